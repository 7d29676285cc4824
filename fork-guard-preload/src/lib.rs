//! `fork` wrapper for programs running under `limited-run`.
//!
//! Loaded with `LD_PRELOAD`, this library interposes `fork` and charges each
//! call to the budget in the arena named by `YAJUDGE_FORK_GUARD_FD`. Once the
//! budget is spent `fork` fails with `EAGAIN`. Without the variable every
//! call goes straight to the next `fork` in the lookup order.

use std::sync::OnceLock;

use sandbox::{ForkGuard, env};

type ForkFn = unsafe extern "C" fn() -> libc::pid_t;

static GUARD: OnceLock<Option<ForkGuard>> = OnceLock::new();
static NEXT_FORK: OnceLock<Option<ForkFn>> = OnceLock::new();

/// Arena inherited from `limited-run`, attached on first use.
fn guard() -> Option<&'static ForkGuard> {
    GUARD
        .get_or_init(|| {
            env::var(env::FORK_GUARD_FD)?;
            ForkGuard::from_env().ok()
        })
        .as_ref()
}

fn next_fork() -> Option<ForkFn> {
    *NEXT_FORK.get_or_init(|| {
        // SAFETY: looking up a symbol by a NUL-terminated name.
        let sym = unsafe { libc::dlsym(libc::RTLD_NEXT, c"fork".as_ptr()) };
        if sym.is_null() {
            return None;
        }
        // SAFETY: the symbol found is libc's `fork`, which has this signature.
        Some(unsafe { std::mem::transmute::<*mut libc::c_void, ForkFn>(sym) })
    })
}

fn fail(errno: i32) -> libc::pid_t {
    // SAFETY: __errno_location returns the calling thread's errno slot.
    unsafe { *libc::__errno_location() = errno };
    -1
}

/// Budgeted replacement for libc `fork`.
///
/// # Safety
///
/// Same contract as libc `fork`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fork() -> libc::pid_t {
    if let Some(guard) = guard()
        && let Err(errno) = guard.reserve()
    {
        return fail(errno as i32);
    }
    match next_fork() {
        // SAFETY: forwarded to the caller.
        Some(real_fork) => unsafe { real_fork() },
        None => fail(libc::ENOSYS),
    }
}
