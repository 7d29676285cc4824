//! Process-tree-wide fork budget.
//!
//! The budget lives in a shared memory arena backed by a `memfd`. Every
//! process that maps the arena (forked descendants inherit the mapping,
//! exec'd images attach through [`env::FORK_GUARD_FD`]) draws from the same
//! counter. A budget of `N` admits exactly `N - 1` forks across the tree and
//! never refills. The cgroup `pids.max` limit remains the primary control.

use std::os::fd::{AsRawFd, FromRawFd, IntoRawFd, OwnedFd, RawFd};
use std::ptr::{NonNull, addr_of_mut};
use std::time::Duration;

use nix::errno::Errno;
use nix::unistd::ForkResult;

use crate::env;
use crate::error::{Result, SandboxError};

const ARENA_SIZE: usize = 4096;

#[repr(C)]
struct GuardState {
    gate: libc::sem_t,
    max_procs: u64,
    start_delay_ms: u64,
}

const _: () = assert!(std::mem::size_of::<GuardState>() <= ARENA_SIZE);

pub struct ForkGuard {
    state: NonNull<GuardState>,
    fd: OwnedFd,
    owner: bool,
}

// SAFETY: the arena is shared memory and every mutation of the counter
// happens while holding the process-shared semaphore.
unsafe impl Send for ForkGuard {}
// SAFETY: see above.
unsafe impl Sync for ForkGuard {}

impl ForkGuard {
    /// Create a fresh arena with `max_procs` budget and a per-fork delay.
    pub fn create(max_procs: u64, start_delay_ms: u64) -> Result<Self> {
        // SAFETY: the name is a valid C string; no flags, so the descriptor
        // survives exec for descendants that attach to it.
        let raw = unsafe { libc::memfd_create(c"yajudge-fork-guard".as_ptr(), 0) };
        if raw < 0 {
            return Err(SandboxError::ForkGuard(Errno::last()));
        }
        // SAFETY: memfd_create returned a fresh descriptor that we own.
        let fd = unsafe { OwnedFd::from_raw_fd(raw) };
        // SAFETY: fd is a valid memfd.
        if unsafe { libc::ftruncate(fd.as_raw_fd(), ARENA_SIZE as libc::off_t) } != 0 {
            return Err(SandboxError::ForkGuard(Errno::last()));
        }
        let state = map_arena(&fd)?;
        let p = state.as_ptr();
        // SAFETY: the mapping is ARENA_SIZE bytes, zero filled and exclusively ours
        // until the semaphore is published.
        unsafe {
            addr_of_mut!((*p).max_procs).write(max_procs);
            addr_of_mut!((*p).start_delay_ms).write(start_delay_ms);
            if libc::sem_init(addr_of_mut!((*p).gate), 1, 1) != 0 {
                let err = Errno::last();
                libc::munmap(p.cast(), ARENA_SIZE);
                return Err(SandboxError::ForkGuard(err));
            }
        }
        Ok(Self {
            state,
            fd,
            owner: true,
        })
    }

    /// Map an arena created by an ancestor process.
    pub fn attach(fd: OwnedFd) -> Result<Self> {
        let state = map_arena(&fd)?;
        Ok(Self {
            state,
            fd,
            owner: false,
        })
    }

    /// Attach to an inherited arena, or create one from the process-count
    /// variables. Without either the budget is unlimited.
    pub fn from_env() -> Result<Self> {
        if let Some(fd) = env::u64_var(env::FORK_GUARD_FD)? {
            let raw = RawFd::try_from(fd).map_err(|_| SandboxError::InvalidEnv {
                name: env::FORK_GUARD_FD,
                value: fd.to_string(),
            })?;
            // SAFETY: F_GETFD only inspects the descriptor table.
            if unsafe { libc::fcntl(raw, libc::F_GETFD) } < 0 {
                return Err(SandboxError::ForkGuard(Errno::last()));
            }
            // SAFETY: the descriptor was handed to this process for exclusive use
            // through the environment and is known to be open.
            return Self::attach(unsafe { OwnedFd::from_raw_fd(raw) });
        }
        let max_procs = env::count_var(env::PROC_COUNT_LIMIT)?.unwrap_or(u64::MAX);
        let start_delay_ms = env::u64_var(env::PROC_START_DELAY)?.unwrap_or(0);
        Self::create(max_procs, start_delay_ms)
    }

    /// Variable that lets an exec'd descendant attach to this arena.
    pub fn export_env(&self) -> (&'static str, String) {
        (env::FORK_GUARD_FD, self.fd.as_raw_fd().to_string())
    }

    /// Keep the arena alive across exec: the descriptor stays open and the
    /// semaphore is not destroyed.
    pub fn into_inherited_fd(self) -> RawFd {
        let this = std::mem::ManuallyDrop::new(self);
        // SAFETY: the mapping is released exactly once; `this` is never dropped.
        unsafe {
            libc::munmap(this.state.as_ptr().cast(), ARENA_SIZE);
            std::ptr::read(&this.fd).into_raw_fd()
        }
    }

    /// Take one unit of budget. Fails with `EAGAIN` once the budget is
    /// down to its last unit, exactly like an exhausted `fork`.
    pub fn reserve(&self) -> std::result::Result<(), Errno> {
        let p = self.state.as_ptr();
        // SAFETY: the arena is mapped for the lifetime of self and the gate was
        // initialised by the creator before the descriptor was shared.
        let delay_ms = unsafe {
            let gate = addr_of_mut!((*p).gate);
            while libc::sem_wait(gate) != 0 {
                let err = Errno::last();
                if err != Errno::EINTR {
                    return Err(err);
                }
            }
            let remaining = addr_of_mut!((*p).max_procs);
            if remaining.read() <= 1 {
                libc::sem_post(gate);
                return Err(Errno::EAGAIN);
            }
            remaining.write(remaining.read() - 1);
            libc::sem_post(gate);
            addr_of_mut!((*p).start_delay_ms).read()
        };
        if delay_ms > 0 {
            std::thread::sleep(Duration::from_millis(delay_ms));
        }
        Ok(())
    }

    /// Fork after taking one unit of budget.
    ///
    /// # Safety
    ///
    /// Same contract as [`nix::unistd::fork`]: in a multithreaded parent the
    /// child may only call async-signal-safe functions until it execs.
    pub unsafe fn fork(&self) -> std::result::Result<ForkResult, Errno> {
        self.reserve()?;
        // SAFETY: forwarded to the caller.
        unsafe { nix::unistd::fork() }
    }

    /// Budget left, read under the gate.
    pub fn remaining(&self) -> u64 {
        let p = self.state.as_ptr();
        // SAFETY: see `reserve`.
        unsafe {
            let gate = addr_of_mut!((*p).gate);
            while libc::sem_wait(gate) != 0 && Errno::last() == Errno::EINTR {}
            let value = addr_of_mut!((*p).max_procs).read();
            libc::sem_post(gate);
            value
        }
    }
}

impl Drop for ForkGuard {
    fn drop(&mut self) {
        let p = self.state.as_ptr();
        // SAFETY: the mapping is live until this munmap; only the creator
        // destroys the semaphore.
        unsafe {
            if self.owner {
                libc::sem_destroy(addr_of_mut!((*p).gate));
            }
            libc::munmap(p.cast(), ARENA_SIZE);
        }
    }
}

fn map_arena(fd: &OwnedFd) -> Result<NonNull<GuardState>> {
    // SAFETY: mapping a shared region of a descriptor we hold; the result is
    // checked against MAP_FAILED before use.
    let addr = unsafe {
        libc::mmap(
            std::ptr::null_mut(),
            ARENA_SIZE,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_SHARED,
            fd.as_raw_fd(),
            0,
        )
    };
    if addr == libc::MAP_FAILED {
        return Err(SandboxError::ForkGuard(Errno::last()));
    }
    NonNull::new(addr.cast::<GuardState>()).ok_or(SandboxError::ForkGuard(Errno::EFAULT))
}
