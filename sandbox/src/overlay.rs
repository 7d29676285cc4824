use std::path::{Path, PathBuf};

use nix::mount::{MntFlags, MsFlags, mount, umount2};
use tracing::{info, warn};

use crate::capability::SysAdminGuard;
use crate::env;
use crate::error::{Result, SandboxError};

/// Pseudo filesystems mounted inside the merged root, in mount order.
const SUBMOUNTS: [(&str, &str, &str); 3] = [
    ("tmp", "tmpfs", "tmpfs"),
    ("dev/shm", "tmpfs", "tmpfs"),
    ("proc", "procfs", "proc"),
];

/// Overlay root for one job: a read-only system image (`lower`) with a
/// per-job writable layer (`upper`) merged at `merge`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayMount {
    pub lower: PathBuf,
    pub upper: PathBuf,
    pub work: PathBuf,
    pub merge: PathBuf,
}

impl OverlayMount {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            lower: env::require(env::OVERLAY_LOWERDIR)?.into(),
            upper: env::require(env::OVERLAY_UPPERDIR)?.into(),
            work: env::require(env::OVERLAY_WORKDIR)?.into(),
            merge: env::require(env::OVERLAY_MERGEDIR)?.into(),
        })
    }

    pub fn options(&self) -> String {
        format!(
            "lowerdir={},upperdir={},workdir={}",
            self.lower.display(),
            self.upper.display(),
            self.work.display()
        )
    }

    /// Mount the overlay and the tmpfs/proc filesystems inside it.
    ///
    /// Stops at the first failure; mounts made before it are left in place
    /// for `unmount` to clean up.
    pub fn mount(&self) -> Result<()> {
        if is_mounted(&self.merge)? {
            return Err(SandboxError::AlreadyMounted(self.merge.clone()));
        }
        let _cap = SysAdminGuard::acquire()?;

        let options = self.options();
        mount(
            Some("overlay"),
            &self.merge,
            Some("overlay"),
            MsFlags::empty(),
            Some(options.as_str()),
        )
        .map_err(|source| SandboxError::Mount {
            target: self.merge.clone(),
            source,
        })?;

        for (sub, source, fstype) in SUBMOUNTS {
            let target = self.merge.join(sub);
            mount(
                Some(source),
                &target,
                Some(fstype),
                MsFlags::empty(),
                Some(""),
            )
            .map_err(|source| SandboxError::Mount { target, source })?;
        }
        info!(merge = %self.merge.display(), "overlay mounted");
        Ok(())
    }
}

/// Force-unmount the pseudo filesystems and then the overlay at `merge`.
///
/// Sub-mount failures are logged and skipped; only a failure to unmount
/// the overlay root is an error.
pub fn unmount(merge: &Path) -> Result<()> {
    let _cap = SysAdminGuard::acquire()?;
    for (sub, _, _) in SUBMOUNTS {
        let target = merge.join(sub);
        if let Err(e) = umount2(&target, MntFlags::MNT_FORCE) {
            warn!(target = %target.display(), error = %e, "unmount failed");
        }
    }
    umount2(merge, MntFlags::MNT_FORCE).map_err(|source| SandboxError::Unmount {
        target: merge.to_path_buf(),
        source,
    })?;
    info!(merge = %merge.display(), "overlay unmounted");
    Ok(())
}

/// Whether `target` is a mount point of the calling process's namespace.
///
/// `target` is canonicalized first, since the kernel reports mount points
/// as absolute paths without `..` or symlinks. A missing path is not mounted.
pub fn is_mounted(target: &Path) -> Result<bool> {
    let target = match std::fs::canonicalize(target) {
        Ok(path) => path,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };
    let mountinfo = std::fs::read_to_string("/proc/self/mountinfo")?;
    Ok(mount_points(&mountinfo).iter().any(|p| *p == target))
}

fn mount_points(mountinfo: &str) -> Vec<PathBuf> {
    mountinfo
        .lines()
        .filter_map(|line| line.split(' ').nth(4))
        .map(|p| PathBuf::from(unescape_octal(p)))
        .collect()
}

/// Undo the `\NNN` escaping the kernel applies to mountinfo paths.
fn unescape_octal(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while let Some(&b) = bytes.get(i) {
        let code = bytes
            .get(i + 1..i + 4)
            .filter(|_| b == b'\\')
            .and_then(|d| std::str::from_utf8(d).ok())
            .and_then(|d| u8::from_str_radix(d, 8).ok());
        match code {
            Some(c) => {
                out.push(c);
                i += 4;
            }
            None => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OverlayMount {
        OverlayMount {
            lower: "/srv/root".into(),
            upper: "/var/lib/yajudge/1/upperdir".into(),
            work: "/var/lib/yajudge/1/workdir".into(),
            merge: "/var/lib/yajudge/1/root".into(),
        }
    }

    #[test]
    fn option_string() {
        assert_eq!(
            sample().options(),
            "lowerdir=/srv/root,upperdir=/var/lib/yajudge/1/upperdir,workdir=/var/lib/yajudge/1/workdir"
        );
    }

    #[test]
    fn parses_mount_points_with_escapes() {
        let info = "\
22 1 259:2 / / rw,relatime shared:1 - ext4 /dev/root rw
35 22 0:31 / /var/lib/my\\040dir rw - overlay overlay rw,lowerdir=/a
36 35 0:32 / /proc rw,nosuid - proc proc rw
";
        let points = mount_points(info);
        assert_eq!(
            points,
            vec![
                PathBuf::from("/"),
                PathBuf::from("/var/lib/my dir"),
                PathBuf::from("/proc"),
            ]
        );
    }

    #[test]
    fn root_is_mounted_and_tempdir_is_not() {
        assert!(is_mounted(Path::new("/")).unwrap());
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_mounted(dir.path()).unwrap());
    }

    #[test]
    fn non_canonical_mount_point_is_still_found() {
        assert!(is_mounted(Path::new("/proc/../proc")).unwrap());
        assert!(is_mounted(Path::new("/proc/self/..")).unwrap());
        assert!(is_mounted(Path::new("/tmp/..")).unwrap());

        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("proc-link");
        std::os::unix::fs::symlink("/proc", &link).unwrap();
        assert!(is_mounted(&link).unwrap());
        assert!(!is_mounted(&dir.path().join("absent")).unwrap());
    }

    #[test]
    #[ignore = "requires CAP_SYS_ADMIN"]
    fn mount_then_unmount_restores_mount_table() {
        let before = std::fs::read_to_string("/proc/self/mountinfo").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let layout = |name: &str| {
            let p = dir.path().join(name);
            std::fs::create_dir_all(&p).unwrap();
            p
        };
        let lower = layout("lower");
        for sub in ["tmp", "dev/shm", "proc"] {
            std::fs::create_dir_all(lower.join(sub)).unwrap();
        }
        let overlay = OverlayMount {
            lower,
            upper: layout("upper"),
            work: layout("work"),
            merge: layout("merge"),
        };

        overlay.mount().unwrap();
        assert!(is_mounted(&overlay.merge).unwrap());
        assert!(matches!(
            overlay.mount(),
            Err(SandboxError::AlreadyMounted(_))
        ));
        unmount(&overlay.merge).unwrap();

        let after = std::fs::read_to_string("/proc/self/mountinfo").unwrap();
        assert_eq!(mount_points(&before), mount_points(&after));
    }
}
