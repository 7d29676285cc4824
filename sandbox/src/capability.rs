use caps::{CapSet, Capability};
use tracing::warn;

use crate::error::{Result, SandboxError};

/// Holds `CAP_SYS_ADMIN` in the effective set for as long as it lives.
///
/// The capability must already be permitted (file capability or root). If it
/// was not effective when acquired, it is dropped from the effective set again
/// on drop.
pub struct SysAdminGuard {
    raised: bool,
}

impl SysAdminGuard {
    pub fn acquire() -> Result<Self> {
        let effective = caps::has_cap(None, CapSet::Effective, Capability::CAP_SYS_ADMIN)
            .map_err(|e| SandboxError::Capability(e.to_string()))?;
        if effective {
            return Ok(Self { raised: false });
        }
        caps::raise(None, CapSet::Effective, Capability::CAP_SYS_ADMIN)
            .map_err(|e| SandboxError::Capability(e.to_string()))?;
        Ok(Self { raised: true })
    }
}

impl Drop for SysAdminGuard {
    fn drop(&mut self) {
        if self.raised
            && let Err(e) = caps::drop(None, CapSet::Effective, Capability::CAP_SYS_ADMIN)
        {
            warn!(error = %e, "failed to drop CAP_SYS_ADMIN");
        }
    }
}
