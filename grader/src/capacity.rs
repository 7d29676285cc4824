use std::sync::Arc;

use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};
use yajudge_proto::ServiceStatus;

/// Pool of task slots: one per grading worker plus one held by the master
/// link for its whole lifetime.
#[derive(Debug, Clone)]
pub struct WorkerSlots {
    semaphore: Arc<Semaphore>,
    workers: usize,
}

impl WorkerSlots {
    pub fn new(workers: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(workers + 1)),
            workers,
        }
    }

    /// Total slots including the reserved link slot.
    pub fn pool_size(&self) -> usize {
        self.workers + 1
    }

    /// Wait for a free slot.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, AcquireError> {
        Arc::clone(&self.semaphore).acquire_owned().await
    }

    pub fn try_acquire(&self) -> Option<OwnedSemaphorePermit> {
        Arc::clone(&self.semaphore).try_acquire_owned().ok()
    }

    /// Tasks currently holding a slot, the link included.
    pub fn active_tasks(&self) -> usize {
        self.pool_size()
            .saturating_sub(self.semaphore.available_permits())
    }

    pub fn capacity(&self) -> WorkerCapacity {
        WorkerCapacity::from_active_tasks(self.workers, self.active_tasks())
    }
}

/// Derived view of the pool, recomputed for every status push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerCapacity {
    pub capacity: usize,
    pub used: usize,
}

impl WorkerCapacity {
    /// `active_tasks` counts the link's own task, which is not a grading job.
    pub fn from_active_tasks(capacity: usize, active_tasks: usize) -> Self {
        Self {
            capacity,
            used: active_tasks.saturating_sub(1),
        }
    }

    pub fn free_slots(&self) -> usize {
        self.capacity.saturating_sub(self.used)
    }

    pub fn accepts_work(&self) -> bool {
        self.free_slots() > 0
    }

    pub fn service_status(&self) -> ServiceStatus {
        if self.accepts_work() {
            ServiceStatus::Idle
        } else {
            ServiceStatus::Busy
        }
    }
}
