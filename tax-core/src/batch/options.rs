use std::num::NonZeroUsize;

/// Tuning for a single run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// Worker count for the compute phase. `None` uses the machine's
    /// available parallelism.
    pub workers: Option<NonZeroUsize>,
}

impl BatchOptions {
    pub fn with_workers(workers: NonZeroUsize) -> Self {
        Self {
            workers: Some(workers),
        }
    }

    /// Resolved worker count. Falls back to 1 when the platform cannot
    /// report its parallelism.
    pub fn worker_count(&self) -> NonZeroUsize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
        })
    }
}
