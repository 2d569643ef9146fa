use crate::sweep::SweepDataset;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Latest published dataset with a version that increases on every
/// publish. The lock is held only to swap or clone the `Arc`.
#[derive(Debug, Default)]
pub struct DatasetSlot {
    current: Mutex<Arc<SweepDataset>>,
    version: AtomicU64,
}

impl DatasetSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the dataset and return its version
    pub fn publish(&self, dataset: SweepDataset) -> u64 {
        let dataset = Arc::new(dataset);
        let mut guard = self.current.lock();
        *guard = dataset;
        self.version.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn snapshot(&self) -> Arc<SweepDataset> {
        Arc::clone(&self.current.lock())
    }

    /// Dataset and version as one consistent pair
    pub fn snapshot_versioned(&self) -> (Arc<SweepDataset>, u64) {
        let guard = self.current.lock();
        (Arc::clone(&guard), self.version.load(Ordering::Acquire))
    }

    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Publish an empty dataset
    pub fn reset(&self) -> u64 {
        self.publish(SweepDataset::default())
    }
}
