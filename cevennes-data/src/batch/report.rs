//! Per-dataset results of a batch run.

use crate::materialize::DatasetStatus;

/// Terminal state of one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetReport {
    /// Dataset key.
    pub key: String,
    /// Output file name.
    pub output: String,
    /// What happened.
    pub status: DatasetStatus,
}

/// Outcome of [`super::run_batch`], in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    entries: Vec<DatasetReport>,
}

impl BatchReport {
    pub(super) fn push(&mut self, entry: DatasetReport) {
        self.entries.push(entry);
    }

    /// Reports in processing order.
    #[must_use]
    pub fn entries(&self) -> &[DatasetReport] {
        &self.entries
    }

    /// Status of the dataset with `key`, if it was processed.
    #[must_use]
    pub fn status(&self, key: &str) -> Option<&DatasetStatus> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.status)
    }

    /// Datasets written with fetched features.
    #[must_use]
    pub fn written(&self) -> usize {
        self.count(|status| matches!(status, DatasetStatus::Written { .. }))
    }

    /// Datasets written as empty collections.
    #[must_use]
    pub fn written_empty(&self) -> usize {
        self.count(|status| matches!(status, DatasetStatus::WrittenEmpty { .. }))
    }

    /// Datasets skipped for lack of a query document.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|status| matches!(status, DatasetStatus::Skipped))
    }

    /// Datasets stopped by a local fault.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|status| matches!(status, DatasetStatus::Failed { .. }))
    }

    fn count(&self, predicate: impl Fn(&DatasetStatus) -> bool) -> usize {
        self.entries
            .iter()
            .filter(|entry| predicate(&entry.status))
            .count()
    }
}
