//! Batched writer
//!
//! Commits accepted expenses to a [`RecordStore`] in size-bounded atomic
//! groups. Groups are committed one after another; a failed group stops the
//! run but leaves earlier groups persisted.

use crate::models::NewExpense;
use crate::storage::{RecordStore, WriteBatch};

/// Default number of create operations per group
pub const DEFAULT_BATCH_CAPACITY: usize = 450;

/// How a commit run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// No records were offered
    NothingAccepted,
    /// Every accepted record was persisted
    Complete,
    /// Some groups were persisted before a group failed
    Partial,
    /// Records were accepted but the store persisted none of them
    Rejected,
}

/// Counts reported by [`BatchWriter::commit`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    /// Records handed to the writer
    pub accepted: usize,
    /// Records acknowledged by the store
    pub persisted: usize,
    /// Groups that committed successfully
    pub batches_committed: usize,
    /// Store error of the failed group, if any
    pub failure: Option<String>,
}

impl CommitReport {
    pub fn outcome(&self) -> CommitOutcome {
        if self.accepted == 0 {
            CommitOutcome::NothingAccepted
        } else if self.persisted == self.accepted && self.failure.is_none() {
            CommitOutcome::Complete
        } else if self.persisted == 0 {
            CommitOutcome::Rejected
        } else {
            CommitOutcome::Partial
        }
    }
}

/// Writes records through a store's batch primitive
pub struct BatchWriter<'a> {
    store: &'a dyn RecordStore,
    capacity: usize,
}

impl<'a> BatchWriter<'a> {
    /// Create a writer with the default group capacity
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self::with_capacity(store, DEFAULT_BATCH_CAPACITY)
    }

    /// Create a writer with a custom group capacity (minimum 1)
    pub fn with_capacity(store: &'a dyn RecordStore, capacity: usize) -> Self {
        Self {
            store,
            capacity: capacity.max(1),
        }
    }

    /// Commit every record, flushing whenever a group reaches capacity
    ///
    /// Input after a failed group is still counted as accepted but is not
    /// written.
    pub fn commit<I>(&self, records: I) -> CommitReport
    where
        I: IntoIterator<Item = NewExpense>,
    {
        let mut report = CommitReport::default();
        let mut batch = WriteBatch::new();

        for record in records {
            report.accepted += 1;
            if report.failure.is_some() {
                continue;
            }

            batch.queue(record);
            if batch.len() >= self.capacity {
                self.flush(std::mem::take(&mut batch), &mut report);
            }
        }

        if !batch.is_empty() && report.failure.is_none() {
            self.flush(batch, &mut report);
        }

        tracing::info!(
            accepted = report.accepted,
            persisted = report.persisted,
            batches = report.batches_committed,
            "batched write finished"
        );
        report
    }

    fn flush(&self, batch: WriteBatch, report: &mut CommitReport) {
        let size = batch.len();
        match self.store.commit_batch(batch) {
            Ok(ids) => {
                report.persisted += ids.len();
                report.batches_committed += 1;
                tracing::debug!(size, "committed write batch");
            }
            Err(e) => {
                tracing::warn!(size, error = %e, "write batch rejected, stopping");
                report.failure = Some(e.to_string());
            }
        }
    }
}
