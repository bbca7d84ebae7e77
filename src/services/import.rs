//! CSV import service
//!
//! Parses exported CSV text and writes the accepted rows through the batched
//! writer. Rows that fail parsing are skipped and counted.

use std::path::Path;

use chrono::{Local, NaiveDate};
use rand::Rng;

use crate::error::{SpendlogError, SpendlogResult};
use crate::import::{parse_rows, ParsedRow};
use crate::services::writer::{BatchWriter, CommitOutcome, CommitReport, DEFAULT_BATCH_CAPACITY};
use crate::storage::RecordStore;

/// Result of a completed import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Rows that passed parsing and validation
    pub imported: usize,
    /// Non-blank data rows that were dropped
    pub skipped: usize,
    /// Rows acknowledged by the store
    pub persisted: usize,
    /// Writer report for the accepted rows
    pub report: CommitReport,
}

impl ImportSummary {
    pub fn outcome(&self) -> CommitOutcome {
        self.report.outcome()
    }
}

/// Service for importing expenses from CSV
pub struct ImportService<'a> {
    store: &'a dyn RecordStore,
    batch_capacity: usize,
}

impl<'a> ImportService<'a> {
    /// Create a new import service
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self {
            store,
            batch_capacity: DEFAULT_BATCH_CAPACITY,
        }
    }

    /// Override the writer group size
    pub fn with_batch_capacity(mut self, capacity: usize) -> Self {
        self.batch_capacity = capacity;
        self
    }

    /// Import from a file on disk
    pub fn import_file(&self, path: &Path) -> SpendlogResult<ImportSummary> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            SpendlogError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?;
        self.import_csv(&text)
    }

    /// Import CSV text, dating blank rows today
    pub fn import_csv(&self, text: &str) -> SpendlogResult<ImportSummary> {
        self.import_csv_on(text, Local::now().date_naive(), &mut rand::thread_rng())
    }

    /// Import CSV text with an explicit clock and id source
    pub fn import_csv_on<R: Rng>(
        &self,
        text: &str,
        today: NaiveDate,
        rng: &mut R,
    ) -> SpendlogResult<ImportSummary> {
        if !has_data_lines(text) {
            return Err(SpendlogError::InputFormat(
                "CSV has no data rows".into(),
            ));
        }

        let mut skipped = 0usize;
        let accepted = parse_rows(text, today, rng).filter_map(|row| match row {
            ParsedRow::Accepted { expense, .. } => Some(expense),
            ParsedRow::Dropped { line, reason } => {
                tracing::debug!(line, ?reason, "dropped import row");
                skipped += 1;
                None
            }
        });

        let report = BatchWriter::with_capacity(self.store, self.batch_capacity).commit(accepted);

        let summary = ImportSummary {
            imported: report.accepted,
            skipped,
            persisted: report.persisted,
            report,
        };
        tracing::info!(
            imported = summary.imported,
            skipped = summary.skipped,
            persisted = summary.persisted,
            "csv import finished"
        );
        Ok(summary)
    }
}

/// True when anything but blank lines follows the header
fn has_data_lines(text: &str) -> bool {
    text.split('\n').skip(1).any(|line| !line.trim().is_empty())
}
