//! CLI command handler for CSV import

use std::path::Path;

use crate::config::Settings;
use crate::display::format_import_summary;
use crate::error::{SpendlogError, SpendlogResult};
use crate::services::{CommitOutcome, ImportService};
use crate::storage::Storage;

/// Handle the import command
pub fn handle_import_command(
    storage: &Storage,
    settings: &Settings,
    file: &Path,
) -> SpendlogResult<()> {
    let summary = ImportService::new(&storage.expenses)
        .with_batch_capacity(settings.batch_capacity)
        .import_file(file)?;

    println!("{}", format_import_summary(&summary));

    match (summary.outcome(), summary.report.failure) {
        (CommitOutcome::Partial | CommitOutcome::Rejected, Some(reason)) => {
            Err(SpendlogError::Storage(reason))
        }
        _ => Ok(()),
    }
}
