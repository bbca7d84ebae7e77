//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod export;
pub mod expense;
pub mod import;
pub mod report;
pub mod scan;

pub use export::{handle_export_command, ExportArgs};
pub use expense::{
    handle_add_command, handle_delete_command, handle_edit_command, handle_list_command,
    handle_review_command, handle_show_command, AddArgs, EditArgs, ListArgs,
};
pub use import::handle_import_command;
pub use report::handle_summary_command;
pub use scan::{handle_scan_command, ScanArgs};

use clap::Args;

use crate::error::{SpendlogError, SpendlogResult};
use crate::models::{Category, RecordId};
use crate::reports::{ExpenseFilter, LiveView, SortOrder};
use crate::storage::{RecordStore, Storage};

/// View filters shared by list, summary and export
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Month prefix (YYYY-MM)
    #[arg(short, long)]
    pub month: Option<String>,
    /// Category name
    #[arg(short, long)]
    pub category: Option<Category>,
    /// Text to find in place, address or transaction ID
    #[arg(short, long)]
    pub search: Option<String>,
    /// Oldest first instead of newest first
    #[arg(long)]
    pub oldest_first: bool,
}

impl FilterArgs {
    pub fn to_filter(&self) -> ExpenseFilter {
        ExpenseFilter {
            month: self.month.clone(),
            category: self.category,
            search: self.search.clone(),
            sort: if self.oldest_first {
                SortOrder::Ascending
            } else {
                SortOrder::Descending
            },
        }
    }
}

/// Build a view of the user's records with `filter` applied
pub(crate) fn filtered_view(storage: &Storage, filter: &FilterArgs) -> SpendlogResult<LiveView> {
    let view = LiveView::new();
    view.set_filter(filter.to_filter());
    let _subscription = view.attach(&storage.expenses)?;
    Ok(view)
}

/// Check a profile name before it becomes a directory
pub fn validate_user_name(name: &str) -> SpendlogResult<&str> {
    let name = name.trim();
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(SpendlogError::Validation(format!(
            "Invalid user name '{}'",
            name
        )));
    }
    Ok(name)
}

/// Find a record by full ID, ID prefix or transaction ID
pub fn resolve_record_id(store: &dyn RecordStore, raw: &str) -> SpendlogResult<RecordId> {
    let raw = raw.trim();
    if let Ok(id) = RecordId::parse(raw) {
        return Ok(id);
    }
    if raw.is_empty() {
        return Err(SpendlogError::expense_not_found(raw));
    }

    let prefix = raw.to_lowercase();
    let matches: Vec<RecordId> = store
        .snapshot()?
        .into_iter()
        .filter(|r| {
            r.id.to_string().starts_with(&prefix) || r.transaction_id.eq_ignore_ascii_case(raw)
        })
        .map(|r| r.id)
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(SpendlogError::expense_not_found(raw)),
        _ => Err(SpendlogError::Validation(format!(
            "'{}' matches {} expenses; use a longer ID",
            raw,
            matches.len()
        ))),
    }
}
