//! Display formatting for terminal output
//!
//! Provides utilities for formatting records and pipeline results for
//! terminal display.

pub mod expense;
pub mod outcome;

pub use expense::{format_expense_details, format_expense_table, short_id};
pub use outcome::{format_import_summary, format_quota, format_scan_outcome};
