//! Reports module for spendlog
//!
//! Derives filtered views and spending statistics from the record set.

pub mod aggregate;
pub mod view;

pub use aggregate::{apply_filters, Aggregates, CategoryTotal, ExpenseFilter, MonthTotal, SortOrder};
pub use view::LiveView;
