//! CLI command for the spending summary

use super::{filtered_view, FilterArgs};
use crate::config::Settings;
use crate::display::format_quota;
use crate::error::SpendlogResult;
use crate::services::QuotaGuard;
use crate::storage::Storage;

/// Handle the summary command
pub fn handle_summary_command(
    storage: &Storage,
    settings: &Settings,
    filter: FilterArgs,
) -> SpendlogResult<()> {
    let aggregates = filtered_view(storage, &filter)?.aggregates();

    let scope = match &filter.month {
        Some(month) => format!("Spending Summary: {}", month),
        None => "Spending Summary: all time".to_string(),
    };
    println!("{}", scope);
    println!("{}", "=".repeat(50));
    print!("{}", aggregates.format_terminal());

    if !aggregates.available_months.is_empty() {
        println!();
        println!("Months on record: {}", aggregates.available_months.join(", "));
    }

    let guard = QuotaGuard::new(&storage.prefs, settings.daily_scan_limit);
    let usage = guard.usage(chrono::Local::now().date_naive())?;
    println!("{}", format_quota(&usage, guard.limit()));
    Ok(())
}
