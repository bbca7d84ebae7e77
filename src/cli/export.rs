//! CLI command for CSV export

use std::path::PathBuf;

use clap::Args;

use super::{filtered_view, FilterArgs};
use crate::error::SpendlogResult;
use crate::export::{default_export_filename, export_to_file};
use crate::storage::Storage;

/// Arguments for `export`
#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
    /// Output file, defaults to expenses_export_<today>.csv
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Handle the export command
pub fn handle_export_command(storage: &Storage, args: ExportArgs) -> SpendlogResult<()> {
    let rows = filtered_view(storage, &args.filter)?.rows();
    let output = args
        .output
        .unwrap_or_else(|| default_export_filename(chrono::Local::now().date_naive()));

    if export_to_file(&rows, &output)? {
        println!("Exported {} expenses to {}", rows.len(), output.display());
    } else {
        println!("Nothing to export.");
    }
    Ok(())
}
