//! Export module for spendlog
//!
//! CSV export of the current filtered view, spreadsheet-compatible and
//! readable by the importer.

pub mod csv;

pub use csv::{
    default_export_filename, export_csv, export_to_file, write_csv, EXPORT_HEADER, VERIFIED_LABEL,
};
