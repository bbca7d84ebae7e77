//! Import formats
//!
//! Only the positional CSV layout written by the exporter is supported.

pub mod parser;

pub use parser::{parse_rows, tokenize, CsvRows, DropReason, ParsedRow, MIN_COLUMNS};
