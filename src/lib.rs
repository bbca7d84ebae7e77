//! spendlog - personal expense tracking
//!
//! Records expenses per user in JSON files, imports bank CSV exports,
//! turns receipt photos into expenses through a recognition service, and
//! computes filtered spending summaries.
//!
//! # Architecture
//!
//! - `config`: Paths and settings
//! - `error`: Custom error types
//! - `models`: Expense records, money, categories and identifiers
//! - `storage`: Record store and key-value store, JSON backed
//! - `import`: CSV row parsing
//! - `recognition`: Receipt recognition client
//! - `services`: Validation, batched writes, quota, import, scan and form logic
//! - `reports`: Filtering, aggregation and the live view
//! - `export`: CSV export
//! - `display`: Terminal formatting
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use spendlog::config::{paths::SpendlogPaths, settings::Settings};
//! use spendlog::storage::Storage;
//!
//! let paths = SpendlogPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::open(paths, "default")?;
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod import;
pub mod models;
pub mod recognition;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::SpendlogError;
