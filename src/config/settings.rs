//! User settings for spendlog
//!
//! Manages tunables for the ingestion pipeline (scan quota, batch size,
//! recognition model) and display preferences.

use serde::{Deserialize, Serialize};

use super::paths::SpendlogPaths;
use crate::error::SpendlogError;

/// User settings for spendlog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Maximum receipt images that may be scanned per calendar day
    #[serde(default = "default_daily_scan_limit")]
    pub daily_scan_limit: u32,

    /// Number of create operations per atomic write batch
    #[serde(default = "default_batch_capacity")]
    pub batch_capacity: usize,

    /// Model name passed to the recognition service
    #[serde(default = "default_recognition_model")]
    pub recognition_model: String,

    /// Base URL of the recognition service
    #[serde(default = "default_recognition_url")]
    pub recognition_url: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_daily_scan_limit() -> u32 {
    20
}

fn default_batch_capacity() -> usize {
    450
}

fn default_recognition_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_recognition_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            daily_scan_limit: default_daily_scan_limit(),
            batch_capacity: default_batch_capacity(),
            recognition_model: default_recognition_model(),
            recognition_url: default_recognition_url(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &SpendlogPaths) -> Result<Self, SpendlogError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                SpendlogError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                SpendlogError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            settings.validate()?;
            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &SpendlogPaths) -> Result<(), SpendlogError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            SpendlogError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| SpendlogError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<(), SpendlogError> {
        if self.batch_capacity == 0 {
            return Err(SpendlogError::Config(
                "batch_capacity must be at least 1".into(),
            ));
        }
        if self.recognition_model.trim().is_empty() {
            return Err(SpendlogError::Config(
                "recognition_model must not be empty".into(),
            ));
        }
        Ok(())
    }
}
