//! CLI command for receipt scanning

use std::path::PathBuf;

use clap::Args;

use crate::config::Settings;
use crate::display::format_scan_outcome;
use crate::error::SpendlogResult;
use crate::recognition::{Credential, GeminiClient, GeminiConfig, ReceiptImage};
use crate::services::{ScanService, ScanState};
use crate::storage::Storage;

/// Arguments for `scan`
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Receipt images (jpg, png, webp, heic, gif)
    #[arg(required = true)]
    pub images: Vec<PathBuf>,
    /// Gemini API key; remembered after the first successful use
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

/// Handle the scan command
pub fn handle_scan_command(
    storage: &Storage,
    settings: &Settings,
    args: ScanArgs,
) -> SpendlogResult<()> {
    let images: Vec<ReceiptImage> = args.images.into_iter().map(ReceiptImage::File).collect();
    let credential = args.api_key.and_then(Credential::new);
    let count = images.len();

    let client = GeminiClient::new(GeminiConfig::from(settings));
    let service = ScanService::new(&storage.expenses, &storage.prefs, &client)
        .with_daily_limit(settings.daily_scan_limit)
        .with_batch_capacity(settings.batch_capacity);

    let mut report_progress = |state: ScanState| match state {
        ScanState::Encoding => println!("Processing {} images...", count),
        ScanState::Calling => println!("Analyzing receipts..."),
        ScanState::Persisting => println!("Saving transactions..."),
        _ => {}
    };
    let outcome = service.scan_with_progress(&images, credential, &mut report_progress);

    println!("{}", format_scan_outcome(&outcome));
    match outcome.error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
