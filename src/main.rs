use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use spendlog::cli::{
    handle_add_command, handle_delete_command, handle_edit_command, handle_export_command,
    handle_import_command, handle_list_command, handle_review_command, handle_scan_command,
    handle_show_command, handle_summary_command, validate_user_name, AddArgs, EditArgs,
    ExportArgs, FilterArgs, ListArgs, ScanArgs,
};
use spendlog::config::{paths::SpendlogPaths, settings::Settings};
use spendlog::storage::Storage;

#[derive(Parser)]
#[command(
    name = "spendlog",
    version,
    about = "Personal expense tracker",
    long_about = "spendlog records expenses per user, imports bank CSV exports, \
                  reads receipt photos into transactions and summarizes where \
                  the money went."
)]
struct Cli {
    /// Profile whose expenses to use
    #[arg(short, long, global = true, env = "SPENDLOG_USER", default_value = "default")]
    user: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record an expense
    Add(AddArgs),

    /// Change an existing expense
    Edit(EditArgs),

    /// Delete an expense
    #[command(alias = "rm")]
    Delete {
        /// Expense ID, ID prefix or transaction reference
        id: String,
    },

    /// Toggle the review-later flag
    Review {
        /// Expense ID, ID prefix or transaction reference
        id: String,
    },

    /// Show one expense in full
    Show {
        /// Expense ID, ID prefix or transaction reference
        id: String,
    },

    /// List expenses
    #[command(alias = "ls")]
    List(ListArgs),

    /// Totals, category breakdown and monthly trend
    Summary(FilterArgs),

    /// Import a CSV export
    Import {
        /// CSV file path
        file: PathBuf,
    },

    /// Export expenses to CSV
    Export(ExportArgs),

    /// Read receipt images into expenses
    Scan(ScanArgs),

    /// Show configuration
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("SPENDLOG_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let user = validate_user_name(&cli.user)?.to_string();

    // Initialize paths and settings
    let paths = SpendlogPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    // Initialize storage
    let storage = Storage::open(paths.clone(), &user)?;
    tracing::debug!(user = %user, data_dir = %paths.data_dir().display(), "storage opened");

    match cli.command {
        Some(Commands::Add(args)) => handle_add_command(&storage, args)?,
        Some(Commands::Edit(args)) => handle_edit_command(&storage, args)?,
        Some(Commands::Delete { id }) => handle_delete_command(&storage, &id)?,
        Some(Commands::Review { id }) => handle_review_command(&storage, &id)?,
        Some(Commands::Show { id }) => handle_show_command(&storage, &id)?,
        Some(Commands::List(args)) => handle_list_command(&storage, args)?,
        Some(Commands::Summary(filter)) => handle_summary_command(&storage, &settings, filter)?,
        Some(Commands::Import { file }) => handle_import_command(&storage, &settings, &file)?,
        Some(Commands::Export(args)) => handle_export_command(&storage, args)?,
        Some(Commands::Scan(args)) => handle_scan_command(&storage, &settings, args)?,
        Some(Commands::Config) => {
            println!("spendlog Configuration");
            println!("======================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Expenses file:    {}", paths.expenses_file(&user).display());
            println!("Preferences file: {}", paths.prefs_file().display());
            println!();
            println!("Settings:");
            println!("  Daily scan limit:  {}", settings.daily_scan_limit);
            println!("  Batch capacity:    {}", settings.batch_capacity);
            println!("  Recognition model: {}", settings.recognition_model);
            println!("  Recognition URL:   {}", settings.recognition_url);
        }
        None => {
            println!("spendlog - Personal expense tracker");
            println!();
            println!("Run 'spendlog --help' for usage information.");
        }
    }

    Ok(())
}
