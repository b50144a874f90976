//! # agency: Agency Books on the Command Line
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  1. dotenvy::dotenv()         .env → process environment (optional)    │
//! │  2. init_tracing()            RUST_LOG or the default filter           │
//! │  3. Cli::parse()              clap derive                              │
//! │  4. AppConfig::from_env()     AGENCY_* variables, then --db            │
//! │  5. Database::new()           only for commands that need storage      │
//! │  6. commands::*::run()        print tables (or JSON with --json)       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod commands;
mod config;
mod output;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use agency_db::{Database, DbConfig};
use commands::Context;
use config::AppConfig;

/// Back office for a small trading agency: purchases, sales, items,
/// customers, invoices and the profit tally.
#[derive(Parser)]
#[command(name = "agency", author, version, about, long_about = None)]
struct Cli {
    /// Database file (overrides AGENCY_DB_PATH). `:memory:` for a throwaway run.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Print JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record and list stock purchases.
    #[command(subcommand)]
    Purchase(commands::purchase::PurchaseCommand),

    /// Record, list and void sales.
    #[command(subcommand)]
    Sale(commands::sale::SaleCommand),

    /// Manage inventory items and their QR codes.
    #[command(subcommand)]
    Item(commands::item::ItemCommand),

    /// Manage customers.
    #[command(subcommand)]
    Customer(commands::customer::CustomerCommand),

    /// Print the invoice of a sale.
    Invoice(commands::invoice::InvoiceArgs),

    /// Tally stored purchases against completed sales.
    Tally(commands::tally::TallyArgs),

    /// Tally purchase and sale records from JSON files.
    TallyFile(commands::tally::TallyFileArgs),

    /// Overview: tally plus record counts.
    Stats(commands::RangeArgs),

    /// Fill the database with sample data.
    Seed(commands::seed::SeedArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let dotenv = dotenvy::dotenv().ok();

    init_tracing();
    if let Some(path) = dotenv {
        debug!(path = %path.display(), "Loaded .env");
    }

    let cli = Cli::parse();
    let config = AppConfig::from_env()
        .context("invalid configuration")?
        .with_db_path(cli.db);

    // Tallying files needs no database
    if let Commands::TallyFile(args) = &cli.command {
        return commands::tally::run_file(args, &config, cli.json);
    }

    let db_path = config.database_path()?;
    info!(path = %db_path.display(), "Opening database");
    let db = Database::new(DbConfig::new(db_path))
        .await
        .context("could not open the database")?;

    let ctx = Context {
        db,
        config,
        json: cli.json,
    };

    let result = match cli.command {
        Commands::Purchase(cmd) => commands::purchase::run(cmd, &ctx).await,
        Commands::Sale(cmd) => commands::sale::run(cmd, &ctx).await,
        Commands::Item(cmd) => commands::item::run(cmd, &ctx).await,
        Commands::Customer(cmd) => commands::customer::run(cmd, &ctx).await,
        Commands::Invoice(args) => commands::invoice::run(args, &ctx).await,
        Commands::Tally(args) => commands::tally::run(args, &ctx).await,
        Commands::Stats(args) => commands::stats::run(args, &ctx).await,
        Commands::Seed(args) => commands::seed::run(args, &ctx).await,
        Commands::TallyFile(_) => Ok(()),
    };

    ctx.db.close().await;
    result
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=agency=trace` - Show trace for agency crates only
/// - Default: INFO, DEBUG for agency crates
///
/// Logs go to stderr so stdout stays clean for tables and JSON.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,agency=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
