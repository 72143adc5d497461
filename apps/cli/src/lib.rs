//! # BillBook CLI Library
//!
//! Command-line shell over billbook-core and billbook-db.
//!
//! ## Module Organization
//! ```text
//! billbook_cli/
//! ├── lib.rs          ◄─── You are here (argument tree & run)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── db.rs       ◄─── Database + live snapshot
//! │   └── config.rs   ◄─── Config file, env overrides, formatting
//! ├── commands/
//! │   ├── mod.rs      ◄─── Output, tables, shared parsers
//! │   ├── customer.rs
//! │   ├── product.rs
//! │   ├── invoice.rs
//! │   ├── expense.rs
//! │   ├── report.rs
//! │   ├── settings.rs
//! │   └── backup.rs
//! └── error.rs        ◄─── API error type and exit codes
//! ```
//!
//! ## One Invocation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Initialize Logging (stderr, RUST_LOG overrides)                     │
//! │  2. Load ConfigState (defaults ◄── billbook.toml ◄── BILLBOOK_* env)    │
//! │  3. Open Database (SQLite, WAL, migrations) and load the snapshot       │
//! │  4. Dispatch the command ──► Output                                     │
//! │  5. Print Output (text or --json); errors go to stderr with an exit code│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod state;

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use billbook_db::{Database, DbConfig};
use commands::backup::BackupCommand;
use commands::customer::CustomerCommand;
use commands::expense::ExpenseCommand;
use commands::invoice::InvoiceCommand;
use commands::product::ProductCommand;
use commands::settings::SettingsCommand;
use commands::Output;
use error::ApiResult;
use state::{ConfigState, DbState};

#[derive(Debug, Parser)]
#[command(name = "billbook", version, about = "Invoices, purchase bills and expenses for a small business")]
pub struct Cli {
    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage customers
    #[command(subcommand)]
    Customer(CustomerCommand),
    /// Manage the product catalogue and stock
    #[command(subcommand)]
    Product(ProductCommand),
    /// Sale invoices and purchase bills
    #[command(subcommand)]
    Invoice(InvoiceCommand),
    /// Record and review expenses
    #[command(subcommand)]
    Expense(ExpenseCommand),
    /// Headline figures and recent invoices
    Dashboard,
    /// Revenue, profit, monthly rollup and top customers
    Report,
    /// Business profile and diagnostics
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Export or import a JSON backup
    #[command(subcommand)]
    Backup(BackupCommand),
    /// Delete all data
    Clear {
        #[arg(long)]
        yes: bool,
    },
}

/// Parses the command line, runs one command and returns the exit code.
pub async fn run() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let json = cli.json;

    match execute(cli).await {
        Ok(output) => {
            println!("{}", output.render(json));
            ExitCode::SUCCESS
        }
        Err(err) => {
            if json {
                let body = serde_json::to_string(&err).unwrap_or_else(|_| err.to_string());
                eprintln!("{}", body);
            } else {
                eprintln!("error {}", err);
            }
            ExitCode::from(err.exit_code())
        }
    }
}

async fn execute(cli: Cli) -> ApiResult<Output> {
    let config = ConfigState::load();
    let db_path = config.database_path()?;
    debug!(?db_path, "Database path determined");

    let db = Database::new(DbConfig::new(db_path)).await?;
    let mut db = DbState::open(db).await?;
    info!("Database opened");

    let output = dispatch(cli.command, &mut db, &config).await;
    db.inner().close().await;
    output
}

/// Routes a parsed command to its handler.
pub async fn dispatch(command: Commands, db: &mut DbState, config: &ConfigState) -> ApiResult<Output> {
    match command {
        Commands::Customer(cmd) => commands::customer::run(cmd, db, config).await,
        Commands::Product(cmd) => commands::product::run(cmd, db, config).await,
        Commands::Invoice(cmd) => commands::invoice::run(cmd, db, config).await,
        Commands::Expense(cmd) => commands::expense::run(cmd, db, config).await,
        Commands::Dashboard => commands::report::run_dashboard(db, config),
        Commands::Report => commands::report::run_report(db, config),
        Commands::Settings(cmd) => commands::settings::run(cmd, db, config).await,
        Commands::Backup(cmd) => commands::backup::run(cmd, db, config).await,
        Commands::Clear { yes } => commands::backup::clear(db, yes).await,
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so stdout stays clean for tables and `--json`.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=billbook_db=trace` - Trace the storage layer only
/// - Default: warnings only
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,sqlx=error"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_nested_commands() {
        let cli = Cli::try_parse_from([
            "billbook", "invoice", "new", "--customer", "Acme", "--item", "Audit:1:5000:18", "--json",
        ])
        .unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Invoice(InvoiceCommand::New { .. })));

        let cli = Cli::try_parse_from(["billbook", "product", "stock", "abc", "-3"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Product(ProductCommand::Stock { delta: -3, .. })
        ));

        let cli = Cli::try_parse_from(["billbook", "clear"]).unwrap();
        assert!(matches!(cli.command, Commands::Clear { yes: false }));
    }

    #[test]
    fn test_draft_and_paid_conflict() {
        let err = Cli::try_parse_from([
            "billbook", "invoice", "new", "--customer", "Acme", "--draft", "--paid",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[tokio::test]
    async fn test_dispatch_end_to_end() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut db = DbState::open(db).await.unwrap();
        let config = ConfigState::default();

        let cli = Cli::try_parse_from(["billbook", "customer", "add", "Acme Traders"]).unwrap();
        dispatch(cli.command, &mut db, &config).await.unwrap();

        let cli = Cli::try_parse_from([
            "billbook", "invoice", "new", "--customer", "Acme Traders", "--item", "Audit:2:5000:18", "--paid",
        ])
        .unwrap();
        let out = dispatch(cli.command, &mut db, &config).await.unwrap();
        assert!(out.text().contains("INV-0001"));
        assert!(out.text().contains("₹11,800.00"));

        let cli = Cli::try_parse_from(["billbook", "dashboard"]).unwrap();
        let out = dispatch(cli.command, &mut db, &config).await.unwrap();
        assert!(out.text().contains("₹11,800.00"));
    }
}
