pub mod categories;
pub mod export;
pub mod import;
pub mod init;
pub mod report;
pub mod transactions;

use clap::{Parser, Subcommand};

use crate::error::{CasaError, Result};
use crate::session::Session;
use crate::settings::Settings;

/// Parse `YYYY-MM` into `(year, month)`.
pub(crate) fn parse_month(raw: &str) -> Result<(i32, u32)> {
    let invalid = || CasaError::InvalidMonth(raw.to_string());
    let (y, m) = raw.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = y.parse().map_err(|_| invalid())?;
    let month: u32 = m.parse().map_err(|_| invalid())?;
    if y.len() != 4 || !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

/// Session for the configured user, or for `user` when given.
pub(crate) fn open_session(settings: &Settings, user: Option<&str>) -> Result<Session> {
    let name = user.unwrap_or(&settings.user_name);
    let ttl = chrono::Duration::try_minutes(settings.session_ttl_minutes).ok_or_else(|| {
        CasaError::Settings(format!(
            "session_ttl_minutes {} is out of range",
            settings.session_ttl_minutes
        ))
    })?;
    Session::authenticate(name, ttl)
}

#[derive(Parser)]
#[command(name = "casa", about = "Household ledger with encrypted bank statement import.")]
pub struct Cli {
    /// Increase log output (-v info, -vv debug). CASA_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and user, and initialize the ledger.
    Init {
        /// Path for casa data (default: ~/Documents/casa)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Name recorded on every imported row
        #[arg(long)]
        user: Option<String>,
    },
    /// Import a password-protected statement spreadsheet (.xls/.xlsx).
    Import {
        /// Path to the encrypted statement
        file: String,
        /// Statement password (prompted when omitted)
        #[arg(long, env = "CASA_STATEMENT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Import as this user instead of the configured one
        #[arg(long)]
        user: Option<String>,
        /// Show the normalized rows without writing anything
        #[arg(long = "dry-run")]
        dry_run: bool,
    },
    /// Manage categories.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Inspect stored transactions.
    Transactions {
        #[command(subcommand)]
        command: TransactionsCommands,
    },
    /// Generate reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Export reports to CSV files.
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// List all categories.
    List,
}

#[derive(Subcommand)]
pub enum TransactionsCommands {
    /// List transactions, newest first.
    List {
        /// Month: YYYY-MM
        #[arg(long)]
        month: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Income vs. expenses for one month, with a category breakdown.
    Monthly {
        /// Month: YYYY-MM
        #[arg(long)]
        month: String,
    },
}

#[derive(Subcommand)]
pub enum ExportCommands {
    /// Export one month of transactions (default: <data-dir>/exports/monthly-YYYY-MM.csv).
    Monthly {
        /// Month: YYYY-MM
        #[arg(long)]
        month: String,
        /// Output file path
        #[arg(long)]
        output: Option<String>,
    },
}
