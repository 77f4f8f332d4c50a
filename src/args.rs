//! These structs provide the CLI interface for the ledger CLI.

use crate::model::{Amount, TransactionId, TransactionType, TransactionUpdates};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// ledger: A small personal-finance ledger.
///
/// Record expenses and revenues, list and edit them, and ask a local LLM (an Ollama-compatible
/// `/api/generate` endpoint) to assign a category to a transaction based on your most recent
/// transactions.
///
/// Transactions are stored as JSON in the ledger home directory. Run `ledger init` first.
#[derive(Debug, Parser, Clone)]
#[command(name = "ledger", version)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration file.
    ///
    /// This is the first command you should run. The inference settings can be changed later by
    /// editing `config.json` in the ledger home directory.
    Init(InitArgs),
    /// Record a new transaction.
    Add(AddArgs),
    /// Print all transactions in ledger order, newest first.
    List,
    /// Change fields of an existing transaction. Fields that are not given are left unchanged.
    Update(UpdateArgs),
    /// Delete a transaction.
    Delete(IdArgs),
    /// Ask the inference service to assign a category to a transaction.
    Categorize(IdArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the ledger and its configuration are held. Defaults to ~/ledger
    #[arg(long, env = "LEDGER_HOME", default_value_t = default_ledger_home())]
    ledger_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, ledger_home: PathBuf) -> Self {
        Self {
            log_level,
            ledger_home: ledger_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn ledger_home(&self) -> &DisplayPath {
        &self.ledger_home
    }
}

/// Args for the `ledger init` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct InitArgs {
    /// The URL of the `/api/generate` endpoint, e.g. http://localhost:11434/api/generate
    #[arg(long)]
    endpoint: Option<String>,

    /// The model to request categories from, e.g. gpt-oss:20b
    #[arg(long)]
    model: Option<String>,

    /// How many of the most recent transactions are sent along as examples.
    #[arg(long)]
    context_size: Option<usize>,

    /// How long to wait for the inference service, in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl InitArgs {
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn context_size(&self) -> Option<usize> {
        self.context_size
    }

    pub fn timeout_secs(&self) -> Option<u64> {
        self.timeout_secs
    }
}

/// Args for the `ledger add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// Either "expense" or "revenue".
    #[arg(long = "type", default_value_t = TransactionType::Expense)]
    pub transaction_type: TransactionType,

    /// A short description, e.g. "Coffee".
    #[arg(long)]
    pub label: String,

    /// The amount, e.g. 3.50 or "1,250.00".
    #[arg(long, allow_hyphen_values = true)]
    pub amount: Amount,

    /// The date as YYYY-MM-DD or RFC 3339. Defaults to now.
    #[arg(long, value_parser = parse_date)]
    pub date: Option<DateTime<Utc>>,

    /// Free-form notes.
    #[arg(long)]
    pub notes: Option<String>,
}

/// Args for the `ledger update` command.
#[derive(Debug, Parser, Clone)]
pub struct UpdateArgs {
    /// The ID of the transaction to update.
    pub id: TransactionId,

    /// Either "expense" or "revenue".
    #[arg(long = "type")]
    pub transaction_type: Option<TransactionType>,

    #[arg(long)]
    pub label: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub amount: Option<Amount>,

    /// The date as YYYY-MM-DD or RFC 3339.
    #[arg(long, value_parser = parse_date)]
    pub date: Option<DateTime<Utc>>,

    #[arg(long)]
    pub notes: Option<String>,
}

impl UpdateArgs {
    /// The fields that were given, as a partial update.
    pub fn updates(&self) -> TransactionUpdates {
        TransactionUpdates {
            transaction_type: self.transaction_type,
            label: self.label.clone(),
            amount: self.amount,
            date: self.date,
            notes: self.notes.clone(),
            category: None,
        }
    }
}

/// Args for commands that act on a single transaction.
#[derive(Debug, Parser, Clone)]
pub struct IdArgs {
    /// The ID of the transaction, as shown by `ledger list`.
    pub id: TransactionId,
}

/// Parses a date given as `YYYY-MM-DD` (midnight UTC) or as an RFC 3339 timestamp.
pub fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| format!("Expected YYYY-MM-DD or an RFC 3339 timestamp, got '{s}': {e}"))
}

fn default_ledger_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("ledger"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --ledger-home or LEDGER_HOME instead of relying on the default \
                ledger home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("ledger")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
