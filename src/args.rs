//! These structs provide the CLI interface for the txtrack CLI.

use crate::model::{Amount, AmountError, Category};
use clap::{Parser, Subcommand, ValueEnum};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// txtrack: A command-line ledger for spending decisions.
///
/// Log each purchase as it happens. Purchases you decided on ahead of time are "pre-approved" and
/// sit on a 24 hour hold before they can be categorized; everything else waits for you to approve
/// or deny it. Approved money lands in one of four buckets: debt paid, saved, invested or spent.
#[derive(Debug, Parser, Clone)]
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
    /// Create the data directory and initialize the configuration file and store.
    ///
    /// This is the first command you should run. By default the data lives in $HOME/txtrack; pass
    /// --txtrack-home or set TXTRACK_HOME to put it somewhere else.
    Init,
    /// Log a new transaction.
    Log(LogArgs),
    /// Show pending transactions and the four totals.
    List,
    /// Approve a transaction that needs approval and put its amount in a category.
    Approve(ProcessArgs),
    /// Deny a transaction that needs approval. It is discarded without touching any total.
    Deny(IdArgs),
    /// Put the amount of a pending transaction in a category. Pre-approved transactions can only
    /// be categorized once their 24 hour hold is over.
    Categorize(ProcessArgs),
    /// Show the four totals.
    Summary,
    /// Delete every pending transaction and zero every total. A backup is written first.
    Reset(ResetArgs),
    /// Show or change the dark-mode preference.
    Theme(ThemeArgs),
    /// Keep re-evaluating pre-approved holds and report each one as it ends.
    Watch(WatchArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber crate for instructions.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where txtrack data and configuration is held. Defaults to ~/txtrack
    #[arg(long, env = "TXTRACK_HOME", default_value_t = default_txtrack_home())]
    txtrack_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, txtrack_home: PathBuf) -> Self {
        Self {
            log_level,
            txtrack_home: txtrack_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn txtrack_home(&self) -> &DisplayPath {
        &self.txtrack_home
    }
}

/// (Not shown): Args for the `txtrack log` command.
#[derive(Debug, Parser, Clone)]
pub struct LogArgs {
    /// The amount, e.g. 12.50 or "$1,200". Must be greater than zero.
    #[arg(value_parser = parse_amount)]
    amount: Amount,

    /// An optional note about what the money was for.
    #[arg(long)]
    label: Option<String>,

    /// The purchase was planned ahead. It skips approval but is held for 24 hours.
    #[arg(long)]
    pre_approved: bool,
}

impl LogArgs {
    pub fn new(amount: Amount, label: Option<String>, pre_approved: bool) -> Self {
        Self {
            amount,
            label,
            pre_approved,
        }
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// The label, with a blank label treated as absent.
    pub fn label(&self) -> Option<&str> {
        self.label
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn pre_approved(&self) -> bool {
        self.pre_approved
    }
}

fn parse_amount(s: &str) -> Result<Amount, AmountError> {
    Amount::parse_positive(s)
}

/// (Not shown): Args for commands that take a transaction id.
#[derive(Debug, Parser, Clone)]
pub struct IdArgs {
    /// The transaction id, or any unique prefix of it as shown by `txtrack list`.
    id: String,
}

impl IdArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// (Not shown): Args for the `txtrack approve` and `txtrack categorize` commands.
#[derive(Debug, Parser, Clone)]
pub struct ProcessArgs {
    /// The transaction id, or any unique prefix of it as shown by `txtrack list`.
    id: String,

    /// Where the money went.
    #[arg(value_enum)]
    category: Category,
}

impl ProcessArgs {
    pub fn new(id: impl Into<String>, category: Category) -> Self {
        Self {
            id: id.into(),
            category,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn category(&self) -> Category {
        self.category
    }
}

/// (Not shown): Args for the `txtrack reset` command.
#[derive(Debug, Parser, Clone)]
pub struct ResetArgs {
    /// Confirm the reset. Without it nothing is deleted.
    #[arg(long)]
    yes: bool,
}

impl ResetArgs {
    pub fn new(yes: bool) -> Self {
        Self { yes }
    }

    pub fn yes(&self) -> bool {
        self.yes
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum ThemeMode {
    Dark,
    Light,
    Toggle,
}

/// (Not shown): Args for the `txtrack theme` command.
#[derive(Debug, Parser, Clone)]
pub struct ThemeArgs {
    /// Omit to show the current setting.
    #[arg(value_enum)]
    mode: Option<ThemeMode>,
}

impl ThemeArgs {
    pub fn new(mode: Option<ThemeMode>) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> Option<ThemeMode> {
        self.mode
    }
}

/// (Not shown): Args for the `txtrack watch` command.
#[derive(Debug, Parser, Clone)]
pub struct WatchArgs {
    /// Stop after this many seconds. Runs until Ctrl-C when omitted.
    #[arg(long)]
    seconds: Option<u64>,

    /// Override the tick cadence from config.json, in milliseconds.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    tick_millis: Option<u64>,
}

impl WatchArgs {
    pub fn new(seconds: Option<u64>, tick_millis: Option<u64>) -> Self {
        Self {
            seconds,
            tick_millis,
        }
    }

    pub fn seconds(&self) -> Option<u64> {
        self.seconds
    }

    pub fn tick_millis(&self) -> Option<u64> {
        self.tick_millis
    }
}

fn default_txtrack_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("txtrack"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --txtrack-home or TXTRACK_HOME instead of relying on the \
                default txtrack home directory. If you continue using the program right now, you \
                may have problems!",
            );
            PathBuf::from("txtrack")
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
