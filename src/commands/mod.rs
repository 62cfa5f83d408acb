//! Command handlers for the txtrack CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod init;
mod list;
mod log;
mod process;
mod reset;
mod summary;
mod theme;
mod watch;

use crate::clock::SystemClock;
use crate::model::Transaction;
use crate::session::Session;
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, info};

pub use init::init;
pub use list::{list, Listing, OnHold};
pub use log::log;
pub use process::{approve, categorize, deny};
pub use reset::reset;
pub use summary::{summary, Summary};
pub use theme::theme;
pub use watch::{watch, WatchReport};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Opens a `Session` on the configured store with the wall clock. Resets are backed up to the
/// configured backups directory.
///
/// # Errors
/// - `StorageUnavailable` if the store fails its availability probe.
pub async fn open_session(config: &Config) -> Result<Session> {
    let session = Session::open(Arc::new(config.store().clone()), Arc::new(SystemClock)).await?;
    Ok(session.with_backup(config.backup()))
}

/// The first characters of an id, enough to pick it out of a short list.
pub(crate) fn short_id(transaction: &Transaction) -> String {
    transaction.id().to_string().chars().take(8).collect()
}

/// One-line description of a transaction, e.g. `3f2a9c1e $12.50 (coffee)`.
pub(crate) fn describe(transaction: &Transaction) -> String {
    match transaction.label() {
        Some(label) => format!(
            "{} {} ({label})",
            short_id(transaction),
            transaction.amount()
        ),
        None => format!("{} {}", short_id(transaction), transaction.amount()),
    }
}
