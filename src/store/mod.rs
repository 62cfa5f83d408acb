//! Key-value persistence for the ledger snapshot and preferences.
//!
//! The `Store` trait is deliberately small: values are JSON documents addressed by string keys.
//! `SqliteStore` is the durable implementation used by the CLI and `MemoryStore` keeps everything
//! in memory.

mod memory;
mod migrations;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::Result;
use serde_json::Value;

/// The key written and removed by `is_available` probes.
pub(crate) const PROBE_KEY: &str = "__storage_test__";

/// A key-value store of JSON documents.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// Checks that the store can be written to. Called once at startup; when this returns false
    /// the application refuses to operate.
    async fn is_available(&self) -> bool;

    /// Writes `value` under `key`, replacing any previous value.
    async fn save(&self, key: &str, value: &Value) -> Result<()>;

    /// Reads the value under `key`, `None` if it was never written.
    async fn load(&self, key: &str) -> Result<Option<Value>>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// A human-readable description of where data lives, used in messages.
    fn location(&self) -> String;
}
