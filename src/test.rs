//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::clock::ManualClock;
use crate::model::Amount;
use crate::session::Session;
use crate::Config;
use chrono::{DateTime, TimeZone, Utc};
use std::str::FromStr;
use std::sync::Arc;
use tempfile::TempDir;

/// Test environment that sets up a txtrack home directory with Config and SQLite store, and a
/// clock that only moves when the test says so.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
    clock: Arc<ManualClock>,
}

impl TestEnv {
    /// Creates a test environment with Config and an initialized store.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("txtrack");
        let config = Config::create(&root).await.unwrap();
        Self {
            _temp_dir: temp_dir,
            config,
            clock: Arc::new(ManualClock::new(start())),
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// Opens a session on the environment's store, the way `main` does, but on the manual clock.
    pub async fn session(&self) -> Session {
        Session::open(Arc::new(self.config.store().clone()), self.clock.clone())
            .await
            .unwrap()
            .with_backup(self.config.backup())
    }
}

/// The instant every `TestEnv` clock starts at.
pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
}

pub fn amount(s: &str) -> Amount {
    Amount::from_str(s).unwrap()
}
