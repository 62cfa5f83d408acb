//! Configuration file handling for txtrack.
//!
//! The configuration file is stored at `$TXTRACK_HOME/config.json` and contains settings for
//! the txtrack application such as the number of backups to keep and the expiry tick cadence.

use crate::backup::Backup;
use crate::error::StorageUnavailable;
use crate::store::SqliteStore;
use crate::ticker::DEFAULT_PERIOD;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const APP_NAME: &str = "txtrack";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const BACKUPS: &str = ".backups";
const CONFIG_JSON: &str = "config.json";
const TXTRACK_SQLITE: &str = "txtrack.sqlite";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$TXTRACK_HOME` and from there it loads `$TXTRACK_HOME/config.json`. It provides
/// paths to other items that are expected in a certain location within the txtrack home
/// directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    store: SqliteStore,
}

impl Config {
    /// Creates the data directory, its backups subdirectory, an initial `config.json` with
    /// default settings and an empty SQLite store.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of data directory, e.g. `$HOME/txtrack`
    ///
    /// # Errors
    /// - Returns an error if any file operations fail or if the store already exists.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        // Create the directory if it does not exist
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the txtrack home directory")?;

        // Canonicalize the directory path
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        let sqlite_path = root.join(TXTRACK_SQLITE);
        for existing in [&config_path, &sqlite_path] {
            if existing.exists() {
                bail!(
                    "txtrack is already initialized, '{}' exists",
                    existing.display()
                )
            }
        }

        let backups_dir = root.join(BACKUPS);
        utils::make_dir(&backups_dir).await?;

        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        let store = SqliteStore::init(sqlite_path)
            .await
            .context("Unable to create SQLite store")?;

        Ok(Self {
            root,
            backups: backups_dir,
            config_path,
            config_file,
            store,
        })
    }

    /// This will
    /// - validate that the `txtrack_home` exists and that the config file exists
    /// - load the config file
    /// - validate that the backups directory exists
    /// - open the SQLite store
    /// - return the loaded configuration object
    ///
    /// # Errors
    /// - `StorageUnavailable` if the SQLite store cannot be opened.
    pub async fn load(txtrack_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = txtrack_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("txtrack home is missing, run 'txtrack init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let backups = root.join(BACKUPS);
        if !backups.is_dir() {
            bail!("The backups directory is missing '{}'", backups.display())
        }

        let sqlite_path = root.join(TXTRACK_SQLITE);
        let store = match SqliteStore::load(&sqlite_path).await {
            Ok(store) => store,
            Err(e) => {
                debug!("Unable to open the SQLite store: {e:#}");
                return Err(StorageUnavailable::new(sqlite_path.to_string_lossy()).into());
            }
        };

        Ok(Self {
            root,
            backups,
            config_path,
            config_file,
            store,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    /// The expiry re-evaluation cadence.
    pub fn tick(&self) -> Duration {
        self.config_file
            .tick_millis
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_PERIOD)
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(&self.backups, self.backup_copies())
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "txtrack",
///   "config_version": 1,
///   "backup_copies": 5,
///   "tick_millis": 1000
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "txtrack"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Number of backup copies to keep
    backup_copies: u32,

    /// How often pre-approved holds are re-evaluated, in milliseconds. Defaults to one second.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tick_millis: Option<u64>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            backup_copies: BACKUP_COPIES,
            tick_millis: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it belongs to another app.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.tick_millis != Some(0),
            "Invalid tick_millis in config file: must be greater than zero"
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
