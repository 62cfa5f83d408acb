use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its backups subdirectory, an initial `config.json` file with
/// default settings and an empty SQLite store.
///
/// # Arguments
/// - `txtrack_home` - The directory that will be the root of data directory, e.g. `$HOME/txtrack`
///
/// # Errors
/// - Returns an error if any file operations fail, or if the directory was already initialized.
pub async fn init(txtrack_home: &Path) -> Result<Out<()>> {
    let config = Config::create(txtrack_home)
        .await
        .context("Unable to create the data directory and configs")?;
    Ok(format!(
        "Successfully created the txtrack directory at {}",
        config.root().display()
    )
    .into())
}
