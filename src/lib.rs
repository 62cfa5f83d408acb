pub mod args;
mod backup;
pub mod clock;
pub mod commands;
mod config;
mod error;
pub mod ledger;
pub mod model;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod ticker;
mod utils;

#[cfg(test)]
mod test;

pub use backup::Backup;
pub use config::Config;
pub use error::{Error, Result, StorageUnavailable};
pub use session::Session;
