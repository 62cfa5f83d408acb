use std::fmt::{Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Returned when the key-value store cannot be used at all. Nothing can be recorded in this state,
/// so callers should stop and ask the user to fix the storage location before retrying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageUnavailable {
    location: String,
}

impl StorageUnavailable {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

impl Display for StorageUnavailable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Storage at '{}' is unavailable. txtrack needs a writable store to function; check the \
            permissions of that location and retry",
            self.location
        )
    }
}

impl std::error::Error for StorageUnavailable {}
