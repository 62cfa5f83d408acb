//! Implements the `Store` trait using in-memory data.
//!
//! Note: this is compiled even in the "production" version of this app so that the whole app can
//! run without touching the disk.

use crate::store::Store;
use crate::Result;
use anyhow::bail;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// An implementation of the `Store` trait that holds its values in a `HashMap`. It can be told to
/// fail so that the unavailable and write-failure paths can be exercised.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<String, Value>>,
    unavailable: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `is_available` return false.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Makes `save` and `remove` fail while keeping the store available.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// A copy of the raw value under `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        // A panic while holding the lock cannot leave the map half-written.
        self.data.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_writable(&self, key: &str) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) || self.fail_writes.load(Ordering::SeqCst) {
            bail!("Unable to write '{key}' to the in-memory store");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn is_available(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }

    async fn save(&self, key: &str, value: &Value) -> Result<()> {
        self.check_writable(key)?;
        self.lock().insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<Value>> {
        if self.unavailable.load(Ordering::SeqCst) {
            bail!("Unable to read '{key}' from the in-memory store");
        }
        Ok(self.lock().get(key).cloned())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.check_writable(key)?;
        self.lock().remove(key);
        Ok(())
    }

    fn location(&self) -> String {
        String::from("memory")
    }
}
