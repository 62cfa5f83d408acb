//! The persisted shape of the ledger and the keys it is stored under.
//!
//! Reads never fail: a missing or unreadable key falls back to its default and the problem is
//! logged. Writes report success as a `bool` after logging any failure, because the in-memory
//! ledger stays authoritative whether or not the write landed.

use crate::model::{Amount, Category, Counters, Preferences, Transaction};
use crate::store::Store;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{trace, warn};

pub const DARK_MODE_KEY: &str = "isDarkMode";
pub const TRANSACTIONS_KEY: &str = "transactions";

/// Every key written by this program.
pub fn all_keys() -> Vec<String> {
    let mut keys = vec![DARK_MODE_KEY.to_string(), TRANSACTIONS_KEY.to_string()];
    keys.extend(Category::ALL.iter().map(counter_key));
    keys
}

/// The store key of a counter, e.g. `debtPaid`.
pub fn counter_key(category: &Category) -> String {
    category.to_string()
}

/// The full ledger state as it is persisted.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub transactions: Vec<Transaction>,
    pub counters: Counters,
}

/// Reads the snapshot, substituting defaults for anything missing or unreadable.
pub async fn load(store: &dyn Store) -> Snapshot {
    let transactions = load_or(store, TRANSACTIONS_KEY, Vec::new()).await;
    let mut counters = Counters::default();
    for category in Category::ALL {
        let amount = load_or(store, &counter_key(&category), Amount::ZERO).await;
        counters.set(category, amount);
    }
    Snapshot {
        transactions,
        counters,
    }
}

/// Writes every ledger key. Returns false if any write failed.
pub async fn save(store: &dyn Store, snapshot: &Snapshot) -> bool {
    let mut ok = save_value(store, TRANSACTIONS_KEY, &snapshot.transactions).await;
    for (category, amount) in snapshot.counters.iter() {
        ok &= save_value(store, &counter_key(&category), &amount).await;
    }
    ok
}

pub async fn load_preferences(store: &dyn Store) -> Preferences {
    Preferences {
        is_dark_mode: load_or(store, DARK_MODE_KEY, false).await,
    }
}

pub async fn save_preferences(store: &dyn Store, preferences: &Preferences) -> bool {
    save_value(store, DARK_MODE_KEY, &preferences.is_dark_mode).await
}

/// Removes every key this program writes. Returns false if any removal failed.
pub async fn clear(store: &dyn Store) -> bool {
    let mut ok = true;
    for key in all_keys() {
        if let Err(e) = store.remove(&key).await {
            warn!("Unable to remove '{key}' from {}: {e:#}", store.location());
            ok = false;
        }
    }
    ok
}

/// Reads `key` and deserializes it, or returns `default` if it is missing or invalid.
pub async fn load_or<T>(store: &dyn Store, key: &str, default: T) -> T
where
    T: DeserializeOwned,
{
    match store.load(key).await {
        Ok(Some(value)) => match serde_json::from_value(value) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Ignoring unreadable value for '{key}': {e}");
                default
            }
        },
        Ok(None) => {
            trace!("No value stored for '{key}'");
            default
        }
        Err(e) => {
            warn!("Unable to load '{key}' from {}: {e:#}", store.location());
            default
        }
    }
}

/// Serializes `value` and writes it under `key`. Failures are logged and reported as false.
pub async fn save_value<T>(store: &dyn Store, key: &str, value: &T) -> bool
where
    T: Serialize + ?Sized,
{
    let value: Value = match serde_json::to_value(value) {
        Ok(v) => v,
        Err(e) => {
            warn!("Unable to serialize '{key}': {e}");
            return false;
        }
    };
    match store.save(key, &value).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Unable to save '{key}' to {}: {e:#}", store.location());
            false
        }
    }
}
