//! The application context: one `Ledger`, the user's preferences, the `Store` they are persisted
//! in and the `Clock` that decides what "now" means.
//!
//! Every mutation goes through the session so that the snapshot is written afterwards. Write
//! failures are logged by the snapshot layer and otherwise ignored; the in-memory ledger stays
//! authoritative.

use crate::backup::{Backup, PRE_RESET};
use crate::clock::Clock;
use crate::error::StorageUnavailable;
use crate::ledger::{Ledger, LedgerEvent, Outcome, SubscriptionId};
use crate::model::{Amount, Category, Preferences, Transaction, TransactionId};
use crate::snapshot;
use crate::store::Store;
use crate::Result;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct Session {
    ledger: Ledger,
    preferences: Preferences,
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    backup: Option<Backup>,
}

impl Session {
    /// Checks that `store` is usable, then restores the persisted ledger and preferences and
    /// re-derives every expiry flag at the clock's current time.
    ///
    /// # Errors
    /// - `StorageUnavailable` if the store fails its availability probe.
    pub async fn open(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Result<Self> {
        if !store.is_available().await {
            return Err(StorageUnavailable::new(store.location()).into());
        }
        let now = clock.now();
        let snapshot = snapshot::load(store.as_ref()).await;
        let preferences = snapshot::load_preferences(store.as_ref()).await;
        let ledger = Ledger::from_snapshot(snapshot, now);
        debug!(
            "Opened session on {} with {} pending transactions",
            store.location(),
            ledger.transactions().len()
        );
        Ok(Self {
            ledger,
            preferences,
            store,
            clock,
            backup: None,
        })
    }

    /// Writes a JSON backup of the ledger to `backup` before every reset.
    pub fn with_backup(mut self, backup: Backup) -> Self {
        self.backup = Some(backup);
        self
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&LedgerEvent) + Send + Sync + 'static,
    {
        self.ledger.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.ledger.unsubscribe(id)
    }

    pub async fn add_transaction(
        &mut self,
        amount: Amount,
        label: Option<String>,
        is_pre_approved: bool,
    ) -> Transaction {
        let now = self.clock.now();
        let transaction = self
            .ledger
            .add_transaction(amount, label, is_pre_approved, now);
        self.persist().await;
        transaction
    }

    /// Returns the ids whose expiry flag flipped. The snapshot is only written when there are any.
    pub async fn evaluate_expiry(&mut self) -> Vec<TransactionId> {
        let now = self.clock.now();
        let changed = self.ledger.evaluate_expiry(now);
        if !changed.is_empty() {
            self.persist().await;
        }
        changed
    }

    pub async fn categorize(&mut self, id: TransactionId, category: Category) -> Outcome {
        let now = self.clock.now();
        let outcome = self.ledger.categorize(id, category, now);
        if outcome.changed() {
            self.persist().await;
        }
        outcome
    }

    pub async fn deny(&mut self, id: TransactionId) -> Outcome {
        let outcome = self.ledger.deny(id);
        if outcome.changed() {
            self.persist().await;
        }
        outcome
    }

    /// Clears the ledger, the counters and the dark-mode preference, and removes every key from
    /// the store. When a backup location is configured, the current ledger is written there first
    /// and its path returned. A failed backup is logged and does not stop the reset.
    pub async fn reset_all(&mut self) -> Option<PathBuf> {
        let backup_path = match &self.backup {
            Some(backup) => match backup.save_json(PRE_RESET, &self.ledger.snapshot()).await {
                Ok(path) => {
                    info!("Saved a backup of the ledger to {}", path.display());
                    Some(path)
                }
                Err(e) => {
                    warn!("Unable to back up the ledger before reset: {e:#}");
                    None
                }
            },
            None => None,
        };
        self.ledger.reset_all();
        self.preferences = Preferences::default();
        snapshot::clear(self.store.as_ref()).await;
        backup_path
    }

    pub async fn set_dark_mode(&mut self, is_dark_mode: bool) -> bool {
        self.preferences.is_dark_mode = is_dark_mode;
        snapshot::save_preferences(self.store.as_ref(), &self.preferences).await;
        is_dark_mode
    }

    /// Flips the preference and returns the new value.
    pub async fn toggle_dark_mode(&mut self) -> bool {
        let flipped = !self.preferences.is_dark_mode;
        self.set_dark_mode(flipped).await
    }

    async fn persist(&self) -> bool {
        snapshot::save(self.store.as_ref(), &self.ledger.snapshot()).await
    }
}
