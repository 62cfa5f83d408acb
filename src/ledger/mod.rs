//! The ledger state machine: pending transactions, the four counters, and the rules that move a
//! transaction from logged to categorized (or denied).
//!
//! The ledger is purely in-memory and never fails. Time is always passed in so that the rules can
//! be evaluated at any instant; persistence is layered on top by `Session`.

pub mod expiry;
mod observer;

use crate::model::{Amount, Category, Counters, Transaction, TransactionId};
use crate::snapshot::Snapshot;
use chrono::{DateTime, Utc};
pub use expiry::RemainingTime;
pub use observer::{LedgerEvent, SubscriptionId};
use observer::Observers;
use serde::Serialize;
use tracing::{debug, trace};

/// The result of asking the ledger to categorize or deny a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The amount was added to `category` and the transaction removed.
    Categorized {
        transaction: Transaction,
        category: Category,
    },
    /// The transaction was discarded without touching any counter.
    Denied { transaction: Transaction },
    /// No pending transaction has this id, e.g. it was already processed. Nothing changed.
    NotFound { id: TransactionId },
    /// The transaction is pre-approved and its hold has not ended. Nothing changed.
    Locked {
        id: TransactionId,
        remaining: RemainingTime,
    },
    /// Pre-approved transactions skip approval, so they cannot be denied. Nothing changed.
    NotDeniable { id: TransactionId },
}

impl Outcome {
    /// True if the ledger was mutated.
    pub fn changed(&self) -> bool {
        matches!(self, Outcome::Categorized { .. } | Outcome::Denied { .. })
    }
}

/// The result of looking up a transaction by a (possibly abbreviated) id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(TransactionId),
    NotFound,
    Ambiguous(Vec<TransactionId>),
}

#[derive(Debug, Default)]
pub struct Ledger {
    transactions: Vec<Transaction>,
    counters: Counters,
    observers: Observers,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from a persisted snapshot. The stored expiry flags are discarded and
    /// re-derived at `now`.
    pub fn from_snapshot(snapshot: Snapshot, now: DateTime<Utc>) -> Self {
        let mut ledger = Self::new();
        ledger.restore(snapshot, now);
        ledger
    }

    /// Replaces the whole state with `snapshot`, re-deriving expiry flags at `now`.
    pub fn restore(&mut self, snapshot: Snapshot, now: DateTime<Utc>) {
        let Snapshot {
            transactions,
            counters,
        } = snapshot;
        self.transactions = transactions;
        self.counters = counters;
        for transaction in self.transactions.iter_mut() {
            transaction.refresh_expiry(now);
        }
        debug!(
            "Restored {} pending transactions, totals {}",
            self.transactions.len(),
            self.counters.total()
        );
        self.observers.notify(&LedgerEvent::Restored);
    }

    /// A copy of the state in its persisted shape.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            transactions: self.transactions.clone(),
            counters: self.counters,
        }
    }

    /// Pending transactions in the order they were logged.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn pre_approved(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(|t| t.is_pre_approved())
    }

    pub fn needs_approval(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(|t| !t.is_pre_approved())
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id() == id)
    }

    /// Finds a pending transaction by its full id or by a unique prefix of it.
    pub fn lookup(&self, needle: &str) -> Lookup {
        let needle = needle.trim().to_ascii_lowercase();
        if needle.is_empty() {
            return Lookup::NotFound;
        }
        let matches: Vec<TransactionId> = self
            .transactions
            .iter()
            .map(|t| t.id())
            .filter(|id| id.to_string().starts_with(&needle))
            .collect();
        match matches.len() {
            0 => Lookup::NotFound,
            1 => Lookup::Found(matches[0]),
            _ => Lookup::Ambiguous(matches),
        }
    }

    /// Time left on the hold of a pre-approved transaction. `None` if the id is unknown or the
    /// transaction was not pre-approved.
    pub fn remaining_time(&self, id: TransactionId, now: DateTime<Utc>) -> Option<RemainingTime> {
        self.get(id)
            .filter(|t| t.is_pre_approved())
            .map(|t| RemainingTime::until_expiry(t.created_at(), now))
    }

    /// Logs a new transaction at the end of the list. The amount is expected to have been
    /// validated as positive by the caller.
    pub fn add_transaction(
        &mut self,
        amount: Amount,
        label: Option<String>,
        is_pre_approved: bool,
        now: DateTime<Utc>,
    ) -> Transaction {
        let transaction = Transaction::new(amount, label, is_pre_approved, now);
        debug!(
            "Adding transaction {} for {} (pre-approved: {is_pre_approved})",
            transaction.id(),
            transaction.amount()
        );
        self.transactions.push(transaction.clone());
        self.observers.notify(&LedgerEvent::Added(transaction.clone()));
        transaction
    }

    /// Re-derives the expiry flag of every pre-approved transaction at `now`. Returns the ids whose
    /// flag changed; when nothing changed the ledger is untouched and observers are not notified.
    pub fn evaluate_expiry(&mut self, now: DateTime<Utc>) -> Vec<TransactionId> {
        let changed: Vec<TransactionId> = self
            .transactions
            .iter_mut()
            .filter_map(|t| t.refresh_expiry(now).then(|| t.id()))
            .collect();
        if changed.is_empty() {
            trace!("Expiry evaluation at {now}: no changes");
        } else {
            debug!("Expiry evaluation at {now}: {} changed", changed.len());
            self.observers.notify(&LedgerEvent::ExpiryChanged(changed.clone()));
        }
        changed
    }

    /// Adds the amount of transaction `id` to `category` and removes the transaction.
    ///
    /// A pre-approved transaction can only be categorized once its hold has ended at `now`. An
    /// unknown id is a no-op.
    pub fn categorize(
        &mut self,
        id: TransactionId,
        category: Category,
        now: DateTime<Utc>,
    ) -> Outcome {
        let Some(ix) = self.position(id) else {
            debug!("Categorize ignored, {id} is not pending");
            return Outcome::NotFound { id };
        };

        let candidate = &self.transactions[ix];
        if candidate.is_pre_approved() && !candidate.expired_at(now) {
            let remaining = RemainingTime::until_expiry(candidate.created_at(), now);
            debug!("Categorize refused, {id} is on hold for another {remaining}");
            return Outcome::Locked { id, remaining };
        }

        let transaction = self.transactions.remove(ix);
        self.counters.add(category, transaction.amount());
        debug!(
            "Categorized {id} as {category}, {category} is now {}",
            self.counters.get(category)
        );
        self.observers.notify(&LedgerEvent::Categorized {
            transaction: transaction.clone(),
            category,
        });
        Outcome::Categorized {
            transaction,
            category,
        }
    }

    /// Discards a transaction that was waiting for approval. No counter changes.
    pub fn deny(&mut self, id: TransactionId) -> Outcome {
        let Some(ix) = self.position(id) else {
            debug!("Deny ignored, {id} is not pending");
            return Outcome::NotFound { id };
        };
        if self.transactions[ix].is_pre_approved() {
            return Outcome::NotDeniable { id };
        }
        let transaction = self.transactions.remove(ix);
        debug!("Denied {id}");
        self.observers.notify(&LedgerEvent::Denied(transaction.clone()));
        Outcome::Denied { transaction }
    }

    /// Drops every pending transaction and zeroes all counters.
    pub fn reset_all(&mut self) {
        debug!(
            "Resetting ledger with {} pending transactions",
            self.transactions.len()
        );
        self.transactions.clear();
        self.counters = Counters::default();
        self.observers.notify(&LedgerEvent::Reset);
    }

    /// Registers `callback` to be called after every mutation.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&LedgerEvent) + Send + Sync + 'static,
    {
        self.observers.subscribe(Box::new(callback))
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn position(&self, id: TransactionId) -> Option<usize> {
        self.transactions.iter().position(|t| t.id() == id)
    }
}
