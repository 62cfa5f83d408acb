//! Change notifications for whoever renders the ledger.

use crate::model::{Category, Transaction, TransactionId};
use std::fmt::{Debug, Formatter};

/// Describes a mutation that has already been applied to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    Added(Transaction),
    /// The expiry flag of these transactions flipped during an evaluation.
    ExpiryChanged(Vec<TransactionId>),
    Categorized {
        transaction: Transaction,
        category: Category,
    },
    Denied(Transaction),
    Reset,
    /// The whole state was replaced from a snapshot.
    Restored,
}

/// Handle returned by `Ledger::subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&LedgerEvent) + Send + Sync>;

#[derive(Default)]
pub(super) struct Observers {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, Callback)>,
}

impl Observers {
    pub(super) fn subscribe(&mut self, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, callback));
        id
    }

    pub(super) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(existing, _)| *existing != id);
        self.callbacks.len() != before
    }

    pub(super) fn notify(&mut self, event: &LedgerEvent) {
        for (_, callback) in self.callbacks.iter_mut() {
            callback(event);
        }
    }

    pub(super) fn len(&self) -> usize {
        self.callbacks.len()
    }
}

impl Debug for Observers {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.callbacks.len())
            .finish()
    }
}
