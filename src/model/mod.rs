//! Types that represent the core data model, such as `Transaction` and `Counters`.
mod amount;
mod category;
mod counters;
mod transaction;

pub use amount::{Amount, AmountError};
pub use category::Category;
pub use counters::Counters;
use serde::{Deserialize, Serialize};
pub use transaction::{ApprovalState, Transaction, TransactionId};

/// User preferences that are persisted next to the ledger.
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub is_dark_mode: bool,
}
