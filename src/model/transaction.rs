use crate::ledger::expiry;
use crate::model::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// The unique, immutable identifier of a transaction.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Generates a new random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for TransactionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Where a pending transaction is in its approval workflow.
///
/// Terminal states (categorized, denied) are not represented because a transaction is removed from
/// the ledger the moment it reaches one.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ApprovalState {
    /// Not pre-approved: waiting for the user to approve (then categorize) or deny it.
    PendingApproval,
    /// Pre-approved and still inside its 24-hour hold.
    PreApprovedActive,
    /// Pre-approved and past its hold, so it can be categorized.
    PreApprovedExpired,
}

/// A logged transaction that has not been categorized yet.
///
/// Serializes to the snapshot format:
/// `{"id", "amount", "label", "isPreApproved", "createdAt", "isExpired"}`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    id: TransactionId,
    amount: Amount,
    #[serde(default, deserialize_with = "blank_as_none")]
    label: Option<String>,
    is_pre_approved: bool,
    created_at: DateTime<Utc>,
    /// Cached view of `expiry::is_expired`. It is stored with the snapshot but never trusted when
    /// loaded; the ledger re-derives it.
    #[serde(default)]
    is_expired: bool,
}

impl Transaction {
    /// Creates a transaction with a fresh id, created at `now` and not expired.
    pub fn new(
        amount: Amount,
        label: Option<String>,
        is_pre_approved: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TransactionId::generate(),
            amount,
            label: label.and_then(normalize_label),
            is_pre_approved,
            created_at: now,
            is_expired: false,
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn is_pre_approved(&self) -> bool {
        self.is_pre_approved
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The expiry flag as of the last evaluation.
    pub fn is_expired(&self) -> bool {
        self.is_expired
    }

    /// The approval state as of the last evaluation.
    pub fn state(&self) -> ApprovalState {
        match (self.is_pre_approved, self.is_expired) {
            (false, _) => ApprovalState::PendingApproval,
            (true, false) => ApprovalState::PreApprovedActive,
            (true, true) => ApprovalState::PreApprovedExpired,
        }
    }

    /// Whether the 24-hour hold has elapsed at `now`. Always false for transactions that were not
    /// pre-approved; the hold does not apply to them.
    pub fn expired_at(&self, now: DateTime<Utc>) -> bool {
        self.is_pre_approved && expiry::is_expired(self.created_at, now)
    }

    /// Re-derives the cached flag. Returns true if it changed.
    pub(crate) fn refresh_expiry(&mut self, now: DateTime<Utc>) -> bool {
        let expired = self.expired_at(now);
        if expired == self.is_expired {
            return false;
        }
        self.is_expired = expired;
        true
    }
}

fn normalize_label(label: String) -> Option<String> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Older snapshots store a missing label as `""`.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let label: Option<String> = Option::deserialize(deserializer)?;
    Ok(label.and_then(normalize_label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_new_transaction() {
        let tx = Transaction::new(Amount::from_str("50").unwrap(), None, true, t0());
        assert_eq!(tx.created_at(), t0());
        assert!(!tx.is_expired());
        assert_eq!(tx.state(), ApprovalState::PreApprovedActive);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Transaction::new(Amount::from_str("1").unwrap(), None, false, t0());
        let b = Transaction::new(Amount::from_str("1").unwrap(), None, false, t0());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_blank_label_is_none() {
        let tx = Transaction::new(
            Amount::from_str("1").unwrap(),
            Some("   ".to_string()),
            false,
            t0(),
        );
        assert_eq!(tx.label(), None);

        let tx = Transaction::new(
            Amount::from_str("1").unwrap(),
            Some(" Groceries ".to_string()),
            false,
            t0(),
        );
        assert_eq!(tx.label(), Some("Groceries"));
    }

    #[test]
    fn test_refresh_expiry_only_for_pre_approved() {
        let later = t0() + Duration::hours(48);

        let mut pre = Transaction::new(Amount::from_str("1").unwrap(), None, true, t0());
        assert!(pre.refresh_expiry(later));
        assert!(!pre.refresh_expiry(later));
        assert_eq!(pre.state(), ApprovalState::PreApprovedExpired);

        let mut pending = Transaction::new(Amount::from_str("1").unwrap(), None, false, t0());
        assert!(!pending.refresh_expiry(later));
        assert!(!pending.is_expired());
        assert_eq!(pending.state(), ApprovalState::PendingApproval);
    }

    #[test]
    fn test_snapshot_field_names() {
        let tx = Transaction::new(
            Amount::from_str("12.34").unwrap(),
            Some("Coffee".to_string()),
            true,
            t0(),
        );
        let json = serde_json::to_value(&tx).unwrap();
        let obj = json.as_object().unwrap();
        for key in ["id", "amount", "label", "isPreApproved", "createdAt", "isExpired"] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(obj["amount"], "12.34");
        assert_eq!(obj["createdAt"], "2025-03-01T09:30:00Z");
    }

    #[test]
    fn test_deserialize_legacy_record() {
        let json = r#"{
            "id": "0f8fad5b-d9cb-469f-a165-70867728950e",
            "amount": 20.5,
            "label": "",
            "isPreApproved": false,
            "createdAt": "2025-03-01T09:30:00.000Z",
            "isExpired": false
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.amount(), Amount::from_str("20.5").unwrap());
        assert_eq!(tx.label(), None);
        assert_eq!(tx.created_at(), t0());
        assert_eq!(
            tx.id().to_string(),
            "0f8fad5b-d9cb-469f-a165-70867728950e"
        );
    }
}
