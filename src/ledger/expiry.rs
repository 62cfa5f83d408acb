//! The 24-hour hold that applies to pre-approved transactions.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// How long a pre-approved transaction is held before it can be categorized.
pub const HOLD_HOURS: i64 = 24;

/// The instant the hold of a transaction created at `created_at` ends.
pub fn expires_at(created_at: DateTime<Utc>) -> DateTime<Utc> {
    created_at + Duration::hours(HOLD_HOURS)
}

/// True once `now` has reached `created_at + 24h`. The boundary itself counts as expired.
pub fn is_expired(created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now >= expires_at(created_at)
}

/// Time left until a hold ends, broken down for display. Saturates at zero.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemainingTime {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub total_ms: i64,
    /// `HH:MM:SS`
    pub formatted: String,
}

impl RemainingTime {
    pub fn until_expiry(created_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let total_ms = (expires_at(created_at) - now).num_milliseconds().max(0);
        let hours = total_ms / (1000 * 60 * 60);
        let minutes = (total_ms % (1000 * 60 * 60)) / (1000 * 60);
        let seconds = (total_ms % (1000 * 60)) / 1000;
        Self {
            hours,
            minutes,
            seconds,
            total_ms,
            formatted: format!("{hours:02}:{minutes:02}:{seconds:02}"),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.total_ms == 0
    }
}

impl Display for RemainingTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.formatted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_boundary() {
        let just_before = t0() + Duration::hours(24) - Duration::seconds(1);
        assert!(!is_expired(t0(), just_before));
        assert!(!is_expired(t0(), t0() + Duration::hours(24) - Duration::milliseconds(1)));
        assert!(is_expired(t0(), t0() + Duration::hours(24)));
        assert!(is_expired(t0(), t0() + Duration::days(30)));
    }

    #[test]
    fn test_remaining_at_creation() {
        let r = RemainingTime::until_expiry(t0(), t0());
        assert_eq!(r.hours, 24);
        assert_eq!(r.minutes, 0);
        assert_eq!(r.seconds, 0);
        assert_eq!(r.total_ms, 24 * 60 * 60 * 1000);
        assert_eq!(r.formatted, "24:00:00");
    }

    #[test]
    fn test_remaining_breakdown() {
        let now = t0() + Duration::hours(20) + Duration::minutes(14) + Duration::milliseconds(1500);
        let r = RemainingTime::until_expiry(t0(), now);
        // 3h 45m 58.5s left
        assert_eq!(r.hours, 3);
        assert_eq!(r.minutes, 45);
        assert_eq!(r.seconds, 58);
        assert_eq!(r.to_string(), "03:45:58");
    }

    #[test]
    fn test_remaining_saturates() {
        let r = RemainingTime::until_expiry(t0(), t0() + Duration::hours(25));
        assert!(r.is_zero());
        assert_eq!(r.formatted, "00:00:00");
    }
}
