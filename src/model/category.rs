use serde::{Deserialize, Serialize};

/// The four buckets a transaction can end up in once it is categorized.
///
/// The serialized names double as the store keys of the matching counters.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    /// Money that went toward paying down debt.
    #[value(alias = "debtPaid", alias = "debt")]
    DebtPaid,
    /// Money that was put into savings.
    Saved,
    /// Money that was invested.
    Invested,
    /// Money that was spent.
    Spent,
}

serde_plain::derive_display_from_serialize!(Category);
serde_plain::derive_fromstr_from_deserialize!(Category);

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 4] = [
        Category::DebtPaid,
        Category::Saved,
        Category::Invested,
        Category::Spent,
    ];

    /// A human-friendly title, e.g. "Debt Paid".
    pub fn title(&self) -> &'static str {
        match self {
            Category::DebtPaid => "Debt Paid",
            Category::Saved => "Saved",
            Category::Invested => "Invested",
            Category::Spent => "Spent",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_display_matches_store_keys() {
        assert_eq!(Category::DebtPaid.to_string(), "debtPaid");
        assert_eq!(Category::Saved.to_string(), "saved");
        assert_eq!(Category::Invested.to_string(), "invested");
        assert_eq!(Category::Spent.to_string(), "spent");
    }

    #[test]
    fn test_from_str() {
        assert_eq!(Category::from_str("debtPaid").unwrap(), Category::DebtPaid);
        assert!(Category::from_str("gambled").is_err());
    }

    #[test]
    fn test_value_enum_names() {
        let parse = |s: &str| <Category as clap::ValueEnum>::from_str(s, false).ok();
        assert_eq!(parse("debt-paid"), Some(Category::DebtPaid));
        assert_eq!(parse("debt"), Some(Category::DebtPaid));
        assert_eq!(parse("saved"), Some(Category::Saved));
        assert_eq!(parse("lost"), None);
    }
}
