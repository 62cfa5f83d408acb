use crate::commands::Out;
use crate::model::{Amount, Counters};
use crate::session::Session;
use crate::Result;
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub counters: Counters,
    pub total: Amount,
}

/// Reports the four totals and their sum.
pub async fn summary(session: &Session) -> Result<Out<Summary>> {
    let counters = *session.ledger().counters();
    let summary = Summary {
        counters,
        total: counters.total(),
    };
    let mut message = String::new();
    for (category, amount) in counters.iter() {
        let _ = writeln!(message, "{}: {amount}", category.title());
    }
    let _ = write!(message, "Total: {}", summary.total);
    Ok(Out::new(message, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use crate::test::{amount, TestEnv};

    #[tokio::test]
    async fn test_summary() {
        let env = TestEnv::new().await;
        let mut session = env.session().await;
        for (value, category) in [
            ("1000", Category::DebtPaid),
            ("0.10", Category::Saved),
            ("0.20", Category::Saved),
        ] {
            let t = session.add_transaction(amount(value), None, false).await;
            session.categorize(t.id(), category).await;
        }

        let out = summary(&session).await.unwrap();
        let s = out.structure().unwrap();
        assert_eq!(s.counters.get(Category::Saved), amount("0.30"));
        assert_eq!(s.total, amount("1000.30"));
        assert_eq!(
            out.message(),
            "Debt Paid: $1,000.00\nSaved: $0.30\nInvested: $0.00\nSpent: $0.00\nTotal: $1,000.30"
        );
    }
}
