//! Handlers that move a pending transaction out of the ledger: approve, deny and categorize.

use crate::args::{IdArgs, ProcessArgs};
use crate::commands::{describe, Out};
use crate::ledger::{Lookup, Outcome};
use crate::model::{ApprovalState, TransactionId};
use crate::session::Session;
use crate::Result;
use anyhow::bail;

/// Approves a transaction that is waiting for approval and adds its amount to the chosen
/// category. Pre-approved transactions are refused; they go through `categorize` instead.
pub async fn approve(session: &mut Session, args: &ProcessArgs) -> Result<Out<Outcome>> {
    let Some(id) = resolve(session, args.id())? else {
        return Ok(no_match(args.id()));
    };
    if let Some(transaction) = session.ledger().get(id) {
        let message = match transaction.state() {
            ApprovalState::PendingApproval => None,
            ApprovalState::PreApprovedActive => Some(
                "is pre-approved and still on hold, use 'txtrack categorize' once the hold ends",
            ),
            ApprovalState::PreApprovedExpired => {
                Some("is pre-approved and its hold has ended, use 'txtrack categorize' instead")
            }
        };
        if let Some(message) = message {
            return Ok(format!("{} {message}. Nothing changed", describe(transaction)).into());
        }
    }
    let outcome = session.categorize(id, args.category()).await;
    Ok(render(session, outcome))
}

/// Discards a transaction that is waiting for approval.
pub async fn deny(session: &mut Session, args: &IdArgs) -> Result<Out<Outcome>> {
    let Some(id) = resolve(session, args.id())? else {
        return Ok(no_match(args.id()));
    };
    let outcome = session.deny(id).await;
    Ok(render(session, outcome))
}

/// Adds the amount of a pending transaction to a category. A pre-approved transaction whose hold
/// has not ended is left alone and the remaining time is reported.
pub async fn categorize(session: &mut Session, args: &ProcessArgs) -> Result<Out<Outcome>> {
    let Some(id) = resolve(session, args.id())? else {
        return Ok(no_match(args.id()));
    };
    let outcome = session.categorize(id, args.category()).await;
    Ok(render(session, outcome))
}

/// Turns a full or abbreviated id into a pending transaction id. `None` means nothing matched.
fn resolve(session: &Session, needle: &str) -> Result<Option<TransactionId>> {
    match session.ledger().lookup(needle) {
        Lookup::Found(id) => Ok(Some(id)),
        Lookup::NotFound => Ok(None),
        Lookup::Ambiguous(ids) => bail!(
            "'{needle}' matches {} pending transactions, use more characters of the id",
            ids.len()
        ),
    }
}

fn no_match(needle: &str) -> Out<Outcome> {
    format!("No pending transaction matches '{needle}'. Nothing changed").into()
}

fn render(session: &Session, outcome: Outcome) -> Out<Outcome> {
    let message = match &outcome {
        Outcome::Categorized {
            transaction,
            category,
        } => format!(
            "Added {} to {}. {} is now {}",
            transaction.amount(),
            category.title(),
            category.title(),
            session.ledger().counters().get(*category)
        ),
        Outcome::Denied { transaction } => format!("Denied {}", describe(transaction)),
        Outcome::NotFound { id } => format!("No pending transaction {id}. Nothing changed"),
        Outcome::Locked { id, remaining } => format!(
            "{id} is pre-approved and on hold for another {remaining}. Nothing changed"
        ),
        Outcome::NotDeniable { id } => {
            format!("{id} is pre-approved and cannot be denied. Nothing changed")
        }
    };
    Out::new(message, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use crate::test::{amount, TestEnv};
    use chrono::Duration;

    #[tokio::test]
    async fn test_pre_approved_scenario() {
        let env = TestEnv::new().await;
        let mut session = env.session().await;
        let t = session.add_transaction(amount("50"), None, true).await;
        let id = t.id().to_string();

        env.clock()
            .advance(Duration::hours(23) + Duration::minutes(59) + Duration::seconds(59));
        let out = categorize(&mut session, &ProcessArgs::new(&id[..8], Category::Saved))
            .await
            .unwrap();
        assert!(matches!(out.structure(), Some(Outcome::Locked { .. })));
        assert!(out.message().contains("00:00:01"));

        env.clock().advance(Duration::seconds(1));
        session.evaluate_expiry().await;
        let out = categorize(&mut session, &ProcessArgs::new(&id, Category::Saved))
            .await
            .unwrap();
        assert!(out.structure().unwrap().changed());
        assert_eq!(out.message(), "Added $50.00 to Saved. Saved is now $50.00");
        assert!(session.ledger().transactions().is_empty());
    }

    #[tokio::test]
    async fn test_approve() {
        let env = TestEnv::new().await;
        let mut session = env.session().await;
        let held = session.add_transaction(amount("5"), None, true).await;
        let pending = session.add_transaction(amount("12.5"), None, false).await;

        let out = approve(
            &mut session,
            &ProcessArgs::new(held.id().to_string(), Category::Spent),
        )
        .await
        .unwrap();
        assert!(out.structure().is_none());
        assert!(out.message().contains("still on hold"));
        assert_eq!(session.ledger().transactions().len(), 2);

        env.clock().advance(Duration::hours(24));
        session.evaluate_expiry().await;
        let out = approve(
            &mut session,
            &ProcessArgs::new(held.id().to_string(), Category::Spent),
        )
        .await
        .unwrap();
        assert!(out.structure().is_none());
        assert!(out.message().contains("its hold has ended"));
        assert_eq!(session.ledger().transactions().len(), 2);

        let out = approve(
            &mut session,
            &ProcessArgs::new(pending.id().to_string(), Category::DebtPaid),
        )
        .await
        .unwrap();
        assert!(out.structure().unwrap().changed());
        assert_eq!(
            session.ledger().counters().get(Category::DebtPaid),
            amount("12.50")
        );
    }

    #[tokio::test]
    async fn test_deny() {
        let env = TestEnv::new().await;
        let mut session = env.session().await;
        let held = session.add_transaction(amount("5"), None, true).await;
        let pending = session.add_transaction(amount("20"), Some("shoes".into()), false).await;

        let out = deny(&mut session, &IdArgs::new(held.id().to_string()))
            .await
            .unwrap();
        assert!(matches!(out.structure(), Some(Outcome::NotDeniable { .. })));

        let out = deny(&mut session, &IdArgs::new(pending.id().to_string()))
            .await
            .unwrap();
        assert!(out.message().starts_with("Denied"));
        assert!(out.message().contains("(shoes)"));
        assert_eq!(session.ledger().transactions(), &[held]);
        assert!(session.ledger().counters().total().is_zero());

        // Stale id: already denied.
        let out = deny(&mut session, &IdArgs::new(pending.id().to_string()))
            .await
            .unwrap();
        assert!(out.message().contains("Nothing changed"));
        assert!(out.structure().is_none());
    }

    #[tokio::test]
    async fn test_no_match() {
        let env = TestEnv::new().await;
        let mut session = env.session().await;
        session.add_transaction(amount("1"), None, false).await;
        let out = categorize(&mut session, &ProcessArgs::new("zz", Category::Spent))
            .await
            .unwrap();
        assert_eq!(out.message(), "No pending transaction matches 'zz'. Nothing changed");
        assert_eq!(session.ledger().transactions().len(), 1);
    }
}
