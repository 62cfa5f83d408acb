use crate::commands::{describe, Out};
use crate::ledger::RemainingTime;
use crate::model::{Counters, Transaction};
use crate::session::Session;
use crate::Result;
use serde::Serialize;
use std::fmt::Write;

/// A pre-approved transaction together with what is left of its hold.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnHold {
    pub transaction: Transaction,
    pub remaining: RemainingTime,
}

/// The two groups of pending transactions plus the current totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub pre_approved: Vec<OnHold>,
    pub needs_approval: Vec<Transaction>,
    pub counters: Counters,
}

/// Lists pending transactions. Pre-approved ones show the time left on their hold, or that they
/// are ready to be categorized.
pub async fn list(session: &Session) -> Result<Out<Listing>> {
    let now = session.now();
    let ledger = session.ledger();
    let listing = Listing {
        pre_approved: ledger
            .pre_approved()
            .filter_map(|t| {
                ledger.remaining_time(t.id(), now).map(|remaining| OnHold {
                    transaction: t.clone(),
                    remaining,
                })
            })
            .collect(),
        needs_approval: ledger.needs_approval().cloned().collect(),
        counters: *ledger.counters(),
    };
    Ok(Out::new(render(&listing), listing))
}

fn render(listing: &Listing) -> String {
    let mut s = String::new();
    if listing.pre_approved.is_empty() && listing.needs_approval.is_empty() {
        s.push_str("No pending transactions\n");
    }
    if !listing.pre_approved.is_empty() {
        s.push_str("Pre-approved:\n");
        for hold in &listing.pre_approved {
            let status = if hold.remaining.is_zero() {
                String::from("ready to categorize")
            } else {
                format!("on hold for {}", hold.remaining)
            };
            let _ = writeln!(s, "  {} {status}", describe(&hold.transaction));
        }
    }
    if !listing.needs_approval.is_empty() {
        s.push_str("Needs approval:\n");
        for t in &listing.needs_approval {
            let _ = writeln!(s, "  {}", describe(t));
        }
    }
    for (category, amount) in listing.counters.iter() {
        let _ = writeln!(s, "{}: {amount}", category.title());
    }
    s.trim_end().to_string()
}
