use crate::commands::{describe, Out};
use crate::ledger::LedgerEvent;
use crate::model::TransactionId;
use crate::session::Session;
use crate::ticker::ExpiryTicker;
use crate::Result;
use anyhow::Context;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::info;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchReport {
    /// Transactions whose hold ended while watching, in the order it happened.
    pub expired: Vec<TransactionId>,
}

/// Runs the expiry ticker every `period` and logs each hold as it ends. Stops on Ctrl-C, or after
/// `seconds` when given.
pub async fn watch(
    session: Arc<Mutex<Session>>,
    period: Duration,
    seconds: Option<u64>,
) -> Result<Out<WatchReport>> {
    let (sender, mut receiver) = mpsc::unbounded_channel();
    let subscription = {
        let mut session = session.lock().await;
        let on_hold = session
            .ledger()
            .pre_approved()
            .filter(|t| !t.is_expired())
            .count();
        info!("Watching {on_hold} pre-approved transaction(s) on hold, press Ctrl-C to stop");
        session.subscribe(move |event| {
            if let LedgerEvent::ExpiryChanged(ids) = event {
                // The receiver outlives the subscription.
                let _ = sender.send(ids.clone());
            }
        })
    };

    let ticker = ExpiryTicker::spawn(session.clone(), period);
    let deadline = async {
        match seconds {
            Some(s) => tokio::time::sleep(Duration::from_secs(s)).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut expired = Vec::new();
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            signal = &mut ctrl_c => {
                signal.context("Unable to listen for Ctrl-C")?;
                break;
            }
            Some(ids) = receiver.recv() => {
                let session = session.lock().await;
                for id in ids {
                    if let Some(t) = session.ledger().get(id).filter(|t| t.is_expired()) {
                        info!("The hold on {} has ended, it can be categorized now", describe(t));
                        expired.push(id);
                    }
                }
            }
        }
    }

    ticker.cancel().await?;
    session.lock().await.unsubscribe(subscription);

    let message = format!("Stopped watching, {} hold(s) ended", expired.len());
    Ok(Out::new(message, WatchReport { expired }))
}
