//! A background task that re-evaluates expiry on a fixed cadence.

use crate::session::Session;
use crate::Result;
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};

/// The cadence used when none is configured.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

/// Runs `Session::evaluate_expiry` every `period` until cancelled or dropped.
#[derive(Debug)]
pub struct ExpiryTicker {
    handle: JoinHandle<()>,
    cancel: Option<oneshot::Sender<()>>,
}

impl ExpiryTicker {
    /// Starts ticking on the current tokio runtime. The first evaluation happens immediately.
    pub fn spawn(session: Arc<Mutex<Session>>, period: Duration) -> Self {
        let (cancel, mut cancelled) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = &mut cancelled => break,
                    _ = interval.tick() => {
                        let changed = session.lock().await.evaluate_expiry().await;
                        if changed.is_empty() {
                            trace!("Tick: no expiry changes");
                        } else {
                            debug!("Tick: {} transaction(s) changed expiry", changed.len());
                        }
                    }
                }
            }
            debug!("Expiry ticker stopped");
        });
        debug!("Expiry ticker started with a period of {period:?}");
        Self {
            handle,
            cancel: Some(cancel),
        }
    }

    /// Stops the task and waits for an in-flight tick to finish.
    pub async fn cancel(mut self) -> Result<()> {
        if let Some(cancel) = self.cancel.take() {
            // The task may already be gone; nothing to signal then.
            let _ = cancel.send(());
        }
        (&mut self.handle)
            .await
            .context("The expiry ticker task failed")
    }
}

impl Drop for ExpiryTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
