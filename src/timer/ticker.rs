use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tokio::{
    sync::mpsc::UnboundedSender,
    task::JoinHandle,
    time::{self, Instant},
};
use tokio_util::sync::CancellationToken;

const ENABLE_LOGS: bool = false;

/// Heartbeat delivered to the presentation layer so it can redraw running counters.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Tick {
    pub count: u64,
}

/// Periodic tick source. Start/stop only; the counters themselves live in
/// [`Stopwatch`](super::Stopwatch).
pub struct Ticker {
    period: Duration,
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            handle: None,
            cancel_token: None,
        }
    }

    pub fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    pub fn start(&mut self, sender: UnboundedSender<Tick>) -> Result<()> {
        if self.handle.is_some() {
            bail!("ticker already active");
        }

        let cancel_token = CancellationToken::new();
        let token = cancel_token.clone();
        let period = self.period;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            let mut count: u64 = 0;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        count = count.wrapping_add(1);
                        if sender.send(Tick { count }).is_err() {
                            crate::log_debug!("Tick receiver dropped; stopping ticker");
                            break;
                        }
                    }
                }
            }
        });

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    /// Stops the tick task. Calling it on an idle ticker is a no-op.
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle.await.context("ticker task failed to join")
        } else {
            Ok(())
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
    }
}
