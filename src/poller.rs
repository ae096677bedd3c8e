//! Fixed-interval balance polling loop.
//!
//! One cycle: sign -> GET -> parse -> append, then sleep. A failed cycle is
//! logged and skipped; the loop only exits on shutdown.

use std::time::Duration;
use tracing::{error, info, warn};

use crate::balance_api::{BalanceTransport, BybitClient};
use crate::shutdown::ShutdownSignal;
use crate::store::ObservationStore;
use crate::types::Observation;

/// Counters reported when the loop stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    pub cycles: u64,
    pub appended: u64,
    pub failed_polls: u64,
    pub failed_appends: u64,
}

/// Balance poller
pub struct BalancePoller<T> {
    client: BybitClient<T>,
    interval: Duration,
}

impl<T: BalanceTransport> BalancePoller<T> {
    pub fn new(client: BybitClient<T>, interval: Duration) -> Self {
        Self { client, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run a single poll cycle. `None` means nothing should be stored.
    pub async fn poll_once(&self) -> Option<Observation> {
        match self.client.get_wallet_balance().await {
            Ok(balance) => {
                info!("[POLL] Balance: {}", balance);
                Some(Observation::now(balance))
            }
            Err(e) if e.is_transport() => {
                warn!("[POLL] Request failed: {}", e);
                None
            }
            Err(e) => {
                warn!("[POLL] Bad response: {}", e);
                None
            }
        }
    }

    /// Poll until shutdown, appending each observation to `store`.
    ///
    /// Shutdown is honoured during the request and during the sleep; an
    /// append in progress always completes.
    pub async fn run(&self, store: &ObservationStore, mut shutdown: ShutdownSignal) -> PollStats {
        let mut stats = PollStats::default();
        let mut consecutive_store_failures = 0u64;

        info!(
            "[POLL] Started ({}, every {}s, writing {})",
            self.client.environment(),
            self.interval.as_secs_f64(),
            store.path().display()
        );

        loop {
            if shutdown.is_triggered() {
                break;
            }

            let outcome = tokio::select! {
                biased;
                _ = shutdown.wait() => break,
                outcome = self.poll_once() => outcome,
            };
            stats.cycles += 1;

            match outcome {
                Some(observation) => match store.append(&observation) {
                    Ok(()) => {
                        stats.appended += 1;
                        consecutive_store_failures = 0;
                    }
                    Err(e) => {
                        stats.failed_appends += 1;
                        consecutive_store_failures += 1;
                        error!(
                            "[STORE] Failed to append to {} ({} in a row), sample dropped: {}",
                            store.path().display(),
                            consecutive_store_failures,
                            e
                        );
                    }
                },
                None => stats.failed_polls += 1,
            }

            tokio::select! {
                biased;
                _ = shutdown.wait() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!(
            "[POLL] Stopped after {} cycles ({} appended, {} failed polls, {} failed appends)",
            stats.cycles, stats.appended, stats.failed_polls, stats.failed_appends
        );
        stats
    }
}
