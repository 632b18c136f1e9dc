//! Fixed-interval action dispatch.
//!
//! The poller sends one action immediately and then one per interval for as
//! long as its [`PollerHandle`] lives. Ticks missed while the executor was
//! busy are skipped rather than replayed in a burst. Whether a tick actually
//! does work (for example when the previous cycle is still in flight) is the
//! reducer's decision.

use crate::error::StoreError;
use crate::store::Store;
use rifa_core::reducer::Reducer;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Shortest accepted interval; `tokio::time::interval` rejects zero
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Spawns interval loops that feed a [`Store`]
#[derive(Debug, Clone, Copy)]
pub struct Poller;

impl Poller {
    /// Send `make_action()` to `store` now and every `interval` afterwards
    ///
    /// The loop ends when the handle is stopped or dropped, or when the store
    /// starts shutting down.
    pub fn spawn<S, A, E, R, F>(
        store: Store<S, A, E, R>,
        interval: Duration,
        make_action: F,
    ) -> PollerHandle
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Sync + Clone + std::fmt::Debug + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
        F: Fn() -> A + Send + 'static,
    {
        let interval = interval.max(MIN_INTERVAL);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                metrics::counter!("poller_ticks_total").increment(1);

                match store.send(make_action()).await {
                    Ok(_) => {},
                    Err(StoreError::ShutdownInProgress) => {
                        tracing::info!("Store is shutting down, poller exiting");
                        break;
                    },
                    Err(error) => {
                        tracing::warn!(error = %error, "Poller could not dispatch tick");
                    },
                }
            }
        });

        tracing::debug!(interval_ms = interval.as_millis(), "Poller started");
        PollerHandle { task }
    }
}

/// Owner of a running poller; dropping it stops the loop
#[derive(Debug)]
pub struct PollerHandle {
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Stop the poller
    pub fn stop(self) {
        self.task.abort();
        tracing::debug!("Poller stopped");
    }

    /// Whether the loop has ended
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
