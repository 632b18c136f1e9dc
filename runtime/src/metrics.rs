//! Prometheus metrics for the storefront client.
//!
//! Covers:
//! - Store action dispatch and effect execution
//! - Status reconciliation cycles and selection evictions
//! - Debounced search requests
//! - Admin form actions
//!
//! # Example
//!
//! ```rust,no_run
//! use rifa_runtime::metrics::MetricsServer;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut server = MetricsServer::new("127.0.0.1:9100".parse()?);
//! server.start()?;
//!
//! // Metrics available at http://127.0.0.1:9100/metrics
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use thiserror::Error;

pub use metrics::{counter, histogram};

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Prometheus metrics server.
///
/// Serves the scrape endpoint from a task on the current tokio runtime.
pub struct MetricsServer {
    addr: SocketAddr,
    handle: Option<PrometheusHandle>,
}

impl MetricsServer {
    /// Create a server bound to `addr` once started
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self { addr, handle: None }
    }

    /// Install the global recorder and start serving.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::Build`] if the exporter cannot be built or the
    /// listener cannot bind, and [`MetricsError::Install`] if the recorder
    /// cannot be installed for another reason than a recorder already being
    /// present. An existing recorder is tolerated with a warning.
    pub fn start(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let (recorder, exporter) = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[0.000_01, 0.000_05, 0.000_1, 0.000_5, 0.001, 0.005, 0.01, 0.05, 0.1],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?
            .with_http_listener(self.addr)
            .build()
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        let handle = recorder.handle();
        match metrics::set_global_recorder(recorder) {
            Ok(()) => {
                self.handle = Some(handle);
                tokio::spawn(async move {
                    if exporter.await.is_err() {
                        tracing::warn!("Metrics exporter stopped");
                    }
                });
                tracing::info!(
                    addr = %self.addr,
                    "Metrics server started - available at http://{}/metrics",
                    self.addr
                );
                Ok(())
            },
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            },
        }
    }

    /// Render current metrics in Prometheus format.
    ///
    /// Returns `None` if this server did not install the recorder.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

fn register_metrics() {
    describe_counter!("store_actions_total", "Total number of actions dispatched to the store");
    describe_histogram!(
        "store_reducer_duration_seconds",
        "Time spent inside the reducer per action"
    );
    describe_counter!(
        "store_effects_executed_total",
        "Total number of effects executed, by effect type"
    );
    describe_counter!("poller_ticks_total", "Total number of poller ticks dispatched");

    describe_counter!(
        "poll_cycles_total",
        "Total number of completed reconciliation cycles, by outcome"
    );
    describe_counter!(
        "poll_ticks_skipped_total",
        "Poll ticks ignored because the previous cycle was still fetching"
    );
    describe_counter!(
        "selection_evictions_total",
        "Selected tickets dropped because the server reported them taken"
    );

    describe_counter!("search_requests_total", "Total number of search requests issued");

    describe_counter!("admin_actions_total", "Admin form submissions, by action and outcome");
}

/// Reconciliation metrics recorder.
pub struct ReconciliationMetrics;

impl ReconciliationMetrics {
    /// Record a finished cycle; `outcome` is `applied`, `unavailable` or `failed`
    pub fn record_cycle(outcome: &'static str) {
        counter!("poll_cycles_total", "outcome" => outcome).increment(1);
    }

    /// Record a tick skipped due to an in-flight cycle
    pub fn record_skipped() {
        counter!("poll_ticks_skipped_total").increment(1);
    }

    /// Record ids evicted from the selection
    pub fn record_evictions(count: usize) {
        if count > 0 {
            counter!("selection_evictions_total").increment(count as u64);
        }
    }
}

/// Search metrics recorder.
pub struct SearchMetrics;

impl SearchMetrics {
    /// Record a search request sent to the server
    pub fn record_request() {
        counter!("search_requests_total").increment(1);
    }
}

/// Admin action metrics recorder.
pub struct AdminMetrics;

impl AdminMetrics {
    /// Record an admin action; `action` is `confirm_sale` or `cancel_reservation`
    pub fn record(action: &'static str, outcome: &'static str) {
        counter!("admin_actions_total", "action" => action, "outcome" => outcome).increment(1);
    }
}
