//! Observability infrastructure for the monitor
//!
//! Provides:
//! - Prometheus metrics (poll latency, channel lock counts, uncorrectable codewords)
//! - Structured logging of poll events with tracing

use crate::error::MonitorError;
use crate::models::StatusReport;
use prometheus::proto::MetricFamily;
use prometheus::{
    register_histogram, register_int_counter, register_int_gauge, register_int_gauge_vec,
    Histogram, IntCounter, IntGauge, IntGaugeVec,
};
use std::sync::OnceLock;
use tracing::{error, info};

/// Histogram buckets for a full poll cycle (two HTTP round trips), in seconds
const POLL_LATENCY_BUCKETS: &[f64] = &[0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<MonitorMetricsInner> = OnceLock::new();

struct MonitorMetricsInner {
    poll_latency_seconds: Histogram,
    polls_completed: IntCounter,
    poll_errors: IntCounter,
    locked_channels: IntGaugeVec,
    unlocked_channels: IntGaugeVec,
    downstream_uncorrectable: IntGauge,
    link_degraded: IntGaugeVec,
}

impl MonitorMetricsInner {
    fn new() -> Self {
        Self {
            poll_latency_seconds: register_histogram!(
                "docsis_monitor_poll_latency_seconds",
                "Time spent authenticating and fetching the status page",
                POLL_LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register poll_latency_seconds"),

            polls_completed: register_int_counter!(
                "docsis_monitor_polls_completed_total",
                "Number of poll cycles that produced a status report"
            )
            .expect("Failed to register polls_completed"),

            poll_errors: register_int_counter!(
                "docsis_monitor_poll_errors_total",
                "Number of poll cycles that failed"
            )
            .expect("Failed to register poll_errors"),

            locked_channels: register_int_gauge_vec!(
                "docsis_monitor_locked_channels",
                "Channels reporting Locked in the last poll",
                &["direction"]
            )
            .expect("Failed to register locked_channels"),

            unlocked_channels: register_int_gauge_vec!(
                "docsis_monitor_unlocked_channels",
                "Channels reporting Not Locked in the last poll",
                &["direction"]
            )
            .expect("Failed to register unlocked_channels"),

            downstream_uncorrectable: register_int_gauge!(
                "docsis_monitor_downstream_uncorrectable_codewords",
                "Uncorrectable codewords summed across downstream channels"
            )
            .expect("Failed to register downstream_uncorrectable"),

            link_degraded: register_int_gauge_vec!(
                "docsis_monitor_link_degraded",
                "1 when the modem reports partial service for the direction",
                &["direction"]
            )
            .expect("Failed to register link_degraded"),
        }
    }
}

/// Monitor metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share it.
#[derive(Clone)]
pub struct MonitorMetrics {
    _private: (),
}

impl Default for MonitorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(MonitorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &MonitorMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    /// Snapshot of every registered metric family, monitor metrics included
    pub fn gather(&self) -> Vec<MetricFamily> {
        prometheus::gather()
    }

    pub fn observe_poll_latency(&self, duration_secs: f64) {
        self.inner().poll_latency_seconds.observe(duration_secs);
    }

    pub fn inc_poll_errors(&self) {
        self.inner().poll_errors.inc();
    }

    /// Publish the counts of a completed poll
    pub fn record_report(&self, report: &StatusReport) {
        let inner = self.inner();
        inner.polls_completed.inc();

        let ds = &report.downstream;
        let us = &report.upstream;

        inner
            .locked_channels
            .with_label_values(&["downstream"])
            .set(i64::from(ds.counts.locked));
        inner
            .unlocked_channels
            .with_label_values(&["downstream"])
            .set(i64::from(ds.counts.unlocked));
        inner
            .locked_channels
            .with_label_values(&["upstream"])
            .set(i64::from(us.counts.locked));
        inner
            .unlocked_channels
            .with_label_values(&["upstream"])
            .set(i64::from(us.counts.unlocked));

        inner
            .downstream_uncorrectable
            .set(i64::try_from(ds.counts.uncorrectable_total).unwrap_or(i64::MAX));

        inner
            .link_degraded
            .with_label_values(&["downstream"])
            .set(i64::from(ds.health.is_degraded()));
        inner
            .link_degraded
            .with_label_values(&["upstream"])
            .set(i64::from(us.health.is_degraded()));
    }
}

/// Structured logger for monitor events
#[derive(Clone)]
pub struct StructuredLogger {
    host: String,
}

impl StructuredLogger {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }

    pub fn log_startup(&self, version: &str, firmware: &str, interval_secs: u64) {
        info!(
            event = "monitor_started",
            host = %self.host,
            version = %version,
            firmware = %firmware,
            interval_secs = interval_secs,
            "DOCSIS monitor started"
        );
    }

    pub fn log_poll(&self, report: &StatusReport, elapsed_ms: u128) {
        info!(
            event = "poll_completed",
            host = %self.host,
            device = %report.device_name,
            downstream = ?report.downstream.health,
            downstream_locked = report.downstream.counts.locked,
            downstream_unlocked = report.downstream.counts.unlocked,
            uncorrectable = report.downstream.counts.uncorrectable_total,
            upstream = ?report.upstream.health,
            upstream_locked = report.upstream.counts.locked,
            upstream_unlocked = report.upstream.counts.unlocked,
            elapsed_ms = elapsed_ms,
            "Poll cycle complete"
        );
    }

    pub fn log_poll_failure(&self, err: &MonitorError) {
        error!(
            event = "poll_failed",
            host = %self.host,
            stage = %err.stage(),
            kind = ?err.kind(),
            error = %err,
            "Poll cycle failed"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "monitor_shutdown",
            host = %self.host,
            reason = %reason,
            "DOCSIS monitor shutting down"
        );
    }
}
