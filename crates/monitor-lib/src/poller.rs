//! Status polling loop
//!
//! Periodically authenticates against the modem, parses its status page and
//! emits a [`StatusReport`] per cycle over a channel. What happens after a
//! failed cycle is decided by [`ErrorPolicy`].

use crate::error::MonitorError;
use crate::health::HealthRegistry;
use crate::models::StatusReport;
use crate::observability::{MonitorMetrics, StructuredLogger};
use crate::page::StatusPageParser;
use crate::session::SessionAuthenticator;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// What the loop does after a failed poll cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Stop the loop and hand the error to the caller
    #[default]
    Exit,
    /// Log the failure and try again on the next tick
    Continue,
}

/// Configuration for the poll loop
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between poll cycles (default: 2 seconds)
    pub interval: Duration,
    pub error_policy: ErrorPolicy,
    /// Channel buffer size for emitted reports
    pub buffer_size: usize,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            error_policy: ErrorPolicy::Exit,
            buffer_size: 16,
        }
    }
}

/// Loop that polls one modem until shut down
pub struct PollLoop {
    authenticator: SessionAuthenticator,
    parser: StatusPageParser,
    config: PollConfig,
    report_tx: mpsc::Sender<StatusReport>,
    health: Option<HealthRegistry>,
    metrics: Option<MonitorMetrics>,
    logger: Option<StructuredLogger>,
}

impl PollLoop {
    pub fn new(
        authenticator: SessionAuthenticator,
        parser: StatusPageParser,
        config: PollConfig,
    ) -> (Self, mpsc::Receiver<StatusReport>) {
        let (report_tx, report_rx) = mpsc::channel(config.buffer_size.max(1));

        let poll_loop = Self {
            authenticator,
            parser,
            config,
            report_tx,
            health: None,
            metrics: None,
            logger: None,
        };

        (poll_loop, report_rx)
    }

    /// Run a single cycle: authenticate, fetch, parse
    pub async fn poll_once(&self) -> Result<StatusReport, MonitorError> {
        let body = self.authenticator.fetch_status_page().await?;
        debug!(bytes = body.len(), "Fetched status page");
        self.parser.parse(&body)
    }

    /// Run one cycle and publish its outcome to the report channel and sinks
    pub async fn run_cycle(&self) -> Result<(), MonitorError> {
        let start = Instant::now();
        let outcome = self.poll_once().await;
        let elapsed = start.elapsed();

        if let Some(metrics) = &self.metrics {
            metrics.observe_poll_latency(elapsed.as_secs_f64());
        }

        match outcome {
            Ok(report) => {
                if let Some(logger) = &self.logger {
                    logger.log_poll(&report, elapsed.as_millis());
                }
                if let Some(metrics) = &self.metrics {
                    metrics.record_report(&report);
                }
                if let Some(health) = &self.health {
                    health.record_report(&report).await;
                }
                if let Err(e) = self.report_tx.send(report).await {
                    warn!(error = %e, "Failed to send status report to channel");
                }
                Ok(())
            }
            Err(err) => {
                match &self.logger {
                    Some(logger) => logger.log_poll_failure(&err),
                    None => warn!(stage = %err.stage(), error = %err, "Poll cycle failed"),
                }
                if let Some(metrics) = &self.metrics {
                    metrics.inc_poll_errors();
                }
                if let Some(health) = &self.health {
                    health.record_failure(&err).await;
                }
                Err(err)
            }
        }
    }

    /// Poll until a shutdown signal arrives, or until a cycle fails under
    /// [`ErrorPolicy::Exit`]
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> Result<(), MonitorError> {
        info!(
            interval_secs = self.config.interval.as_secs(),
            policy = ?self.config.error_policy,
            "Starting status poll loop"
        );

        let mut ticker = interval(self.config.interval);
        // A slow cycle pushes the next one back instead of bursting
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(err) = self.run_cycle().await {
                        if self.config.error_policy == ErrorPolicy::Exit {
                            return Err(err);
                        }
                    }

                    if self.report_tx.is_closed() {
                        info!("Report receiver dropped, stopping poll loop");
                        break;
                    }
                }
                _ = shutdown.recv() => {
                    info!("Shutting down status poll loop");
                    break;
                }
            }
        }

        Ok(())
    }
}

/// Builder for the poll loop
pub struct PollLoopBuilder {
    authenticator: Option<SessionAuthenticator>,
    parser: StatusPageParser,
    config: PollConfig,
    health: Option<HealthRegistry>,
    metrics: Option<MonitorMetrics>,
    logger: Option<StructuredLogger>,
}

impl PollLoopBuilder {
    pub fn new() -> Self {
        Self {
            authenticator: None,
            parser: StatusPageParser::default(),
            config: PollConfig::default(),
            health: None,
            metrics: None,
            logger: None,
        }
    }

    pub fn authenticator(mut self, authenticator: SessionAuthenticator) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    pub fn parser(mut self, parser: StatusPageParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.interval = interval;
        self
    }

    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.config.error_policy = policy;
        self
    }

    pub fn health(mut self, health: HealthRegistry) -> Self {
        self.health = Some(health);
        self
    }

    pub fn metrics(mut self, metrics: MonitorMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn build(self) -> Result<(PollLoop, mpsc::Receiver<StatusReport>)> {
        let authenticator = self
            .authenticator
            .ok_or_else(|| anyhow::anyhow!("Authenticator is required"))?;

        let (mut poll_loop, rx) = PollLoop::new(authenticator, self.parser, self.config);
        poll_loop.health = self.health;
        poll_loop.metrics = self.metrics;
        poll_loop.logger = self.logger;

        Ok((poll_loop, rx))
    }
}

impl Default for PollLoopBuilder {
    fn default() -> Self {
        Self::new()
    }
}
