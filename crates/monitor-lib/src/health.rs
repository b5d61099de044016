//! Poll-driven health state
//!
//! The poll loop is the only writer: each cycle either records a report or a
//! failure, and the HTTP probes read the resulting snapshot. Transport stages
//! are charged to the `session` component, parsing stages to `parser`, and
//! the modem's own partial-service flags to the link directions.

use crate::error::{MonitorError, Stage};
use crate::models::{LinkHealth, StatusReport};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Component state, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    /// The modem reports partial service; polling itself works
    Degraded,
    /// The last poll cycle failed in a stage owned by this component
    Unhealthy,
}

/// State of one component after the latest poll cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Failed cycles in a row charged to this component
    pub consecutive_failures: u32,
    pub last_check_timestamp: i64,
}

impl ComponentHealth {
    fn fresh() -> Self {
        Self {
            status: ComponentStatus::Healthy,
            message: None,
            consecutive_failures: 0,
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }

    fn mark(&mut self, status: ComponentStatus, message: Option<String>) {
        self.consecutive_failures = match status {
            ComponentStatus::Unhealthy => self.consecutive_failures.saturating_add(1),
            _ => 0,
        };
        self.status = status;
        self.message = message;
        self.last_check_timestamp = chrono::Utc::now().timestamp();
    }
}

/// Body of the `/healthz` probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Worst status across all components
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    pub components: HashMap<String, ComponentHealth>,
}

/// Body of the `/readyz` probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Component names for health tracking
pub mod components {
    pub const SESSION: &str = "session";
    pub const PARSER: &str = "parser";
    pub const DOWNSTREAM: &str = "downstream";
    pub const UPSTREAM: &str = "upstream";

    pub const ALL: &[&str] = &[SESSION, PARSER, DOWNSTREAM, UPSTREAM];
}

#[derive(Debug, Default)]
struct RegistryState {
    components: HashMap<String, ComponentHealth>,
    device_name: Option<String>,
    failed_stage: Option<Stage>,
    reports: u64,
}

impl RegistryState {
    fn mark(&mut self, name: &str, status: ComponentStatus, message: Option<String>) {
        self.components
            .entry(name.to_string())
            .or_insert_with(ComponentHealth::fresh)
            .mark(status, message);
    }
}

/// Shared health state; clones observe the same registry
#[derive(Debug, Clone, Default)]
pub struct HealthRegistry {
    state: Arc<RwLock<RegistryState>>,
}

fn link_status(health: LinkHealth) -> (ComponentStatus, Option<String>) {
    match health {
        LinkHealth::Up => (ComponentStatus::Healthy, None),
        LinkHealth::Partial => (
            ComponentStatus::Degraded,
            Some("Modem reports partial service".to_string()),
        ),
    }
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every monitor component as healthy
    pub async fn register_all(&self) {
        let mut state = self.state.write().await;
        for name in components::ALL {
            state
                .components
                .insert(name.to_string(), ComponentHealth::fresh());
        }
    }

    /// Record a successful poll cycle
    pub async fn record_report(&self, report: &StatusReport) {
        let mut state = self.state.write().await;

        state.mark(components::SESSION, ComponentStatus::Healthy, None);
        state.mark(components::PARSER, ComponentStatus::Healthy, None);

        let (status, message) = link_status(report.downstream.health);
        state.mark(components::DOWNSTREAM, status, message);
        let (status, message) = link_status(report.upstream.health);
        state.mark(components::UPSTREAM, status, message);

        state.device_name = Some(report.device_name.clone());
        state.failed_stage = None;
        state.reports += 1;
    }

    /// Record a failed poll cycle against the component owning the failing stage
    pub async fn record_failure(&self, error: &MonitorError) {
        let stage = error.stage();
        let component = match stage {
            Stage::TokenAcquisition | Stage::AuthenticatedFetch => components::SESSION,
            Stage::Extraction | Stage::Aggregation => components::PARSER,
        };

        let mut state = self.state.write().await;
        state.mark(component, ComponentStatus::Unhealthy, Some(error.to_string()));
        state.failed_stage = Some(stage);
    }

    /// Snapshot for the liveness probe
    pub async fn health(&self) -> HealthResponse {
        let state = self.state.read().await;
        let status = state
            .components
            .values()
            .map(|c| c.status)
            .max()
            .unwrap_or(ComponentStatus::Healthy);

        HealthResponse {
            status,
            device_name: state.device_name.clone(),
            components: state.components.clone(),
        }
    }

    /// Ready once a report has been produced and the latest cycle succeeded
    pub async fn readiness(&self) -> ReadinessResponse {
        let state = self.state.read().await;

        let reason = if state.reports == 0 {
            Some("No poll cycle has completed yet".to_string())
        } else {
            state
                .failed_stage
                .map(|stage| format!("Last poll cycle failed during {}", stage))
        };

        ReadinessResponse {
            ready: reason.is_none(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DownstreamCounts, DownstreamStatus, UpstreamCounts, UpstreamStatus};

    fn report(downstream: LinkHealth, upstream: LinkHealth) -> StatusReport {
        StatusReport {
            device_name: "CM1200".to_string(),
            downstream: DownstreamStatus {
                health: downstream,
                counts: DownstreamCounts::default(),
            },
            upstream: UpstreamStatus {
                health: upstream,
                counts: UpstreamCounts::default(),
            },
        }
    }

    async fn registry() -> HealthRegistry {
        let registry = HealthRegistry::new();
        registry.register_all().await;
        registry
    }

    #[tokio::test]
    async fn test_registered_components_start_healthy_but_not_ready() {
        let registry = registry().await;

        let health = registry.health().await;
        assert_eq!(health.status, ComponentStatus::Healthy);
        assert_eq!(health.components.len(), components::ALL.len());
        assert!(health.device_name.is_none());

        let readiness = registry.readiness().await;
        assert!(!readiness.ready);
        assert_eq!(
            readiness.reason.as_deref(),
            Some("No poll cycle has completed yet")
        );
    }

    #[tokio::test]
    async fn test_record_report_marks_partial_link_degraded() {
        let registry = registry().await;

        registry
            .record_report(&report(LinkHealth::Up, LinkHealth::Partial))
            .await;

        let health = registry.health().await;
        assert_eq!(health.status, ComponentStatus::Degraded);
        assert_eq!(health.device_name.as_deref(), Some("CM1200"));
        assert_eq!(
            health.components[components::UPSTREAM].status,
            ComponentStatus::Degraded
        );
        assert_eq!(
            health.components[components::DOWNSTREAM].status,
            ComponentStatus::Healthy
        );
        // Partial service is the modem's condition; the monitor stays ready
        assert!(registry.readiness().await.ready);
    }

    #[tokio::test]
    async fn test_transport_failure_charged_to_session() {
        let registry = registry().await;
        registry
            .record_report(&report(LinkHealth::Up, LinkHealth::Up))
            .await;

        registry
            .record_failure(&MonitorError::HttpStatus {
                stage: Stage::AuthenticatedFetch,
                status: 401,
            })
            .await;

        let health = registry.health().await;
        assert_eq!(health.status, ComponentStatus::Unhealthy);
        let session = &health.components[components::SESSION];
        assert_eq!(session.status, ComponentStatus::Unhealthy);
        assert_eq!(session.consecutive_failures, 1);
        assert!(session.message.as_deref().unwrap_or_default().contains("401"));
        assert_eq!(
            health.components[components::PARSER].status,
            ComponentStatus::Healthy
        );

        let readiness = registry.readiness().await;
        assert!(!readiness.ready);
        assert_eq!(
            readiness.reason.as_deref(),
            Some("Last poll cycle failed during authenticated_fetch")
        );
    }

    #[tokio::test]
    async fn test_parser_failures_accumulate_then_recover() {
        let registry = registry().await;

        for _ in 0..3 {
            registry
                .record_failure(&MonitorError::MissingQuotedField { line: 306 })
                .await;
        }

        let health = registry.health().await;
        let parser = &health.components[components::PARSER];
        assert_eq!(parser.status, ComponentStatus::Unhealthy);
        assert_eq!(parser.consecutive_failures, 3);
        assert_eq!(
            health.components[components::SESSION].status,
            ComponentStatus::Healthy
        );
        assert!(!registry.readiness().await.ready);

        registry
            .record_report(&report(LinkHealth::Up, LinkHealth::Up))
            .await;

        let health = registry.health().await;
        assert_eq!(health.status, ComponentStatus::Healthy);
        assert_eq!(health.components[components::PARSER].consecutive_failures, 0);
        assert!(health.components[components::PARSER].message.is_none());
        assert!(registry.readiness().await.ready);
    }

    #[test]
    fn test_status_ordering_picks_worst() {
        assert!(ComponentStatus::Healthy < ComponentStatus::Degraded);
        assert!(ComponentStatus::Degraded < ComponentStatus::Unhealthy);
    }
}
