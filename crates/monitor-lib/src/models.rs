//! Core data models for the DOCSIS monitor

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lock-state and error tallies for the downstream channels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownstreamCounts {
    pub locked: u32,
    pub unlocked: u32,
    pub uncorrectable_total: u64,
}

/// Lock-state tallies for the upstream channels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamCounts {
    pub locked: u32,
    pub unlocked: u32,
}

/// Values read from the summary line of the status page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryFields {
    pub device_name: String,
    /// `"0"` when every downstream channel is bonded
    pub downstream_partial: String,
    /// `"0"` when every upstream channel is bonded
    pub upstream_partial: String,
}

/// Health of one link direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkHealth {
    /// All channels bonded
    Up,
    /// Partial-service mode reported by the modem
    Partial,
}

impl LinkHealth {
    pub fn is_degraded(&self) -> bool {
        matches!(self, LinkHealth::Partial)
    }
}

/// Classified downstream state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownstreamStatus {
    pub health: LinkHealth,
    pub counts: DownstreamCounts,
}

/// Classified upstream state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamStatus {
    pub health: LinkHealth,
    pub counts: UpstreamCounts,
}

/// Result of one poll cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub device_name: String,
    pub downstream: DownstreamStatus,
    pub upstream: UpstreamStatus,
}

/// HTTP Basic credentials for the modem web interface
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
