//! Library for monitoring DOCSIS link health through a cable modem's web interface
//!
//! This crate provides the core functionality for:
//! - Session authentication against the modem status page
//! - Extraction of the channel tables embedded in the page
//! - Aggregation of lock states and error counters
//! - Link health classification and status line rendering
//! - The poll loop, health checks and observability

pub mod channels;
pub mod classify;
pub mod error;
pub mod extract;
pub mod health;
pub mod layout;
pub mod models;
pub mod observability;
pub mod output;
pub mod page;
pub mod poller;
pub mod session;

pub use error::{ErrorKind, MonitorError, Stage};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use layout::{AggregationPolicy, FirmwareLayout, UnknownLockState, WindowBoundary};
pub use models::*;
pub use observability::{MonitorMetrics, StructuredLogger};
pub use page::StatusPageParser;
pub use poller::{ErrorPolicy, PollConfig, PollLoop, PollLoopBuilder};
pub use session::{CookiePair, HttpTransport, ModemTransport, SessionAuthenticator, SessionToken};
