//! Error types for the monitor pipeline
//!
//! Every stage of a poll cycle returns [`MonitorError`]. The poll loop decides
//! whether an error ends the process or only the current cycle.

use std::fmt;
use std::num::ParseIntError;
use thiserror::Error;

/// Stage of a poll cycle in which an error was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Unauthenticated request for the session cookie
    TokenAcquisition,
    /// Authenticated request for the status page
    AuthenticatedFetch,
    /// Pulling field lists out of the page body
    Extraction,
    /// Tallying channel windows
    Aggregation,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::TokenAcquisition => "token_acquisition",
            Stage::AuthenticatedFetch => "authenticated_fetch",
            Stage::Extraction => "extraction",
            Stage::Aggregation => "aggregation",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broad class of a [`MonitorError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The device could not be reached or answered unexpectedly
    Transport,
    /// The page no longer matches the firmware layout
    FormatContract,
}

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("invalid modem address {host:?}: {source}")]
    InvalidHost {
        host: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("{stage} request failed: {source}")]
    Transport {
        stage: Stage,
        #[source]
        source: reqwest::Error,
    },

    #[error("{stage} request returned HTTP {status}")]
    HttpStatus { stage: Stage, status: u16 },

    #[error("token response carried no Set-Cookie header")]
    MissingSessionCookie,

    #[error("malformed session cookie pair {pair:?}")]
    MalformedCookie { pair: String },

    #[error("status page has {available} lines, line {line} is required")]
    LineOutOfRange { line: usize, available: usize },

    #[error("line {line} has no single-quoted field list")]
    MissingQuotedField { line: usize },

    #[error("{section} field {index} is missing ({available} fields present)")]
    FieldOutOfRange {
        section: &'static str,
        index: usize,
        available: usize,
    },

    #[error("uncorrectable count {value:?} at field {index} is not a base-10 integer")]
    InvalidCounter {
        index: usize,
        value: String,
        #[source]
        source: ParseIntError,
    },
}

impl MonitorError {
    /// Stage of the poll cycle this error belongs to
    pub fn stage(&self) -> Stage {
        match self {
            MonitorError::InvalidHost { .. }
            | MonitorError::Client(_)
            | MonitorError::MissingSessionCookie
            | MonitorError::MalformedCookie { .. } => Stage::TokenAcquisition,
            MonitorError::Transport { stage, .. } | MonitorError::HttpStatus { stage, .. } => {
                *stage
            }
            MonitorError::LineOutOfRange { .. }
            | MonitorError::MissingQuotedField { .. }
            | MonitorError::FieldOutOfRange { .. } => Stage::Extraction,
            MonitorError::InvalidCounter { .. } => Stage::Aggregation,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self.stage() {
            Stage::TokenAcquisition | Stage::AuthenticatedFetch => ErrorKind::Transport,
            Stage::Extraction | Stage::Aggregation => ErrorKind::FormatContract,
        }
    }
}
