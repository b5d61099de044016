//! Link health classification

use crate::error::MonitorError;
use crate::extract::field_at;
use crate::layout::SummaryLayout;
use crate::models::{
    DownstreamCounts, DownstreamStatus, LinkHealth, StatusReport, SummaryFields, UpstreamCounts,
    UpstreamStatus,
};

impl SummaryFields {
    /// Pick the summary values out of the extracted summary line
    pub fn from_fields(fields: &[String], layout: &SummaryLayout) -> Result<Self, MonitorError> {
        Ok(Self {
            device_name: field_at(fields, layout.device_name, "summary")?.to_string(),
            downstream_partial: field_at(fields, layout.downstream_partial, "summary")?
                .to_string(),
            upstream_partial: field_at(fields, layout.upstream_partial, "summary")?.to_string(),
        })
    }
}

/// A partial-service flag of anything but `"0"` means the link is degraded
fn health_from_flag(flag: &str) -> LinkHealth {
    if flag == "0" {
        LinkHealth::Up
    } else {
        LinkHealth::Partial
    }
}

/// Combine summary flags and channel tallies into a report
pub fn classify(
    summary: &SummaryFields,
    downstream: DownstreamCounts,
    upstream: UpstreamCounts,
) -> StatusReport {
    StatusReport {
        device_name: summary.device_name.clone(),
        downstream: DownstreamStatus {
            health: health_from_flag(&summary.downstream_partial),
            counts: downstream,
        },
        upstream: UpstreamStatus {
            health: health_from_flag(&summary.upstream_partial),
            counts: upstream,
        },
    }
}
