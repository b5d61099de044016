//! Status page parsing
//!
//! Runs the three extractions, two aggregations and the classification for
//! one page body against a firmware layout.

use crate::channels::{aggregate_downstream_with, aggregate_upstream_with};
use crate::classify::classify;
use crate::error::MonitorError;
use crate::extract::extract_fields;
use crate::layout::{AggregationPolicy, FirmwareLayout, CM1200};
use crate::models::{StatusReport, SummaryFields};
use tracing::debug;

/// Parser for the modem status page
#[derive(Debug, Clone, Copy)]
pub struct StatusPageParser {
    layout: &'static FirmwareLayout,
    policy: AggregationPolicy,
}

impl Default for StatusPageParser {
    fn default() -> Self {
        Self::new(&CM1200, AggregationPolicy::default())
    }
}

impl StatusPageParser {
    pub fn new(layout: &'static FirmwareLayout, policy: AggregationPolicy) -> Self {
        Self { layout, policy }
    }

    /// Parse a status page body into a report
    pub fn parse(&self, page_body: &str) -> Result<StatusReport, MonitorError> {
        let layout = self.layout;

        let summary_fields = extract_fields(page_body, layout.summary_line)?;
        let downstream_fields = extract_fields(page_body, layout.downstream_line)?;
        let upstream_fields = extract_fields(page_body, layout.upstream_line)?;

        debug!(
            summary_fields = summary_fields.len(),
            downstream_fields = downstream_fields.len(),
            upstream_fields = upstream_fields.len(),
            "Extracted status page tables"
        );

        let summary = SummaryFields::from_fields(&summary_fields, &layout.summary)?;
        let downstream =
            aggregate_downstream_with(&downstream_fields, &layout.downstream, &self.policy)?;
        let upstream = aggregate_upstream_with(&upstream_fields, &layout.upstream, &self.policy);

        Ok(classify(&summary, downstream, upstream))
    }
}
