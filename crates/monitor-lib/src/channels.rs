//! Channel table aggregation
//!
//! Walks a channel field list in fixed-width windows and tallies lock states
//! and, for downstream tables, uncorrectable codewords.

use crate::error::MonitorError;
use crate::layout::{AggregationPolicy, ChannelLayout, UnknownLockState, WindowBoundary, CM1200};
use crate::models::{DownstreamCounts, UpstreamCounts};

const LOCKED: &str = "Locked";
const NOT_LOCKED: &str = "Not Locked";

/// Generic tally over one channel table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelTally {
    pub locked: u32,
    pub unlocked: u32,
    pub uncorrectable_total: u64,
}

/// Iterate the channel records of a field list under the given boundary rule
pub fn channel_windows<'a>(
    fields: &'a [String],
    layout: &ChannelLayout,
    boundary: WindowBoundary,
) -> impl Iterator<Item = (usize, &'a [String])> + 'a {
    let width = layout.width.max(1);
    let len = fields.len();

    (layout.start..len)
        .step_by(width)
        .take_while(move |&i| match boundary {
            WindowBoundary::ExclusiveTail => i + width < len,
            WindowBoundary::Inclusive => i + width <= len,
        })
        .map(move |i| (i, &fields[i..i + width]))
}

/// Tally a channel table according to its layout
pub fn aggregate(
    fields: &[String],
    layout: &ChannelLayout,
    policy: &AggregationPolicy,
) -> Result<ChannelTally, MonitorError> {
    let mut tally = ChannelTally::default();

    for (start, window) in channel_windows(fields, layout, policy.boundary) {
        match window[layout.lock_offset].as_str() {
            LOCKED => tally.locked += 1,
            NOT_LOCKED => tally.unlocked += 1,
            _ => {
                if policy.unknown_lock_state == UnknownLockState::CountAsUnlocked {
                    tally.unlocked += 1;
                }
            }
        }

        if let Some(offset) = layout.uncorrectable_offset {
            let raw = &window[offset];
            let count: u64 = raw.parse().map_err(|source| MonitorError::InvalidCounter {
                index: start + offset,
                value: raw.clone(),
                source,
            })?;
            tally.uncorrectable_total = tally.uncorrectable_total.saturating_add(count);
        }
    }

    Ok(tally)
}

/// Tally a downstream table using the CM1200 record layout
pub fn aggregate_downstream(
    fields: &[String],
    policy: &AggregationPolicy,
) -> Result<DownstreamCounts, MonitorError> {
    aggregate_downstream_with(fields, &CM1200.downstream, policy)
}

/// Tally an upstream table using the CM1200 record layout
pub fn aggregate_upstream(fields: &[String], policy: &AggregationPolicy) -> UpstreamCounts {
    aggregate_upstream_with(fields, &CM1200.upstream, policy)
}

pub fn aggregate_downstream_with(
    fields: &[String],
    layout: &ChannelLayout,
    policy: &AggregationPolicy,
) -> Result<DownstreamCounts, MonitorError> {
    let tally = aggregate(fields, layout, policy)?;
    Ok(DownstreamCounts {
        locked: tally.locked,
        unlocked: tally.unlocked,
        uncorrectable_total: tally.uncorrectable_total,
    })
}

pub fn aggregate_upstream_with(
    fields: &[String],
    layout: &ChannelLayout,
    policy: &AggregationPolicy,
) -> UpstreamCounts {
    let layout = ChannelLayout {
        uncorrectable_offset: None,
        ..*layout
    };
    // Without a counter offset there is nothing that can fail to parse
    let tally = aggregate(fields, &layout, policy).unwrap_or_default();
    UpstreamCounts {
        locked: tally.locked,
        unlocked: tally.unlocked,
    }
}
