//! Firmware page layouts
//!
//! The status page carries its data as single-quoted, pipe-delimited
//! JavaScript strings on fixed lines. Which line holds what, and where each
//! value sits inside a channel record, is specific to a firmware build and
//! is recorded here rather than scattered through the parser.

use serde::{Deserialize, Serialize};

/// Position of a channel table inside its field list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelLayout {
    /// Index of the first field of the first channel record
    pub start: usize,
    /// Number of fields per channel record
    pub width: usize,
    /// Offset of the lock state within a record
    pub lock_offset: usize,
    /// Offset of the uncorrectable codeword count within a record, if reported
    pub uncorrectable_offset: Option<usize>,
}

/// Position of the summary values inside the summary field list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryLayout {
    pub device_name: usize,
    pub downstream_partial: usize,
    pub upstream_partial: usize,
}

/// Complete page layout for one firmware build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareLayout {
    /// Name used to select the layout in configuration
    pub name: &'static str,
    /// Path of the status page relative to the device root
    pub status_path: &'static str,
    /// Line holding the summary fields
    pub summary_line: usize,
    /// Line holding the upstream channel table
    pub upstream_line: usize,
    /// Line holding the downstream channel table
    pub downstream_line: usize,
    pub summary: SummaryLayout,
    pub downstream: ChannelLayout,
    pub upstream: ChannelLayout,
}

/// Netgear CM1200 `DocsisStatus.htm` layout
pub const CM1200: FirmwareLayout = FirmwareLayout {
    name: "cm1200",
    status_path: "DocsisStatus.htm",
    summary_line: 176,
    upstream_line: 253,
    downstream_line: 306,
    summary: SummaryLayout {
        device_name: 10,
        downstream_partial: 12,
        upstream_partial: 13,
    },
    // Field 0 is the channel count
    downstream: ChannelLayout {
        start: 1,
        width: 9,
        lock_offset: 1,
        uncorrectable_offset: Some(8),
    },
    upstream: ChannelLayout {
        start: 0,
        width: 7,
        lock_offset: 2,
        uncorrectable_offset: None,
    },
};

/// All layouts known to the monitor
pub const KNOWN_LAYOUTS: &[FirmwareLayout] = &[CM1200];

impl FirmwareLayout {
    /// Look up a layout by name (case-insensitive)
    pub fn lookup(name: &str) -> Option<&'static FirmwareLayout> {
        KNOWN_LAYOUTS
            .iter()
            .find(|layout| layout.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Names of all known layouts, for error messages
    pub fn known_names() -> Vec<&'static str> {
        KNOWN_LAYOUTS.iter().map(|layout| layout.name).collect()
    }
}

/// Which channel windows are processed at the end of a field list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowBoundary {
    /// Process a window at `i` only while `i + width < len`.
    ///
    /// A record ending exactly at the last field is skipped. The device
    /// terminates each table with a trailing `|`, so in practice the final
    /// record is followed by one empty field and is still processed.
    #[default]
    ExclusiveTail,
    /// Process every complete window (`i + width <= len`)
    Inclusive,
}

/// How lock states other than `Locked` / `Not Locked` are tallied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownLockState {
    /// Count the channel in neither tally
    #[default]
    Ignore,
    /// Count the channel as not locked
    CountAsUnlocked,
}

/// Tallying rules applied by the channel aggregator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationPolicy {
    #[serde(default)]
    pub boundary: WindowBoundary,
    #[serde(default)]
    pub unknown_lock_state: UnknownLockState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_layout() {
        let layout = FirmwareLayout::lookup("CM1200").unwrap();
        assert_eq!(layout.summary_line, 176);
        assert_eq!(layout.upstream_line, 253);
        assert_eq!(layout.downstream_line, 306);
        assert_eq!(layout.downstream.uncorrectable_offset, Some(8));
        assert!(layout.upstream.uncorrectable_offset.is_none());
    }

    #[test]
    fn test_lookup_unknown_layout() {
        assert!(FirmwareLayout::lookup("cm600").is_none());
        assert_eq!(FirmwareLayout::known_names(), vec!["cm1200"]);
    }

    #[test]
    fn test_default_policy_is_exclusive_and_ignores_unknown() {
        let policy = AggregationPolicy::default();
        assert_eq!(policy.boundary, WindowBoundary::ExclusiveTail);
        assert_eq!(policy.unknown_lock_state, UnknownLockState::Ignore);
    }

    #[test]
    fn test_policy_names_deserialize() {
        let boundary: WindowBoundary = serde_json::from_str("\"inclusive\"").unwrap();
        assert_eq!(boundary, WindowBoundary::Inclusive);

        let unknown: UnknownLockState =
            serde_json::from_str("\"count-as-unlocked\"").unwrap();
        assert_eq!(unknown, UnknownLockState::CountAsUnlocked);
    }
}
