//! Status line formatting

use crate::models::{DownstreamStatus, LinkHealth, StatusReport, UpstreamStatus};
use colored::Colorize;

/// Health word padded to a fixed width so successive lines stay aligned
fn health_label(health: LinkHealth) -> &'static str {
    match health {
        LinkHealth::Partial => "Partial",
        LinkHealth::Up => "Up     ",
    }
}

/// Color a phrase by link health: red when degraded, green otherwise
pub fn color_health(phrase: &str, health: LinkHealth) -> String {
    if health.is_degraded() {
        phrase.red().to_string()
    } else {
        phrase.green().to_string()
    }
}

/// Plain downstream phrase, e.g. `DownStream Up     (locked(32) not locked(0), uncorr(0))`
pub fn downstream_phrase(status: &DownstreamStatus) -> String {
    format!(
        "DownStream {}(locked({}) not locked({}), uncorr({}))",
        health_label(status.health),
        status.counts.locked,
        status.counts.unlocked,
        status.counts.uncorrectable_total
    )
}

/// Plain upstream phrase, e.g. `UpStream Partial(locked(3) not locked(1))`.
///
/// The healthy form is spelled `Upstream`, as the device tooling has always printed it.
pub fn upstream_phrase(status: &UpstreamStatus) -> String {
    let direction = match status.health {
        LinkHealth::Partial => "UpStream",
        LinkHealth::Up => "Upstream",
    };
    format!(
        "{} {}(locked({}) not locked({}))",
        direction,
        health_label(status.health),
        status.counts.locked,
        status.counts.unlocked
    )
}

/// Render the one-line summary printed after every poll cycle
pub fn render_status_line(report: &StatusReport) -> String {
    format!(
        "{}: {}, {}",
        report.device_name,
        color_health(&downstream_phrase(&report.downstream), report.downstream.health),
        color_health(&upstream_phrase(&report.upstream), report.upstream.health)
    )
}
