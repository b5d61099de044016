//! Monitor configuration
//!
//! Sources, in increasing precedence: an optional config file, `CM_MONITOR_*`
//! environment variables, command-line flags.

use crate::Cli;
use anyhow::{bail, Context, Result};
use monitor_lib::{
    AggregationPolicy, ErrorPolicy, FirmwareLayout, UnknownLockState, WindowBoundary,
};
use serde::Deserialize;
use std::time::Duration;

const ENV_PREFIX: &str = "CM_MONITOR";

/// Monitor configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Modem host (`192.168.100.1`, `modem:8080` or a full URL)
    #[serde(default)]
    pub host: String,

    /// HTTP Basic username
    #[serde(default)]
    pub username: String,

    /// HTTP Basic password
    #[serde(default)]
    pub password: String,

    /// Delay between poll cycles in seconds
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Firmware page layout name
    #[serde(default = "default_firmware")]
    pub firmware: String,

    #[serde(default)]
    pub on_error: ErrorPolicy,

    #[serde(default)]
    pub window_boundary: WindowBoundary,

    #[serde(default)]
    pub unknown_lock_state: UnknownLockState,

    /// Port for the health/metrics endpoint; disabled when unset
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_interval() -> u64 {
    2
}

fn default_request_timeout() -> u64 {
    10
}

fn default_firmware() -> String {
    "cm1200".to_string()
}

impl MonitorConfig {
    /// Load configuration from file, environment and command line
    pub fn load(cli: &Cli) -> Result<Self> {
        Self::load_with_env(cli, None)
    }

    /// Load with an explicit set of environment variables in place of the
    /// process environment when `env` is given
    fn load_with_env(cli: &Cli, env: Option<config::Map<String, String>>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = &cli.config {
            builder = builder.add_source(config::File::from(path.as_path()));
        }

        let config = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).source(env))
            .set_override_option("host", cli.host.clone())?
            .set_override_option("username", cli.username.clone())?
            .set_override_option("password", cli.password.clone())?
            .set_override_option("interval_secs", cli.interval_secs.map(|v| v as i64))?
            .set_override_option("metrics_port", cli.metrics_port.map(i64::from))?
            .build()
            .context("Failed to read configuration")?;

        let config: MonitorConfig = config
            .try_deserialize()
            .context("Invalid configuration")?;
        config.validate()?;

        Ok(config)
    }

    /// Reject configurations the monitor cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            bail!("host is required (-h/--host or {}_HOST)", ENV_PREFIX);
        }
        if self.username.is_empty() {
            bail!("username is required (-u/--username or {}_USERNAME)", ENV_PREFIX);
        }
        if self.password.is_empty() {
            bail!("password is required (-p/--password or {}_PASSWORD)", ENV_PREFIX);
        }
        if self.interval_secs == 0 {
            bail!("interval_secs must be at least 1");
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be at least 1");
        }
        self.layout()?;
        Ok(())
    }

    pub fn layout(&self) -> Result<&'static FirmwareLayout> {
        FirmwareLayout::lookup(&self.firmware).with_context(|| {
            format!(
                "Unknown firmware layout {:?} (known: {})",
                self.firmware,
                FirmwareLayout::known_names().join(", ")
            )
        })
    }

    pub fn aggregation_policy(&self) -> AggregationPolicy {
        AggregationPolicy {
            boundary: self.window_boundary,
            unknown_lock_state: self.unknown_lock_state,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
