//! DOCSIS Monitor - cable modem link health monitor
//!
//! Polls a cable modem's web interface, parses its DOCSIS status page and
//! prints a color-coded summary of the downstream and upstream channels
//! once per interval.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use monitor_lib::{
    output::render_status_line, HealthRegistry, HttpTransport, MonitorMetrics, PollLoopBuilder,
    SessionAuthenticator, StatusPageParser, StructuredLogger,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

const MONITOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// DOCSIS Monitor
#[derive(Parser, Debug)]
#[command(name = "docsis-monitor")]
#[command(
    version,
    about = "Continuous DOCSIS link health monitor for cable modems",
    long_about = None,
    disable_help_flag = true
)]
pub struct Cli {
    /// Host of the cable modem
    #[arg(short = 'h', long)]
    pub host: Option<String>,

    /// HTTP username
    #[arg(short = 'u', long)]
    pub username: Option<String>,

    /// HTTP password
    #[arg(short = 'p', long)]
    pub password: Option<String>,

    /// Path to a config file (TOML, YAML or JSON)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Seconds between poll cycles
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// Serve /healthz, /readyz and /metrics on this port
    #[arg(long)]
    pub metrics_port: Option<u16>,

    /// Poll once, print the status line and exit
    #[arg(long)]
    pub once: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries the status lines
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = config::MonitorConfig::load(&cli)?;
    let layout = config.layout()?;
    info!(host = %config.host, firmware = layout.name, "Monitor configured");

    let transport = HttpTransport::new(&config.host, layout.status_path, config.request_timeout())
        .context("Failed to set up modem transport")?;
    let credentials =
        monitor_lib::Credentials::new(config.username.clone(), config.password.clone());
    let authenticator = SessionAuthenticator::new(Arc::new(transport), credentials);
    let parser = StatusPageParser::new(layout, config.aggregation_policy());

    let logger = StructuredLogger::new(&config.host);
    let metrics = MonitorMetrics::new();
    let health = HealthRegistry::new();
    health.register_all().await;

    let (poll_loop, mut reports) = PollLoopBuilder::new()
        .authenticator(authenticator)
        .parser(parser)
        .interval(config.interval())
        .error_policy(config.on_error)
        .health(health.clone())
        .metrics(metrics.clone())
        .logger(logger.clone())
        .build()?;

    if cli.once {
        poll_loop.run_cycle().await?;
        if let Some(report) = reports.recv().await {
            println!("{}", render_status_line(&report));
        }
        return Ok(());
    }

    logger.log_startup(MONITOR_VERSION, layout.name, config.interval_secs);

    if let Some(port) = config.metrics_port {
        let state = Arc::new(api::AppState::new(health.clone(), metrics.clone()));
        tokio::spawn(api::serve(port, state));
    }

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let signal_logger = logger.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_logger.log_shutdown("SIGINT received");
            let _ = shutdown_tx.send(());
        }
    });

    let printer = tokio::spawn(async move {
        while let Some(report) = reports.recv().await {
            println!("{}", render_status_line(&report));
        }
    });

    let outcome = poll_loop.run(shutdown_rx).await;
    printer.await.context("Status printer task failed")?;
    outcome?;

    info!("Shutting down");
    Ok(())
}
