//! Spoilage Shield - cold-chain decision runner
//!
//! Reads cargo telemetry, keeps the rolling history and prints one JSON
//! `DecisionRecord` per reading on stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Run the built-in cooling-failure demo
//! cargo run --release
//!
//! # Replay a CSV file
//! ./spoilage-shield --csv data/run_042.csv
//!
//! # Stream from the simulator
//! ./simulation --scenario chaos --seed 7 | ./spoilage-shield --stdin
//! ```
//!
//! # Environment Variables
//!
//! - `SHIELD_CONFIG`: Path to shield_config.toml (default: ./shield_config.toml, then built-ins)
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::AsyncBufReadExt;
use tracing::{error, info, warn};

use spoilage_shield::config::ShieldConfig;
use spoilage_shield::pipeline::{DecisionEngine, ShipmentContext};
use spoilage_shield::sensors::{self, FeedMessage};
use spoilage_shield::types::{Destination, TelemetryHistory, TelemetryReading};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "spoilage-shield")]
#[command(about = "Cold-chain decision engine for perishable cargo")]
#[command(version)]
struct CliArgs {
    /// Path to a shield_config.toml (fails hard on errors)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay telemetry from a CSV file
    #[arg(long, conflicts_with = "stdin")]
    csv: Option<String>,

    /// Read JSON-lines telemetry from stdin
    /// Use with simulator: ./simulation | ./spoilage-shield --stdin
    #[arg(long)]
    stdin: bool,

    /// Readings scored for trust and liability (default: trust.window from config)
    #[arg(long)]
    window: Option<usize>,

    /// Pretty-print decision records
    #[arg(long)]
    pretty: bool,

    /// Emit logs as JSON
    #[arg(long, env = "SHIELD_JSON_LOGS")]
    json_logs: bool,
}

// ============================================================================
// Runner
// ============================================================================

/// Owns the mutable state around the stateless engine.
struct Runner {
    engine: DecisionEngine,
    history: TelemetryHistory,
    destinations: Vec<Destination>,
    cargo_value: f64,
    window: usize,
    pretty: bool,
    decisions: u64,
    rejected: u64,
}

impl Runner {
    fn new(config: &ShieldConfig, window: Option<usize>, pretty: bool) -> Result<Self> {
        let engine = DecisionEngine::from_config(config).context("Invalid market catalog")?;
        Ok(Self {
            engine,
            history: TelemetryHistory::new(config.history.capacity),
            destinations: config.reroute.destinations.clone(),
            cargo_value: config.shipment.cargo_value,
            window: window.unwrap_or(config.trust.window),
            pretty,
            decisions: 0,
            rejected: 0,
        })
    }

    fn handle(&mut self, message: FeedMessage) -> Result<()> {
        match message {
            FeedMessage::Chaos {
                chaos_event,
                timestamp,
            } => {
                let at = timestamp
                    .or_else(|| self.history.latest().map(|r| r.timestamp))
                    .unwrap_or_else(Utc::now);
                warn!(event = %chaos_event, "Chaos event recorded");
                self.history.record_chaos_event(at, chaos_event);
                Ok(())
            }
            FeedMessage::Road { road_update } => {
                if road_update.apply(&mut self.destinations) {
                    info!(
                        destination = %road_update.name,
                        road_status = ?road_update.road_status,
                        capacity_pct = ?road_update.capacity_pct,
                        "Destination updated"
                    );
                } else {
                    warn!(destination = %road_update.name, "Road update for unknown destination ignored");
                }
                Ok(())
            }
            FeedMessage::Reading(reading) => self.decide(reading),
        }
    }

    fn decide(&mut self, reading: TelemetryReading) -> Result<()> {
        if let Err(e) = reading.validate() {
            warn!(error = %e, "Rejected telemetry reading");
            self.rejected += 1;
            return Ok(());
        }

        self.history.push(reading.clone());
        let snapshot = self.history.snapshot(self.window);
        let ctx = ShipmentContext {
            history: &snapshot,
            destinations: &self.destinations,
            cargo_value: self.cargo_value,
        };

        let record = match self.engine.decide(&reading, &ctx) {
            Ok(record) => record,
            Err(e) => {
                error!(error = %e, "Decision cycle failed");
                self.rejected += 1;
                return Ok(());
            }
        };

        let json = if self.pretty {
            serde_json::to_string_pretty(&record)?
        } else {
            serde_json::to_string(&record)?
        };
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        writeln!(out, "{}", json)?;
        out.flush()?;

        self.decisions += 1;
        Ok(())
    }
}

// ============================================================================
// Input modes
// ============================================================================

async fn run_stdin(runner: &mut Runner) -> Result<()> {
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, stopping");
                break;
            }
        };
        let Some(line) = line else {
            break;
        };

        match sensors::parse_feed_line(&line) {
            Ok(Some(message)) => runner.handle(message)?,
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Skipping malformed feed line"),
        }
    }
    Ok(())
}

fn run_csv(runner: &mut Runner, path: &str) -> Result<()> {
    let readings = sensors::read_csv_data(path);
    if readings.is_empty() {
        anyhow::bail!("No valid telemetry in {}", path);
    }
    for reading in readings {
        runner.decide(reading)?;
    }
    Ok(())
}

fn run_demo(runner: &mut Runner) -> Result<()> {
    for message in sensors::demo_scenario() {
        runner.handle(message)?;
    }
    Ok(())
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.json_logs);

    let config = match &args.config {
        Some(path) => ShieldConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ShieldConfig::load(),
    };

    info!(
        shipment = %config.shipment.name,
        commodity = %config.shipment.commodity,
        cargo_value = config.shipment.cargo_value,
        currency = %config.shipment.currency,
        destinations = config.reroute.destinations.len(),
        markets = config.pivot.markets.len(),
        "Spoilage Shield starting"
    );

    let mut runner = Runner::new(&config, args.window, args.pretty)?;

    if args.stdin {
        info!("Input: stdin (JSON-lines telemetry)");
        run_stdin(&mut runner).await?;
    } else if let Some(path) = &args.csv {
        info!(path = %path, "Input: CSV replay");
        run_csv(&mut runner, path)?;
    } else {
        info!("Input: built-in cooling-failure demo");
        run_demo(&mut runner)?;
    }

    info!(
        shipment = %runner.engine.shipment(),
        decisions = runner.decisions,
        rejected = runner.rejected,
        readings_in_history = runner.history.len(),
        history_capacity = runner.history.capacity(),
        "Spoilage Shield shutdown complete"
    );
    Ok(())
}
