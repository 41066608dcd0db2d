//! Cold-Chain Telemetry Simulation
//!
//! Generates reefer-truck telemetry as JSON lines for Spoilage Shield.
//! Scenarios:
//! - `normal`: stable refrigeration, light road vibration
//! - `chaos`: cooling failure, rough road and a road closure mid-run
//!
//! # Usage
//! ```bash
//! ./simulation --scenario chaos --seed 7 | ./spoilage-shield --stdin
//! ```

use chrono::{DateTime, Duration, Utc};
use clap::{Parser, ValueEnum};
use rand::prelude::*;
use rand_distr::{Distribution, Normal};
use std::io::{self, Write};

use spoilage_shield::sensors::{FeedMessage, RoadUpdate};
use spoilage_shield::types::{RoadStatus, TelemetryReading};

// ============================================================================
// Reefer Constants
// ============================================================================

/// Setpoint temperature (°C)
const SETPOINT_C: f64 = 3.0;
/// Nominal relative humidity (%)
const BASE_HUMIDITY: f64 = 50.0;
/// Nominal road vibration (G)
const BASE_VIBRATION: f64 = 0.12;
/// Starting distance to the planned destination (km)
const START_DISTANCE_KM: f64 = 320.0;
/// Average truck speed (km/h)
const TRUCK_SPEED_KMH: f64 = 60.0;
/// Peak temperature after a full cooling failure (°C)
const FAILURE_PEAK_C: f64 = 38.0;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scenario {
    Normal,
    Chaos,
}

#[derive(Parser, Debug)]
#[command(name = "simulation")]
#[command(about = "Cold-chain telemetry simulation for Spoilage Shield testing")]
#[command(version = "1.0")]
struct Args {
    /// Scenario to simulate
    #[arg(long, value_enum, default_value = "normal")]
    scenario: Scenario,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Number of readings to generate
    #[arg(short, long, default_value = "60", value_parser = clap::value_parser!(u32).range(1..=100_000))]
    count: u32,

    /// Simulated seconds between readings
    #[arg(long, default_value = "600")]
    interval_secs: u32,

    /// Suppress mission log (only output telemetry)
    #[arg(short, long)]
    quiet: bool,
}

// ============================================================================
// Simulation Phases
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    /// Refrigeration holding setpoint
    Nominal,
    /// Compressor failed, cargo warming (chaos only, 40-70%)
    CoolingFailure,
    /// Warm cargo on a damaged road (chaos only, 70-100%)
    RoughRoad,
}

impl Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::Nominal => "Nominal (refrigeration holding)",
            Phase::CoolingFailure => "Cooling Failure (cargo warming)",
            Phase::RoughRoad => "Rough Road (detour, heavy vibration)",
        }
    }

    fn from_progress(scenario: Scenario, progress: f64) -> Self {
        match (scenario, progress) {
            (Scenario::Normal, _) => Phase::Nominal,
            (Scenario::Chaos, p) if p < 0.40 => Phase::Nominal,
            (Scenario::Chaos, p) if p < 0.70 => Phase::CoolingFailure,
            (Scenario::Chaos, _) => Phase::RoughRoad,
        }
    }
}

// ============================================================================
// Simulation State
// ============================================================================

struct SimulationState {
    rng: StdRng,
    scenario: Scenario,
    current_phase: Phase,
    step: u32,
    total_steps: u32,
    interval_secs: u32,
    start: DateTime<Utc>,

    temperature_c: f64,
    humidity_pct: f64,
    vibration_g: f64,
    distance_km: f64,

    temp_noise: Normal<f64>,
    humidity_noise: Normal<f64>,
    vibration_noise: Normal<f64>,
}

impl SimulationState {
    fn new(args: &Args) -> Result<Self, rand_distr::NormalError> {
        let rng = match args.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            rng,
            scenario: args.scenario,
            current_phase: Phase::Nominal,
            step: 0,
            total_steps: args.count,
            interval_secs: args.interval_secs,
            start: Utc::now(),
            temperature_c: SETPOINT_C,
            humidity_pct: BASE_HUMIDITY,
            vibration_g: BASE_VIBRATION,
            distance_km: START_DISTANCE_KM,
            temp_noise: Normal::new(0.0, 0.15)?,
            humidity_noise: Normal::new(0.0, 1.0)?,
            vibration_noise: Normal::new(0.0, 0.03)?,
        })
    }

    fn progress(&self) -> f64 {
        f64::from(self.step) / f64::from(self.total_steps)
    }

    fn elapsed_hours(&self) -> f64 {
        f64::from(self.step) * f64::from(self.interval_secs) / 3600.0
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.start + Duration::seconds(i64::from(self.step) * i64::from(self.interval_secs))
    }

    fn update_phase(&mut self) -> bool {
        let new_phase = Phase::from_progress(self.scenario, self.progress());
        if new_phase != self.current_phase {
            self.current_phase = new_phase;
            true
        } else {
            false
        }
    }

    /// Update sensor values based on current phase
    fn update_parameters(&mut self) {
        let t_noise = self.temp_noise.sample(&mut self.rng);
        let h_noise = self.humidity_noise.sample(&mut self.rng);
        let v_noise = self.vibration_noise.sample(&mut self.rng);

        match self.current_phase {
            Phase::Nominal => {
                self.temperature_c = SETPOINT_C + t_noise;
                self.humidity_pct = BASE_HUMIDITY + h_noise;
                self.vibration_g = BASE_VIBRATION + v_noise;
            }
            Phase::CoolingFailure => {
                // Warm toward the peak, first-order lag
                let warming = ((self.progress() - 0.40) / 0.30).clamp(0.0, 1.0);
                let target = SETPOINT_C + (FAILURE_PEAK_C - SETPOINT_C) * warming;
                self.temperature_c += (target - self.temperature_c) * 0.6 + t_noise;
                self.humidity_pct = BASE_HUMIDITY + 25.0 * warming + h_noise;
                self.vibration_g = BASE_VIBRATION + 0.1 * warming + v_noise;
            }
            Phase::RoughRoad => {
                self.temperature_c = FAILURE_PEAK_C + t_noise;
                self.humidity_pct = BASE_HUMIDITY + 28.0 + h_noise;
                self.vibration_g = 0.8 + v_noise * 3.0;
            }
        }

        self.temperature_c = self.temperature_c.clamp(-40.0, 80.0);
        self.humidity_pct = self.humidity_pct.clamp(0.0, 100.0);
        self.vibration_g = self.vibration_g.max(0.0);

        let km_per_step = TRUCK_SPEED_KMH * f64::from(self.interval_secs) / 3600.0;
        self.distance_km = (self.distance_km - km_per_step).max(0.0);
    }

    fn generate_reading(&mut self) -> TelemetryReading {
        self.update_parameters();
        let reading = TelemetryReading {
            temperature_c: self.temperature_c,
            humidity_pct: self.humidity_pct,
            vibration_g: self.vibration_g,
            distance_remaining_km: self.distance_km,
            timestamp: self.timestamp(),
        };
        self.step += 1;
        reading
    }
}

// ============================================================================
// Logging Utilities
// ============================================================================

fn format_time(hours: f64) -> String {
    let total_minutes = (hours * 60.0) as u32;
    format!("T+{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}

fn log_mission(hours: f64, message: &str, quiet: bool) {
    if !quiet {
        eprintln!("[{}] {}", format_time(hours), message);
    }
}

fn emit(out: &mut impl Write, message: &FeedMessage) -> Result<(), Box<dyn std::error::Error>> {
    writeln!(out, "{}", serde_json::to_string(message)?)?;
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let mut state = SimulationState::new(&args)?;

    log_mission(0.0, &"=".repeat(60), args.quiet);
    log_mission(0.0, "COLD-CHAIN TELEMETRY SIMULATION v1.0", args.quiet);
    log_mission(0.0, &"=".repeat(60), args.quiet);
    log_mission(0.0, &format!("  Scenario: {:?}", args.scenario), args.quiet);
    log_mission(0.0, &format!("  Readings: {} every {}s", args.count, args.interval_secs), args.quiet);
    log_mission(0.0, &format!("  Setpoint: {:.1}°C", SETPOINT_C), args.quiet);
    if let Some(seed) = args.seed {
        log_mission(0.0, &format!("  Random seed: {}", seed), args.quiet);
    }
    log_mission(0.0, &"=".repeat(60), args.quiet);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut road_closed = false;

    while state.step < state.total_steps {
        if state.update_phase() {
            let hours = state.elapsed_hours();
            log_mission(hours, &format!(">>> PHASE: {}", state.current_phase.name()), args.quiet);
            match state.current_phase {
                Phase::Nominal => {}
                Phase::CoolingFailure => {
                    emit(
                        &mut out,
                        &FeedMessage::Chaos {
                            chaos_event: "cooling_failure".to_string(),
                            timestamp: Some(state.timestamp()),
                        },
                    )?;
                }
                Phase::RoughRoad => {
                    emit(
                        &mut out,
                        &FeedMessage::Chaos {
                            chaos_event: "rough_road_detour".to_string(),
                            timestamp: Some(state.timestamp()),
                        },
                    )?;
                }
            }
        }

        // Planned route closes halfway through the rough-road phase
        if state.current_phase == Phase::RoughRoad && !road_closed && state.progress() >= 0.85 {
            log_mission(state.elapsed_hours(), "    Road to Premium_Supermarket closed", args.quiet);
            emit(
                &mut out,
                &FeedMessage::Road {
                    road_update: RoadUpdate {
                        name: "Premium_Supermarket".to_string(),
                        road_status: Some(RoadStatus::Blocked),
                        capacity_pct: None,
                        travel_time_hrs: None,
                    },
                },
            )?;
            road_closed = true;
        }

        let reading = state.generate_reading();
        emit(&mut out, &FeedMessage::Reading(reading))?;
        out.flush()?;
    }

    log_mission(state.elapsed_hours(), "SIMULATION COMPLETE", args.quiet);
    Ok(())
}
