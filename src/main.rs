// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/rotorsim

//! RotorSim - Rotating-Machinery Vibration Synthesis & Spectral Analysis
//!
//! Runs one scenario (machine, sensors, fault) through the synthesis and spectral
//! stages and prints a summary or the full result as JSON.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use std::path::PathBuf;

use rotorsim::faults::{BearingGeometry, GearGeometry};
use rotorsim::{Config, FaultKind, Orchestrator, SimulationResult, NAME, VERSION};

/// Deep-groove ball bearing used when a bearing fault is selected without geometry
const DEFAULT_BEARING: (u32, f64, f64, f64) = (9, 39.04, 7.94, 0.0);

/// Gear pair used when a gear fault is selected without geometry
const DEFAULT_GEAR: (u32, u32) = (23, 57);

/// RotorSim - Rotating-Machinery Vibration Synthesis & Spectral Analysis
#[derive(Parser, Debug)]
#[command(name = "rotorsim")]
#[command(author = "RotorSim Project")]
#[command(version = VERSION)]
#[command(about = "Synthesize machine vibration for a fault and analyze its spectrum")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fault id (see --list-faults)
    #[arg(short, long)]
    fault: Option<String>,

    /// Fault severity, 0..1
    #[arg(short, long)]
    severity: Option<f64>,

    /// Shaft speed
    #[arg(long)]
    rpm: Option<f64>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Run both stages on the calling runtime instead of worker threads
    #[arg(long)]
    inline: bool,

    /// List fault ids and exit
    #[arg(long)]
    list_faults: bool,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace-level logging
    #[arg(long)]
    trace: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.list_faults {
        list_faults();
        return Ok(());
    }

    // Load or create configuration
    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_create(&config_path)?;

    // Initialize logging
    let log_level = if args.trace {
        Level::TRACE
    } else if args.debug {
        Level::DEBUG
    } else {
        config.log_level.parse().unwrap_or(Level::INFO)
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(args.debug)
        .with_line_number(args.debug)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("{} v{}", NAME, VERSION);
    info!("Configuration loaded from {:?}", config_path);

    apply_overrides(&mut config, &args);

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(run_scenario(config))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(result.as_ref())?);
    } else {
        print_summary(&result);
    }

    Ok(())
}

/// Override the configured scenario with command line args
fn apply_overrides(config: &mut Config, args: &Args) {
    let scenario = &mut config.scenario;

    if let Some(fault) = &args.fault {
        scenario.fault.fault_id = fault.clone();
    }
    if let Some(severity) = args.severity {
        scenario.fault.severity = severity;
    }
    if let Some(rpm) = args.rpm {
        scenario.machine.rpm = rpm;
    }
    if let Some(seed) = args.seed {
        scenario.synthesis.seed = seed;
    }
    if args.inline {
        config.engine.offload = false;
    }

    if let Some(kind) = config.scenario.fault.kind() {
        let fault = &mut config.scenario.fault;
        if kind.needs_bearing() && fault.bearing.is_none() {
            let (n, pitch, roller, angle) = DEFAULT_BEARING;
            info!("No bearing geometry configured, using {} rollers", n);
            fault.bearing = Some(BearingGeometry::new(n, pitch, roller, angle));
        }
        if kind.needs_gear() && fault.gear.is_none() {
            let (pinion, gear) = DEFAULT_GEAR;
            info!("No gear geometry configured, using {}:{} teeth", pinion, gear);
            fault.gear = Some(GearGeometry::new(pinion, gear));
        }
    }
}

async fn run_scenario(config: Config) -> Result<std::sync::Arc<SimulationResult>> {
    let orchestrator = Orchestrator::from_config(&config.engine);
    let result = orchestrator.run(config.scenario.payload()).await?;

    let status = orchestrator.status();
    info!(
        "Pipeline {:?} on {} runner ({} submitted, {} discarded)",
        status.state, status.runner, status.submitted, status.discarded
    );

    Ok(result)
}

fn list_faults() {
    for kind in FaultKind::ALL {
        let needs = if kind.needs_bearing() {
            " (bearing geometry)"
        } else if kind.needs_gear() {
            " (gear geometry)"
        } else {
            ""
        };
        println!("{}{}", kind.id(), needs);
    }
}

fn print_summary(result: &SimulationResult) {
    let fault = result.fault.map(|k| k.id()).unwrap_or("healthy");
    println!("Fault: {}  ({})", fault, result.cue().description);
    println!(
        "Samples: {} per sensor at {} Hz, shaft {:.2} Hz",
        result.len(),
        result.sample_rate,
        result.shaft_hz
    );

    println!();
    println!("{:<12} {:>10} {:>10} {:>10} {:>8} {:>18}", "sensor", "rms", "peak", "p-p", "crest", "dominant line");
    for id in &result.sensor_ids {
        let Some(stats) = result.stats.get(id) else {
            continue;
        };
        let dominant = result.spectrum
            .as_ref()
            .and_then(|s| s.peak(id))
            .map(|(f, m)| format!("{:.4} @ {:.1} Hz", m, f))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<12} {:>10.4} {:>10.4} {:>10.4} {:>8.2} {:>18}",
            id, stats.rms, stats.peak, stats.peak_to_peak, stats.crest_factor, dominant
        );
    }

    if !result.markers.is_empty() {
        println!();
        println!("Markers:");
        for marker in &result.markers {
            println!("  {:<24} {:>10.2} Hz", marker.label, marker.frequency);
        }
    }

    let motion = &result.motion;
    println!();
    println!(
        "Motion: {:?} orbit {:.3} x {:.3}, axial {:.3}, torsional {:.3}, lag {:.2} rad",
        motion.cue.mode, motion.orbit_major, motion.orbit_minor, motion.axial, motion.torsional, motion.phase_lag
    );
}
