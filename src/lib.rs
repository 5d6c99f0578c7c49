// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/rotorsim

//! RotorSim - Rotating-Machinery Vibration Synthesis & Spectral Analysis
//!
//! Turns a machine description, up to four virtual accelerometers and a fault
//! selection into:
//! - reproducible time-domain vibration traces per sensor (seeded)
//! - a compact motion descriptor for a 3D rotor view
//! - averaged, windowed spectra with envelope and order-tracking options
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Orchestrator                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌─────────┐  ┌───────────┐  ┌──────────┐  ┌─────────────┐   │
//! │  │ Faults  │→ │ Sensors   │→ │ Envelope │→ │   Motion    │   │
//! │  │ Library │  │ Simulator │  │          │  │  Estimator  │   │
//! │  └─────────┘  └───────────┘  └──────────┘  └─────────────┘   │
//! │        synthesis stage ──────────────────────────┐           │
//! │                                                  ↓           │
//! │                                   ┌──────────────────────┐   │
//! │        spectral stage             │  Spectral Analyzer   │   │
//! │                                   └──────────────────────┘   │
//! │       ↓                    ↓                   ↓             │
//! │  ┌───────────────────────────────────────────────────────┐   │
//! │  │          Job runners (offloaded / inline)             │   │
//! │  └───────────────────────────────────────────────────────┘   │
//! │  ┌───────────────────────────────────────────────────────┐   │
//! │  │                      Event Bus                        │   │
//! │  └───────────────────────────────────────────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod units;
pub mod error;
pub mod machine;
pub mod faults;
pub mod sensors;
pub mod analysis;
pub mod core;
pub mod config;

// Re-exports for convenience
pub use config::{Config, Scenario};
pub use core::{
    run_spectral_analysis, run_synthesis, Orchestrator, PipelineState, SimulationResult,
    SpectralPayload, SynthesisPayload,
};
pub use error::{ConfigurationError, EngineError, EngineResult};
pub use faults::{build_fault_plan, FaultConfig, FaultKind, FaultPlan};
pub use machine::{AnalysisSettings, MachineConfig, RampConfig, SynthesisParams};
pub use sensors::{Axis, MountLocation, Sensor};
pub use analysis::{SpectrumResult, WindowKind};
pub use units::DisplayUnits;

/// RotorSim version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// RotorSim name
pub const NAME: &str = "RotorSim";
