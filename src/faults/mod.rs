// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/rotorsim

//! Fault plan library - maps a fault selection onto harmonic, sideband and impact content

mod bearings;
mod gears;
mod library;

pub use bearings::*;
pub use gears::*;

use std::fmt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigurationError;
use crate::machine::{clamp_unit, MachineConfig};
use crate::sensors::{Axis, Sensor};

/// Base amplitude of a full-severity component: 1 g in m/s²
pub const BASE_AMPLITUDE: f64 = 9.81;

/// Supported fault modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    // Rotor / structure
    Unbalance,
    Misalignment,
    SoftFoot,
    Looseness,
    BentShaft,
    Eccentricity,

    // Rolling-element bearings
    BearingBpfo,
    BearingBpfi,
    BearingBsf,
    BearingFtf,

    // Gearing
    GearMesh,
    GearChipped,

    // Drive train / process
    Belt,
    Resonance,
    Cavitation,
}

impl FaultKind {
    pub const ALL: [FaultKind; 15] = [
        FaultKind::Unbalance,
        FaultKind::Misalignment,
        FaultKind::SoftFoot,
        FaultKind::Looseness,
        FaultKind::BentShaft,
        FaultKind::Eccentricity,
        FaultKind::BearingBpfo,
        FaultKind::BearingBpfi,
        FaultKind::BearingBsf,
        FaultKind::BearingFtf,
        FaultKind::GearMesh,
        FaultKind::GearChipped,
        FaultKind::Belt,
        FaultKind::Resonance,
        FaultKind::Cavitation,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            FaultKind::Unbalance => "unbalance",
            FaultKind::Misalignment => "misalignment",
            FaultKind::SoftFoot => "soft_foot",
            FaultKind::Looseness => "looseness",
            FaultKind::BentShaft => "bent_shaft",
            FaultKind::Eccentricity => "eccentricity",
            FaultKind::BearingBpfo => "bearing_bpfo",
            FaultKind::BearingBpfi => "bearing_bpfi",
            FaultKind::BearingBsf => "bearing_bsf",
            FaultKind::BearingFtf => "bearing_ftf",
            FaultKind::GearMesh => "gear_mesh",
            FaultKind::GearChipped => "gear_chipped",
            FaultKind::Belt => "belt",
            FaultKind::Resonance => "resonance",
            FaultKind::Cavitation => "cavitation",
        }
    }

    /// Look up a fault by id; unknown ids return None
    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.trim();
        Self::ALL.iter().copied().find(|k| k.id().eq_ignore_ascii_case(id))
    }

    pub fn needs_bearing(&self) -> bool {
        matches!(
            self,
            FaultKind::BearingBpfo | FaultKind::BearingBpfi | FaultKind::BearingBsf | FaultKind::BearingFtf
        )
    }

    pub fn needs_gear(&self) -> bool {
        matches!(self, FaultKind::GearMesh | FaultKind::GearChipped)
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Fault selection supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultConfig {
    /// Fault id; unknown ids synthesize a healthy machine
    pub fault_id: String,

    /// 0..1
    pub severity: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearing: Option<BearingGeometry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gear: Option<GearGeometry>,
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self {
            fault_id: FaultKind::Unbalance.id().to_string(),
            severity: 0.5,
            bearing: None,
            gear: None,
        }
    }
}

impl FaultConfig {
    pub fn new(kind: FaultKind, severity: f64) -> Self {
        Self {
            fault_id: kind.id().to_string(),
            severity,
            bearing: None,
            gear: None,
        }
    }

    pub fn with_bearing(mut self, bearing: BearingGeometry) -> Self {
        self.bearing = Some(bearing);
        self
    }

    pub fn with_gear(mut self, gear: GearGeometry) -> Self {
        self.gear = Some(gear);
        self
    }

    pub fn kind(&self) -> Option<FaultKind> {
        FaultKind::from_id(&self.fault_id)
    }

    pub fn clamped_severity(&self) -> f64 {
        clamp_unit(self.severity)
    }
}

/// Sinusoid at a multiple of shaft speed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Harmonic {
    /// Multiple of shaft frequency
    pub order: f64,
    pub amplitude: f64,
    /// Radians
    pub phase: f64,
    /// Only sensors measuring this axis see the component
    pub axis: Option<Axis>,
    /// Draw a random phase per sensor each run
    pub random_phase: bool,
}

impl Harmonic {
    pub fn new(order: f64, amplitude: f64) -> Self {
        Self {
            order,
            amplitude,
            phase: 0.0,
            axis: None,
            random_phase: false,
        }
    }

    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }

    pub fn on_axis(mut self, axis: Axis) -> Self {
        self.axis = Some(axis);
        self
    }

    pub fn with_random_phase(mut self) -> Self {
        self.random_phase = true;
        self
    }

    pub fn applies_to(&self, axis: Axis) -> bool {
        self.axis.map_or(true, |a| a == axis)
    }
}

/// Family of sidebands around `center_order` spaced by `spacing_order`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sideband {
    pub center_order: f64,
    pub spacing_order: f64,
    /// Pairs on each side
    pub count: u32,
    pub amplitude: f64,
}

/// Repetitive impact exciting a structural resonance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Impact {
    /// Repetition rate, Hz
    pub frequency: f64,
    pub amplitude: f64,
    /// Carrier phase jitter, 0..1
    pub randomness: f64,
    /// Resonance bandwidth in Hz; sets the envelope decay
    pub bandwidth: f64,
    /// Ringing frequency of the excited resonance, Hz
    pub carrier: f64,
}

/// Named frequency for spectrum overlays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyMarker {
    pub label: String,
    /// Hz at nominal speed
    pub frequency: f64,
}

impl FrequencyMarker {
    pub fn new(label: &str, frequency: f64) -> Self {
        Self {
            label: label.to_string(),
            frequency,
        }
    }
}

/// How the 3D view should animate the rotor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionMode {
    Steady,
    Orbit,
    Axial,
    Rocking,
    Rattle,
    Whirl,
    Pulsing,
    Impacting,
    Torsional,
    Flutter,
    Swaying,
    Chaotic,
}

/// Visualization hint carried through to the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualCue {
    pub mode: MotionMode,
    pub description: String,
    /// Hex RGB
    pub color: String,
}

impl VisualCue {
    pub fn new(mode: MotionMode, description: &str, color: &str) -> Self {
        Self {
            mode,
            description: description.to_string(),
            color: color.to_string(),
        }
    }
}

/// Everything the synthesizer needs to render one fault. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultPlan {
    /// None for the healthy fallback
    pub kind: Option<FaultKind>,
    pub harmonics: Vec<Harmonic>,
    pub sidebands: Vec<Sideband>,
    pub impacts: Vec<Impact>,
    /// Extra broadband noise RMS, m/s²
    pub broadband_rms: f64,
    pub axial_bias: Option<f64>,
    pub modulation_depth: Option<f64>,
    pub markers: Vec<FrequencyMarker>,
    pub cue: VisualCue,
}

impl FaultPlan {
    /// Minimal plan: a 1× line at 10% of the base amplitude and nothing else
    pub fn healthy() -> Self {
        Self {
            kind: None,
            harmonics: vec![Harmonic::new(1.0, 0.1 * BASE_AMPLITUDE)],
            sidebands: Vec::new(),
            impacts: Vec::new(),
            broadband_rms: 0.0,
            axial_bias: None,
            modulation_depth: None,
            markers: Vec::new(),
            cue: VisualCue::new(MotionMode::Steady, "Machine running smoothly", "#8ecae6"),
        }
    }
}

/// Build the fault plan for a run.
///
/// Pure and deterministic. Bearing and gear faults fail fast without their geometry;
/// unknown fault ids fall back to [`FaultPlan::healthy`].
pub fn build_fault_plan(
    machine: &MachineConfig,
    fault: &FaultConfig,
    sensors: &[Sensor],
) -> Result<FaultPlan, ConfigurationError> {
    let Some(kind) = fault.kind() else {
        debug!("Unknown fault id '{}', using healthy plan", fault.fault_id);
        return Ok(FaultPlan::healthy());
    };

    let fr = machine.shaft_hz();
    let bearing = match (kind.needs_bearing(), fault.bearing) {
        (true, None) => return Err(ConfigurationError::MissingBearingGeometry(kind)),
        (_, geometry) => geometry.map(|g| g.frequencies(fr)),
    };
    let gear = match (kind.needs_gear(), fault.gear) {
        (true, None) => return Err(ConfigurationError::MissingGearGeometry(kind)),
        (_, geometry) => geometry.map(|g| g.frequencies(fr)),
    };

    let ctx = library::RecipeContext {
        fr,
        severity: fault.clamped_severity(),
        load: machine.clamped_load(),
        bearing,
        gear,
    };

    let mut plan = library::recipe(kind, &ctx);

    // Axis-restricted content nobody can measure is dropped
    plan.harmonics.retain(|h| h.axis.map_or(true, |axis| sensors.iter().any(|s| s.axis == axis)));

    debug!(
        "Built {} plan: {} harmonics, {} sideband families, {} impact trains",
        kind,
        plan.harmonics.len(),
        plan.sidebands.len(),
        plan.impacts.len()
    );

    Ok(plan)
}
