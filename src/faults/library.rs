// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/rotorsim

//! Hand-authored recipes, one per fault kind

use std::f64::consts::PI;

use super::{
    BearingFrequencies, FaultKind, FaultPlan, FrequencyMarker, GearFrequencies, Harmonic, Impact,
    MotionMode, Sideband, VisualCue, BASE_AMPLITUDE,
};
use crate::sensors::Axis;

/// Resonance excited by rolling-element impacts, Hz
const BEARING_RESONANCE_HZ: f64 = 3000.0;

/// Belt pass as a fraction of shaft speed
const BELT_ORDER: f64 = 0.38;

/// Structural mode sitting just above running speed, in orders
const STRUCTURAL_MODE_ORDER: f64 = 3.3;

/// Impeller vane count used for pump faults
const PUMP_VANES: f64 = 6.0;

/// Inputs shared by every recipe
pub(super) struct RecipeContext {
    /// Shaft frequency, Hz
    pub fr: f64,
    /// Clamped 0..1
    pub severity: f64,
    /// Clamped 0..1
    pub load: f64,
    pub bearing: Option<BearingFrequencies>,
    pub gear: Option<GearFrequencies>,
}

impl RecipeContext {
    /// Severity-scaled amplitude; severity 0 still leaves a 10% line
    fn amp(&self) -> f64 {
        BASE_AMPLITUDE * (0.1 + 0.9 * self.severity)
    }

    fn order(&self, freq: f64) -> f64 {
        if self.fr > 0.0 {
            freq / self.fr
        } else {
            0.0
        }
    }

    fn marker(&self, label: &str, order: f64) -> FrequencyMarker {
        FrequencyMarker::new(label, order * self.fr)
    }

    fn bearing(&self) -> BearingFrequencies {
        // Geometry presence is checked before any recipe runs
        self.bearing.unwrap_or(BearingFrequencies {
            shaft: self.fr,
            bpfo: 0.0,
            bpfi: 0.0,
            bsf: 0.0,
            ftf: 0.0,
        })
    }

    fn gear(&self) -> GearFrequencies {
        self.gear.unwrap_or(GearFrequencies {
            input_shaft: self.fr,
            output_shaft: self.fr,
            mesh: 0.0,
            hunting_tooth: 0.0,
        })
    }
}

pub(super) fn recipe(kind: FaultKind, ctx: &RecipeContext) -> FaultPlan {
    match kind {
        FaultKind::Unbalance => unbalance(ctx),
        FaultKind::Misalignment => misalignment(ctx),
        FaultKind::SoftFoot => soft_foot(ctx),
        FaultKind::Looseness => looseness(ctx),
        FaultKind::BentShaft => bent_shaft(ctx),
        FaultKind::Eccentricity => eccentricity(ctx),
        FaultKind::BearingBpfo => bearing_outer_race(ctx),
        FaultKind::BearingBpfi => bearing_inner_race(ctx),
        FaultKind::BearingBsf => bearing_ball_spin(ctx),
        FaultKind::BearingFtf => bearing_cage(ctx),
        FaultKind::GearMesh => gear_mesh(ctx),
        FaultKind::GearChipped => gear_chipped(ctx),
        FaultKind::Belt => belt(ctx),
        FaultKind::Resonance => resonance(ctx),
        FaultKind::Cavitation => cavitation(ctx),
    }
}

fn plan(kind: FaultKind, cue: VisualCue) -> FaultPlan {
    FaultPlan {
        kind: Some(kind),
        harmonics: Vec::new(),
        sidebands: Vec::new(),
        impacts: Vec::new(),
        broadband_rms: 0.0,
        axial_bias: None,
        modulation_depth: None,
        markers: Vec::new(),
        cue,
    }
}

fn unbalance(ctx: &RecipeContext) -> FaultPlan {
    let a = ctx.amp();
    FaultPlan {
        harmonics: vec![
            Harmonic::new(1.0, a),
            Harmonic::new(2.0, 0.08 * a),
            Harmonic::new(3.0, 0.03 * a),
        ],
        broadband_rms: 0.02 * a,
        axial_bias: Some(0.1),
        markers: vec![ctx.marker("1×", 1.0)],
        ..plan(
            FaultKind::Unbalance,
            VisualCue::new(MotionMode::Orbit, "Heavy spot drives a circular 1× orbit", "#e4572e"),
        )
    }
}

fn misalignment(ctx: &RecipeContext) -> FaultPlan {
    let a = ctx.amp();
    FaultPlan {
        harmonics: vec![
            Harmonic::new(1.0, 0.6 * a),
            Harmonic::new(2.0, (0.6 + 0.4 * ctx.load) * a),
            Harmonic::new(3.0, 0.25 * a),
            Harmonic::new(1.0, 0.7 * a).with_phase(PI).on_axis(Axis::Z),
            Harmonic::new(2.0, 0.4 * a).with_phase(PI).on_axis(Axis::Z),
        ],
        broadband_rms: 0.03 * a,
        axial_bias: Some(0.9),
        markers: vec![ctx.marker("1×", 1.0), ctx.marker("2×", 2.0), ctx.marker("3×", 3.0)],
        ..plan(
            FaultKind::Misalignment,
            VisualCue::new(
                MotionMode::Axial,
                "Coupling misalignment pushes the shaft axially at 1× and 2×",
                "#f3a712",
            ),
        )
    }
}

fn soft_foot(ctx: &RecipeContext) -> FaultPlan {
    let a = ctx.amp();
    FaultPlan {
        harmonics: vec![
            Harmonic::new(1.0, 0.7 * a),
            Harmonic::new(2.0, 0.3 * (0.5 + ctx.load) * a),
            Harmonic::new(1.0, 0.5 * a).with_phase(PI / 2.0).on_axis(Axis::Y),
        ],
        broadband_rms: 0.02 * a,
        axial_bias: Some(0.15),
        modulation_depth: Some(0.15),
        markers: vec![ctx.marker("1×", 1.0), ctx.marker("2×", 2.0)],
        ..plan(
            FaultKind::SoftFoot,
            VisualCue::new(MotionMode::Rocking, "Uneven foot support rocks the frame at 1×", "#a8c686"),
        )
    }
}

fn looseness(ctx: &RecipeContext) -> FaultPlan {
    let a = ctx.amp();
    let mut harmonics: Vec<Harmonic> = (1..=8)
        .map(|k| {
            let h = Harmonic::new(k as f64, 0.5 * a / (k as f64).sqrt());
            if k > 1 { h.with_random_phase() } else { h }
        })
        .collect();
    harmonics.extend(
        [0.5, 1.5, 2.5, 3.5]
            .iter()
            .map(|&order| Harmonic::new(order, 0.2 * a).with_random_phase()),
    );

    FaultPlan {
        harmonics,
        broadband_rms: 0.08 * a,
        axial_bias: Some(0.25),
        modulation_depth: Some(0.2),
        markers: vec![
            ctx.marker("0.5×", 0.5),
            ctx.marker("1×", 1.0),
            ctx.marker("2×", 2.0),
            ctx.marker("3×", 3.0),
        ],
        ..plan(
            FaultKind::Looseness,
            VisualCue::new(
                MotionMode::Rattle,
                "Mechanical looseness rattles out a comb of harmonics and half-orders",
                "#9b5de5",
            ),
        )
    }
}

fn bent_shaft(ctx: &RecipeContext) -> FaultPlan {
    let a = ctx.amp();
    FaultPlan {
        harmonics: vec![
            Harmonic::new(1.0, 0.8 * a),
            Harmonic::new(2.0, 0.5 * a),
            Harmonic::new(1.0, 0.9 * a).with_phase(PI).on_axis(Axis::Z),
            Harmonic::new(2.0, 0.3 * a).with_phase(PI).on_axis(Axis::Z),
        ],
        broadband_rms: 0.02 * a,
        axial_bias: Some(0.9),
        markers: vec![ctx.marker("1×", 1.0), ctx.marker("2×", 2.0)],
        ..plan(
            FaultKind::BentShaft,
            VisualCue::new(
                MotionMode::Whirl,
                "Bowed shaft wobbles the rotor with strong anti-phase axial 1×",
                "#f15bb5",
            ),
        )
    }
}

fn eccentricity(ctx: &RecipeContext) -> FaultPlan {
    let a = ctx.amp();
    FaultPlan {
        harmonics: vec![Harmonic::new(1.0, 0.9 * a), Harmonic::new(2.0, 0.15 * a)],
        sidebands: vec![Sideband {
            center_order: 4.0,
            spacing_order: 1.0,
            count: 2,
            amplitude: 0.1 * a,
        }],
        broadband_rms: 0.02 * a,
        modulation_depth: Some(0.3),
        markers: vec![ctx.marker("1×", 1.0), ctx.marker("4×", 4.0)],
        ..plan(
            FaultKind::Eccentricity,
            VisualCue::new(
                MotionMode::Pulsing,
                "Eccentric rotor modulates every rotating frequency once per turn",
                "#00bbf9",
            ),
        )
    }
}

fn bearing_impact(frequency: f64, amplitude: f64, randomness: f64) -> Impact {
    Impact {
        frequency,
        amplitude,
        randomness,
        bandwidth: 400.0,
        carrier: BEARING_RESONANCE_HZ,
    }
}

fn bearing_outer_race(ctx: &RecipeContext) -> FaultPlan {
    let a = ctx.amp();
    let b = ctx.bearing();
    let o = ctx.order(b.bpfo);
    FaultPlan {
        harmonics: vec![
            Harmonic::new(1.0, 0.15 * a),
            Harmonic::new(o, 0.25 * a),
            Harmonic::new(2.0 * o, 0.12 * a),
            Harmonic::new(3.0 * o, 0.06 * a),
        ],
        impacts: vec![bearing_impact(b.bpfo, 1.2 * a, 0.05)],
        broadband_rms: 0.05 * a,
        markers: vec![
            ctx.marker("1×", 1.0),
            ctx.marker("BPFO", o),
            ctx.marker("2×BPFO", 2.0 * o),
            ctx.marker("3×BPFO", 3.0 * o),
        ],
        ..plan(
            FaultKind::BearingBpfo,
            VisualCue::new(MotionMode::Impacting, "Outer-race spall struck by every passing roller", "#ff6b6b"),
        )
    }
}

fn bearing_inner_race(ctx: &RecipeContext) -> FaultPlan {
    let a = ctx.amp();
    let b = ctx.bearing();
    let o = ctx.order(b.bpfi);
    FaultPlan {
        harmonics: vec![
            Harmonic::new(1.0, 0.2 * a),
            Harmonic::new(o, 0.2 * a),
            Harmonic::new(2.0 * o, 0.1 * a),
        ],
        // Defect rotates with the shaft, so it is amplitude modulated at 1×
        sidebands: vec![Sideband {
            center_order: o,
            spacing_order: 1.0,
            count: 2,
            amplitude: 0.1 * a,
        }],
        impacts: vec![bearing_impact(b.bpfi, 1.1 * a, 0.08)],
        broadband_rms: 0.05 * a,
        modulation_depth: Some(0.1),
        markers: vec![
            ctx.marker("1×", 1.0),
            ctx.marker("BPFI-1×", o - 1.0),
            ctx.marker("BPFI", o),
            ctx.marker("BPFI+1×", o + 1.0),
            ctx.marker("2×BPFI", 2.0 * o),
        ],
        ..plan(
            FaultKind::BearingBpfi,
            VisualCue::new(
                MotionMode::Impacting,
                "Inner-race defect rotates in and out of the load zone",
                "#ff8c42",
            ),
        )
    }
}

fn bearing_ball_spin(ctx: &RecipeContext) -> FaultPlan {
    let a = ctx.amp();
    let b = ctx.bearing();
    let o_bsf = ctx.order(b.bsf);
    let o_ftf = ctx.order(b.ftf);
    FaultPlan {
        harmonics: vec![
            Harmonic::new(1.0, 0.15 * a),
            Harmonic::new(2.0 * o_bsf, 0.18 * a),
            Harmonic::new(o_bsf, 0.08 * a),
        ],
        // The damaged element orbits with the cage
        sidebands: vec![Sideband {
            center_order: 2.0 * o_bsf,
            spacing_order: o_ftf,
            count: 2,
            amplitude: 0.08 * a,
        }],
        impacts: vec![bearing_impact(2.0 * b.bsf, 0.9 * a, 0.12)],
        broadband_rms: 0.05 * a,
        modulation_depth: Some(0.1),
        markers: vec![
            ctx.marker("1×", 1.0),
            ctx.marker("FTF", o_ftf),
            ctx.marker("BSF", o_bsf),
            ctx.marker("2×BSF", 2.0 * o_bsf),
        ],
        ..plan(
            FaultKind::BearingBsf,
            VisualCue::new(
                MotionMode::Impacting,
                "Damaged rolling element strikes both races twice per spin",
                "#ef476f",
            ),
        )
    }
}

fn bearing_cage(ctx: &RecipeContext) -> FaultPlan {
    let a = ctx.amp();
    let b = ctx.bearing();
    let o = ctx.order(b.ftf);
    FaultPlan {
        harmonics: vec![
            Harmonic::new(1.0, 0.25 * a),
            Harmonic::new(o, 0.3 * a),
            Harmonic::new(2.0 * o, 0.1 * a),
        ],
        impacts: vec![Impact {
            frequency: b.ftf,
            amplitude: 0.3 * a,
            randomness: 0.2,
            bandwidth: 600.0,
            carrier: 0.8 * BEARING_RESONANCE_HZ,
        }],
        broadband_rms: 0.04 * a,
        modulation_depth: Some(0.2),
        markers: vec![ctx.marker("FTF", o), ctx.marker("2×FTF", 2.0 * o), ctx.marker("1×", 1.0)],
        ..plan(
            FaultKind::BearingFtf,
            VisualCue::new(MotionMode::Flutter, "Worn cage lets the roller set wander sub-synchronously", "#ffd6a5"),
        )
    }
}

fn gear_mesh(ctx: &RecipeContext) -> FaultPlan {
    let a = ctx.amp();
    let g = ctx.gear();
    let mesh = ctx.order(g.mesh);
    let loaded = (0.4 + 0.6 * ctx.load) * a;
    FaultPlan {
        harmonics: vec![
            Harmonic::new(1.0, 0.2 * a),
            Harmonic::new(ctx.order(g.output_shaft), 0.1 * a),
            Harmonic::new(mesh, 0.6 * loaded),
            Harmonic::new(2.0 * mesh, 0.3 * loaded),
        ],
        sidebands: vec![Sideband {
            center_order: mesh,
            spacing_order: 1.0,
            count: 3,
            amplitude: 0.15 * loaded,
        }],
        broadband_rms: 0.03 * a,
        modulation_depth: Some(0.25),
        markers: vec![
            ctx.marker("1×", 1.0),
            FrequencyMarker::new("Output 1×", g.output_shaft),
            FrequencyMarker::new("Hunting tooth", g.hunting_tooth),
            ctx.marker("GMF", mesh),
            ctx.marker("2×GMF", 2.0 * mesh),
        ],
        ..plan(
            FaultKind::GearMesh,
            VisualCue::new(MotionMode::Torsional, "Tooth mesh loads the shaft torsionally at GMF", "#7bdff2"),
        )
    }
}

fn gear_chipped(ctx: &RecipeContext) -> FaultPlan {
    let a = ctx.amp();
    let g = ctx.gear();
    let mesh = ctx.order(g.mesh);
    let loaded = (0.4 + 0.6 * ctx.load) * a;
    FaultPlan {
        harmonics: vec![
            Harmonic::new(1.0, 0.25 * a),
            Harmonic::new(mesh, 0.4 * loaded),
            Harmonic::new(2.0 * mesh, 0.15 * loaded),
        ],
        sidebands: vec![Sideband {
            center_order: mesh,
            spacing_order: 1.0,
            count: 5,
            amplitude: 0.25 * loaded,
        }],
        // Chipped tooth hits once per pinion revolution and rings the mesh
        impacts: vec![Impact {
            frequency: ctx.fr,
            amplitude: 0.9 * a,
            randomness: 0.03,
            bandwidth: 300.0,
            carrier: 2.0 * g.mesh,
        }],
        broadband_rms: 0.04 * a,
        modulation_depth: Some(0.35),
        markers: vec![
            ctx.marker("1×", 1.0),
            ctx.marker("GMF-1×", mesh - 1.0),
            ctx.marker("GMF", mesh),
            ctx.marker("GMF+1×", mesh + 1.0),
        ],
        ..plan(
            FaultKind::GearChipped,
            VisualCue::new(MotionMode::Impacting, "Chipped tooth knocks once per revolution", "#118ab2"),
        )
    }
}

fn belt(ctx: &RecipeContext) -> FaultPlan {
    let a = ctx.amp();
    let slack = (0.6 + 0.4 * ctx.load) * a;
    FaultPlan {
        harmonics: vec![
            Harmonic::new(1.0, 0.5 * a),
            Harmonic::new(BELT_ORDER, 0.45 * slack).with_random_phase(),
            Harmonic::new(2.0 * BELT_ORDER, 0.35 * slack).with_random_phase(),
            Harmonic::new(3.0 * BELT_ORDER, 0.15 * slack).with_random_phase(),
        ],
        broadband_rms: 0.03 * a,
        modulation_depth: Some(0.2),
        markers: vec![
            ctx.marker("Belt", BELT_ORDER),
            ctx.marker("2×Belt", 2.0 * BELT_ORDER),
            ctx.marker("1×", 1.0),
        ],
        ..plan(
            FaultKind::Belt,
            VisualCue::new(MotionMode::Flutter, "Worn belt flaps below running speed", "#c9ada7"),
        )
    }
}

fn resonance(ctx: &RecipeContext) -> FaultPlan {
    let a = ctx.amp();
    FaultPlan {
        // Driven at a natural frequency: amplified 1× lagging by 90°
        harmonics: vec![
            Harmonic::new(1.0, 1.6 * a).with_phase(-PI / 2.0),
            Harmonic::new(2.0, 0.1 * a),
            Harmonic::new(STRUCTURAL_MODE_ORDER, 0.3 * a).with_random_phase(),
        ],
        broadband_rms: 0.06 * a,
        axial_bias: Some(0.3),
        markers: vec![ctx.marker("1×", 1.0), ctx.marker("Mode", STRUCTURAL_MODE_ORDER)],
        ..plan(
            FaultKind::Resonance,
            VisualCue::new(
                MotionMode::Swaying,
                "Running speed sits on a structural natural frequency",
                "#ffd166",
            ),
        )
    }
}

fn cavitation(ctx: &RecipeContext) -> FaultPlan {
    let a = ctx.amp();
    FaultPlan {
        harmonics: vec![
            Harmonic::new(1.0, 0.2 * a),
            Harmonic::new(PUMP_VANES, 0.3 * a).with_random_phase(),
            Harmonic::new(2.0 * PUMP_VANES, 0.1 * a).with_random_phase(),
        ],
        impacts: vec![Impact {
            frequency: 3.7 * ctx.fr,
            amplitude: 0.6 * a,
            randomness: 0.9,
            bandwidth: 800.0,
            carrier: 4000.0,
        }],
        broadband_rms: 0.25 * a,
        modulation_depth: Some(0.1),
        markers: vec![ctx.marker("1×", 1.0), ctx.marker("Vane pass", PUMP_VANES)],
        ..plan(
            FaultKind::Cavitation,
            VisualCue::new(
                MotionMode::Chaotic,
                "Collapsing vapour bubbles raise broadband noise and random bursts",
                "#06d6a0",
            ),
        )
    }
}
