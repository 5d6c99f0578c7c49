// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/rotorsim

//! Compact rotor motion descriptor for the 3D view

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

use crate::faults::{FaultPlan, VisualCue};

const DEFAULT_MINOR_RATIO: f64 = 0.3;
const DEFAULT_AXIAL_BIAS: f64 = 0.2;
const DEFAULT_MODULATION_DEPTH: f64 = 0.05;

/// How the rotor should move on screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionDescriptor {
    /// Orbit semi-major axis, m/s²
    pub orbit_major: f64,
    pub orbit_minor: f64,
    pub axial: f64,
    pub torsional: f64,
    /// Radians between the first two sensors
    pub phase_lag: f64,
    pub cue: VisualCue,
    pub severity: f64,
}

/// Derive the motion descriptor from the plan and synthesized traces
pub fn derive_motion(
    plan: &FaultPlan,
    series: &BTreeMap<String, Vec<f64>>,
    sensor_ids: &[String],
    severity: f64,
) -> MotionDescriptor {
    let major = plan.harmonics.first().map(|h| h.amplitude).unwrap_or(0.0);
    let minor = plan.harmonics.get(1)
        .map(|h| h.amplitude)
        .unwrap_or(DEFAULT_MINOR_RATIO * major);

    let axial = plan.axial_bias.unwrap_or(DEFAULT_AXIAL_BIAS) * major;
    let torsional = plan.modulation_depth.unwrap_or(DEFAULT_MODULATION_DEPTH) * major;

    let pair = match sensor_ids {
        [a, b, ..] => series.get(a).zip(series.get(b)),
        _ => None,
    };
    let phase_lag = match pair {
        Some((reference, target)) => quadrature_lag(reference, target),
        None => plan.harmonics.first().map(|h| h.phase).unwrap_or(0.0),
    };

    MotionDescriptor {
        orbit_major: major,
        orbit_minor: minor,
        axial,
        torsional,
        phase_lag,
        cue: plan.cue.clone(),
        severity,
    }
}

/// Lag of `target` relative to `reference` from in-phase and first-difference
/// (quadrature) correlation
pub fn quadrature_lag(reference: &[f64], target: &[f64]) -> f64 {
    let n = reference.len().min(target.len());
    if n == 0 {
        return 0.0;
    }

    let in_phase: f64 = reference[..n].iter().zip(&target[..n]).map(|(r, t)| r * t).sum();
    let quadrature: f64 = (1..n)
        .map(|i| reference[i] * (target[i] - target[i - 1]))
        .sum();

    quadrature.atan2(in_phase)
}
