// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/rotorsim

//! Unit conversions - shaft speed, acceleration, velocity

use std::f64::consts::PI;
use serde::{Deserialize, Serialize};

/// Standard gravity in m/s²
pub const STANDARD_GRAVITY: f64 = 9.80665;

/// Millimetres per inch
pub const MM_PER_INCH: f64 = 25.4;

/// Smallest analysis block the engine will plan an FFT for
pub const MIN_BLOCK_SIZE: usize = 16;

/// Largest FFT block
pub const MAX_BLOCK_SIZE: usize = 1 << 20;

pub fn rpm_to_hz(rpm: f64) -> f64 {
    rpm / 60.0
}

pub fn hz_to_rpm(hz: f64) -> f64 {
    hz * 60.0
}

pub fn ms2_to_g(accel: f64) -> f64 {
    accel / STANDARD_GRAVITY
}

pub fn g_to_ms2(accel: f64) -> f64 {
    accel * STANDARD_GRAVITY
}

pub fn mm_s_to_in_s(velocity: f64) -> f64 {
    velocity / MM_PER_INCH
}

pub fn in_s_to_mm_s(velocity: f64) -> f64 {
    velocity * MM_PER_INCH
}

/// Peak velocity in mm/s of a sinusoidal acceleration of `accel_ms2` at `freq_hz`
pub fn accel_to_velocity_mm_s(accel_ms2: f64, freq_hz: f64) -> f64 {
    if freq_hz <= 0.0 {
        return 0.0;
    }
    1000.0 * accel_ms2 / (2.0 * PI * freq_hz)
}

/// Resolve the FFT block size from the requested line count or the raw block size.
///
/// A positive `lines` wins and maps to `2 * lines` rounded up to a power of two.
pub fn resolve_block_size(block_size: usize, lines: usize) -> usize {
    let requested = if lines > 0 { lines.saturating_mul(2) } else { block_size };
    requested.clamp(MIN_BLOCK_SIZE, MAX_BLOCK_SIZE).next_power_of_two()
}

/// Units the caller displays amplitudes in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayUnits {
    /// Acceleration, m/s²
    #[default]
    Ms2,
    /// Acceleration, g
    G,
    /// Velocity, mm/s
    MmS,
    /// Velocity, in/s
    InS,
}

impl DisplayUnits {
    pub fn label(&self) -> &'static str {
        match self {
            DisplayUnits::Ms2 => "m/s²",
            DisplayUnits::G => "g",
            DisplayUnits::MmS => "mm/s",
            DisplayUnits::InS => "in/s",
        }
    }

    pub fn is_velocity(&self) -> bool {
        matches!(self, DisplayUnits::MmS | DisplayUnits::InS)
    }

    /// Multiplier applied to synthesized m/s² samples.
    ///
    /// Velocity units keep the time domain in m/s²; integration happens in the spectrum.
    pub fn amplitude_scale(&self) -> f64 {
        match self {
            DisplayUnits::G => 1.0 / 9.81,
            _ => 1.0,
        }
    }

    /// Multiplier applied to spectral lines after frequency-domain integration
    pub fn velocity_scale(&self) -> f64 {
        match self {
            DisplayUnits::MmS => 1000.0,
            DisplayUnits::InS => 1000.0 / MM_PER_INCH,
            _ => 1.0,
        }
    }
}
