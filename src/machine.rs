// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/rotorsim

//! Machine, synthesis and analysis records supplied by the caller per run

use serde::{Deserialize, Serialize};

use crate::analysis::WindowKind;
use crate::units::{self, DisplayUnits};

/// Longest buffer synthesized per sensor; longer durations are truncated
pub const MAX_SAMPLES: usize = 1 << 21;

/// Linear speed ramp across the synthesized buffer
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RampConfig {
    pub enabled: bool,
    pub from_rpm: f64,
    pub to_rpm: f64,
}

/// Machine operating point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Shaft speed
    pub rpm: f64,

    /// Load factor, 0..1
    pub load: f64,

    /// Display units
    #[serde(default)]
    pub units: DisplayUnits,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ramp: Option<RampConfig>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            rpm: 1800.0,
            load: 0.5,
            units: DisplayUnits::Ms2,
            ramp: None,
        }
    }
}

impl MachineConfig {
    pub fn new(rpm: f64) -> Self {
        Self {
            rpm,
            ..Self::default()
        }
    }

    /// Shaft frequency in Hz at the nominal speed
    pub fn shaft_hz(&self) -> f64 {
        units::rpm_to_hz(self.rpm.max(0.0))
    }

    pub fn clamped_load(&self) -> f64 {
        clamp_unit(self.load)
    }

    pub fn active_ramp(&self) -> Option<RampConfig> {
        self.ramp.filter(|r| r.enabled)
    }
}

/// Time-domain synthesis parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisParams {
    /// Sample rate in Hz
    pub sample_rate: f64,

    /// Buffer duration in seconds
    pub seconds: f64,

    pub seed: u64,

    /// Broadband noise RMS added to every sensor, m/s²
    pub noise_rms: f64,

    /// Analysis block size (power of two)
    pub block_size: usize,

    /// Integrate spectra to velocity
    #[serde(default)]
    pub integrate_velocity: bool,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            sample_rate: 8192.0,
            seconds: 2.0,
            seed: 1,
            noise_rms: 0.05,
            block_size: 2048,
            integrate_velocity: false,
        }
    }
}

impl SynthesisParams {
    pub fn clamped_sample_rate(&self) -> f64 {
        if self.sample_rate.is_finite() {
            self.sample_rate.max(1.0)
        } else {
            1.0
        }
    }

    /// Samples per sensor: floor(fs * seconds), at most [`MAX_SAMPLES`]
    pub fn sample_count(&self) -> usize {
        let seconds = if self.seconds.is_finite() { self.seconds.max(0.0) } else { 0.0 };
        let samples = (self.clamped_sample_rate() * seconds).floor();
        if samples >= MAX_SAMPLES as f64 {
            MAX_SAMPLES
        } else {
            samples as usize
        }
    }
}

/// Spectral analysis settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    pub window: WindowKind,

    /// Number of averaging blocks
    pub averages: usize,

    /// Desired spectral line count; 0 keeps the synthesis block size
    #[serde(default)]
    pub lines: usize,

    #[serde(default)]
    pub envelope: bool,

    #[serde(default)]
    pub order_tracking: bool,

    #[serde(default)]
    pub velocity: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            window: WindowKind::Hanning,
            averages: 4,
            lines: 0,
            envelope: false,
            order_tracking: false,
            velocity: false,
        }
    }
}

pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
