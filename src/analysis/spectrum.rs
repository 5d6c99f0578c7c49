// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/rotorsim

//! Spectral analysis - windowed, block-averaged FFT magnitude and phase

use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::sync::Arc;
use rayon::prelude::*;
use realfft::{RealFftPlanner, RealToComplex};
use serde::{Deserialize, Serialize};

use super::WindowKind;

/// Parameters of one spectral run
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumSettings {
    pub sample_rate: f64,
    pub window: WindowKind,
    pub block_size: usize,
    pub averages: usize,
    /// Integrate to velocity by dividing each non-DC line by 2πf
    pub velocity: bool,
    /// Applied after integration (e.g. m/s → mm/s)
    pub velocity_scale: f64,
}

/// How the spectrum was produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumMeta {
    pub window: WindowKind,
    /// Blocks actually averaged, never less than 1
    pub averages_used: usize,
    pub block_size: usize,
    pub sample_rate: f64,
    pub velocity: bool,
}

/// Averaged spectra for every sensor of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumResult {
    /// Hz, block_size / 2 lines
    pub frequencies: Vec<f64>,
    pub magnitude: BTreeMap<String, Vec<f64>>,
    /// Radians, arithmetic mean of per-block phase
    pub phase: BTreeMap<String, Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub envelope: Option<BTreeMap<String, Vec<f64>>>,
    /// Frequency axis in shaft orders when order tracking is on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orders: Option<Vec<f64>>,
    pub meta: SpectrumMeta,
}

impl SpectrumResult {
    /// Attach an order axis for the given shaft frequency
    pub fn with_orders(mut self, shaft_hz: f64) -> Self {
        if shaft_hz > 0.0 {
            self.orders = Some(self.frequencies.iter().map(|f| f / shaft_hz).collect());
        }
        self
    }

    /// Largest non-DC line of a sensor: (frequency, magnitude)
    pub fn peak(&self, sensor_id: &str) -> Option<(f64, f64)> {
        dominant_line(&self.frequencies, self.magnitude.get(sensor_id)?)
    }

    /// Largest non-DC line of a sensor's envelope spectrum
    pub fn envelope_peak(&self, sensor_id: &str) -> Option<(f64, f64)> {
        dominant_line(&self.frequencies, self.envelope.as_ref()?.get(sensor_id)?)
    }
}

fn dominant_line(frequencies: &[f64], magnitude: &[f64]) -> Option<(f64, f64)> {
    magnitude.iter()
        .enumerate()
        .skip(1)
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, &m)| (frequencies[i], m))
}

/// Block average of one trace
#[derive(Debug, Clone)]
pub struct BlockAverage {
    pub magnitude: Vec<f64>,
    pub phase: Vec<f64>,
    /// Divisor applied, never less than 1
    pub blocks: usize,
}

/// Windowed block-averaging FFT analyzer for a fixed block size
pub struct SpectralAnalyzer {
    settings: SpectrumSettings,
    window: Vec<f64>,
    r2c: Arc<dyn RealToComplex<f64>>,
}

impl SpectralAnalyzer {
    pub fn new(mut settings: SpectrumSettings) -> Self {
        settings.block_size = settings.block_size.max(2);
        settings.sample_rate = settings.sample_rate.max(1.0);
        let mut planner = RealFftPlanner::<f64>::new();
        let r2c = planner.plan_fft_forward(settings.block_size);
        let window = settings.window.coefficients(settings.block_size);

        Self {
            settings,
            window,
            r2c,
        }
    }

    pub fn settings(&self) -> &SpectrumSettings {
        &self.settings
    }

    /// Frequency axis: bin·fs/N for bin in 0..N/2
    pub fn frequencies(&self) -> Vec<f64> {
        let n = self.settings.block_size;
        let resolution = self.settings.sample_rate / n as f64;
        (0..n / 2).map(|bin| bin as f64 * resolution).collect()
    }

    /// Blocks a buffer of `len` samples yields: min(averages, len / N), at least 1
    pub fn blocks_for(&self, len: usize) -> usize {
        self.settings.averages.max(1).min(len / self.settings.block_size).max(1)
    }

    /// Average the windowed spectra of contiguous, non-overlapping blocks.
    ///
    /// Blocks that would overrun `data` are dropped. Phase is averaged arithmetically,
    /// which misbehaves near ±π; callers rely on that behaviour.
    pub fn analyze(&self, data: &[f64], velocity: bool) -> BlockAverage {
        let n = self.settings.block_size;
        let half = n / 2;
        let gain = self.settings.window.coherent_gain();
        let resolution = self.settings.sample_rate / n as f64;

        let available = data.len() / n;
        let consumed = self.settings.averages.max(1).min(available);

        let mut magnitude = vec![0.0; half];
        let mut phase = vec![0.0; half];

        let mut input = self.r2c.make_input_vec();
        let mut output = self.r2c.make_output_vec();

        for block in data.chunks_exact(n).take(consumed) {
            for ((dst, &x), &w) in input.iter_mut().zip(block).zip(&self.window) {
                *dst = x * w;
            }
            // Buffer lengths come from the plan itself
            if self.r2c.process(&mut input, &mut output).is_err() {
                continue;
            }

            for bin in 0..half {
                let c = output[bin];
                let scale = if bin == 0 { 1.0 / n as f64 } else { 2.0 / n as f64 };
                let mut mag = c.norm() * scale / gain;
                if velocity && bin > 0 {
                    mag /= 2.0 * PI * bin as f64 * resolution;
                    mag *= self.settings.velocity_scale;
                }
                magnitude[bin] += mag;
                phase[bin] += c.im.atan2(c.re);
            }
        }

        let blocks = consumed.max(1);
        for bin in 0..half {
            magnitude[bin] /= blocks as f64;
            phase[bin] /= blocks as f64;
        }

        BlockAverage {
            magnitude,
            phase,
            blocks,
        }
    }
}

/// Spectra for every sensor, plus envelope spectra when envelope traces are supplied
pub fn compute_spectrum(
    time: &BTreeMap<String, Vec<f64>>,
    settings: SpectrumSettings,
    envelope: Option<&BTreeMap<String, Vec<f64>>>,
) -> SpectrumResult {
    let analyzer = SpectralAnalyzer::new(settings);
    let velocity = analyzer.settings().velocity;

    let averaged: Vec<(String, BlockAverage)> = time
        .par_iter()
        .map(|(id, data)| (id.clone(), analyzer.analyze(data, velocity)))
        .collect();

    let averages_used = averaged.first()
        .map(|(_, avg)| avg.blocks)
        .unwrap_or_else(|| analyzer.blocks_for(0));

    let mut magnitude = BTreeMap::new();
    let mut phase = BTreeMap::new();
    for (id, avg) in averaged {
        magnitude.insert(id.clone(), avg.magnitude);
        phase.insert(id, avg.phase);
    }

    let envelope = envelope.map(|series| {
        series
            .par_iter()
            .map(|(id, data)| (id.clone(), analyzer.analyze(data, false).magnitude))
            .collect::<BTreeMap<_, _>>()
    });

    let s = analyzer.settings();
    SpectrumResult {
        frequencies: analyzer.frequencies(),
        magnitude,
        phase,
        envelope,
        orders: None,
        meta: SpectrumMeta {
            window: s.window,
            averages_used,
            block_size: s.block_size,
            sample_rate: s.sample_rate,
            velocity,
        },
    }
}
