// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/rotorsim

//! Time-domain summary statistics

use serde::{Deserialize, Serialize};

/// Overall levels of one vibration trace
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalStats {
    pub rms: f64,
    /// Largest sample (signed maximum)
    pub peak: f64,
    pub peak_to_peak: f64,
    /// Largest absolute sample over RMS
    pub crest_factor: f64,
}

/// RMS, peak and peak-to-peak of `data`; all zero for an empty buffer
pub fn compute_stats(data: &[f64]) -> SignalStats {
    if data.is_empty() {
        return SignalStats::default();
    }

    let n = data.len() as f64;
    let rms = (data.iter().map(|&x| x * x).sum::<f64>() / n).sqrt();

    let max = data.iter().cloned().fold(f64::MIN, f64::max);
    let min = data.iter().cloned().fold(f64::MAX, f64::min);

    let crest_factor = if rms > 1e-10 { max.abs().max(min.abs()) / rms } else { 0.0 };

    SignalStats {
        rms,
        peak: max,
        peak_to_peak: max - min,
        crest_factor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_wave_stats() {
        let stats = compute_stats(&[1.0, -1.0, 1.0, -1.0]);
        assert!((stats.rms - 1.0).abs() < 1e-5);
        assert!((stats.peak - 1.0).abs() < 1e-5);
        assert!((stats.peak_to_peak - 2.0).abs() < 1e-5);
        assert!((stats.crest_factor - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_sine_crest_factor() {
        let data: Vec<f64> = (0..1000)
            .map(|i| (2.0 * std::f64::consts::PI * i as f64 / 100.0).sin())
            .collect();
        let stats = compute_stats(&data);
        assert!((stats.rms - 1.0 / 2f64.sqrt()).abs() < 1e-3);
        assert!((stats.crest_factor - 2f64.sqrt()).abs() < 1e-2);
    }

    #[test]
    fn test_peak_is_signed_max() {
        let stats = compute_stats(&[-5.0, 1.0, 2.0]);
        assert_eq!(stats.peak, 2.0);
        assert_eq!(stats.peak_to_peak, 7.0);
    }

    #[test]
    fn test_empty() {
        assert_eq!(compute_stats(&[]), SignalStats::default());
    }
}
