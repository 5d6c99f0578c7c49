// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/rotorsim

//! Analysis windows and their coherent gains

use std::f64::consts::PI;
use std::fmt;
use serde::{Deserialize, Serialize};

/// Smallest divisor used when correcting for window gain
const MIN_GAIN: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    Rectangular,
    #[default]
    Hanning,
    Hamming,
    Blackman,
}

impl WindowKind {
    pub fn label(&self) -> &'static str {
        match self {
            WindowKind::Rectangular => "rectangular",
            WindowKind::Hanning => "hanning",
            WindowKind::Hamming => "hamming",
            WindowKind::Blackman => "blackman",
        }
    }

    /// Mean value of the window, used to undo its attenuation
    pub fn coherent_gain(&self) -> f64 {
        let gain: f64 = match self {
            WindowKind::Rectangular => 1.0,
            WindowKind::Hanning => 0.5,
            WindowKind::Hamming => 0.54,
            WindowKind::Blackman => 0.42,
        };
        gain.max(MIN_GAIN)
    }

    /// Window coefficients for a block of `n` samples
    pub fn coefficients(&self, n: usize) -> Vec<f64> {
        if n < 2 {
            return vec![1.0; n];
        }
        let m = (n - 1) as f64;
        (0..n)
            .map(|i| {
                let x = 2.0 * PI * i as f64 / m;
                match self {
                    WindowKind::Rectangular => 1.0,
                    WindowKind::Hanning => 0.5 * (1.0 - x.cos()),
                    WindowKind::Hamming => 0.54 - 0.46 * x.cos(),
                    WindowKind::Blackman => 0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos(),
                }
            })
            .collect()
    }
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coherent_gain_close_to_mean() {
        for kind in [WindowKind::Rectangular, WindowKind::Hanning, WindowKind::Hamming, WindowKind::Blackman] {
            let w = kind.coefficients(4096);
            let mean = w.iter().sum::<f64>() / w.len() as f64;
            assert!((mean - kind.coherent_gain()).abs() < 1e-3, "{}: {}", kind, mean);
        }
    }

    #[test]
    fn test_hanning_endpoints() {
        let w = WindowKind::Hanning.coefficients(9);
        assert!(w[0].abs() < 1e-12);
        assert!(w[8].abs() < 1e-12);
        assert!((w[4] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_tiny_blocks() {
        assert!(WindowKind::Blackman.coefficients(0).is_empty());
        assert_eq!(WindowKind::Blackman.coefficients(1), vec![1.0]);
    }
}
