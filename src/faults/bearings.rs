// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/rotorsim

//! Rolling-element bearing geometry and defect frequencies

use serde::{Deserialize, Serialize};

/// Bearing geometry; diameters share one length unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BearingGeometry {
    /// Number of rolling elements
    pub rollers: u32,
    /// Pitch diameter (rolling-element centerline)
    pub pitch_diameter: f64,
    /// Rolling-element diameter
    pub roller_diameter: f64,
    /// Contact angle in degrees
    pub contact_angle_deg: f64,
}

impl BearingGeometry {
    pub fn new(rollers: u32, pitch_diameter: f64, roller_diameter: f64, contact_angle_deg: f64) -> Self {
        Self {
            rollers,
            pitch_diameter,
            roller_diameter,
            contact_angle_deg,
        }
    }

    /// (d/D)·cosφ
    fn ratio(&self) -> f64 {
        if self.pitch_diameter <= 0.0 {
            return 0.0;
        }
        (self.roller_diameter / self.pitch_diameter) * self.contact_angle_deg.to_radians().cos()
    }

    /// Defect frequencies at shaft frequency `fr` (Hz)
    pub fn frequencies(&self, fr: f64) -> BearingFrequencies {
        let n = self.rollers as f64;
        let r = self.ratio();

        let bsf = if self.roller_diameter > 0.0 {
            (self.pitch_diameter / (2.0 * self.roller_diameter)) * fr * (1.0 - r * r)
        } else {
            0.0
        };

        BearingFrequencies {
            shaft: fr,
            bpfo: 0.5 * n * fr * (1.0 - r),
            bpfi: 0.5 * n * fr * (1.0 + r),
            bsf,
            ftf: 0.5 * fr * (1.0 - r),
        }
    }
}

/// Characteristic bearing defect frequencies, Hz
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BearingFrequencies {
    pub shaft: f64,
    /// Ball pass frequency, outer race
    pub bpfo: f64,
    /// Ball pass frequency, inner race
    pub bpfi: f64,
    /// Ball spin frequency
    pub bsf: f64,
    /// Fundamental train (cage) frequency
    pub ftf: f64,
}

impl BearingFrequencies {
    /// Express a frequency as a multiple of shaft speed
    pub fn order(&self, freq: f64) -> f64 {
        if self.shaft > 0.0 {
            freq / self.shaft
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel_err(a: f64, b: f64) -> f64 {
        ((a - b) / b).abs()
    }

    #[test]
    fn test_reference_bearing_at_1800_rpm() {
        let geometry = BearingGeometry::new(8, 120.0, 15.0, 15.0);
        let fr = 1800.0 / 60.0;
        let f = geometry.frequencies(fr);

        let r = (15.0 / 120.0) * 15f64.to_radians().cos();
        let bpfo = 4.0 * fr * (1.0 - r);
        let bpfi = 4.0 * fr * (1.0 + r);
        let bsf = (120.0 / 30.0) * fr * (1.0 - r * r);

        assert!(rel_err(f.bpfo, bpfo) < 0.01);
        assert!(rel_err(f.bpfi, bpfi) < 0.01);
        assert!(rel_err(f.bsf, bsf) < 0.01);
        // Hand-computed: BPFO ≈ 105.51 Hz, BPFI ≈ 134.49 Hz, BSF ≈ 118.25 Hz
        assert!(rel_err(f.bpfo, 105.51) < 0.01);
        assert!(rel_err(f.bpfi, 134.49) < 0.01);
        assert!(rel_err(f.bsf, 118.25) < 0.01);
    }

    #[test]
    fn test_ftf_below_half_shaft() {
        let f = BearingGeometry::new(9, 46.0, 7.9, 0.0).frequencies(25.0);
        assert!(f.ftf < 12.5 && f.ftf > 0.0);
        // BPFO = n * FTF
        assert!(rel_err(f.bpfo, 9.0 * f.ftf) < 1e-12);
        assert!(rel_err(f.order(f.bpfo), f.bpfo / 25.0) < 1e-12);
    }

    #[test]
    fn test_degenerate_geometry() {
        let f = BearingGeometry::new(8, 0.0, 0.0, 0.0).frequencies(30.0);
        assert_eq!(f.bsf, 0.0);
        assert!((f.bpfo - 120.0).abs() < 1e-12);
    }
}
