// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/rotorsim

//! Gear pair geometry and mesh frequencies

use serde::{Deserialize, Serialize};

/// Single-stage gear pair; the pinion rides on the driven shaft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GearGeometry {
    pub pinion_teeth: u32,
    pub gear_teeth: u32,
}

impl GearGeometry {
    pub fn new(pinion_teeth: u32, gear_teeth: u32) -> Self {
        Self {
            pinion_teeth,
            gear_teeth,
        }
    }

    /// Mesh and related frequencies at input shaft frequency `fr` (Hz)
    pub fn frequencies(&self, fr: f64) -> GearFrequencies {
        let np = self.pinion_teeth.max(1);
        let ng = self.gear_teeth.max(1);
        let mesh = mesh_frequency(fr, np);

        GearFrequencies {
            input_shaft: fr,
            output_shaft: fr * np as f64 / ng as f64,
            mesh,
            hunting_tooth: mesh * gcd(np, ng) as f64 / (np as f64 * ng as f64),
        }
    }
}

/// Gear mesh frequency: shaft frequency times tooth count
pub fn mesh_frequency(fr: f64, teeth: u32) -> f64 {
    fr * teeth as f64
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Gear pair frequencies, Hz
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GearFrequencies {
    pub input_shaft: f64,
    pub output_shaft: f64,
    /// Gear mesh frequency (GMF)
    pub mesh: f64,
    /// Rate at which the same tooth pair re-engages
    pub hunting_tooth: f64,
}
