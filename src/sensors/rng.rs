// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/rotorsim

//! Seeded random stream for reproducible synthesis

use std::f64::consts::PI;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

/// Deterministic random stream, reseeded explicitly for every run.
///
/// ChaCha8 keeps the sequence stable across platforms and `rand` releases, so a
/// seed reproduces bit-identical buffers.
#[derive(Debug, Clone)]
pub struct SeededRng {
    seed: u64,
    inner: ChaCha8Rng,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restart the stream from the original seed
    pub fn reseed(&mut self) {
        self.inner = ChaCha8Rng::seed_from_u64(self.seed);
    }

    /// Uniform in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Uniform in [low, high)
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.inner.gen_range(low..high)
    }

    /// Uniform phase in [-π, π)
    pub fn phase(&mut self) -> f64 {
        self.uniform(-PI, PI)
    }

    /// Standard normal draw
    pub fn gaussian(&mut self) -> f64 {
        self.inner.sample::<f64, _>(StandardNormal)
    }
}
