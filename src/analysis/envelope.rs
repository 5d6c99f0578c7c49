// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/rotorsim

//! Hilbert envelope via the FFT-domain analytic signal

use num_complex::Complex;
use rustfft::FftPlanner;

/// Analytic-signal envelope of `signal`, same length as the input.
///
/// Negative-frequency bins are zeroed and positive bins (excluding DC and Nyquist)
/// doubled before the inverse transform; the magnitude is normalized by the length.
pub fn envelope(signal: &[f64]) -> Vec<f64> {
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }

    let mut buffer: Vec<Complex<f64>> = signal.iter()
        .map(|&x| Complex::new(x, 0.0))
        .collect();

    let mut planner = FftPlanner::new();
    planner.plan_fft_forward(n).process(&mut buffer);

    // Bins 1..ceil(n/2) are strictly positive frequencies; for even n, n/2 is Nyquist
    let positive_end = (n + 1) / 2;
    for (k, bin) in buffer.iter_mut().enumerate() {
        if k == 0 || (n % 2 == 0 && k == n / 2) {
            continue;
        }
        if k < positive_end {
            *bin *= 2.0;
        } else {
            *bin = Complex::new(0.0, 0.0);
        }
    }

    planner.plan_fft_inverse(n).process(&mut buffer);

    let scale = 1.0 / n as f64;
    buffer.iter().map(|c| c.norm() * scale).collect()
}
