// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/rotorsim

//! Sensor simulator - sums fault content sample by sample into a vibration trace

use std::f64::consts::PI;

use super::{RpmProfile, SeededRng, Sensor};
use crate::faults::{FaultPlan, Harmonic, Impact, Sideband};

/// Carrier frequencies are kept below this fraction of the sample rate
const MAX_CARRIER_FRACTION: f64 = 0.45;

/// Spectral content a sensor sees, borrowed from a fault plan
#[derive(Debug, Clone, Copy)]
pub struct SignalContent<'a> {
    pub harmonics: &'a [Harmonic],
    pub sidebands: &'a [Sideband],
    pub impacts: &'a [Impact],
}

impl<'a> From<&'a FaultPlan> for SignalContent<'a> {
    fn from(plan: &'a FaultPlan) -> Self {
        Self {
            harmonics: &plan.harmonics,
            sidebands: &plan.sidebands,
            impacts: &plan.impacts,
        }
    }
}

/// A resolved sinusoid: order, amplitude, phase
struct Line {
    order: f64,
    amplitude: f64,
    phase: f64,
}

/// A resolved impact train
struct Burst {
    period: f64,
    amplitude: f64,
    randomness: f64,
    decay: f64,
    carrier: f64,
}

/// Simulates the trace of one pickup for a fixed buffer length and speed profile
pub struct SensorSimulator {
    samples: usize,
    sample_rate: f64,
    profile: RpmProfile,
}

impl SensorSimulator {
    pub fn new(samples: usize, sample_rate: f64, profile: RpmProfile) -> Self {
        Self {
            samples,
            sample_rate: sample_rate.max(1.0),
            profile,
        }
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn profile(&self) -> &RpmProfile {
        &self.profile
    }

    /// Synthesize one sensor's buffer.
    ///
    /// Consumes `rng` in a fixed order (random harmonic phases first, then per sample
    /// impact jitter and noise) so a given seed always yields the same samples.
    pub fn synthesize(
        &self,
        content: SignalContent<'_>,
        sensor: &Sensor,
        noise_rms: f64,
        rng: &mut SeededRng,
    ) -> Vec<f64> {
        let offset = sensor.phase_offset();
        let noise_rms = if noise_rms.is_finite() { noise_rms.max(0.0) } else { 0.0 };

        let mut lines: Vec<Line> = content
            .harmonics
            .iter()
            .filter(|h| h.applies_to(sensor.axis))
            .map(|h| {
                let random = if h.random_phase { rng.phase() } else { 0.0 };
                Line {
                    order: h.order,
                    amplitude: h.amplitude,
                    phase: h.phase + offset + random,
                }
            })
            .collect();
        lines.extend(self.sideband_lines(content.sidebands, offset));

        let bursts = self.bursts(content.impacts);

        let mut data = Vec::with_capacity(self.samples);
        for i in 0..self.samples {
            let t = i as f64 / self.sample_rate;
            let shaft = self.profile.rpm_at(i) / 60.0;
            let base = 2.0 * PI * shaft * t;

            let mut x = 0.0;
            for line in &lines {
                x += line.amplitude * (base * line.order + line.phase).sin();
            }

            for burst in &bursts {
                let tau = t % burst.period;
                let jitter = burst.randomness * rng.phase();
                let envelope = (-burst.decay * tau).exp();
                x += burst.amplitude * envelope * (2.0 * PI * burst.carrier * tau + jitter).sin();
            }

            if noise_rms > 0.0 {
                x += noise_rms * rng.gaussian();
            }

            data.push(x);
        }

        data
    }

    /// Expand sideband families into lines at center ± k·spacing
    fn sideband_lines(&self, sidebands: &[Sideband], offset: f64) -> Vec<Line> {
        let mut lines = Vec::new();
        for sb in sidebands {
            for k in 1..=sb.count as i32 {
                for side in [-1i32, 1] {
                    let signed = side * k;
                    let order = sb.center_order + signed as f64 * sb.spacing_order;
                    if order <= 0.0 {
                        continue;
                    }
                    lines.push(Line {
                        order,
                        amplitude: sb.amplitude / k as f64,
                        phase: (signed.signum() as f64) * PI / 2.0 + offset,
                    });
                }
            }
        }
        lines
    }

    fn bursts(&self, impacts: &[Impact]) -> Vec<Burst> {
        let max_carrier = MAX_CARRIER_FRACTION * self.sample_rate;
        impacts
            .iter()
            .filter(|imp| imp.frequency.is_finite() && imp.frequency > 0.0)
            .map(|imp| Burst {
                period: 1.0 / imp.frequency,
                amplitude: imp.amplitude,
                randomness: imp.randomness.clamp(0.0, 1.0),
                decay: PI * imp.bandwidth.max(1.0),
                carrier: imp.carrier.clamp(0.0, max_carrier),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::{Axis, MountLocation};

    fn sensor(axis: Axis) -> Sensor {
        Sensor::new("s", MountLocation::DriveEnd, axis)
    }

    fn simulator() -> SensorSimulator {
        SensorSimulator::new(4096, 4096.0, RpmProfile::Constant(1800.0))
    }

    #[test]
    fn test_single_harmonic_keeps_amplitude() {
        let harmonics = [Harmonic::new(1.0, 1.0)];
        let content = SignalContent { harmonics: &harmonics, sidebands: &[], impacts: &[] };
        let data = simulator().synthesize(content, &sensor(Axis::X), 0.0, &mut SeededRng::new(1));

        assert_eq!(data.len(), 4096);
        let max = data.iter().fold(0.0_f64, |m, &x| m.max(x.abs()));
        assert!(max > 0.9, "max abs {}", max);
        assert!(max <= 1.0 + 1e-9);
    }

    #[test]
    fn test_same_seed_bit_identical() {
        let harmonics = [Harmonic::new(1.0, 1.0), Harmonic::new(2.5, 0.4).with_random_phase()];
        let impacts = [Impact { frequency: 105.0, amplitude: 2.0, randomness: 0.3, bandwidth: 400.0, carrier: 1500.0 }];
        let content = SignalContent { harmonics: &harmonics, sidebands: &[], impacts: &impacts };

        let a = simulator().synthesize(content, &sensor(Axis::Y), 0.2, &mut SeededRng::new(99));
        let b = simulator().synthesize(content, &sensor(Axis::Y), 0.2, &mut SeededRng::new(99));
        let c = simulator().synthesize(content, &sensor(Axis::Y), 0.2, &mut SeededRng::new(100));

        assert!(a.iter().zip(&b).all(|(x, y)| x.to_bits() == y.to_bits()));
        assert!(a.iter().zip(&c).any(|(x, y)| x != y));
    }

    #[test]
    fn test_axis_restriction() {
        let harmonics = [Harmonic::new(1.0, 1.0).on_axis(Axis::Z)];
        let content = SignalContent { harmonics: &harmonics, sidebands: &[], impacts: &[] };
        let sim = simulator();

        let radial = sim.synthesize(content, &sensor(Axis::X), 0.0, &mut SeededRng::new(1));
        let axial = sim.synthesize(content, &sensor(Axis::Z), 0.0, &mut SeededRng::new(1));

        assert!(radial.iter().all(|&x| x == 0.0));
        assert!(axial.iter().any(|&x| x.abs() > 0.5));
    }

    #[test]
    fn test_sidebands_skip_non_positive_orders() {
        let sim = simulator();
        let sidebands = [Sideband { center_order: 1.0, spacing_order: 1.0, count: 2, amplitude: 1.0 }];
        let lines = sim.sideband_lines(&sidebands, 0.0);

        let orders: Vec<f64> = lines.iter().map(|l| l.order).collect();
        assert_eq!(orders, vec![2.0, 3.0]);
        // k = 2 is attenuated by half
        assert!((lines[1].amplitude - 0.5).abs() < 1e-12);
        assert!((lines[0].phase - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_noise_rms() {
        let content = SignalContent { harmonics: &[], sidebands: &[], impacts: &[] };
        let data = simulator().synthesize(content, &sensor(Axis::X), 0.5, &mut SeededRng::new(5));
        let rms = (data.iter().map(|x| x * x).sum::<f64>() / data.len() as f64).sqrt();
        assert!((rms - 0.5).abs() < 0.05, "rms {}", rms);
    }

    #[test]
    fn test_impacts_decay_between_hits() {
        let impacts = [Impact { frequency: 10.0, amplitude: 1.0, randomness: 0.0, bandwidth: 50.0, carrier: 500.0 }];
        let content = SignalContent { harmonics: &[], sidebands: &[], impacts: &impacts };
        let data = simulator().synthesize(content, &sensor(Axis::X), 0.0, &mut SeededRng::new(3));

        // First 20 ms of each 100 ms period ring; the tail is near silent
        let head = data[..82].iter().fold(0.0_f64, |m, &x| m.max(x.abs()));
        let tail = data[300..400].iter().fold(0.0_f64, |m, &x| m.max(x.abs()));
        assert!(head > 0.5);
        assert!(tail < 0.01);
    }

    #[test]
    fn test_zero_samples() {
        let sim = SensorSimulator::new(0, 1000.0, RpmProfile::Constant(1800.0));
        let content = SignalContent { harmonics: &[], sidebands: &[], impacts: &[] };
        assert!(sim.synthesize(content, &sensor(Axis::X), 1.0, &mut SeededRng::new(1)).is_empty());
    }
}
