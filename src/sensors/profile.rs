// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/rotorsim

//! Shaft speed over time and the tachometer pulse train derived from it

use crate::machine::MachineConfig;

/// Instantaneous shaft speed for every sample of a buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RpmProfile {
    Constant(f64),
    Ramp { from: f64, to: f64, samples: usize },
}

impl RpmProfile {
    pub fn from_machine(machine: &MachineConfig, samples: usize) -> Self {
        match machine.active_ramp() {
            Some(ramp) => RpmProfile::Ramp {
                from: ramp.from_rpm.max(0.0),
                to: ramp.to_rpm.max(0.0),
                samples,
            },
            None => RpmProfile::Constant(machine.rpm.max(0.0)),
        }
    }

    /// RPM at sample `index`
    pub fn rpm_at(&self, index: usize) -> f64 {
        match *self {
            RpmProfile::Constant(rpm) => rpm,
            RpmProfile::Ramp { from, to, samples } => {
                if samples < 2 {
                    return from;
                }
                let frac = index.min(samples - 1) as f64 / (samples - 1) as f64;
                from + (to - from) * frac
            }
        }
    }

    /// Mean speed across the buffer
    pub fn mean_rpm(&self) -> f64 {
        match *self {
            RpmProfile::Constant(rpm) => rpm,
            RpmProfile::Ramp { from, to, .. } => 0.5 * (from + to),
        }
    }

    /// Once-per-revolution pulse train: 1.0 where the shaft phase wraps, else 0.0.
    ///
    /// The first sample always carries a pulse as the phase reference.
    pub fn tach_series(&self, samples: usize, sample_rate: f64) -> Vec<f64> {
        let mut tach = vec![0.0; samples];
        let mut revs = 0.0;
        for (i, pulse) in tach.iter_mut().enumerate() {
            if i == 0 {
                *pulse = 1.0;
            } else {
                revs += self.rpm_at(i) / 60.0 / sample_rate;
                if revs >= 1.0 {
                    revs -= revs.floor();
                    *pulse = 1.0;
                }
            }
        }
        tach
    }
}

/// Shaft frequency estimated from a tach pulse train, None with fewer than two pulses
pub fn shaft_hz_from_tach(tach: &[f64], sample_rate: f64) -> Option<f64> {
    let mut pulses = tach.iter().enumerate().filter(|(_, &v)| v >= 0.5).map(|(i, _)| i);
    let first = pulses.next()?;
    let (count, last) = pulses.fold((1usize, first), |(n, _), i| (n + 1, i));
    if count < 2 || last == first {
        return None;
    }
    let seconds = (last - first) as f64 / sample_rate;
    Some((count - 1) as f64 / seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::RampConfig;

    #[test]
    fn test_constant_profile() {
        let profile = RpmProfile::from_machine(&MachineConfig::new(1800.0), 100);
        assert_eq!(profile.rpm_at(0), 1800.0);
        assert_eq!(profile.rpm_at(99), 1800.0);
    }

    #[test]
    fn test_ramp_interpolates_end_to_end() {
        let mut machine = MachineConfig::new(1800.0);
        machine.ramp = Some(RampConfig { enabled: true, from_rpm: 600.0, to_rpm: 1200.0 });
        let profile = RpmProfile::from_machine(&machine, 101);

        assert_eq!(profile.rpm_at(0), 600.0);
        assert!((profile.rpm_at(50) - 900.0).abs() < 1e-9);
        assert_eq!(profile.rpm_at(100), 1200.0);
        assert_eq!(profile.mean_rpm(), 900.0);
    }

    #[test]
    fn test_tach_recovers_speed() {
        let fs = 4096.0;
        let profile = RpmProfile::Constant(1800.0);
        let tach = profile.tach_series(8192, fs);

        let pulses = tach.iter().filter(|&&v| v > 0.5).count();
        // 2 s at 30 Hz, plus the reference pulse
        assert!((60..=61).contains(&pulses));

        let hz = shaft_hz_from_tach(&tach, fs).unwrap();
        assert!((hz - 30.0).abs() < 0.5);
    }

    #[test]
    fn test_tach_without_pulses() {
        assert!(shaft_hz_from_tach(&[0.0; 16], 1000.0).is_none());
        assert!(shaft_hz_from_tach(&[1.0, 0.0, 0.0], 1000.0).is_none());
    }
}
