// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/rotorsim

//! Engine entry points - the synthesis and spectral stages as pure functions

use std::collections::{BTreeMap, HashSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::analysis::{
    compute_spectrum, compute_stats, derive_motion, envelope, MotionDescriptor, SignalStats,
    SpectrumResult, SpectrumSettings, WindowKind,
};
use crate::error::{ConfigurationError, EngineResult};
use crate::faults::{build_fault_plan, FaultConfig, FaultKind, FrequencyMarker, VisualCue};
use crate::machine::{AnalysisSettings, MachineConfig, SynthesisParams};
use crate::sensors::{
    shaft_hz_from_tach, RpmProfile, SeededRng, Sensor, SensorSimulator, SignalContent, MAX_SENSORS,
};
use crate::units::{self, resolve_block_size, DisplayUnits};

/// Everything the synthesis stage needs, moved into the job by value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisPayload {
    pub machine: MachineConfig,
    pub sensors: Vec<Sensor>,
    pub fault: FaultConfig,
    pub synthesis: SynthesisParams,
    pub analysis: AnalysisSettings,
    /// Multiplies every time-domain sample
    pub amplitude_scale: f64,
}

impl SynthesisPayload {
    /// Payload with the amplitude scale taken from the machine's display units
    pub fn new(
        machine: MachineConfig,
        sensors: Vec<Sensor>,
        fault: FaultConfig,
        synthesis: SynthesisParams,
        analysis: AnalysisSettings,
    ) -> Self {
        let amplitude_scale = machine.units.amplitude_scale();
        Self {
            machine,
            sensors,
            fault,
            synthesis,
            analysis,
            amplitude_scale,
        }
    }
}

/// Identifies the synthesis output a spectral job belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpectralKey {
    pub request_id: Uuid,
    pub generated_at: DateTime<Utc>,
}

/// Output of one run. Append-only: the spectral stage may only attach `spectrum`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub request_id: Uuid,
    pub sample_rate: f64,
    /// Input order
    pub sensor_ids: Vec<String>,
    pub time: BTreeMap<String, Vec<f64>>,
    pub stats: BTreeMap<String, SignalStats>,
    pub tach: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub envelope: Option<BTreeMap<String, Vec<f64>>>,
    pub motion: MotionDescriptor,
    pub generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spectrum: Option<SpectrumResult>,
    pub markers: Vec<FrequencyMarker>,
    /// None when the fault id fell back to the healthy plan
    pub fault: Option<FaultKind>,
    /// Mean shaft frequency of the speed profile
    pub shaft_hz: f64,
}

impl SimulationResult {
    pub fn key(&self) -> SpectralKey {
        SpectralKey {
            request_id: self.request_id,
            generated_at: self.generated_at,
        }
    }

    /// Samples per sensor
    pub fn len(&self) -> usize {
        self.tach.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tach.is_empty()
    }

    pub fn cue(&self) -> &VisualCue {
        &self.motion.cue
    }

    /// Attach the spectrum; nothing else changes
    pub fn with_spectrum(mut self, spectrum: SpectrumResult) -> Self {
        self.spectrum = Some(spectrum);
        self
    }
}

/// Everything the spectral stage needs, copied out of a synthesis result
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralPayload {
    pub key: SpectralKey,
    pub time: BTreeMap<String, Vec<f64>>,
    pub tach: Vec<f64>,
    pub sample_rate: f64,
    pub window: WindowKind,
    pub averages: usize,
    pub block_size: usize,
    pub envelope: Option<BTreeMap<String, Vec<f64>>>,
    pub velocity: bool,
    pub velocity_scale: f64,
    pub order_tracking: bool,
    /// Used when the tach carries fewer than two pulses
    pub nominal_shaft_hz: f64,
}

impl SpectralPayload {
    pub fn from_result(
        result: &SimulationResult,
        synthesis: &SynthesisParams,
        analysis: &AnalysisSettings,
        display: DisplayUnits,
    ) -> Self {
        let velocity = synthesis.integrate_velocity || analysis.velocity || display.is_velocity();
        Self {
            key: result.key(),
            time: result.time.clone(),
            tach: result.tach.clone(),
            sample_rate: result.sample_rate,
            window: analysis.window,
            averages: analysis.averages.max(1),
            block_size: resolve_block_size(synthesis.block_size, analysis.lines),
            envelope: result.envelope.clone(),
            velocity,
            velocity_scale: if velocity { display.velocity_scale() } else { 1.0 },
            order_tracking: analysis.order_tracking,
            nominal_shaft_hz: result.shaft_hz,
        }
    }
}

/// Keep at most [`MAX_SENSORS`] sensors and reject empty or ambiguous sets
pub fn validate_sensors(sensors: &[Sensor]) -> Result<Vec<Sensor>, ConfigurationError> {
    if sensors.is_empty() {
        return Err(ConfigurationError::NoSensors);
    }
    if sensors.len() > MAX_SENSORS {
        warn!("{} sensors supplied, using the first {}", sensors.len(), MAX_SENSORS);
    }

    let used: Vec<Sensor> = sensors.iter().take(MAX_SENSORS).cloned().collect();
    let mut seen = HashSet::new();
    for sensor in &used {
        if !seen.insert(sensor.id.as_str()) {
            return Err(ConfigurationError::DuplicateSensorId(sensor.id.clone()));
        }
    }
    Ok(used)
}

/// Synthesis stage: fault plan, per-sensor traces, tach, stats, envelope, motion
pub fn run_synthesis(request_id: Uuid, payload: &SynthesisPayload) -> EngineResult<SimulationResult> {
    let sensors = validate_sensors(&payload.sensors)?;
    let plan = build_fault_plan(&payload.machine, &payload.fault, &sensors)?;

    let fs = payload.synthesis.clamped_sample_rate();
    let samples = payload.synthesis.sample_count();
    let profile = RpmProfile::from_machine(&payload.machine, samples);
    let simulator = SensorSimulator::new(samples, fs, profile);

    let noise_rms = payload.synthesis.noise_rms.max(0.0) + plan.broadband_rms;
    let scale = if payload.amplitude_scale.is_finite() { payload.amplitude_scale } else { 1.0 };

    // One stream per run, consumed sensor by sensor in input order
    let mut rng = SeededRng::new(payload.synthesis.seed);
    let content = SignalContent::from(&plan);

    let sensor_ids: Vec<String> = sensors.iter().map(|s| s.id.clone()).collect();
    let mut time = BTreeMap::new();
    let mut stats = BTreeMap::new();
    for sensor in &sensors {
        let mut data = simulator.synthesize(content, sensor, noise_rms, &mut rng);
        if scale != 1.0 {
            data.iter_mut().for_each(|x| *x *= scale);
        }
        stats.insert(sensor.id.clone(), compute_stats(&data));
        time.insert(sensor.id.clone(), data);
    }

    let tach = profile.tach_series(samples, fs);

    let envelopes = payload.analysis.envelope.then(|| {
        time.iter()
            .map(|(id, data)| (id.clone(), envelope(data)))
            .collect::<BTreeMap<_, _>>()
    });

    let motion = derive_motion(&plan, &time, &sensor_ids, payload.fault.clamped_severity());

    debug!(
        "Synthesized {} x {} samples at {} Hz for {}",
        sensor_ids.len(),
        samples,
        fs,
        plan.kind.map(|k| k.id()).unwrap_or("healthy")
    );

    Ok(SimulationResult {
        request_id,
        sample_rate: fs,
        sensor_ids,
        time,
        stats,
        tach,
        envelope: envelopes,
        motion,
        generated_at: Utc::now(),
        spectrum: None,
        markers: plan.markers,
        fault: plan.kind,
        shaft_hz: units::rpm_to_hz(profile.mean_rpm()),
    })
}

/// Spectral stage: averaged spectra, envelope spectra and the optional order axis
pub fn run_spectral_analysis(payload: &SpectralPayload) -> SpectrumResult {
    let settings = SpectrumSettings {
        sample_rate: payload.sample_rate,
        window: payload.window,
        block_size: payload.block_size,
        averages: payload.averages,
        velocity: payload.velocity,
        velocity_scale: payload.velocity_scale,
    };

    let spectrum = compute_spectrum(&payload.time, settings, payload.envelope.as_ref());

    if payload.order_tracking {
        let shaft_hz = shaft_hz_from_tach(&payload.tach, payload.sample_rate)
            .unwrap_or(payload.nominal_shaft_hz);
        spectrum.with_orders(shaft_hz)
    } else {
        spectrum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::faults::{BearingGeometry, FaultKind};
    use crate::sensors::{Axis, MountLocation};

    fn payload(kind: FaultKind) -> SynthesisPayload {
        let sensors = vec![
            Sensor::new("de-x", MountLocation::DriveEnd, Axis::X),
            Sensor::new("de-y", MountLocation::DriveEnd, Axis::Y),
        ];
        let synthesis = SynthesisParams {
            sample_rate: 4096.0,
            seconds: 1.0,
            seed: 7,
            noise_rms: 0.0,
            block_size: 1024,
            integrate_velocity: false,
        };
        let fault = FaultConfig::new(kind, 1.0)
            .with_bearing(BearingGeometry::new(8, 120.0, 15.0, 15.0));
        SynthesisPayload::new(
            MachineConfig::new(1800.0),
            sensors,
            fault,
            synthesis,
            AnalysisSettings::default(),
        )
    }

    fn spectral(result: &SimulationResult, p: &SynthesisPayload) -> SpectralPayload {
        SpectralPayload::from_result(result, &p.synthesis, &p.analysis, p.machine.units)
    }

    #[test]
    fn test_deterministic_for_seed() {
        let p = payload(FaultKind::Looseness);
        let a = run_synthesis(Uuid::new_v4(), &p).unwrap();
        let b = run_synthesis(Uuid::new_v4(), &p).unwrap();
        assert_eq!(a.time, b.time);
        assert_eq!(a.tach, b.tach);

        let mut other = p.clone();
        other.synthesis.seed = 8;
        let c = run_synthesis(Uuid::new_v4(), &other).unwrap();
        assert_ne!(a.time, c.time);
    }

    #[test]
    fn test_buffer_lengths() {
        let mut p = payload(FaultKind::BearingBpfo);
        p.synthesis.sample_rate = 1000.0;
        p.synthesis.seconds = 1.5;
        p.analysis.envelope = true;
        let result = run_synthesis(Uuid::new_v4(), &p).unwrap();

        assert_eq!(result.len(), 1500);
        for id in &result.sensor_ids {
            assert_eq!(result.time[id].len(), 1500);
            assert_eq!(result.envelope.as_ref().unwrap()[id].len(), 1500);
        }
        assert_eq!(result.sensor_ids, vec!["de-x".to_string(), "de-y".to_string()]);
        assert!(result.spectrum.is_none());
        assert!(!result.markers.is_empty());
    }

    #[test]
    fn test_sensor_validation() {
        let mut p = payload(FaultKind::Unbalance);
        p.sensors.clear();
        let err = run_synthesis(Uuid::new_v4(), &p).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(ConfigurationError::NoSensors)));

        let mut p = payload(FaultKind::Unbalance);
        p.sensors[1].id = "de-x".to_string();
        let err = run_synthesis(Uuid::new_v4(), &p).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Configuration(ConfigurationError::DuplicateSensorId(ref id)) if id == "de-x"
        ));

        let mut p = payload(FaultKind::Unbalance);
        for i in 0..4 {
            p.sensors.push(Sensor::new(&format!("extra-{}", i), MountLocation::Base, Axis::Z));
        }
        let result = run_synthesis(Uuid::new_v4(), &p).unwrap();
        assert_eq!(result.sensor_ids.len(), MAX_SENSORS);
    }

    #[test]
    fn test_missing_geometry_propagates() {
        let mut p = payload(FaultKind::BearingBpfi);
        p.fault.bearing = None;
        let err = run_synthesis(Uuid::new_v4(), &p).unwrap_err();
        assert!(!err.is_execution_context());
    }

    #[test]
    fn test_unbalance_peak_at_running_speed() {
        let p = payload(FaultKind::Unbalance);
        let result = run_synthesis(Uuid::new_v4(), &p).unwrap();
        let spectrum = run_spectral_analysis(&spectral(&result, &p));

        assert_eq!(spectrum.frequencies.len(), 512);
        let (freq, mag) = spectrum.peak("de-x").unwrap();
        assert!((freq - 30.0).abs() <= 4.0, "peak at {}", freq);
        assert!(mag > 1.0);
    }

    #[test]
    fn test_amplitude_scale_applies_to_time_domain() {
        let p = payload(FaultKind::Unbalance);
        let mut scaled = p.clone();
        scaled.amplitude_scale = 0.5;

        let a = run_synthesis(Uuid::new_v4(), &p).unwrap();
        let b = run_synthesis(Uuid::new_v4(), &scaled).unwrap();
        let ra = a.stats["de-x"].rms;
        let rb = b.stats["de-x"].rms;
        assert!((rb - 0.5 * ra).abs() < 1e-9);
    }

    #[test]
    fn test_order_axis_from_tach() {
        let mut p = payload(FaultKind::Unbalance);
        p.analysis.order_tracking = true;
        let result = run_synthesis(Uuid::new_v4(), &p).unwrap();
        let spectrum = run_spectral_analysis(&spectral(&result, &p));

        let orders = spectrum.orders.unwrap();
        // 4 Hz bins at a ~30 Hz shaft
        assert!((orders[15] - 2.0).abs() < 0.05, "order {}", orders[15]);
    }

    #[test]
    fn test_velocity_units() {
        let mut p = payload(FaultKind::Unbalance);
        p.machine.units = DisplayUnits::MmS;
        let result = run_synthesis(Uuid::new_v4(), &p).unwrap();
        let sp = spectral(&result, &p);
        assert!(sp.velocity);
        assert_eq!(sp.velocity_scale, 1000.0);

        let spectrum = run_spectral_analysis(&sp);
        assert!(spectrum.meta.velocity);
    }

    #[test]
    fn test_lines_override_block_size() {
        let mut p = payload(FaultKind::Unbalance);
        p.analysis.lines = 400;
        let result = run_synthesis(Uuid::new_v4(), &p).unwrap();
        let spectrum = run_spectral_analysis(&spectral(&result, &p));
        assert_eq!(spectrum.meta.block_size, 1024);
        assert_eq!(spectrum.frequencies.len(), 512);
    }
}
