// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/rotorsim

//! Job orchestrator - runs synthesis then spectral analysis off the caller's thread,
//! keeping only the newest request

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use parking_lot::Mutex;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::engine::{SimulationResult, SpectralKey, SpectralPayload, SynthesisPayload};
use super::event_bus::{Event, EventBus, EventPayload, EventType};
use super::runner::{InlineRunner, JobRunner, OffloadedRunner};
use super::{OrchestratorStatus, PipelineState};
use crate::analysis::SpectrumResult;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};

/// Mutable bookkeeping guarded by one lock
#[derive(Default)]
struct Tracking {
    state: PipelineState,
    current_request: Option<Uuid>,
    /// Settings of the current request, needed to build its spectral job
    current_payload: Option<Arc<SynthesisPayload>>,
    current: Option<Arc<SimulationResult>>,
    last_spectral_key: Option<SpectralKey>,
    last_error: Option<(Uuid, EngineError)>,
}

/// Outcome of claiming the spectral key for a result
enum Claim {
    Ready(Arc<SynthesisPayload>),
    Duplicate,
    Stale,
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    completed: AtomicU64,
    discarded: AtomicU64,
    failed: AtomicU64,
    duplicate_dispatches: AtomicU64,
}

struct Inner {
    primary: Arc<dyn JobRunner>,
    inline: Arc<dyn JobRunner>,
    /// Set once on the first offload failure, never cleared
    fallback: AtomicBool,
    tracking: Mutex<Tracking>,
    counters: Counters,
    event_bus: EventBus,
}

/// Orchestrates synthesis and spectral jobs; cheap to clone
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

impl Orchestrator {
    /// Offloaded runner when enabled and startable, otherwise inline
    pub fn from_config(config: &EngineConfig) -> Self {
        if !config.offload {
            info!("Offloading disabled, running jobs inline");
            return Self::with_runner(Arc::new(InlineRunner), config.event_capacity);
        }

        match OffloadedRunner::spawn() {
            Ok(runner) => Self::with_runner(Arc::new(runner), config.event_capacity),
            Err(e) => {
                warn!("Could not start worker threads ({}), running jobs inline", e);
                let orchestrator = Self::with_runner(Arc::new(InlineRunner), config.event_capacity);
                orchestrator.inner.fallback.store(true, Ordering::Release);
                orchestrator
            }
        }
    }

    pub fn with_runner(runner: Arc<dyn JobRunner>, event_capacity: usize) -> Self {
        Self::with_runners(runner, Arc::new(InlineRunner), event_capacity)
    }

    fn with_runners(primary: Arc<dyn JobRunner>, inline: Arc<dyn JobRunner>, event_capacity: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                primary,
                inline,
                fallback: AtomicBool::new(false),
                tracking: Mutex::new(Tracking::default()),
                counters: Counters::default(),
                event_bus: EventBus::new(event_capacity),
            }),
        }
    }

    /// Start a run and return its request id immediately.
    ///
    /// Must be called from within a tokio runtime. Any earlier request still in
    /// flight becomes stale and its results are discarded.
    pub fn submit(&self, payload: SynthesisPayload) -> Uuid {
        let request_id = Uuid::new_v4();
        let payload = Arc::new(payload);
        {
            let mut tracking = self.inner.tracking.lock();
            tracking.state = PipelineState::SynthesizingRunning;
            tracking.current_request = Some(request_id);
            tracking.current_payload = Some(payload.clone());
        }
        self.inner.counters.submitted.fetch_add(1, Ordering::Relaxed);
        info!("Submitted request {}", request_id);

        let inner = self.inner.clone();
        tokio::spawn(async move {
            inner.run_request(request_id, payload).await;
        });

        request_id
    }

    /// Submit and wait until the request completes or fails
    pub async fn run(&self, payload: SynthesisPayload) -> EngineResult<Arc<SimulationResult>> {
        let mut events = self.subscribe();
        let request_id = self.submit(payload);

        loop {
            match events.recv().await {
                Ok(event) if event.request_id == request_id => match (event.event_type, event.payload) {
                    (EventType::Complete, EventPayload::Result(result)) => return Ok(result),
                    (EventType::Failed, EventPayload::Error { message }) => {
                        return Err(self.last_error_for(request_id).unwrap_or(EngineError::ExecutionContext(message)));
                    }
                    (EventType::Discarded, _) => {
                        return Err(EngineError::ExecutionContext("request superseded".to_string()));
                    }
                    _ => continue,
                },
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event receiver lagged by {} events", skipped);
                    if let Some(result) = self.current().filter(|r| r.request_id == request_id && r.spectrum.is_some()) {
                        return Ok(result);
                    }
                }
                Err(RecvError::Closed) => {
                    return Err(EngineError::ExecutionContext("event bus closed".to_string()));
                }
            }
        }
    }

    /// Dispatch the spectral stage for `result`.
    ///
    /// Returns false when that result already had a spectral job dispatched or no
    /// longer belongs to the current request.
    pub fn dispatch_spectral(&self, result: &Arc<SimulationResult>) -> bool {
        let claim = {
            let mut tracking = self.inner.tracking.lock();
            self.inner.claim_spectral(&mut tracking, result)
        };
        match claim {
            Claim::Ready(settings) => {
                self.inner.spawn_spectral(spectral_payload(result, &settings));
                true
            }
            Claim::Duplicate => false,
            Claim::Stale => {
                self.inner.discard(result.request_id, "dispatch");
                false
            }
        }
    }

    /// Latest published result, partial or complete
    pub fn current(&self) -> Option<Arc<SimulationResult>> {
        self.inner.tracking.lock().current.clone()
    }

    pub fn state(&self) -> PipelineState {
        self.inner.tracking.lock().state
    }

    pub fn is_fallback_latched(&self) -> bool {
        self.inner.fallback.load(Ordering::Acquire)
    }

    pub fn status(&self) -> OrchestratorStatus {
        let tracking = self.inner.tracking.lock();
        let counters = &self.inner.counters;
        OrchestratorStatus {
            state: tracking.state,
            current_request: tracking.current_request,
            fallback_latched: self.is_fallback_latched(),
            runner: self.inner.active_runner().0.name().to_string(),
            submitted: counters.submitted.load(Ordering::Relaxed),
            completed: counters.completed.load(Ordering::Relaxed),
            discarded: counters.discarded.load(Ordering::Relaxed),
            failed: counters.failed.load(Ordering::Relaxed),
            duplicate_dispatches: counters.duplicate_dispatches.load(Ordering::Relaxed),
            last_error: tracking.last_error.as_ref().map(|(_, e)| e.to_string()),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.event_bus.subscribe_events()
    }

    fn last_error_for(&self, request_id: Uuid) -> Option<EngineError> {
        self.inner.tracking.lock().last_error
            .as_ref()
            .filter(|(id, _)| *id == request_id)
            .map(|(_, e)| e.clone())
    }
}

impl Inner {
    /// Runner to use next, and whether it is the primary one
    fn active_runner(&self) -> (Arc<dyn JobRunner>, bool) {
        if self.fallback.load(Ordering::Acquire) {
            (self.inline.clone(), false)
        } else {
            (self.primary.clone(), true)
        }
    }

    fn latch_fallback(&self, stage: &str, err: &EngineError) {
        if !self.fallback.swap(true, Ordering::AcqRel) {
            warn!("{} stage failed on {} runner ({}), switching to inline", stage, self.primary.name(), err);
        }
    }

    async fn synthesize(&self, request_id: Uuid, payload: &SynthesisPayload) -> EngineResult<SimulationResult> {
        let (runner, primary) = self.active_runner();
        match runner.run_synthesis(request_id, payload.clone()).await {
            Err(err) if primary && err.is_execution_context() => {
                self.latch_fallback("synthesis", &err);
                self.inline.run_synthesis(request_id, payload.clone()).await
            }
            other => other,
        }
    }

    async fn analyze(&self, payload: SpectralPayload) -> EngineResult<SpectrumResult> {
        let (runner, primary) = self.active_runner();
        if !primary {
            return runner.run_spectral(payload).await;
        }
        match runner.run_spectral(payload.clone()).await {
            Err(err) if err.is_execution_context() => {
                self.latch_fallback("spectral", &err);
                self.inline.run_spectral(payload).await
            }
            other => other,
        }
    }

    async fn run_request(self: Arc<Self>, request_id: Uuid, payload: Arc<SynthesisPayload>) {
        let outcome = self.synthesize(request_id, &payload).await;

        let result = match outcome {
            Ok(result) => Arc::new(result),
            Err(err) => {
                self.fail(request_id, err);
                return;
            }
        };

        // Store the partial result and claim its key under one lock, before announcing it
        let claim = {
            let mut tracking = self.tracking.lock();
            if tracking.current_request == Some(request_id) {
                tracking.state = PipelineState::SynthesisReady;
                tracking.current = Some(result.clone());
                self.claim_spectral(&mut tracking, &result)
            } else {
                Claim::Stale
            }
        };

        match claim {
            Claim::Ready(settings) => {
                debug!("Synthesis ready for {}", request_id);
                let spectral = spectral_payload(&result, &settings);
                self.event_bus.publish_synthesis_ready(result);
                self.spawn_spectral(spectral);
            }
            Claim::Duplicate => self.event_bus.publish_synthesis_ready(result),
            Claim::Stale => self.discard(request_id, "synthesis"),
        }
    }

    /// Record the spectral key for `result` unless it was already dispatched or is stale
    fn claim_spectral(&self, tracking: &mut Tracking, result: &SimulationResult) -> Claim {
        let key = result.key();
        if tracking.last_spectral_key == Some(key) {
            self.counters.duplicate_dispatches.fetch_add(1, Ordering::Relaxed);
            debug!("Spectral job for {} already dispatched", key.request_id);
            return Claim::Duplicate;
        }
        if tracking.current_request != Some(key.request_id) {
            debug!("Not dispatching spectral job for stale request {}", key.request_id);
            return Claim::Stale;
        }
        let Some(settings) = tracking.current_payload.clone() else {
            return Claim::Stale;
        };
        tracking.last_spectral_key = Some(key);
        tracking.state = PipelineState::SpectrumRunning;
        Claim::Ready(settings)
    }

    fn spawn_spectral(self: &Arc<Self>, payload: SpectralPayload) {
        let inner = self.clone();
        tokio::spawn(async move {
            inner.run_spectral(payload).await;
        });
    }

    async fn run_spectral(self: Arc<Self>, payload: SpectralPayload) {
        let key = payload.key;
        match self.analyze(payload).await {
            Ok(spectrum) => self.merge(key, spectrum),
            Err(err) => self.fail(key.request_id, err),
        }
    }

    /// Attach the spectrum if its key still matches the current result
    fn merge(&self, key: SpectralKey, spectrum: SpectrumResult) {
        let merged = {
            let mut tracking = self.tracking.lock();
            let matches = tracking.current_request == Some(key.request_id)
                && tracking.current.as_ref().map(|r| r.key()) == Some(key);
            if !matches {
                None
            } else {
                let merged = tracking.current
                    .as_ref()
                    .map(|current| Arc::new(current.as_ref().clone().with_spectrum(spectrum)));
                if let Some(result) = &merged {
                    tracking.current = Some(result.clone());
                    tracking.state = PipelineState::Complete;
                }
                merged
            }
        };

        match merged {
            Some(result) => {
                self.counters.completed.fetch_add(1, Ordering::Relaxed);
                info!("Request {} complete", key.request_id);
                self.event_bus.publish_complete(result);
            }
            None => self.discard(key.request_id, "spectral"),
        }
    }

    fn discard(&self, request_id: Uuid, stage: &str) {
        self.counters.discarded.fetch_add(1, Ordering::Relaxed);
        debug!("Discarding stale {} result for {}", stage, request_id);
        self.event_bus.publish_discarded(request_id, stage);
    }

    fn fail(&self, request_id: Uuid, err: EngineError) {
        let message = err.to_string();
        {
            let mut tracking = self.tracking.lock();
            if tracking.current_request != Some(request_id) {
                drop(tracking);
                self.discard(request_id, "failed");
                return;
            }
            tracking.state = PipelineState::Error;
            tracking.last_error = Some((request_id, err));
        }
        error!("Request {} failed: {}", request_id, message);
        self.counters.failed.fetch_add(1, Ordering::Relaxed);
        self.event_bus.publish_failed(request_id, &message);
    }
}

fn spectral_payload(result: &SimulationResult, settings: &SynthesisPayload) -> SpectralPayload {
    SpectralPayload::from_result(result, &settings.synthesis, &settings.analysis, settings.machine.units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use async_trait::async_trait;
    use crate::core::engine::{run_spectral_analysis, run_synthesis};
    use crate::core::runner::run_blocking;
    use crate::error::ConfigurationError;
    use crate::faults::{FaultConfig, FaultKind};
    use crate::machine::{AnalysisSettings, MachineConfig, SynthesisParams, MAX_SAMPLES};
    use crate::sensors::{Axis, MountLocation, Sensor};

    const WAIT: Duration = Duration::from_secs(10);

    fn payload(seed: u64) -> SynthesisPayload {
        SynthesisPayload::new(
            MachineConfig::default(),
            vec![
                Sensor::new("de-x", MountLocation::DriveEnd, Axis::X),
                Sensor::new("de-y", MountLocation::DriveEnd, Axis::Y),
            ],
            FaultConfig::new(FaultKind::Unbalance, 0.5),
            SynthesisParams {
                sample_rate: 2048.0,
                seconds: 1.0,
                seed,
                block_size: 512,
                ..SynthesisParams::default()
            },
            AnalysisSettings::default(),
        )
    }

    /// Delays the spectral job of one chosen request
    #[derive(Default)]
    struct SlowSpectral {
        slow: parking_lot::Mutex<Option<Uuid>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl JobRunner for SlowSpectral {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn run_synthesis(&self, request_id: Uuid, payload: SynthesisPayload) -> EngineResult<SimulationResult> {
            run_synthesis(request_id, &payload)
        }

        async fn run_spectral(&self, payload: SpectralPayload) -> EngineResult<SpectrumResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if *self.slow.lock() == Some(payload.key.request_id) {
                tokio::time::sleep(Duration::from_millis(300)).await;
            }
            Ok(run_spectral_analysis(&payload))
        }
    }

    /// Offload that is never available
    struct BrokenRunner;

    #[async_trait]
    impl JobRunner for BrokenRunner {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn run_synthesis(&self, _: Uuid, _: SynthesisPayload) -> EngineResult<SimulationResult> {
            Err(EngineError::ExecutionContext("worker unavailable".to_string()))
        }

        async fn run_spectral(&self, _: SpectralPayload) -> EngineResult<SpectrumResult> {
            Err(EngineError::ExecutionContext("worker unavailable".to_string()))
        }
    }

    /// Delays the synthesis job of one chosen request, optionally failing it afterwards
    #[derive(Default)]
    struct SlowSynthesis {
        slow: parking_lot::Mutex<Option<Uuid>>,
        fail_slow: bool,
    }

    #[async_trait]
    impl JobRunner for SlowSynthesis {
        fn name(&self) -> &'static str {
            "slow-synthesis"
        }

        async fn run_synthesis(&self, request_id: Uuid, payload: SynthesisPayload) -> EngineResult<SimulationResult> {
            if *self.slow.lock() == Some(request_id) {
                tokio::time::sleep(Duration::from_millis(300)).await;
                if self.fail_slow {
                    return Err(ConfigurationError::NoSensors.into());
                }
            }
            run_synthesis(request_id, &payload)
        }

        async fn run_spectral(&self, payload: SpectralPayload) -> EngineResult<SpectrumResult> {
            Ok(run_spectral_analysis(&payload))
        }
    }

    /// Synthesis works, the spectral context does not
    struct SpectralBroken;

    #[async_trait]
    impl JobRunner for SpectralBroken {
        fn name(&self) -> &'static str {
            "spectral-broken"
        }

        async fn run_synthesis(&self, request_id: Uuid, payload: SynthesisPayload) -> EngineResult<SimulationResult> {
            run_synthesis(request_id, &payload)
        }

        async fn run_spectral(&self, _: SpectralPayload) -> EngineResult<SpectrumResult> {
            Err(EngineError::ExecutionContext("worker unavailable".to_string()))
        }
    }

    /// Fallback whose jobs panic
    struct PanickingRunner;

    #[async_trait]
    impl JobRunner for PanickingRunner {
        fn name(&self) -> &'static str {
            "panicking"
        }

        async fn run_synthesis(&self, _: Uuid, _: SynthesisPayload) -> EngineResult<SimulationResult> {
            run_blocking::<SimulationResult, _>(|| panic!("capacity overflow")).await
        }

        async fn run_spectral(&self, _: SpectralPayload) -> EngineResult<SpectrumResult> {
            run_blocking::<SpectrumResult, _>(|| panic!("capacity overflow")).await
        }
    }

    /// Wait for the `Discarded` event of `request_id` and return its stage
    async fn discarded_stage(events: &mut broadcast::Receiver<Event>, request_id: Uuid) -> String {
        loop {
            let event = events.recv().await.unwrap();
            if event.request_id != request_id || event.event_type != EventType::Discarded {
                continue;
            }
            match event.payload {
                EventPayload::Stale { stage } => return stage,
                other => panic!("unexpected payload {:?}", other),
            }
        }
    }

    /// Wait until `completed` finishes and `stale` is discarded, in either order
    async fn complete_and_discard(events: &mut broadcast::Receiver<Event>, completed: Uuid, stale: Uuid) -> String {
        let (mut done, mut stage) = (false, None);
        while !(done && stage.is_some()) {
            let event = events.recv().await.unwrap();
            match (event.event_type, event.payload) {
                (EventType::Complete, _) => {
                    assert_eq!(event.request_id, completed);
                    done = true;
                }
                (EventType::Discarded, EventPayload::Stale { stage: s }) if event.request_id == stale => {
                    stage = Some(s);
                }
                _ => {}
            }
        }
        stage.unwrap_or_default()
    }

    #[tokio::test]
    async fn test_newest_request_wins() {
        let runner = Arc::new(SlowSpectral::default());
        let orchestrator = Orchestrator::with_runner(runner.clone(), 64);
        let mut events = orchestrator.subscribe();

        // Single-threaded test runtime: nothing runs before the id is recorded
        let first = orchestrator.submit(payload(1));
        *runner.slow.lock() = Some(first);
        // Wait until the first request's spectral job is in flight
        tokio::time::timeout(WAIT, async {
            loop {
                let event = events.recv().await.unwrap();
                if event.request_id == first && event.event_type == EventType::SynthesisReady {
                    break;
                }
            }
        })
        .await
        .unwrap();

        let second = orchestrator.submit(payload(2));

        tokio::time::timeout(WAIT, async {
            let (mut completed, mut discarded) = (false, false);
            while !(completed && discarded) {
                let event = events.recv().await.unwrap();
                match event.event_type {
                    EventType::Complete => {
                        assert_eq!(event.request_id, second);
                        completed = true;
                    }
                    EventType::Discarded if event.request_id == first => discarded = true,
                    _ => {}
                }
            }
        })
        .await
        .unwrap();

        let current = orchestrator.current().unwrap();
        assert_eq!(current.request_id, second);
        assert!(current.spectrum.is_some());
        assert_eq!(orchestrator.state(), PipelineState::Complete);
        assert!(orchestrator.status().discarded >= 1);
        assert_eq!(runner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fallback_latches_to_inline() {
        let orchestrator = Orchestrator::with_runner(Arc::new(BrokenRunner), 64);
        assert!(!orchestrator.is_fallback_latched());

        let result = tokio::time::timeout(WAIT, orchestrator.run(payload(3))).await.unwrap().unwrap();
        assert!(result.spectrum.is_some());
        assert!(orchestrator.is_fallback_latched());
        assert_eq!(orchestrator.status().runner, "inline");

        // Stays latched for later requests
        tokio::time::timeout(WAIT, orchestrator.run(payload(4))).await.unwrap().unwrap();
        assert!(orchestrator.is_fallback_latched());
    }

    #[tokio::test]
    async fn test_duplicate_dispatch_skipped() {
        let orchestrator = Orchestrator::with_runner(Arc::new(InlineRunner), 64);
        let result = tokio::time::timeout(WAIT, orchestrator.run(payload(5))).await.unwrap().unwrap();

        assert!(!orchestrator.dispatch_spectral(&result));
        assert_eq!(orchestrator.status().duplicate_dispatches, 1);
        assert_eq!(orchestrator.state(), PipelineState::Complete);
    }

    #[tokio::test]
    async fn test_configuration_error_not_retried() {
        let orchestrator = Orchestrator::with_runner(Arc::new(InlineRunner), 64);
        let mut bad = payload(6);
        bad.sensors.clear();

        let err = tokio::time::timeout(WAIT, orchestrator.run(bad)).await.unwrap().unwrap_err();
        assert!(matches!(err, EngineError::Configuration(ConfigurationError::NoSensors)));
        assert_eq!(orchestrator.state(), PipelineState::Error);
        assert!(!orchestrator.is_fallback_latched());
        assert_eq!(orchestrator.status().failed, 1);
    }

    #[tokio::test]
    async fn test_offloaded_runs_are_reproducible() {
        let orchestrator = Orchestrator::from_config(&EngineConfig::default());
        let a = tokio::time::timeout(WAIT, orchestrator.run(payload(9))).await.unwrap().unwrap();
        let b = tokio::time::timeout(WAIT, orchestrator.run(payload(9))).await.unwrap().unwrap();

        assert_ne!(a.request_id, b.request_id);
        assert_eq!(a.time, b.time);

        let spectrum = b.spectrum.as_ref().unwrap();
        assert_eq!(spectrum.frequencies.len(), 256);
        for id in &b.sensor_ids {
            assert_eq!(b.time[id].len(), 2048);
            assert_eq!(spectrum.magnitude[id].len(), 256);
        }
        assert_eq!(orchestrator.status().completed, 2);
    }

    #[tokio::test]
    async fn test_stale_synthesis_discarded() {
        let runner = Arc::new(SlowSynthesis::default());
        let orchestrator = Orchestrator::with_runner(runner.clone(), 64);
        let mut events = orchestrator.subscribe();

        let first = orchestrator.submit(payload(10));
        *runner.slow.lock() = Some(first);
        let second = orchestrator.submit(payload(11));

        let stage = tokio::time::timeout(WAIT, complete_and_discard(&mut events, second, first)).await.unwrap();
        assert_eq!(stage, "synthesis");

        let current = orchestrator.current().unwrap();
        assert_eq!(current.request_id, second);
        assert_eq!(orchestrator.state(), PipelineState::Complete);
        let status = orchestrator.status();
        assert_eq!(status.completed, 1);
        assert_eq!(status.discarded, 1);
    }

    #[tokio::test]
    async fn test_stale_failure_keeps_newer_state() {
        let runner = Arc::new(SlowSynthesis {
            fail_slow: true,
            ..SlowSynthesis::default()
        });
        let orchestrator = Orchestrator::with_runner(runner.clone(), 64);
        let mut events = orchestrator.subscribe();

        let first = orchestrator.submit(payload(12));
        *runner.slow.lock() = Some(first);
        let second = orchestrator.submit(payload(13));

        let stage = tokio::time::timeout(WAIT, complete_and_discard(&mut events, second, first)).await.unwrap();
        assert_eq!(stage, "failed");
        assert_eq!(orchestrator.state(), PipelineState::Complete);
        let status = orchestrator.status();
        assert_eq!(status.failed, 0);
        assert!(status.last_error.is_none());
    }

    #[tokio::test]
    async fn test_spectral_failure_retried_inline() {
        let orchestrator = Orchestrator::with_runner(Arc::new(SpectralBroken), 64);

        let result = tokio::time::timeout(WAIT, orchestrator.run(payload(14))).await.unwrap().unwrap();
        assert!(result.spectrum.is_some());
        assert!(orchestrator.is_fallback_latched());

        let status = orchestrator.status();
        assert_eq!(status.runner, "inline");
        assert_eq!(status.completed, 1);
        assert_eq!(status.failed, 0);
    }

    #[tokio::test]
    async fn test_panicking_retry_surfaces_error() {
        let orchestrator = Orchestrator::with_runners(Arc::new(BrokenRunner), Arc::new(PanickingRunner), 64);

        let err = tokio::time::timeout(WAIT, orchestrator.run(payload(15))).await.unwrap().unwrap_err();
        assert!(err.is_execution_context());
        assert!(err.to_string().contains("capacity overflow"));
        assert_eq!(orchestrator.state(), PipelineState::Error);
        assert!(orchestrator.is_fallback_latched());
        assert_eq!(orchestrator.status().failed, 1);
    }

    #[tokio::test]
    async fn test_oversized_duration_truncated() {
        let orchestrator = Orchestrator::from_config(&EngineConfig::default());
        let mut long = payload(16);
        long.sensors.truncate(1);
        long.synthesis.seconds = 1e30;

        let result = tokio::time::timeout(Duration::from_secs(60), orchestrator.run(long))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.len(), MAX_SAMPLES);
        assert!(result.spectrum.is_some());
        assert!(!orchestrator.is_fallback_latched());
    }

    #[tokio::test]
    async fn test_stale_dispatch_publishes_discarded() {
        let orchestrator = Orchestrator::with_runner(Arc::new(InlineRunner), 64);
        let first = tokio::time::timeout(WAIT, orchestrator.run(payload(17))).await.unwrap().unwrap();
        tokio::time::timeout(WAIT, orchestrator.run(payload(18))).await.unwrap().unwrap();

        let mut events = orchestrator.subscribe();
        assert!(!orchestrator.dispatch_spectral(&first));
        let stage = tokio::time::timeout(WAIT, discarded_stage(&mut events, first.request_id)).await.unwrap();
        assert_eq!(stage, "dispatch");

        let status = orchestrator.status();
        assert_eq!(status.discarded, 1);
        assert_eq!(status.duplicate_dispatches, 0);
        assert_eq!(orchestrator.state(), PipelineState::Complete);
    }
}
