//! Core module - engine stages, runners and the job orchestrator

mod engine;
mod event_bus;
mod orchestrator;
mod runner;

pub use engine::{
    run_spectral_analysis, run_synthesis, validate_sensors, SimulationResult, SpectralKey,
    SpectralPayload, SynthesisPayload,
};
pub use event_bus::{Event, EventBus, EventPayload, EventType};
pub use orchestrator::Orchestrator;
pub use runner::{InlineRunner, JobRunner, OffloadedRunner, WorkerMessage, WorkerReply};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where the current request is in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PipelineState {
    #[default]
    Idle,
    SynthesizingRunning,
    SynthesisReady,
    SpectrumRunning,
    Complete,
    Error,
}

/// Orchestrator snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorStatus {
    pub state: PipelineState,
    pub current_request: Option<Uuid>,
    pub fallback_latched: bool,
    /// Name of the runner the next job will use
    pub runner: String,
    pub submitted: u64,
    pub completed: u64,
    pub discarded: u64,
    pub failed: u64,
    pub duplicate_dispatches: u64,
    pub last_error: Option<String>,
}
