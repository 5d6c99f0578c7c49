// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/rotorsim

//! Engine error taxonomy

use thiserror::Error;

use crate::faults::FaultKind;

/// Input the engine cannot turn into a plausible run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("fault '{0}' requires bearing geometry")]
    MissingBearingGeometry(FaultKind),

    #[error("fault '{0}' requires gear geometry")]
    MissingGearGeometry(FaultKind),

    #[error("at least one sensor is required")]
    NoSensors,

    #[error("sensor id '{0}' is used more than once")]
    DuplicateSensorId(String),
}

/// Errors surfaced by the synthesis and spectral stages
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The offloaded execution context failed to start or threw while handling a job
    #[error("execution context error: {0}")]
    ExecutionContext(String),
}

impl EngineError {
    pub fn is_execution_context(&self) -> bool {
        matches!(self, EngineError::ExecutionContext(_))
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
