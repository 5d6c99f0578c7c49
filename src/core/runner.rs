// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/rotorsim

//! Job runners - where the synthesis and spectral stages execute

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};
use async_trait::async_trait;
use crossbeam::channel::{self, Receiver, Sender};
use tokio::sync::oneshot;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::engine::{run_spectral_analysis, run_synthesis, SimulationResult, SpectralKey, SpectralPayload, SynthesisPayload};
use crate::analysis::SpectrumResult;
use crate::error::{EngineError, EngineResult};

/// Executes engine stages on some execution context
#[async_trait]
pub trait JobRunner: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run_synthesis(&self, request_id: Uuid, payload: SynthesisPayload) -> EngineResult<SimulationResult>;

    async fn run_spectral(&self, payload: SpectralPayload) -> EngineResult<SpectrumResult>;
}

/// Runs both stages on the calling runtime's blocking pool
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineRunner;

#[async_trait]
impl JobRunner for InlineRunner {
    fn name(&self) -> &'static str {
        "inline"
    }

    async fn run_synthesis(&self, request_id: Uuid, payload: SynthesisPayload) -> EngineResult<SimulationResult> {
        run_blocking(move || run_synthesis(request_id, &payload)).await
    }

    async fn run_spectral(&self, payload: SpectralPayload) -> EngineResult<SpectrumResult> {
        run_blocking(move || Ok(run_spectral_analysis(&payload))).await
    }
}

/// Run a CPU-bound job off the async workers; a panic comes back as `ExecutionContext`
pub(crate) async fn run_blocking<T, F>(job: F) -> EngineResult<T>
where
    F: FnOnce() -> EngineResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job).await.map_err(|e| {
        if e.is_panic() {
            EngineError::ExecutionContext(panic_message(e.into_panic()))
        } else {
            EngineError::ExecutionContext(format!("job cancelled: {}", e))
        }
    })?
}

/// Message sent to a worker thread
pub enum WorkerMessage {
    Synthesis {
        request_id: Uuid,
        payload: SynthesisPayload,
        reply: oneshot::Sender<WorkerReply>,
    },
    Spectral {
        payload: SpectralPayload,
        reply: oneshot::Sender<WorkerReply>,
    },
}

/// Worker answer, tagged with the request it belongs to
#[derive(Debug)]
pub enum WorkerReply {
    Synthesis {
        request_id: Uuid,
        result: Box<SimulationResult>,
    },
    Spectral {
        key: SpectralKey,
        spectrum: Box<SpectrumResult>,
    },
    Failed {
        request_id: Uuid,
        error: EngineError,
    },
}

/// Runs each stage on its own dedicated worker thread
pub struct OffloadedRunner {
    synthesis_tx: Sender<WorkerMessage>,
    spectral_tx: Sender<WorkerMessage>,
    handles: Vec<JoinHandle<()>>,
}

impl OffloadedRunner {
    /// Start the synthesis and spectral workers
    pub fn spawn() -> EngineResult<Self> {
        let (synthesis_tx, synthesis_rx) = channel::unbounded();
        let (spectral_tx, spectral_rx) = channel::unbounded();

        let handles = vec![
            spawn_worker("rotorsim-synthesis", synthesis_rx)?,
            spawn_worker("rotorsim-spectral", spectral_rx)?,
        ];
        info!("Offloaded runner started with {} workers", handles.len());

        Ok(Self {
            synthesis_tx,
            spectral_tx,
            handles,
        })
    }

    /// Close both queues and wait for the workers to drain
    pub fn shutdown(self) {
        let Self { synthesis_tx, spectral_tx, handles } = self;
        drop(synthesis_tx);
        drop(spectral_tx);
        for handle in handles {
            if handle.join().is_err() {
                error!("Worker thread exited abnormally");
            }
        }
    }

    async fn dispatch(
        tx: &Sender<WorkerMessage>,
        make: impl FnOnce(oneshot::Sender<WorkerReply>) -> WorkerMessage,
    ) -> EngineResult<WorkerReply> {
        let (reply_tx, reply_rx) = oneshot::channel();
        tx.send(make(reply_tx))
            .map_err(|_| EngineError::ExecutionContext("worker queue closed".to_string()))?;
        reply_rx
            .await
            .map_err(|_| EngineError::ExecutionContext("worker dropped the reply".to_string()))
    }
}

#[async_trait]
impl JobRunner for OffloadedRunner {
    fn name(&self) -> &'static str {
        "offloaded"
    }

    async fn run_synthesis(&self, request_id: Uuid, payload: SynthesisPayload) -> EngineResult<SimulationResult> {
        let reply = Self::dispatch(&self.synthesis_tx, |reply| WorkerMessage::Synthesis {
            request_id,
            payload,
            reply,
        })
        .await?;

        match reply {
            WorkerReply::Synthesis { result, .. } => Ok(*result),
            WorkerReply::Failed { error, .. } => Err(error),
            WorkerReply::Spectral { .. } => Err(EngineError::ExecutionContext(
                "synthesis worker answered with a spectrum".to_string(),
            )),
        }
    }

    async fn run_spectral(&self, payload: SpectralPayload) -> EngineResult<SpectrumResult> {
        let reply = Self::dispatch(&self.spectral_tx, |reply| WorkerMessage::Spectral { payload, reply }).await?;

        match reply {
            WorkerReply::Spectral { spectrum, .. } => Ok(*spectrum),
            WorkerReply::Failed { error, .. } => Err(error),
            WorkerReply::Synthesis { .. } => Err(EngineError::ExecutionContext(
                "spectral worker answered with a synthesis result".to_string(),
            )),
        }
    }
}

fn spawn_worker(name: &str, rx: Receiver<WorkerMessage>) -> EngineResult<JoinHandle<()>> {
    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || worker_loop(rx))
        .map_err(|e| EngineError::ExecutionContext(format!("failed to spawn {}: {}", name, e)))
}

/// Handle one job at a time until every sender is gone
fn worker_loop(rx: Receiver<WorkerMessage>) {
    for message in rx.iter() {
        match message {
            WorkerMessage::Synthesis { request_id, payload, reply } => {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| run_synthesis(request_id, &payload)));
                let answer = match outcome {
                    Ok(Ok(result)) => WorkerReply::Synthesis {
                        request_id,
                        result: Box::new(result),
                    },
                    Ok(Err(error)) => WorkerReply::Failed { request_id, error },
                    Err(panic) => WorkerReply::Failed {
                        request_id,
                        error: EngineError::ExecutionContext(panic_message(panic)),
                    },
                };
                if reply.send(answer).is_err() {
                    debug!("Synthesis reply for {} had no receiver", request_id);
                }
            }
            WorkerMessage::Spectral { payload, reply } => {
                let key = payload.key;
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| run_spectral_analysis(&payload)));
                let answer = match outcome {
                    Ok(spectrum) => WorkerReply::Spectral {
                        key,
                        spectrum: Box::new(spectrum),
                    },
                    Err(panic) => WorkerReply::Failed {
                        request_id: key.request_id,
                        error: EngineError::ExecutionContext(panic_message(panic)),
                    },
                };
                if reply.send(answer).is_err() {
                    debug!("Spectral reply for {} had no receiver", key.request_id);
                }
            }
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("job panicked: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("job panicked: {}", s)
    } else {
        "job panicked".to_string()
    }
}
