//! Background generation on a dedicated worker thread.
//!
//! Keeps a caller such as a UI loop responsive while an island is built. At
//! most one request is in flight; a submission made while the worker is busy
//! is rejected and must be re-triggered by the caller once the result lands.
//! Up to [`RESULT_CAPACITY`] undrained results are kept; later ones are
//! dropped with a warning so an idle caller never stalls the worker.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};

use crate::error::GenerationError;
use crate::generator::{GenerationOutput, GenerationParams, IslandGenerator};

/// Undrained results held before new ones are dropped.
pub const RESULT_CAPACITY: usize = 8;

/// Result delivered for each accepted submission.
pub type GenerationResult = Result<Arc<GenerationOutput>, GenerationError>;

/// Runs generations for an [`IslandGenerator`] off the calling thread.
pub struct IslandWorker {
    task_sender: Sender<GenerationParams>,
    result_receiver: Receiver<GenerationResult>,
    generator: Arc<IslandGenerator>,
    in_flight: Arc<AtomicBool>,
}

impl IslandWorker {
    /// Spawn the worker thread. It exits when the worker is dropped.
    pub fn spawn(generator: Arc<IslandGenerator>) -> Result<Self, GenerationError> {
        let (task_sender, task_receiver) = bounded::<GenerationParams>(1);
        let (result_sender, result_receiver) = bounded::<GenerationResult>(RESULT_CAPACITY);
        let in_flight = Arc::new(AtomicBool::new(false));

        let worker_generator = Arc::clone(&generator);
        let worker_in_flight = Arc::clone(&in_flight);
        std::thread::Builder::new()
            .name("island-gen-worker".into())
            .spawn(move || {
                while let Ok(params) = task_receiver.recv() {
                    let result = worker_generator.generate(params);
                    if let Err(err) = &result {
                        tracing::error!(
                            target: "isle_terrain::worker",
                            error = %err,
                            "background generation failed"
                        );
                    }
                    let sent = result_sender.try_send(result);
                    worker_in_flight.store(false, Ordering::Release);
                    match sent {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => {
                            tracing::warn!(
                                target: "isle_terrain::worker",
                                capacity = RESULT_CAPACITY,
                                "result queue full, dropping result"
                            );
                        }
                        Err(TrySendError::Disconnected(_)) => break,
                    }
                }
            })?;

        Ok(Self {
            task_sender,
            result_receiver,
            generator,
            in_flight,
        })
    }

    /// Queue a generation. Returns [`GenerationError::Busy`] if one is
    /// already queued or running.
    pub fn submit(&self, params: GenerationParams) -> Result<(), GenerationError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(target: "isle_terrain::worker", "worker busy, submission dropped");
            return Err(GenerationError::Busy);
        }
        self.task_sender.try_send(params).map_err(|_| {
            self.in_flight.store(false, Ordering::Release);
            GenerationError::WorkerDisconnected
        })
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Collect every finished result without blocking.
    pub fn drain_results(&self) -> Vec<GenerationResult> {
        self.result_receiver.try_iter().collect()
    }

    /// Block until the next result arrives or `timeout` passes.
    pub fn wait_result(&self, timeout: Duration) -> Option<GenerationResult> {
        match self.result_receiver.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(GenerationError::WorkerDisconnected)),
        }
    }

    pub fn generator(&self) -> &Arc<IslandGenerator> {
        &self.generator
    }
}
