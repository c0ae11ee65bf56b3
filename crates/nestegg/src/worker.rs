//! Background worker that keeps simulations off the caller's thread.
//!
//! Only the newest request matters. Submitting a request cancels the one in
//! flight, and when the worker picks up work it skips anything already
//! superseded in its queue. Every request gets an answer tagged with its id.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use nestegg_core::simulation::run_with_progress;
use nestegg_core::{
    MonteCarloConfig, MonteCarloProgress, ReturnSeries, SimulationError, SimulationParameters,
    SimulationSummary,
};

/// Inputs for one run
#[derive(Debug, Clone)]
pub struct SimulationRequest {
    pub returns: Arc<ReturnSeries>,
    pub params: SimulationParameters,
    pub config: MonteCarloConfig,
}

/// Response from the background worker
#[derive(Debug)]
pub enum SimulationResponse {
    /// Run finished (boxed to reduce enum size)
    Complete {
        id: u64,
        summary: Box<SimulationSummary>,
    },
    /// Superseded by a newer request or cancelled explicitly
    Cancelled { id: u64 },
    /// Inputs were rejected
    Error { id: u64, message: String },
}

impl SimulationResponse {
    pub fn id(&self) -> u64 {
        match self {
            Self::Complete { id, .. } | Self::Cancelled { id } | Self::Error { id, .. } => *id,
        }
    }
}

enum WorkerMessage {
    Run {
        id: u64,
        request: SimulationRequest,
        progress: MonteCarloProgress,
    },
    Shutdown,
}

/// Background worker that runs simulations on a separate thread
pub struct SimulationWorker {
    request_tx: Sender<WorkerMessage>,
    response_rx: Receiver<SimulationResponse>,
    /// Progress handle of the newest request
    current: MonteCarloProgress,
    next_id: u64,
    thread: Option<JoinHandle<()>>,
}

impl SimulationWorker {
    /// Create a new simulation worker with a background thread
    pub fn new() -> Self {
        let (request_tx, request_rx) = channel();
        let (response_tx, response_rx) = channel();

        let ctx = WorkerContext { response_tx };
        let thread = thread::spawn(move || {
            ctx.run(request_rx);
        });

        Self {
            request_tx,
            response_rx,
            current: MonteCarloProgress::new(),
            next_id: 0,
            thread: Some(thread),
        }
    }

    /// Queue a run and return its id. The previous run, if still pending or
    /// in flight, is cancelled.
    pub fn submit(&mut self, request: SimulationRequest) -> u64 {
        self.current.cancel();

        self.next_id += 1;
        let id = self.next_id;
        let progress = MonteCarloProgress::new();
        self.current = progress.clone();

        tracing::debug!(id, iterations = request.config.iterations, "Submitting simulation");
        if self
            .request_tx
            .send(WorkerMessage::Run {
                id,
                request,
                progress,
            })
            .is_err()
        {
            tracing::error!(id, "Simulation worker is gone");
        }
        id
    }

    /// Try to receive a response (non-blocking)
    pub fn try_recv(&self) -> Option<SimulationResponse> {
        self.response_rx.try_recv().ok()
    }

    /// Block until a response arrives; None if the worker has stopped
    pub fn recv(&self) -> Option<SimulationResponse> {
        self.response_rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<SimulationResponse> {
        match self.response_rx.recv_timeout(timeout) {
            Ok(response) => Some(response),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Block until the response for `id` arrives, discarding older ones
    pub fn wait_for(&self, id: u64) -> Option<SimulationResponse> {
        while let Some(response) = self.recv() {
            if response.id() == id {
                return Some(response);
            }
            tracing::debug!(stale = response.id(), waiting_for = id, "Discarding stale response");
        }
        None
    }

    /// Progress of the newest request
    pub fn progress(&self) -> &MonteCarloProgress {
        &self.current
    }

    /// Request cancellation of the newest request
    pub fn cancel(&self) {
        self.current.cancel();
    }

    /// Shutdown the worker thread
    pub fn shutdown(&self) {
        let _ = self.request_tx.send(WorkerMessage::Shutdown);
    }
}

impl Default for SimulationWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SimulationWorker {
    fn drop(&mut self) {
        self.current.cancel();
        self.shutdown();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Shared state for the background worker thread.
struct WorkerContext {
    response_tx: Sender<SimulationResponse>,
}

impl WorkerContext {
    fn run(&self, request_rx: Receiver<WorkerMessage>) {
        while let Ok(mut message) = request_rx.recv() {
            // Skip to the newest queued message
            while let Ok(newer) = request_rx.try_recv() {
                if let WorkerMessage::Run { id, .. } = message {
                    tracing::debug!(id, "Skipping superseded request");
                    self.respond(SimulationResponse::Cancelled { id });
                }
                message = newer;
            }

            match message {
                WorkerMessage::Shutdown => break,
                WorkerMessage::Run {
                    id,
                    request,
                    progress,
                } => self.respond(Self::run_request(id, &request, &progress)),
            }
        }
        tracing::debug!("Simulation worker stopped");
    }

    fn run_request(
        id: u64,
        request: &SimulationRequest,
        progress: &MonteCarloProgress,
    ) -> SimulationResponse {
        if progress.is_cancelled() {
            return SimulationResponse::Cancelled { id };
        }

        tracing::info!(
            id,
            iterations = request.config.iterations,
            horizon = request.params.horizon_periods,
            "Starting Monte Carlo simulation"
        );

        match run_with_progress(&request.returns, &request.params, &request.config, progress) {
            Ok(summary) => SimulationResponse::Complete {
                id,
                summary: Box::new(summary),
            },
            Err(SimulationError::Cancelled) => SimulationResponse::Cancelled { id },
            Err(e) => {
                tracing::warn!(id, error = %e, "Simulation rejected");
                SimulationResponse::Error {
                    id,
                    message: e.to_string(),
                }
            }
        }
    }

    fn respond(&self, response: SimulationResponse) {
        // The receiver only disappears when the worker handle is dropped
        let _ = self.response_tx.send(response);
    }
}
