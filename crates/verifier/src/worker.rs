//! Verification worker.
//!
//! A worker is anything that consumes [`VerifyRequest`]s and eventually emits
//! [`VerifyResponse`]s on a separate channel. Responses may come back in any
//! order; the verifier matches them by request id.

use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::{Result, VerifierError};
use crate::protocol::{process_request, VerifyRequest, VerifyResponse};

/// Channel pair connecting the verifier to a running worker.
///
/// Dropping `requests` asks the worker to shut down.
pub struct WorkerChannels {
    pub requests: mpsc::UnboundedSender<VerifyRequest>,
    pub responses: mpsc::UnboundedReceiver<VerifyResponse>,
}

/// Starts verification workers.
pub trait WorkerSpawner: Send + Sync {
    /// Start a worker, or report why one is unavailable.
    fn spawn(&self) -> Result<WorkerChannels>;
}

/// Runs verification on a dedicated OS thread.
#[derive(Debug, Clone)]
pub struct ThreadWorkerSpawner {
    thread_name: String,
}

impl ThreadWorkerSpawner {
    pub fn new(thread_name: impl Into<String>) -> Self {
        Self {
            thread_name: thread_name.into(),
        }
    }
}

impl Default for ThreadWorkerSpawner {
    fn default() -> Self {
        Self::new("feedtrust-verify")
    }
}

impl WorkerSpawner for ThreadWorkerSpawner {
    fn spawn(&self) -> Result<WorkerChannels> {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (response_tx, response_rx) = mpsc::unbounded_channel();

        thread::Builder::new()
            .name(self.thread_name.clone())
            .spawn(move || run_worker(request_rx, response_tx))
            .map_err(|e| VerifierError::WorkerStart(e.to_string()))?;

        info!(thread = %self.thread_name, "verification worker started");

        Ok(WorkerChannels {
            requests: request_tx,
            responses: response_rx,
        })
    }
}

/// Worker loop: verify each request until the request channel closes or the
/// response side goes away.
pub fn run_worker(
    mut requests: mpsc::UnboundedReceiver<VerifyRequest>,
    responses: mpsc::UnboundedSender<VerifyResponse>,
) {
    while let Some(request) = requests.blocking_recv() {
        let request_id = request.request_id;
        let submitted = request.events.len();
        let response = process_request(request);
        debug!(
            request_id,
            submitted,
            valid = response.valid_ids.len(),
            "worker verified batch"
        );
        if responses.send(response).is_err() {
            break;
        }
    }
    debug!("verification worker exiting");
}
