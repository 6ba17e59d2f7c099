//! Event Verifier
//!
//! Offloads signature checking to a worker and correlates the worker's
//! responses back to the callers that submitted each batch.
//!
//! # Lifecycle
//!
//! `Uninitialized -> Ready` when [`EventVerifier::init`] starts a worker, or
//! `Uninitialized -> Degraded` when it cannot. Degraded is permanent: the
//! verifier never retries and passes every batch through unchanged.
//! [`EventVerifier::destroy`] stops a running worker and returns to
//! `Uninitialized`.
//!
//! # Correlation
//!
//! Each dispatched batch gets a fresh request id and a record in the pending
//! table holding the submitted events and a one-shot reply handle. The
//! dispatcher task removes the record when the matching response arrives and
//! replies with the submitted events filtered to the valid ids, in submission
//! order. Responses for unknown ids are dropped.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use feedtrust_core::{Event, VerifierConfig};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{Result, VerifierError};
use crate::protocol::{VerifyRequest, VerifyResponse};
use crate::worker::{ThreadWorkerSpawner, WorkerChannels, WorkerSpawner};

/// Externally visible verifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifierMode {
    Uninitialized,
    /// A worker is running
    Ready,
    /// No worker could be started; batches pass through unverified
    Degraded,
}

/// Snapshot of verifier counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifierMetrics {
    pub batches_dispatched: u64,
    pub events_submitted: u64,
    pub events_accepted: u64,
    pub unmatched_responses: u64,
    pub fail_open_batches: u64,
}

#[derive(Debug, Default)]
struct Counters {
    batches_dispatched: AtomicU64,
    events_submitted: AtomicU64,
    events_accepted: AtomicU64,
    unmatched_responses: AtomicU64,
    fail_open_batches: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> VerifierMetrics {
        VerifierMetrics {
            batches_dispatched: self.batches_dispatched.load(Ordering::Relaxed),
            events_submitted: self.events_submitted.load(Ordering::Relaxed),
            events_accepted: self.events_accepted.load(Ordering::Relaxed),
            unmatched_responses: self.unmatched_responses.load(Ordering::Relaxed),
            fail_open_batches: self.fail_open_batches.load(Ordering::Relaxed),
        }
    }
}

struct PendingVerification {
    events: Vec<Event>,
    reply: oneshot::Sender<Vec<Event>>,
}

type PendingTable = Arc<Mutex<HashMap<u64, PendingVerification>>>;

struct WorkerLink {
    requests: mpsc::UnboundedSender<VerifyRequest>,
    dispatcher: JoinHandle<()>,
}

enum State {
    Uninitialized,
    Ready(WorkerLink),
    Degraded,
}

/// Spawner used when verification is switched off in configuration.
struct DisabledSpawner;

impl WorkerSpawner for DisabledSpawner {
    fn spawn(&self) -> Result<WorkerChannels> {
        Err(VerifierError::WorkerStart(
            "verification disabled by configuration".to_string(),
        ))
    }
}

/// Batched, asynchronous event signature verifier.
pub struct EventVerifier {
    spawner: Box<dyn WorkerSpawner>,
    state: Mutex<State>,
    pending: PendingTable,
    next_request_id: AtomicU64,
    response_timeout: Option<Duration>,
    counters: Arc<Counters>,
}

impl EventVerifier {
    pub fn new(spawner: impl WorkerSpawner + 'static) -> Self {
        Self {
            spawner: Box::new(spawner),
            state: Mutex::new(State::Uninitialized),
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_request_id: AtomicU64::new(0),
            response_timeout: None,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Builds a verifier backed by a worker thread, or a permanently degraded
    /// one when `config.enabled` is false.
    pub fn from_config(config: &VerifierConfig) -> Self {
        let verifier = if config.enabled {
            Self::new(ThreadWorkerSpawner::new(config.worker_thread_name.clone()))
        } else {
            Self::new(DisabledSpawner)
        };
        verifier.with_response_timeout(config.response_timeout())
    }

    /// Fail a batch with [`VerifierError::Timeout`] if its response takes
    /// longer than `timeout`. `None` waits indefinitely.
    pub fn with_response_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Starts the worker. Must be called from within a Tokio runtime; outside
    /// one the verifier degrades.
    pub fn init(&self) -> VerifierMode {
        let mut state = lock(&self.state);
        if !matches!(*state, State::Uninitialized) {
            return mode_of(&state);
        }

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                warn!(error = %e, "no async runtime, event verification degraded");
                *state = State::Degraded;
                return VerifierMode::Degraded;
            }
        };

        match self.spawner.spawn() {
            Ok(WorkerChannels {
                requests,
                responses,
            }) => {
                let dispatcher = handle.spawn(dispatch_responses(
                    responses,
                    Arc::clone(&self.pending),
                    Arc::clone(&self.counters),
                ));
                *state = State::Ready(WorkerLink {
                    requests,
                    dispatcher,
                });
                info!("event verifier ready");
                VerifierMode::Ready
            }
            Err(e) => {
                warn!(error = %e, "event verification degraded, events will not be verified");
                *state = State::Degraded;
                VerifierMode::Degraded
            }
        }
    }

    /// Stops the worker and discards every pending batch. Callers still
    /// awaiting those batches receive [`VerifierError::Terminated`].
    pub fn destroy(&self) {
        {
            let mut state = lock(&self.state);
            // Degraded stays degraded
            if matches!(*state, State::Ready(_)) {
                if let State::Ready(link) = std::mem::replace(&mut *state, State::Uninitialized)
                {
                    link.dispatcher.abort();
                    // Closing the request channel stops the worker
                    drop(link.requests);
                }
            }
        }

        let discarded = {
            let mut pending = lock(&self.pending);
            let discarded = pending.len();
            pending.clear();
            discarded
        };
        info!(discarded, "event verifier destroyed");
    }

    pub fn mode(&self) -> VerifierMode {
        mode_of(&lock(&self.state))
    }

    /// Number of batches awaiting a worker response.
    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }

    pub fn metrics(&self) -> VerifierMetrics {
        self.counters.snapshot()
    }

    /// Returns the subsequence of `events` whose signatures verify.
    ///
    /// Without a running worker the batch is returned unchanged.
    pub async fn verify_batch(&self, events: Vec<Event>) -> Result<Vec<Event>> {
        if events.is_empty() {
            return Ok(events);
        }

        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed) + 1;
        let submitted = events.len();
        let (reply_tx, reply_rx) = oneshot::channel();

        if let Err(events) = self.dispatch(request_id, events, reply_tx) {
            self.counters.fail_open_batches.fetch_add(1, Ordering::Relaxed);
            debug!(request_id, submitted, "passing batch through unverified");
            return Ok(events);
        }

        self.counters.batches_dispatched.fetch_add(1, Ordering::Relaxed);
        self.counters
            .events_submitted
            .fetch_add(submitted as u64, Ordering::Relaxed);
        debug!(request_id, submitted, "dispatched batch to verification worker");

        let received = match self.response_timeout {
            None => reply_rx.await,
            Some(timeout) => match tokio::time::timeout(timeout, reply_rx).await {
                Ok(received) => received,
                Err(_) => {
                    lock(&self.pending).remove(&request_id);
                    let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
                    warn!(request_id, timeout_ms, "verification response timed out");
                    return Err(VerifierError::Timeout {
                        request_id,
                        timeout_ms,
                    });
                }
            },
        };

        received.map_err(|_| VerifierError::Terminated { request_id })
    }

    /// Registers the batch and sends it to the worker. Hands the events back
    /// when there is no worker to send to.
    fn dispatch(
        &self,
        request_id: u64,
        events: Vec<Event>,
        reply: oneshot::Sender<Vec<Event>>,
    ) -> std::result::Result<(), Vec<Event>> {
        // Held across insert and send so destroy() cannot interleave
        let state = lock(&self.state);
        let link = match &*state {
            State::Ready(link) => link,
            State::Uninitialized | State::Degraded => return Err(events),
        };

        let request = VerifyRequest {
            request_id,
            events: events.clone(),
        };

        let mut pending = lock(&self.pending);
        pending.insert(request_id, PendingVerification { events, reply });

        if link.requests.send(request).is_err() {
            warn!(request_id, "verification worker is gone, passing batch through");
            let events = pending
                .remove(&request_id)
                .map(|record| record.events)
                .unwrap_or_default();
            return Err(events);
        }

        Ok(())
    }
}

async fn dispatch_responses(
    mut responses: mpsc::UnboundedReceiver<VerifyResponse>,
    pending: PendingTable,
    counters: Arc<Counters>,
) {
    while let Some(response) = responses.recv().await {
        let record = lock(&pending).remove(&response.request_id);
        let Some(record) = record else {
            counters.unmatched_responses.fetch_add(1, Ordering::Relaxed);
            debug!(
                request_id = response.request_id,
                "dropping response for unknown request"
            );
            continue;
        };

        let valid: HashSet<&str> = response.valid_ids.iter().map(String::as_str).collect();
        let accepted: Vec<Event> = record
            .events
            .into_iter()
            .filter(|event| valid.contains(event.id.as_str()))
            .collect();

        counters
            .events_accepted
            .fetch_add(accepted.len() as u64, Ordering::Relaxed);
        if record.reply.send(accepted).is_err() {
            debug!(
                request_id = response.request_id,
                "caller stopped waiting for verification result"
            );
        }
    }
    debug!("verification response channel closed");
}

fn mode_of(state: &State) -> VerifierMode {
    match state {
        State::Uninitialized => VerifierMode::Uninitialized,
        State::Ready(_) => VerifierMode::Ready,
        State::Degraded => VerifierMode::Degraded,
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
