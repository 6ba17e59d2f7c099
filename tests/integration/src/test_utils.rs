//! Test utilities for pipeline integration tests

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use feedtrust_core::{Event, UnsignedEvent};
use feedtrust_crypto::EventSigner;
use feedtrust_trust_mesh::{DistanceRecord, LookupOptions, OracleError, TrustOracle};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Get current timestamp in seconds
pub fn current_timestamp_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Test fixture for an event author with a fresh secp256k1 key
pub struct TestAuthor {
    signer: EventSigner,
    next_offset: Mutex<u64>,
}

impl TestAuthor {
    pub fn new() -> Self {
        Self {
            signer: EventSigner::new(),
            next_offset: Mutex::new(0),
        }
    }

    pub fn pubkey(&self) -> String {
        self.signer.public_key_hex().to_string()
    }

    /// Sign a text note with a strictly increasing timestamp
    pub fn note(&self, content: &str) -> Event {
        let mut offset = self.next_offset.lock().unwrap();
        *offset += 1;
        self.signer
            .sign_event(UnsignedEvent::text_note(
                current_timestamp_secs() + *offset,
                content,
            ))
            .unwrap()
    }

    /// Sign a note and then alter its content so the id no longer matches
    pub fn tampered_note(&self, content: &str) -> Event {
        let mut event = self.note(content);
        event.content.push_str(" (edited in transit)");
        event
    }
}

impl Default for TestAuthor {
    fn default() -> Self {
        Self::new()
    }
}

/// In-process oracle that records every call
pub struct RecordingOracle {
    records: HashMap<String, DistanceRecord>,
    fail: bool,
    calls: Mutex<Vec<Vec<String>>>,
}

impl RecordingOracle {
    pub fn new(records: Vec<(String, DistanceRecord)>) -> Self {
        Self {
            records: records.into_iter().collect(),
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TrustOracle for RecordingOracle {
    async fn batch_distances(
        &self,
        pubkeys: &[String],
        _options: LookupOptions,
    ) -> Result<HashMap<String, DistanceRecord>, OracleError> {
        self.calls.lock().unwrap().push(pubkeys.to_vec());
        if self.fail {
            return Err(OracleError::Transport("connection refused".to_string()));
        }
        Ok(pubkeys
            .iter()
            .filter_map(|pubkey| {
                self.records
                    .get(pubkey)
                    .map(|record| (pubkey.clone(), record.clone()))
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Local trust oracle serving a fixed reply on `/v1/distances`.
pub struct OracleStub {
    pub endpoint: String,
    /// JSON body of the first request received
    pub request: oneshot::Receiver<Value>,
    hits: Arc<AtomicUsize>,
}

impl OracleStub {
    /// Number of requests served so far
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    body: String,
    first_request: Arc<Mutex<Option<oneshot::Sender<Value>>>>,
    hits: Arc<AtomicUsize>,
}

async fn distances(
    State(stub): State<StubState>,
    Json(request): Json<Value>,
) -> impl IntoResponse {
    stub.hits.fetch_add(1, Ordering::SeqCst);
    if let Some(tx) = stub.first_request.lock().unwrap().take() {
        let _ = tx.send(request);
    }
    (
        stub.status,
        [(header::CONTENT_TYPE, "application/json")],
        stub.body,
    )
}

/// Serve `status` and `body` for every distance request on an ephemeral port.
pub async fn spawn_oracle_stub(status: u16, body: String) -> OracleStub {
    let (request_tx, request_rx) = oneshot::channel();
    let hits = Arc::new(AtomicUsize::new(0));
    let state = StubState {
        status: StatusCode::from_u16(status).unwrap(),
        body,
        first_request: Arc::new(Mutex::new(Some(request_tx))),
        hits: Arc::clone(&hits),
    };

    let app = Router::new()
        .route("/v1/distances", post(distances))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}/v1/distances", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    OracleStub {
        endpoint,
        request: request_rx,
        hits,
    }
}
