//! Worker verification protocol.
//!
//! Requests and responses are plain serializable messages; the worker shares no
//! memory with the verifier and only ever sees copies of the events it checks.

use std::collections::HashSet;

use feedtrust_core::Event;
use feedtrust_crypto::verify_event;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Batch of events to verify, tagged with a correlation id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub request_id: u64,
    pub events: Vec<Event>,
}

/// Ids of the events in the matching request that verified.
///
/// Ids missing from `valid_ids` are invalid or malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub request_id: u64,
    pub valid_ids: Vec<String>,
}

/// Verifies every event in `request` independently.
///
/// A failing event is left out of the response; it never affects the rest of
/// the batch. Results are reported per id, so an id is only reported valid
/// when every event carrying it verified. A forged copy of a genuine event
/// therefore rejects both.
pub fn process_request(request: VerifyRequest) -> VerifyResponse {
    let mut rejected: HashSet<String> = HashSet::new();
    let mut verified: Vec<String> = Vec::new();

    for event in request.events {
        match verify_event(&event) {
            Ok(()) => {
                if !verified.contains(&event.id) {
                    verified.push(event.id);
                }
            }
            Err(e) => {
                trace!(event_id = %event.id, error = %e, "event failed verification");
                rejected.insert(event.id);
            }
        }
    }

    let valid_ids = verified
        .into_iter()
        .filter(|id| {
            let conflicting = rejected.contains(id);
            if conflicting {
                debug!(event_id = %id, "rejecting id shared with a forged event");
            }
            !conflicting
        })
        .collect();

    VerifyResponse {
        request_id: request.request_id,
        valid_ids,
    }
}
