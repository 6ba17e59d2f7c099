//! Content-addressed event identifiers.
//!
//! An event id is the SHA-256 of the compact JSON array
//! `[0, pubkey, created_at, kind, tags, content]`. Any change to those fields
//! changes the id, which in turn invalidates the signature.

use feedtrust_core::Event;
use sha2::{Digest, Sha256};

use crate::signing::SigningError;

/// 32-byte event id digest
pub type EventIdBytes = [u8; 32];

/// Produces the canonical bytes that are hashed into an event id.
pub fn serialize_for_id(
    pubkey: &str,
    created_at: u64,
    kind: u32,
    tags: &[Vec<String>],
    content: &str,
) -> Result<Vec<u8>, SigningError> {
    serde_json::to_vec(&(0u8, pubkey, created_at, kind, tags, content)).map_err(|e| {
        SigningError::SerializationError {
            reason: e.to_string(),
        }
    })
}

/// Computes the raw id digest for the given fields.
pub fn compute_event_id_bytes(
    pubkey: &str,
    created_at: u64,
    kind: u32,
    tags: &[Vec<String>],
    content: &str,
) -> Result<EventIdBytes, SigningError> {
    let canonical = serialize_for_id(pubkey, created_at, kind, tags, content)?;
    Ok(Sha256::digest(&canonical).into())
}

/// Computes the hex id an event should carry, ignoring its current `id` field.
pub fn compute_event_id(event: &Event) -> Result<String, SigningError> {
    compute_event_id_bytes(
        &event.pubkey,
        event.created_at,
        event.kind,
        &event.tags,
        &event.content,
    )
    .map(hex::encode)
}
