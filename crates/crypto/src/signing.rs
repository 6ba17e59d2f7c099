//! Event signing and verification.
//!
//! Events are signed with BIP-340 Schnorr signatures over secp256k1. The
//! signed message is the 32-byte event id itself, so verification is:
//! - recompute the id from the event fields and compare it to `id`
//! - check `sig` against `id` under the x-only key in `pubkey`
//!
//! # Security Model
//!
//! - Verification never trusts the `id` field; it is always recomputed
//! - Malformed hex, wrong lengths and off-curve keys are rejected, never panicked on
//! - Secret key bytes are zeroized after the signing key is built

use feedtrust_core::{is_hex_of_len, Event, UnsignedEvent, HEX_32_LEN, HEX_SIG_LEN};
use k256::schnorr::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::schnorr::{Signature, SigningKey, VerifyingKey};
use thiserror::Error;
use zeroize::Zeroize;

use crate::event_id::compute_event_id_bytes;

/// Errors that can occur while signing events.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    #[error("Cryptographic error: {reason}")]
    CryptoError { reason: String },
}

/// Reasons an event fails verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("Malformed field '{field}': {reason}")]
    MalformedField { field: &'static str, reason: String },

    #[error("Event id mismatch: claimed {claimed}, computed {computed}")]
    IdMismatch { claimed: String, computed: String },

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid signature encoding: {0}")]
    InvalidSignatureEncoding(String),

    #[error("Signature does not verify")]
    BadSignature,
}

/// Signs events on behalf of a single secp256k1 identity.
pub struct EventSigner {
    signing_key: SigningKey,
    public_key_hex: String,
}

impl EventSigner {
    /// Creates a signer with a freshly generated key.
    pub fn new() -> Self {
        let signing_key = SigningKey::random(&mut rand::rngs::OsRng);
        Self::from_signing_key(signing_key)
    }

    /// Creates a signer from 32 secret key bytes.
    ///
    /// # Security
    /// The intermediate copy of the key bytes is zeroized.
    pub fn from_key(key_bytes: &[u8]) -> Result<Self, SigningError> {
        if key_bytes.len() != 32 {
            return Err(SigningError::CryptoError {
                reason: format!("Invalid key length: {} (expected 32)", key_bytes.len()),
            });
        }

        let mut key_array = [0u8; 32];
        key_array.copy_from_slice(key_bytes);
        let signing_key = SigningKey::from_bytes(&key_array);
        key_array.zeroize();

        let signing_key = signing_key.map_err(|e| SigningError::CryptoError {
            reason: format!("Invalid secret key: {}", e),
        })?;
        Ok(Self::from_signing_key(signing_key))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let public_key_hex = hex::encode(signing_key.verifying_key().to_bytes());
        Self {
            signing_key,
            public_key_hex,
        }
    }

    /// Hex x-only public key, as it appears in an event's `pubkey` field.
    pub fn public_key_hex(&self) -> &str {
        &self.public_key_hex
    }

    /// Hashes and signs an unsigned event, producing a complete wire event.
    pub fn sign_event(&self, unsigned: UnsignedEvent) -> Result<Event, SigningError> {
        let id = compute_event_id_bytes(
            &self.public_key_hex,
            unsigned.created_at,
            unsigned.kind,
            &unsigned.tags,
            &unsigned.content,
        )?;

        let signature: Signature =
            self.signing_key
                .sign_prehash(&id)
                .map_err(|e| SigningError::CryptoError {
                    reason: e.to_string(),
                })?;

        Ok(Event {
            id: hex::encode(id),
            pubkey: self.public_key_hex.clone(),
            created_at: unsigned.created_at,
            kind: unsigned.kind,
            tags: unsigned.tags,
            content: unsigned.content,
            sig: hex::encode(signature.to_bytes()),
        })
    }
}

impl Default for EventSigner {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks that `event.id` matches its fields and `event.sig` is a valid
/// signature over that id by `event.pubkey`.
pub fn verify_event(event: &Event) -> Result<(), VerifyError> {
    check_hex_field("id", &event.id, HEX_32_LEN)?;
    check_hex_field("pubkey", &event.pubkey, HEX_32_LEN)?;
    check_hex_field("sig", &event.sig, HEX_SIG_LEN)?;

    let computed = compute_event_id_bytes(
        &event.pubkey,
        event.created_at,
        event.kind,
        &event.tags,
        &event.content,
    )
    .map_err(|e| VerifyError::MalformedField {
        field: "content",
        reason: e.to_string(),
    })?;

    let claimed = decode_hex("id", &event.id)?;
    if claimed != computed {
        return Err(VerifyError::IdMismatch {
            claimed: event.id.clone(),
            computed: hex::encode(computed),
        });
    }

    let pubkey_bytes = decode_hex("pubkey", &event.pubkey)?;
    let verifying_key = VerifyingKey::from_bytes(&pubkey_bytes)
        .map_err(|e| VerifyError::InvalidPublicKey(e.to_string()))?;

    let sig_bytes = decode_hex("sig", &event.sig)?;
    let signature = Signature::try_from(sig_bytes.as_slice())
        .map_err(|e| VerifyError::InvalidSignatureEncoding(e.to_string()))?;

    verifying_key
        .verify_prehash(&computed, &signature)
        .map_err(|_| VerifyError::BadSignature)
}

fn check_hex_field(field: &'static str, value: &str, len: usize) -> Result<(), VerifyError> {
    if is_hex_of_len(value, len) {
        Ok(())
    } else {
        Err(VerifyError::MalformedField {
            field,
            reason: format!("expected {} hex characters, got {:?}", len, value),
        })
    }
}

fn decode_hex(field: &'static str, value: &str) -> Result<Vec<u8>, VerifyError> {
    hex::decode(value).map_err(|e| VerifyError::MalformedField {
        field,
        reason: e.to_string(),
    })
}
