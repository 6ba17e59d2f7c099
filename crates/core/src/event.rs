//! Event schema for relay-delivered social events.
//!
//! Events arrive from untrusted relays and are immutable once received. The `id`
//! is a content-addressed digest of the other fields and `sig` is a signature over
//! that digest by `pubkey`; checking both is the verifier's job, not this module's.

use serde::{Deserialize, Serialize};

/// Hex length of a 32-byte event id or x-only public key.
pub const HEX_32_LEN: usize = 64;

/// Hex length of a 64-byte Schnorr signature.
pub const HEX_SIG_LEN: usize = 128;

/// A signed, content-addressed event in relay wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Hex SHA-256 digest of the canonical serialization
    pub id: String,
    /// Hex x-only public key of the author
    pub pubkey: String,
    /// Unix timestamp in seconds
    pub created_at: u64,
    /// Event type
    pub kind: u32,
    /// Ordered tag lists
    pub tags: Vec<Vec<String>>,
    /// Arbitrary content
    pub content: String,
    /// Hex Schnorr signature over `id`
    pub sig: String,
}

impl Event {
    /// Values of every tag whose first element equals `name`.
    pub fn tag_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.tags
            .iter()
            .filter(move |tag| tag.first().map(String::as_str) == Some(name))
            .filter_map(|tag| tag.get(1).map(String::as_str))
    }
}

/// An event before it has been hashed and signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedEvent {
    pub created_at: u64,
    pub kind: u32,
    #[serde(default)]
    pub tags: Vec<Vec<String>>,
    #[serde(default)]
    pub content: String,
}

impl UnsignedEvent {
    /// Text note (kind 1) with the given content and no tags.
    pub fn text_note(created_at: u64, content: impl Into<String>) -> Self {
        Self {
            created_at,
            kind: 1,
            tags: Vec::new(),
            content: content.into(),
        }
    }

    /// Append a tag.
    pub fn with_tag<I, S>(mut self, tag: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.push(tag.into_iter().map(Into::into).collect());
        self
    }
}

/// Returns true if `value` is exactly `len` lowercase or uppercase hex digits.
pub fn is_hex_of_len(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_hexdigit())
}
