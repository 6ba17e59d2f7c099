//! Test vectors for event id computation and signing.
//!
//! Ids were computed independently with `sha256sum` over the canonical
//! serialization so that a serializer regression shows up as a mismatch here.

use feedtrust_core::Event;

/// Secret key 1 is only used for reproducible test vectors.
///
/// ⚠️ WARNING: DO NOT USE IN PRODUCTION ⚠️
pub const TEST_VECTOR_PRIVATE_KEY: [u8; 32] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01,
];

/// x-only public key for [`TEST_VECTOR_PRIVATE_KEY`] (the secp256k1 generator).
pub const TEST_VECTOR_PUBKEY: &str =
    "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

pub struct IdTestVector {
    pub name: &'static str,
    pub created_at: u64,
    pub kind: u32,
    pub tags: Vec<Vec<String>>,
    pub content: &'static str,
    pub expected_id: &'static str,
}

impl IdTestVector {
    pub fn event(&self) -> Event {
        Event {
            id: String::new(),
            pubkey: TEST_VECTOR_PUBKEY.to_string(),
            created_at: self.created_at,
            kind: self.kind,
            tags: self.tags.clone(),
            content: self.content.to_string(),
            sig: String::new(),
        }
    }
}

pub fn get_id_vectors() -> Vec<IdTestVector> {
    vec![
        IdTestVector {
            name: "vector_1_empty_note",
            created_at: 1_700_000_000,
            kind: 1,
            tags: vec![],
            content: "",
            expected_id: "1868e8ad4ca66b7a9bb6ddaaecde6e5cc5d11682e87abb650a6ce8853854ef05",
        },
        IdTestVector {
            name: "vector_2_tags_and_escapes",
            created_at: 1_700_000_000,
            kind: 1,
            tags: vec![
                vec!["t".to_string(), "rust".to_string()],
                vec![
                    "p".to_string(),
                    "0000000000000000000000000000000000000000000000000000000000000001".to_string(),
                ],
            ],
            content: "hello \"relay\"\nworld",
            expected_id: "48768b76f4d81a8359d816e942e5e9edc778a40ba193e2dc580499da0e1807bd",
        },
    ]
}
