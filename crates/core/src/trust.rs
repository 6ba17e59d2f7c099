//! Trust types shared by the scorer and the feed pipeline.

use crate::event::Event;
use serde::{Deserialize, Serialize};

/// Distance and trust of a pubkey relative to the reference identity.
///
/// `distance == None` is the unreachable sentinel (infinite hops).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustData {
    /// Trust score, nominally 0.0 to 1.0
    pub score: f64,
    /// Hop count from the reference identity, `None` when unreachable
    pub distance: Option<u32>,
    /// Whether the pubkey is reachable in the trust graph
    pub trusted: bool,
    /// Number of distinct trust paths
    pub paths: u64,
}

impl TrustData {
    /// Zero trust default used whenever no distance could be resolved.
    pub fn unreachable() -> Self {
        Self {
            score: 0.0,
            distance: None,
            trusted: false,
            paths: 0,
        }
    }

    /// Trust data for a pubkey the oracle reached in `hops` hops.
    pub fn reachable(hops: u32, score: f64, paths: u64) -> Self {
        Self {
            score,
            distance: Some(hops),
            trusted: true,
            paths,
        }
    }

    pub fn is_unreachable(&self) -> bool {
        self.distance.is_none()
    }
}

impl Default for TrustData {
    fn default() -> Self {
        Self::unreachable()
    }
}

/// A verified event together with its author's trust data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedEvent {
    #[serde(flatten)]
    pub event: Event,
    pub trust: TrustData,
}
