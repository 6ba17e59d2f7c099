//! Feed Trust Service
//!
//! Main service that sequences verification and trust scoring over a batch of
//! relay events. One long-lived instance per process owns the verifier and
//! the scorer cache.

use std::collections::HashSet;
use std::sync::Arc;

use feedtrust_core::{AnnotatedEvent, Config, Event, TrustData};
use feedtrust_verifier::{EventVerifier, VerifierError, VerifierMode};
use tracing::{debug, info};

use crate::oracle::{HttpTrustOracle, OracleError};
use crate::trust::TrustScorer;

pub struct FeedTrustService {
    verifier: Arc<EventVerifier>,
    scorer: Arc<TrustScorer>,
}

impl FeedTrustService {
    pub fn new(verifier: Arc<EventVerifier>, scorer: Arc<TrustScorer>) -> Self {
        Self { verifier, scorer }
    }

    /// Composition root: HTTP oracle anchored at `config.reference_pubkey` and
    /// a worker-thread verifier, initialized once.
    ///
    /// Call from within a Tokio runtime, otherwise the verifier starts degraded.
    pub fn from_config(config: &Config) -> Result<Self, OracleError> {
        let oracle = HttpTrustOracle::from_config(&config.reference_pubkey, &config.oracle)?;
        let scorer = TrustScorer::new(Arc::new(oracle));

        let verifier = EventVerifier::from_config(&config.verifier);
        let mode = verifier.init();
        info!(
            ?mode,
            reference = %config.reference_pubkey,
            oracle = %config.oracle.endpoint,
            "feed trust service started"
        );

        Ok(Self::new(Arc::new(verifier), Arc::new(scorer)))
    }

    pub fn verifier(&self) -> &Arc<EventVerifier> {
        &self.verifier
    }

    pub fn scorer(&self) -> &Arc<TrustScorer> {
        &self.scorer
    }

    pub fn verifier_mode(&self) -> VerifierMode {
        self.verifier.mode()
    }

    /// Verifies `events`, scores the authors of the survivors and returns one
    /// annotated event per survivor, in input order.
    pub async fn process_batch(
        &self,
        events: Vec<Event>,
    ) -> Result<Vec<AnnotatedEvent>, VerifierError> {
        let submitted = events.len();
        let verified = self.verifier.verify_batch(events).await?;

        let mut seen = HashSet::new();
        let authors: Vec<String> = verified
            .iter()
            .filter(|event| seen.insert(event.pubkey.as_str()))
            .map(|event| event.pubkey.clone())
            .collect();
        self.scorer.score_batch(&authors).await;

        let annotated: Vec<AnnotatedEvent> = verified
            .into_iter()
            .map(|event| {
                let trust = self
                    .scorer
                    .cached(&event.pubkey)
                    .unwrap_or_else(TrustData::unreachable);
                AnnotatedEvent { event, trust }
            })
            .collect();

        debug!(
            submitted,
            verified = annotated.len(),
            authors = authors.len(),
            "processed event batch"
        );
        Ok(annotated)
    }

    /// Stops the verification worker. Batches still in flight fail with
    /// [`VerifierError::Terminated`].
    pub fn shutdown(&self) {
        self.verifier.destroy();
    }
}
