//! HTTP trust oracle against a local stub server.

use crate::test_utils::{spawn_oracle_stub, TestAuthor};
use feedtrust_core::TrustData;
use feedtrust_trust_mesh::{
    DistanceRecord, HttpTrustOracle, LookupOptions, OracleError, TrustOracle, TrustScorer,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const REFERENCE: &str = "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

fn oracle_for(endpoint: &str) -> HttpTrustOracle {
    HttpTrustOracle::new(endpoint, REFERENCE, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_http_oracle_request_and_response() {
    let alice = TestAuthor::new().pubkey();
    let bob = TestAuthor::new().pubkey();
    let body = json!({
        "distances": {
            alice.clone(): {"hops": 2, "score": 0.8, "paths": 3},
            bob.clone(): null
        }
    })
    .to_string();
    let stub = spawn_oracle_stub(200, body).await;

    let distances = oracle_for(&stub.endpoint)
        .batch_distances(&[alice.clone(), bob.clone()], LookupOptions::full())
        .await
        .unwrap();

    assert_eq!(distances.len(), 1);
    assert_eq!(distances[&alice], DistanceRecord::new(2, 0.8, 3));

    let sent = stub.request.await.unwrap();
    assert_eq!(sent["source"], REFERENCE);
    assert_eq!(sent["targets"], json!([alice, bob]));
    assert_eq!(sent["includePaths"], true);
    assert_eq!(sent["includeScores"], true);
}

#[tokio::test]
async fn test_http_oracle_error_status() {
    let stub = spawn_oracle_stub(503, "overloaded".to_string()).await;

    let result = oracle_for(&stub.endpoint)
        .batch_distances(&["aa".to_string()], LookupOptions::full())
        .await;

    match result {
        Err(OracleError::Status { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "overloaded");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_oracle_undecodable_body() {
    let stub = spawn_oracle_stub(200, "not json".to_string()).await;

    let result = oracle_for(&stub.endpoint)
        .batch_distances(&["aa".to_string()], LookupOptions::full())
        .await;

    assert!(matches!(result, Err(OracleError::Decode(_))));
}

#[tokio::test]
async fn test_scorer_over_http_oracle() {
    let alice = TestAuthor::new().pubkey();
    let mallory = TestAuthor::new().pubkey();
    let body = json!({
        "distances": {
            alice.clone(): {"hops": 1, "score": 0.95, "paths": 7},
            mallory.clone(): {"hops": "unknown"}
        }
    })
    .to_string();
    let stub = spawn_oracle_stub(200, body).await;
    let scorer = TrustScorer::new(Arc::new(oracle_for(&stub.endpoint)));

    scorer.score_batch(&[alice.clone(), mallory.clone()]).await;

    assert_eq!(scorer.cached(&alice), Some(TrustData::reachable(1, 0.95, 7)));
    assert_eq!(scorer.cached(&mallory), Some(TrustData::unreachable()));

    assert_eq!(
        scorer.score_single(&alice).await,
        TrustData::reachable(1, 0.95, 7)
    );
    scorer.score_batch(&[alice, mallory]).await;
    assert_eq!(stub.hits(), 1);
}

#[tokio::test]
async fn test_scorer_over_failing_http_oracle() {
    let stub = spawn_oracle_stub(500, "boom".to_string()).await;
    let scorer = TrustScorer::new(Arc::new(oracle_for(&stub.endpoint)));
    let a = TestAuthor::new().pubkey();
    let b = TestAuthor::new().pubkey();

    scorer.score_batch(&[a.clone(), b.clone()]).await;

    assert_eq!(scorer.cached(&a), Some(TrustData::unreachable()));
    assert_eq!(scorer.cached(&b), Some(TrustData::unreachable()));

    // Failures are cached; the oracle is not asked again
    scorer.score_batch(&[a, b]).await;
    assert_eq!(stub.hits(), 1);
}
