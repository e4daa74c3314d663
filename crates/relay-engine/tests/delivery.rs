//! End-to-end delivery flows across registry, store, and reaper

use relay_engine::{
    ActionId, ConnectionId, DeliveryEngine, Error, Reaper, ReaperConfig, SubscriberHandle,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

#[tokio::test]
async fn pull_only_flow_consumes_exactly_once() {
    let engine = DeliveryEngine::new();

    engine
        .ingest(json!({"actionId": "x1", "value": 42}), "webhook")
        .await
        .unwrap();

    let consumed = engine.consume_one(&ActionId::new("x1")).await.unwrap();
    assert_eq!(consumed.payload, json!({"actionId": "x1", "value": 42}));
    assert_eq!(consumed.origin, "webhook");

    let miss = engine.consume_one(&ActionId::new("x1")).await;
    match miss {
        Err(Error::ResultNotFound { available, .. }) => {
            assert!(!available.contains(&ActionId::new("x1")));
        }
        other => panic!("Expected ResultNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn push_flow_keeps_result_pullable() {
    let engine = DeliveryEngine::new();
    let (handle, mut receiver) = SubscriberHandle::new(ConnectionId::new());

    engine.register(ActionId::new("x2"), handle).await;
    engine
        .ingest(json!({"actionId": "x2", "value": 7}), "webhook")
        .await
        .unwrap();

    // Subscriber received the push and the registration was consumed
    let delivery = receiver.recv().await.unwrap();
    assert_eq!(delivery.payload, json!({"actionId": "x2", "value": 7}));
    let snapshot = engine.snapshot().await;
    assert!(!snapshot.registered_keys.contains(&ActionId::new("x2")));

    // Push does not consult or mutate the store: the same event is still
    // retrievable over the pull path
    let consumed = engine.consume_one(&ActionId::new("x2")).await.unwrap();
    assert_eq!(consumed.payload, json!({"actionId": "x2", "value": 7}));
}

#[tokio::test]
async fn pull_before_push_leaves_no_conflict() {
    let engine = DeliveryEngine::new();

    engine
        .ingest(json!({"actionId": "k", "n": 1}), "webhook")
        .await
        .unwrap();
    engine.consume_one(&ActionId::new("k")).await.unwrap();

    // A subscriber arriving after the pull finds nothing to catch up on
    let (handle, mut receiver) = SubscriberHandle::new(ConnectionId::new());
    let caught_up = engine.register(ActionId::new("k"), handle).await;
    assert_eq!(caught_up, None);
    assert!(receiver.try_recv().is_err());

    // The registration stays armed for a future event
    let snapshot = engine.snapshot().await;
    assert!(snapshot.registered_keys.contains(&ActionId::new("k")));
}

#[tokio::test]
async fn displaced_subscriber_receives_nothing() {
    let engine = DeliveryEngine::new();
    let (first, mut first_rx) = SubscriberHandle::new(ConnectionId::new());
    let (second, mut second_rx) = SubscriberHandle::new(ConnectionId::new());

    engine.register(ActionId::new("k"), first).await;
    engine.register(ActionId::new("k"), second).await;
    engine
        .ingest(json!({"actionId": "k", "n": 2}), "webhook")
        .await
        .unwrap();

    assert!(second_rx.recv().await.is_some());
    assert!(first_rx.try_recv().is_err());
}

#[tokio::test]
async fn bulk_consume_handles_partial_hits() {
    let engine = DeliveryEngine::new();
    engine
        .ingest(json!({"actionId": "b", "n": 2}), "webhook")
        .await
        .unwrap();

    let outcome = engine
        .consume_many(vec![
            ActionId::new("a"),
            ActionId::new("b"),
            ActionId::new("c"),
        ])
        .await;

    assert_eq!(outcome.found, 1);
    assert_eq!(outcome.missed, 2);
    assert!(outcome.results[&ActionId::new("b")].found);
    assert!(!outcome.results[&ActionId::new("a")].found);
    assert!(!outcome.results[&ActionId::new("c")].found);

    // The hit is consumed, the misses stay absent
    assert!(engine.consume_one(&ActionId::new("b")).await.is_err());
    assert!(engine.consume_one(&ActionId::new("a")).await.is_err());
    assert!(engine.consume_one(&ActionId::new("c")).await.is_err());
}

#[tokio::test]
async fn unconsumed_results_expire_after_retention_window() {
    let engine = Arc::new(DeliveryEngine::new());
    engine
        .ingest(json!({"actionId": "expired"}), "webhook")
        .await
        .unwrap();

    let config = ReaperConfig {
        retention_window: Duration::from_millis(30),
        sweep_interval: Duration::from_millis(15),
    };
    let (shutdown_tx, _) = broadcast::channel(1);
    let task = Reaper::new(engine.clone(), config).spawn(shutdown_tx.subscribe());

    // Anything ingested now stays retrievable past the window plus one
    // sweep interval, and no longer
    tokio::time::sleep(Duration::from_millis(120)).await;

    let miss = engine.consume_one(&ActionId::new("expired")).await;
    assert!(matches!(miss, Err(Error::ResultNotFound { .. })));

    shutdown_tx.send(()).unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn ingest_register_pairing_delivers_exactly_once() {
    let engine = Arc::new(DeliveryEngine::new());

    for round in 0..20 {
        let key = format!("race-{round}");
        let (handle, mut receiver) = SubscriberHandle::new(ConnectionId::new());

        let ingest_engine = engine.clone();
        let ingest_key = key.clone();
        let ingest = tokio::spawn(async move {
            ingest_engine
                .ingest(json!({"actionId": ingest_key, "round": round}), "webhook")
                .await
                .unwrap();
        });

        let register_engine = engine.clone();
        let register_key = ActionId::new(key.clone());
        let register = tokio::spawn(async move {
            register_engine.register(register_key, handle).await;
        });

        ingest.await.unwrap();
        register.await.unwrap();

        // Whichever path noticed the completed pairing pushed exactly one
        // delivery to the subscriber
        let first = receiver.recv().await.unwrap();
        assert_eq!(first.action_id, ActionId::new(key));
        assert!(receiver.try_recv().is_err());
    }
}
