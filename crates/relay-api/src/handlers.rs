//! Request handlers for the relay API

use crate::config::ApiSettings;
use crate::error::{ApiError, Result};
use crate::types::{ApiResponse, BulkConsumeRequest, CallbackAck, HealthResponse};
use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use relay_core::ActionId;
use relay_engine::{
    BulkConsumeOutcome, ConsumedResult, DeliveryEngine, EngineDump, ResetReport, StoreStats,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Origin tag recorded when the submitter does not identify itself
const DEFAULT_ORIGIN: &str = "http";

/// Header the signing service may use to tag where a callback came from
const CALLBACK_SOURCE_HEADER: &str = "x-callback-source";

/// Shared state for all API handlers
#[derive(Clone)]
pub struct AppState {
    /// The delivery engine
    pub engine: Arc<DeliveryEngine>,

    /// API configuration
    pub settings: ApiSettings,

    /// Server start time, for uptime reporting
    pub start_time: Instant,
}

impl AppState {
    /// Create handler state over an engine
    pub fn new(engine: Arc<DeliveryEngine>, settings: ApiSettings) -> Self {
        Self {
            engine,
            settings,
            start_time: Instant::now(),
        }
    }
}

/// Ingest a signing callback.
///
/// Accepts any JSON shape; only a non-empty string `actionId` field is
/// required. The payload is stored unconditionally and pushed to a
/// registered subscriber when one is reachable.
pub async fn ingest_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<ApiResponse<CallbackAck>>> {
    let origin = headers
        .get(CALLBACK_SOURCE_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(DEFAULT_ORIGIN);

    let ack = state.engine.ingest(payload, origin).await?;

    Ok(Json(ApiResponse::new(CallbackAck {
        accepted: ack.stored,
        action_id: ack.action_id.into_string(),
    })))
}

/// Consume the stored result for one action ID.
///
/// A miss is a 404 carrying the currently available action IDs as a
/// diagnostic, not a failure of the relay.
pub async fn consume_result(
    State(state): State<AppState>,
    Path(action_id): Path<String>,
) -> Result<Json<ApiResponse<ConsumedResult>>> {
    let consumed = state
        .engine
        .consume_one(&ActionId::new(action_id))
        .await?;
    Ok(Json(ApiResponse::new(consumed)))
}

/// Consume stored results for a batch of action IDs.
///
/// The body must be `{"actionIds": [...]}`; anything else is rejected as
/// a client error. Individual misses never fail the call.
pub async fn consume_results(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<ApiResponse<BulkConsumeOutcome>>> {
    let request: BulkConsumeRequest = serde_json::from_value(payload)
        .map_err(|e| ApiError::InvalidActionIds(format!("body must be {{\"actionIds\": [..]}}: {e}")))?;

    let action_ids = request.action_ids.into_iter().map(ActionId::new).collect();
    let outcome = state.engine.consume_many(action_ids).await;
    Ok(Json(ApiResponse::new(outcome)))
}

/// Health snapshot: counts, key lists, uptime, and process memory
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    let snapshot = state.engine.snapshot().await;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        memory_bytes: process_memory_bytes(),
        registered: snapshot.registered,
        registered_action_ids: snapshot
            .registered_keys
            .into_iter()
            .map(ActionId::into_string)
            .collect(),
        stored: snapshot.stored,
        available_action_ids: snapshot
            .stored_keys
            .into_iter()
            .map(ActionId::into_string)
            .collect(),
    }))
}

/// Aggregate age statistics over stored results
pub async fn store_stats(State(state): State<AppState>) -> Result<Json<ApiResponse<StoreStats>>> {
    let stats = state.engine.stats().await;
    Ok(Json(ApiResponse::new(stats)))
}

/// Full state dump. Development only: leaks every stored payload.
pub async fn debug_state(State(state): State<AppState>) -> Result<Json<ApiResponse<EngineDump>>> {
    ensure_debug_exposed(&state)?;
    let dump = state.engine.dump().await;
    Ok(Json(ApiResponse::new(dump)))
}

/// Manual full reset of registry and store; returns the prior sizes
pub async fn debug_reset(State(state): State<AppState>) -> Result<Json<ApiResponse<ResetReport>>> {
    ensure_debug_exposed(&state)?;
    let report = state.engine.reset().await;
    info!(
        registry_cleared = report.registry_cleared,
        store_cleared = report.store_cleared,
        "manual reset requested over the admin surface"
    );
    Ok(Json(ApiResponse::new(report)))
}

fn ensure_debug_exposed(state: &AppState) -> Result<()> {
    if state.settings.expose_debug {
        Ok(())
    } else {
        Err(ApiError::NotFound("debug endpoints are disabled".to_string()))
    }
}

/// Resident memory of this process in bytes, best effort.
///
/// Reads `/proc/self/statm` on Linux; anywhere that file is unavailable
/// the snapshot reports zero rather than failing the health check.
fn process_memory_bytes() -> u64 {
    std::fs::read_to_string("/proc/self/statm")
        .ok()
        .and_then(|statm| {
            statm
                .split_whitespace()
                .nth(1)
                .and_then(|pages| pages.parse::<u64>().ok())
        })
        .map(|pages| pages * 4096)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fixture_state(expose_debug: bool) -> AppState {
        AppState::new(
            Arc::new(DeliveryEngine::new()),
            ApiSettings::default().expose_debug(expose_debug),
        )
    }

    #[tokio::test]
    async fn test_ingest_callback_accepts_valid_payload() {
        let state = fixture_state(false);
        let payload = json!({"actionId": "act-1", "value": 42});

        let Json(response) = ingest_callback(State(state.clone()), HeaderMap::new(), Json(payload))
            .await
            .unwrap();

        assert!(response.data.accepted);
        assert_eq!(response.data.action_id, "act-1");

        let snapshot = state.engine.snapshot().await;
        assert_eq!(snapshot.stored, 1);
    }

    #[tokio::test]
    async fn test_ingest_callback_rejects_missing_action_id() {
        let state = fixture_state(false);
        let payload = json!({"value": 42});

        let actual = ingest_callback(State(state.clone()), HeaderMap::new(), Json(payload)).await;
        assert!(matches!(actual, Err(ApiError::MissingActionId(_))));

        let snapshot = state.engine.snapshot().await;
        assert_eq!(snapshot.stored, 0);
    }

    #[tokio::test]
    async fn test_ingest_callback_records_source_header() {
        let state = fixture_state(false);
        let mut headers = HeaderMap::new();
        headers.insert(CALLBACK_SOURCE_HEADER, "signer-service".parse().unwrap());

        ingest_callback(
            State(state.clone()),
            headers,
            Json(json!({"actionId": "act-1"})),
        )
        .await
        .unwrap();

        let consumed = state
            .engine
            .consume_one(&ActionId::new("act-1"))
            .await
            .unwrap();
        assert_eq!(consumed.origin, "signer-service");
    }

    #[tokio::test]
    async fn test_consume_result_miss_maps_to_not_found() {
        let state = fixture_state(false);

        let actual = consume_result(State(state), Path("missing".to_string())).await;
        match actual {
            Err(ApiError::ResultNotFound { action_id, .. }) => {
                assert_eq!(action_id, "missing");
            }
            other => panic!("Expected ResultNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_consume_results_rejects_non_sequence() {
        let state = fixture_state(false);
        let payload = json!({"actionIds": "not-a-list"});

        let actual = consume_results(State(state), Json(payload)).await;
        assert!(matches!(actual, Err(ApiError::InvalidActionIds(_))));
    }

    #[tokio::test]
    async fn test_consume_results_mixed_batch() {
        let state = fixture_state(false);
        state
            .engine
            .ingest(json!({"actionId": "b", "n": 2}), "test")
            .await
            .unwrap();

        let Json(response) = consume_results(
            State(state),
            Json(json!({"actionIds": ["a", "b", "c"]})),
        )
        .await
        .unwrap();

        assert_eq!(response.data.found, 1);
        assert_eq!(response.data.missed, 2);
    }

    #[tokio::test]
    async fn test_health_check_reports_counts() {
        let state = fixture_state(false);
        state
            .engine
            .ingest(json!({"actionId": "act-1"}), "test")
            .await
            .unwrap();

        let Json(response) = health_check(State(state)).await.unwrap();

        assert_eq!(response.status, "healthy");
        assert_eq!(response.stored, 1);
        assert_eq!(response.available_action_ids, vec!["act-1"]);
        assert_eq!(response.registered, 0);
    }

    #[tokio::test]
    async fn test_debug_endpoints_gated_by_settings() {
        let hidden = fixture_state(false);
        let actual = debug_state(State(hidden.clone())).await;
        assert!(matches!(actual, Err(ApiError::NotFound(_))));
        let actual = debug_reset(State(hidden)).await;
        assert!(matches!(actual, Err(ApiError::NotFound(_))));

        let exposed = fixture_state(true);
        assert!(debug_state(State(exposed.clone())).await.is_ok());
        assert!(debug_reset(State(exposed)).await.is_ok());
    }

    #[tokio::test]
    async fn test_debug_reset_reports_prior_sizes() {
        let state = fixture_state(true);
        state
            .engine
            .ingest(json!({"actionId": "act-1"}), "test")
            .await
            .unwrap();

        let Json(response) = debug_reset(State(state)).await.unwrap();
        assert_eq!(response.data.store_cleared, 1);
        assert_eq!(response.data.registry_cleared, 0);
    }
}
