use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::sync::{SyncError, SyncState};

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::AlreadyRunning => ApiError::Conflict("Refresh already running".to_string()),
            SyncError::NoRoster => ApiError::BadRequest(err.to_string()),
            SyncError::NoData { .. } => ApiError::NoData(err.to_string()),
            SyncError::Cancelled | SyncError::Aborted(_) => ApiError::Internal(err.to_string()),
        }
    }
}

/// Start a refresh cycle in the background and return its state with 202.
pub async fn start_refresh(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let current = state.orchestrator.start_background().await?;
    Ok((StatusCode::ACCEPTED, Json(current)))
}

pub async fn status(State(state): State<AppState>) -> Json<SyncState> {
    Json(state.orchestrator.state().await)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::api::build_router;
    use crate::api::state::test_state;
    use crate::models::PlayerIdentity;
    use crate::riot::mock::{match_dto, MockApi};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::util::ServiceExt;

    async fn send(app: axum::Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    fn api() -> MockApi {
        MockApi::new()
            .with_player("azeotrop", "TR1", "p-a", Some("s-a"))
            .with_match_ids("p-a", &["M1"])
            .with_match(match_dto("M1", 1_000, &[("p-a", 3)]))
    }

    fn roster() -> Vec<PlayerIdentity> {
        vec![PlayerIdentity::new("azeotrop", "TR1")]
    }

    #[tokio::test]
    async fn test_status_idle() {
        let app = build_router(test_state(api(), roster()));
        let (status, json) = send(app, "GET", "/api/refresh/status").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "idle");
        assert!(json["last_sync_started"].is_null());
    }

    #[tokio::test]
    async fn test_start_refresh_accepted_then_completes() {
        let state = test_state(api(), roster());
        let app = build_router(state.clone());

        let (status, json) = send(app.clone(), "POST", "/api/refresh").await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(json["status"], "running");

        tokio::time::sleep(Duration::from_millis(100)).await;

        let (_, json) = send(app.clone(), "GET", "/api/refresh/status").await;
        assert_eq!(json["status"], "completed");
        assert_eq!(json["players_fetched"], 1);

        let (status, _) = send(app, "GET", "/api/stats").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_start_refresh_conflict_while_running() {
        let state = test_state(api().with_latency(Duration::from_millis(300)), roster());
        let app = build_router(state);

        let (status, _) = send(app.clone(), "POST", "/api/refresh").await;
        assert_eq!(status, StatusCode::ACCEPTED);

        let (status, json) = send(app, "POST", "/api/refresh").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_start_refresh_without_roster() {
        let app = build_router(test_state(api(), vec![]));
        let (status, _) = send(app, "POST", "/api/refresh").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
