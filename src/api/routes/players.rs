use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{PlayerRecord, RosterSnapshot};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// The latest snapshot, or `NoData` when it holds no players.
pub(crate) async fn current_snapshot(state: &AppState) -> Result<Arc<RosterSnapshot>, ApiError> {
    match state.orchestrator.snapshot().await {
        Some(snapshot) if !snapshot.is_empty() => Ok(snapshot),
        Some(snapshot) => Err(ApiError::NoData(format!(
            "no player data could be fetched ({} players failed)",
            snapshot.failures.len()
        ))),
        None => Err(ApiError::NoData(
            "no player data has been fetched yet".to_string(),
        )),
    }
}

/// Raw roster fetch output: every player's record in roster order.
pub async fn stats(State(state): State<AppState>) -> Result<Json<Vec<PlayerRecord>>, ApiError> {
    let snapshot = current_snapshot(&state).await?;
    Ok(Json(snapshot.players.clone()))
}

pub async fn player(
    State(state): State<AppState>,
    Path(puuid): Path<String>,
) -> Result<Json<PlayerRecord>, ApiError> {
    let snapshot = current_snapshot(&state).await?;
    snapshot
        .players
        .iter()
        .find(|p| p.puuid.as_str() == puuid)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("player {}", puuid)))
}
