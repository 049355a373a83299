use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::routes::players::current_snapshot;
use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::{
    aggregate, CommonMatch, FilterMode, HeadToHeadRow, PlayerSummary, Rankings,
};
use crate::models::{FetchFailure, PlacementBand};

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    pub filter: Option<String>,
}

/// Pre-formatted numbers, so every client renders them identically.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDisplay {
    pub avg_points: String,
    pub avg_placement: String,
    pub all_time_avg_placement: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerCard {
    #[serde(flatten)]
    pub summary: PlayerSummary,
    pub display: StatsDisplay,

    /// Band of each match in the window, same order as `window`
    pub window_bands: Vec<PlacementBand>,
}

impl From<PlayerSummary> for PlayerCard {
    fn from(summary: PlayerSummary) -> Self {
        let display = StatsDisplay {
            avg_points: summary.stats.avg_points_display(),
            avg_placement: summary.stats.avg_placement_display(),
            all_time_avg_placement: summary.stats.all_time_avg_placement_display(),
        };
        let window_bands = summary.window.iter().map(|m| m.band()).collect();

        Self {
            summary,
            display,
            window_bands,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub filter: FilterMode,
    pub fetched_at: DateTime<Utc>,
    pub players: Vec<PlayerCard>,
    pub rankings: Rankings,
    pub common_matches: Vec<CommonMatch>,
    pub head_to_head: Vec<HeadToHeadRow>,

    /// Roster members missing from this snapshot
    pub failures: Vec<FetchFailure>,
}

pub async fn dashboard(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let filter = match params.filter.as_deref() {
        Some(raw) => raw
            .parse::<FilterMode>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => state.default_filter,
    };

    let snapshot = current_snapshot(&state).await?;
    let dashboard = aggregate(&snapshot.players, filter);

    Ok(Json(DashboardResponse {
        filter: dashboard.filter,
        fetched_at: snapshot.fetched_at,
        players: dashboard.players.into_iter().map(PlayerCard::from).collect(),
        rankings: dashboard.rankings,
        common_matches: dashboard.common_matches,
        head_to_head: dashboard.head_to_head,
        failures: snapshot.failures.clone(),
    }))
}
