//! Statistics calculation engine.
//!
//! Computes derived views from a roster snapshot:
//! - Match window filtering (today, last 10, last 20)
//! - Common match detection across tracked players
//! - Per-player points, averages and rates
//! - Overall, solo and shared leaderboards
//! - The head-to-head grid

pub mod common;
pub mod filter;
pub mod head_to_head;
pub mod ranking;
pub mod stats;

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

pub use common::{detect_common_matches, CommonMatch};
pub use filter::{filter_matches, filter_matches_at, FilterMode, ParseFilterModeError};
pub use head_to_head::{
    build_head_to_head, top_traits, trait_display_name, HeadToHeadCell, HeadToHeadRow,
    HEAD_TO_HEAD_LIMIT,
};
pub use ranking::{build_rankings, Badge, RankedEntry, RankingKind, Rankings};
pub use stats::{compute_player_stats, PlayerStats};

use crate::models::{MatchResult, PlayerId, PlayerRecord, RankedStanding};

/// Ladder points awarded for a final placement.
///
/// Top four gain, bottom four lose. Anything outside 1..=8 scores nothing.
pub fn points_for_placement(placement: u8) -> i32 {
    match placement {
        1 => 4,
        2 => 3,
        3 => 2,
        4 => 1,
        5 => -1,
        6 => -2,
        7 => -3,
        8 => -4,
        _ => 0,
    }
}

/// A player's card on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub player_id: PlayerId,
    pub name: String,
    pub tag: String,
    pub profile_icon_url: String,
    pub rank: Option<RankedStanding>,
    pub stats: PlayerStats,

    /// Matches in the active window, newest first
    pub window: Vec<MatchResult>,
}

/// Everything the dashboard renders for one filter mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub filter: FilterMode,

    /// In roster order
    pub players: Vec<PlayerSummary>,
    pub rankings: Rankings,
    pub common_matches: Vec<CommonMatch>,
    pub head_to_head: Vec<HeadToHeadRow>,
}

impl Dashboard {
    pub fn player(&self, id: &PlayerId) -> Option<&PlayerSummary> {
        self.players.iter().find(|p| &p.player_id == id)
    }
}

/// Build the dashboard against the local wall clock.
pub fn aggregate(players: &[PlayerRecord], mode: FilterMode) -> Dashboard {
    aggregate_at(players, mode, &Local::now())
}

/// Build the dashboard as seen at `now`.
///
/// Pure over its inputs: the same players, mode and instant always produce
/// the same dashboard.
pub fn aggregate_at<Tz: TimeZone>(
    players: &[PlayerRecord],
    mode: FilterMode,
    now: &DateTime<Tz>,
) -> Dashboard {
    let windows = filter::windows_at(players, mode, now);
    let common = detect_common_matches(&windows);

    let all_stats: Vec<PlayerStats> = windows
        .iter()
        .map(|w| compute_player_stats(w, &common))
        .collect();
    let rankings = build_rankings(&all_stats, !common.is_empty());

    let column_order: Vec<PlayerId> = rankings
        .overall
        .iter()
        .map(|e| e.player_id.clone())
        .collect();
    let head_to_head = build_head_to_head(&windows, &common, &column_order, HEAD_TO_HEAD_LIMIT);

    let summaries = windows
        .iter()
        .zip(all_stats)
        .map(|(w, stats)| PlayerSummary {
            player_id: w.player.id().clone(),
            name: w.player.name.clone(),
            tag: w.player.tag.clone(),
            profile_icon_url: w.player.profile_icon_url(),
            rank: w.player.rank.clone(),
            stats,
            window: w.matches.iter().map(|m| (*m).clone()).collect(),
        })
        .collect();

    Dashboard {
        filter: mode,
        players: summaries,
        rankings,
        common_matches: common,
        head_to_head,
    }
}
