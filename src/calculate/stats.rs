//! Per-player statistics over the active window.

use serde::{Deserialize, Serialize};

use super::common::CommonMatch;
use super::filter::PlayerWindow;
use super::points_for_placement;
use crate::models::{MatchResult, PlayerId};

/// Shown when a player has no matches in the active window.
pub const NO_PLACEMENT: &str = "N/A";

/// Aggregate statistics for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub player_id: PlayerId,

    /// Sum of ladder points over the window
    pub total_points: i32,

    /// Mean points per game, rounded to one decimal (0 when the window is empty)
    pub avg_points: f64,

    /// Mean placement, rounded to two decimals
    pub avg_placement: Option<f64>,

    pub top4_count: u32,

    /// Integer percentage of games finishing 1st to 4th
    pub top4_rate: u32,

    pub win_count: u32,

    /// Integer percentage of games won
    pub win_rate: u32,

    /// Games in the active window
    pub filtered_games: usize,

    /// Games in the full fetched history
    pub total_games_available: usize,

    /// Mean placement over the full fetched history
    pub all_time_avg_placement: Option<f64>,

    /// Games in the window shared with another tracked player
    pub common_games: usize,

    pub common_points: i32,
    pub solo_points: i32,
    pub solo_games: usize,
}

impl PlayerStats {
    /// Average points as displayed: one decimal, or "0" when there are no games.
    pub fn avg_points_display(&self) -> String {
        if self.filtered_games == 0 {
            "0".to_string()
        } else {
            format!("{:.1}", self.avg_points)
        }
    }

    /// Average placement as displayed: two decimals, or "N/A".
    pub fn avg_placement_display(&self) -> String {
        format_placement(self.avg_placement)
    }

    pub fn all_time_avg_placement_display(&self) -> String {
        format_placement(self.all_time_avg_placement)
    }
}

fn format_placement(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| NO_PLACEMENT.to_string())
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn percent(count: u32, total: usize) -> u32 {
    if total == 0 {
        0
    } else {
        (count as f64 / total as f64 * 100.0).round() as u32
    }
}

fn mean_placement<'a>(matches: impl Iterator<Item = &'a MatchResult>) -> Option<f64> {
    let (sum, n) = matches.fold((0u32, 0u32), |(sum, n), m| (sum + m.placement as u32, n + 1));
    (n > 0).then(|| sum as f64 / n as f64)
}

/// Compute statistics for one player's window.
///
/// `common` must come from the same set of windows so that the common/solo
/// split adds up to the totals.
pub fn compute_player_stats(window: &PlayerWindow<'_>, common: &[CommonMatch]) -> PlayerStats {
    let player_id = window.player.id();
    let games = window.len();

    let total_points: i32 = window
        .matches
        .iter()
        .map(|m| points_for_placement(m.placement))
        .sum();
    let top4_count = window.matches.iter().filter(|m| m.is_top4()).count() as u32;
    let win_count = window.matches.iter().filter(|m| m.is_win()).count() as u32;

    let (common_games, common_points) = common
        .iter()
        .filter_map(|c| c.placement_of(player_id))
        .fold((0usize, 0i32), |(n, pts), placement| {
            (n + 1, pts + points_for_placement(placement))
        });

    let avg_points = if games == 0 {
        0.0
    } else {
        round_to(total_points as f64 / games as f64, 1)
    };

    PlayerStats {
        player_id: player_id.clone(),
        total_points,
        avg_points,
        avg_placement: mean_placement(window.matches.iter().copied()).map(|v| round_to(v, 2)),
        top4_count,
        top4_rate: percent(top4_count, games),
        win_count,
        win_rate: percent(win_count, games),
        filtered_games: games,
        total_games_available: window.player.recent_matches.len(),
        all_time_avg_placement: mean_placement(window.player.recent_matches.iter())
            .map(|v| round_to(v, 2)),
        common_games,
        common_points,
        solo_points: total_points - common_points,
        solo_games: games.saturating_sub(common_games),
    }
}
