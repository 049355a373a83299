//! Leaderboards derived from player statistics.

use serde::{Deserialize, Serialize};

use super::stats::PlayerStats;
use crate::models::PlayerId;

/// Medal shown next to the top three entries of a leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    Gold,
    Silver,
    Bronze,
}

impl Badge {
    /// Badge for a zero-based leaderboard position.
    pub fn for_position(position: usize) -> Option<Self> {
        match position {
            0 => Some(Badge::Gold),
            1 => Some(Badge::Silver),
            2 => Some(Badge::Bronze),
            _ => None,
        }
    }
}

/// Which points total a leaderboard is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingKind {
    Overall,
    Solo,
    Shared,
}

impl RankingKind {
    pub fn value(&self, stats: &PlayerStats) -> i32 {
        match self {
            RankingKind::Overall => stats.total_points,
            RankingKind::Solo => stats.solo_points,
            RankingKind::Shared => stats.common_points,
        }
    }

    pub fn games(&self, stats: &PlayerStats) -> usize {
        match self {
            RankingKind::Overall => stats.filtered_games,
            RankingKind::Solo => stats.solo_games,
            RankingKind::Shared => stats.common_games,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    /// Zero-based position on the board
    pub position: usize,
    pub player_id: PlayerId,
    pub value: i32,
    pub games: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<Badge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rankings {
    pub overall: Vec<RankedEntry>,
    pub solo: Vec<RankedEntry>,

    /// Present only when the window contains common matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared: Option<Vec<RankedEntry>>,
}

/// Order players by `kind`, highest first. Ties keep input order.
pub fn rank_by<'a>(
    stats: impl IntoIterator<Item = &'a PlayerStats>,
    kind: RankingKind,
) -> Vec<RankedEntry> {
    let mut sorted: Vec<&PlayerStats> = stats.into_iter().collect();
    sorted.sort_by(|a, b| kind.value(b).cmp(&kind.value(a)));

    sorted
        .into_iter()
        .enumerate()
        .map(|(position, s)| RankedEntry {
            position,
            player_id: s.player_id.clone(),
            value: kind.value(s),
            games: kind.games(s),
            badge: Badge::for_position(position),
        })
        .collect()
}

/// Build all leaderboards. The shared board only lists players with common games.
pub fn build_rankings(stats: &[PlayerStats], has_common: bool) -> Rankings {
    Rankings {
        overall: rank_by(stats, RankingKind::Overall),
        solo: rank_by(stats, RankingKind::Solo),
        shared: has_common.then(|| {
            rank_by(
                stats.iter().filter(|s| s.common_games > 0),
                RankingKind::Shared,
            )
        }),
    }
}
