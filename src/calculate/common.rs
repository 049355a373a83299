//! Detection of matches shared by two or more tracked players.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::filter::PlayerWindow;
use crate::models::{MatchId, PlayerId};

/// A match that at least two tracked players took part in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonMatch {
    pub match_id: MatchId,

    /// Placement of every tracked participant, keyed by player id
    pub placements: BTreeMap<PlayerId, u8>,

    /// Start time in epoch milliseconds, taken from the first record seen
    pub timestamp: i64,
}

impl CommonMatch {
    pub fn placement_of(&self, player: &PlayerId) -> Option<u8> {
        self.placements.get(player).copied()
    }

    pub fn participants(&self) -> impl Iterator<Item = &PlayerId> {
        self.placements.keys()
    }

    pub fn includes(&self, player: &PlayerId) -> bool {
        self.placements.contains_key(player)
    }
}

/// Find matches appearing in the windows of at least two players.
///
/// Output is sorted by timestamp, newest first. Ties keep the order in which
/// matches were first encountered (player order, then window order).
pub fn detect_common_matches(windows: &[PlayerWindow<'_>]) -> Vec<CommonMatch> {
    let active = windows.iter().filter(|w| !w.is_empty()).count();
    if active < 2 {
        return Vec::new();
    }

    let mut seen: Vec<CommonMatch> = Vec::new();
    let mut index: HashMap<&MatchId, usize> = HashMap::new();

    for window in windows {
        let player = window.player.id();
        for m in &window.matches {
            let slot = *index.entry(&m.match_id).or_insert_with(|| {
                seen.push(CommonMatch {
                    match_id: m.match_id.clone(),
                    placements: BTreeMap::new(),
                    timestamp: m.started_at_millis(),
                });
                seen.len() - 1
            });
            seen[slot].placements.insert(player.clone(), m.placement);
        }
    }

    seen.retain(|c| c.placements.len() >= 2);
    seen.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    seen
}
