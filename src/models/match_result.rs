//! One player's outcome in one ranked match.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MatchId;

/// Lowest (best) placement a participant can get.
pub const BEST_PLACEMENT: u8 = 1;

/// A trait active for a player in a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trait {
    pub name: String,

    /// Number of units contributing to the trait
    pub num_units: u32,

    /// Activated tier level (0 = inactive)
    pub tier_current: u32,

    /// Cosmetic style rank: 0 none, 1 bronze, 2 silver, 3 gold, 4 chromatic
    pub style: u32,
}

/// A unit fielded on the board at the end of the match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub character_id: String,

    /// Star level
    pub tier: u32,

    #[serde(rename = "itemNames", default)]
    pub item_names: Vec<String>,
}

/// Match-level metadata, identical for every participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameDetail {
    /// Start timestamp in epoch milliseconds
    pub game_datetime: i64,

    /// Duration in seconds
    pub game_length: f64,

    pub game_version: String,
}

/// Coarse classification of a placement, used to colour match cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementBand {
    First,
    Top4,
    Bottom,
}

impl PlacementBand {
    pub fn from_placement(placement: u8) -> Self {
        match placement {
            1 => PlacementBand::First,
            p if p <= 4 => PlacementBand::Top4,
            _ => PlacementBand::Bottom,
        }
    }
}

/// One tracked player's result in one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub match_id: MatchId,

    /// Final placement, 1 (best) to 8
    pub placement: u8,

    #[serde(default)]
    pub traits: Vec<Trait>,

    #[serde(default)]
    pub units: Vec<Unit>,

    pub game_detail: GameDetail,
}

impl MatchResult {
    /// Start time in epoch milliseconds.
    pub fn started_at_millis(&self) -> i64 {
        self.game_detail.game_datetime
    }

    /// Start time as a UTC timestamp, if representable.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.game_detail.game_datetime)
    }

    pub fn is_win(&self) -> bool {
        self.placement == BEST_PLACEMENT
    }

    pub fn is_top4(&self) -> bool {
        (BEST_PLACEMENT..=4).contains(&self.placement)
    }

    pub fn band(&self) -> PlacementBand {
        PlacementBand::from_placement(self.placement)
    }
}
