//! Tracked players: static identities and the per-cycle records fetched for them.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{MatchResult, PlayerId};

const PROFILE_ICON_BASE: &str =
    "https://raw.communitydragon.org/latest/plugins/rcp-be-lol-game-data/global/default/v1/profile-icons";

/// A player to track, as configured.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerIdentity {
    /// In-game display name
    pub name: String,

    /// Tag line (the part after `#`)
    pub tag: String,
}

impl PlayerIdentity {
    pub fn new(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
        }
    }
}

impl fmt::Display for PlayerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.tag)
    }
}

/// Current ranked standing in the ranked queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedStanding {
    /// e.g. "DIAMOND"
    pub tier: String,

    /// Division within the tier, e.g. "II"
    pub rank: String,

    pub league_points: i32,
}

/// Everything fetched for one tracked player in one refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub name: String,
    pub tag: String,
    pub puuid: PlayerId,

    /// Platform-internal summoner id, absent for some accounts
    #[serde(default)]
    pub summoner_id: Option<String>,

    #[serde(default)]
    pub profile_icon_id: Option<i64>,

    /// Absent when unranked or when the lookup failed
    #[serde(default)]
    pub rank: Option<RankedStanding>,

    /// Newest first, at most one entry per match id
    #[serde(default)]
    pub recent_matches: Vec<MatchResult>,
}

impl PlayerRecord {
    pub fn id(&self) -> &PlayerId {
        &self.puuid
    }

    pub fn identity(&self) -> PlayerIdentity {
        PlayerIdentity::new(self.name.clone(), self.tag.clone())
    }

    /// Profile icon URL, falling back to the default icon when unknown.
    pub fn profile_icon_url(&self) -> String {
        format!("{}/{}.jpg", PROFILE_ICON_BASE, self.profile_icon_id.unwrap_or(0))
    }
}
