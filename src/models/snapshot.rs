//! The roster snapshot produced by one refresh cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PlayerIdentity, PlayerRecord};

/// A player whose fetch failed during a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub player: PlayerIdentity,
    pub error: String,
}

/// Immutable result of one roster fetch. Each cycle builds a fresh one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterSnapshot {
    /// Successfully fetched players, in roster order
    pub players: Vec<PlayerRecord>,

    #[serde(default)]
    pub failures: Vec<FetchFailure>,

    pub fetched_at: DateTime<Utc>,
}

/// Saved snapshots are either the full envelope or a bare player array.
#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Envelope(RosterSnapshot),
    Players(Vec<PlayerRecord>),
}

impl RosterSnapshot {
    pub fn new(players: Vec<PlayerRecord>, failures: Vec<FetchFailure>) -> Self {
        Self {
            players,
            failures,
            fetched_at: Utc::now(),
        }
    }

    /// No player could be fetched.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Parse a saved snapshot, accepting the bare `/api/stats` array as well.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        Ok(match serde_json::from_str(content)? {
            SnapshotFile::Envelope(snapshot) => snapshot,
            SnapshotFile::Players(players) => Self::new(players, Vec::new()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot() {
        let snapshot = RosterSnapshot::new(vec![], vec![]);
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_from_json_bare_array() {
        let json = r#"[{"name":"a","tag":"TR1","puuid":"p1","recentMatches":[]}]"#;
        let snapshot = RosterSnapshot::from_json(json).unwrap();

        assert_eq!(snapshot.players.len(), 1);
        assert!(snapshot.failures.is_empty());
    }

    #[test]
    fn test_from_json_envelope_roundtrip() {
        let snapshot = RosterSnapshot::new(
            vec![],
            vec![FetchFailure {
                player: PlayerIdentity::new("JitanX", "TR1"),
                error: "HTTP 404: Not Found".to_string(),
            }],
        );
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed = RosterSnapshot::from_json(&json).unwrap();

        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(RosterSnapshot::from_json("{\"nope\": 1}").is_err());
    }
}
