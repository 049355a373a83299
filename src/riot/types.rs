//! Wire types returned by the upstream stats API.
//!
//! Only the fields the tracker reads are modelled; everything else is ignored.

use serde::{Deserialize, Serialize};

use crate::models::{GameDetail, MatchId, MatchResult, RankedStanding, Trait, Unit};

/// `/riot/account/v1/accounts/by-riot-id/{name}/{tag}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub puuid: String,
    #[serde(default)]
    pub game_name: Option<String>,
    #[serde(default)]
    pub tag_line: Option<String>,
}

/// `/lol/summoner/v4/summoners/by-puuid/{puuid}`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummonerDto {
    /// Encrypted summoner id. Newer accounts may omit it.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub profile_icon_id: Option<i64>,
    #[serde(default)]
    pub puuid: Option<String>,
}

/// One entry of `/tft/league/v1/entries/by-summoner/{summonerId}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueEntryDto {
    pub queue_type: String,
    #[serde(default)]
    pub tier: String,
    #[serde(default)]
    pub rank: String,
    #[serde(default)]
    pub league_points: i32,
}

impl From<&LeagueEntryDto> for RankedStanding {
    fn from(entry: &LeagueEntryDto) -> Self {
        RankedStanding {
            tier: entry.tier.clone(),
            rank: entry.rank.clone(),
            league_points: entry.league_points,
        }
    }
}

/// `/tft/match/v1/matches/{matchId}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDto {
    pub metadata: MatchMetadataDto,
    pub info: MatchInfoDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchMetadataDto {
    pub match_id: MatchId,
    #[serde(default)]
    pub participants: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchInfoDto {
    pub game_datetime: i64,
    pub game_length: f64,
    #[serde(default)]
    pub game_version: String,
    #[serde(default)]
    pub participants: Vec<ParticipantDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantDto {
    pub puuid: String,
    pub placement: u8,
    #[serde(default)]
    pub traits: Vec<Trait>,
    #[serde(default)]
    pub units: Vec<Unit>,
}

impl MatchDto {
    pub fn participant(&self, puuid: &str) -> Option<&ParticipantDto> {
        self.info.participants.iter().find(|p| p.puuid == puuid)
    }

    /// The given player's result, or `None` if they are not a participant.
    pub fn result_for(&self, match_id: &MatchId, puuid: &str) -> Option<MatchResult> {
        self.participant(puuid).map(|p| MatchResult {
            match_id: match_id.clone(),
            placement: p.placement,
            traits: p.traits.clone(),
            units: p.units.clone(),
            game_detail: GameDetail {
                game_datetime: self.info.game_datetime,
                game_length: self.info.game_length,
                game_version: self.info.game_version.clone(),
            },
        })
    }
}
