//! In-memory [`StatsApi`] used by the fetcher, orchestrator and route tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::types::{
    AccountDto, LeagueEntryDto, MatchDto, MatchInfoDto, MatchMetadataDto, ParticipantDto,
    SummonerDto,
};
use super::{FetchError, StatsApi};
use crate::models::MatchId;

fn not_found() -> FetchError {
    FetchError::HttpStatus {
        status: 404,
        message: "Not Found".to_string(),
    }
}

/// Build a match where each `(puuid, placement)` pair is a participant.
pub fn match_dto(id: &str, game_datetime: i64, placements: &[(&str, u8)]) -> MatchDto {
    MatchDto {
        metadata: MatchMetadataDto {
            match_id: id.into(),
            participants: placements.iter().map(|(p, _)| p.to_string()).collect(),
        },
        info: MatchInfoDto {
            game_datetime,
            game_length: 1800.0,
            game_version: "Version 14.24".to_string(),
            participants: placements
                .iter()
                .map(|(puuid, placement)| ParticipantDto {
                    puuid: puuid.to_string(),
                    placement: *placement,
                    traits: vec![],
                    units: vec![],
                })
                .collect(),
        },
    }
}

#[derive(Default)]
pub struct MockApi {
    accounts: HashMap<(String, String), AccountDto>,
    summoners: HashMap<String, SummonerDto>,
    leagues: HashMap<String, Vec<LeagueEntryDto>>,
    failing_leagues: HashSet<String>,
    match_ids: HashMap<String, Vec<MatchId>>,
    matches: HashMap<MatchId, MatchDto>,
    latency: Option<Duration>,
    panics: bool,
    detail_calls: AtomicUsize,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a player with a summoner profile (`summoner_id` may be absent).
    pub fn with_player(mut self, name: &str, tag: &str, puuid: &str, summoner_id: Option<&str>) -> Self {
        self.accounts.insert(
            (name.to_string(), tag.to_string()),
            AccountDto {
                puuid: puuid.to_string(),
                game_name: Some(name.to_string()),
                tag_line: Some(tag.to_string()),
            },
        );
        self.summoners.insert(
            puuid.to_string(),
            SummonerDto {
                id: summoner_id.map(str::to_string),
                profile_icon_id: Some(29),
                puuid: Some(puuid.to_string()),
            },
        );
        self
    }

    pub fn with_rank(mut self, summoner_id: &str, queue: &str, tier: &str, lp: i32) -> Self {
        self.leagues
            .entry(summoner_id.to_string())
            .or_default()
            .push(LeagueEntryDto {
                queue_type: queue.to_string(),
                tier: tier.to_string(),
                rank: "I".to_string(),
                league_points: lp,
            });
        self
    }

    pub fn with_failing_league(mut self, summoner_id: &str) -> Self {
        self.failing_leagues.insert(summoner_id.to_string());
        self
    }

    pub fn with_match_ids(mut self, puuid: &str, ids: &[&str]) -> Self {
        self.match_ids
            .insert(puuid.to_string(), ids.iter().map(|id| MatchId::from(*id)).collect());
        self
    }

    pub fn with_match(mut self, dto: MatchDto) -> Self {
        self.matches.insert(dto.metadata.match_id.clone(), dto);
        self
    }

    /// Delay every call, to keep a refresh cycle in flight.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Panic on the first call, as a buggy client would.
    pub fn with_panic(mut self) -> Self {
        self.panics = true;
        self
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    async fn wait(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl StatsApi for MockApi {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn account_by_riot_id(&self, name: &str, tag: &str) -> Result<AccountDto, FetchError> {
        self.wait().await;
        if self.panics {
            panic!("account lookup for {}#{} blew up", name, tag);
        }
        self.accounts
            .get(&(name.to_string(), tag.to_string()))
            .cloned()
            .ok_or_else(not_found)
    }

    async fn summoner_by_puuid(&self, puuid: &str) -> Result<SummonerDto, FetchError> {
        self.summoners.get(puuid).cloned().ok_or_else(not_found)
    }

    async fn league_entries(&self, summoner_id: &str) -> Result<Vec<LeagueEntryDto>, FetchError> {
        if self.failing_leagues.contains(summoner_id) {
            return Err(FetchError::HttpStatus {
                status: 500,
                message: "Internal Server Error".to_string(),
            });
        }
        Ok(self.leagues.get(summoner_id).cloned().unwrap_or_default())
    }

    async fn match_ids(&self, puuid: &str, count: usize) -> Result<Vec<MatchId>, FetchError> {
        Ok(self
            .match_ids
            .get(puuid)
            .map(|ids| ids.iter().take(count).cloned().collect())
            .unwrap_or_default())
    }

    async fn match_detail(&self, match_id: &MatchId) -> Result<MatchDto, FetchError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.matches.get(match_id).cloned().ok_or_else(not_found)
    }
}
