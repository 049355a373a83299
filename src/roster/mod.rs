//! Roster fetcher.
//!
//! Resolves each configured player against the upstream API and collects
//! their profile, ranked standing and recent match results:
//! 1. Riot ID to account (puuid)
//! 2. Summoner profile (icon, summoner id)
//! 3. Ranked league entry, best effort
//! 4. Recent match ids, then each match's details
//!
//! A player that fails is reported and skipped; the rest of the batch continues.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{FetchSettings, MAX_MATCH_COUNT};
use crate::models::{
    FetchFailure, MatchId, MatchResult, PlayerIdentity, PlayerRecord, RankedStanding,
    RosterSnapshot,
};
use crate::riot::{FetchError, StatsApi, SummonerDto};

/// Limits applied while fetching each player.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    /// Recent matches to fetch per player (at most 20)
    pub match_count: usize,

    /// Pause between consecutive match detail requests
    pub match_detail_delay: Duration,

    /// Queue whose league entry is reported as the rank
    pub ranked_queue: String,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        FetchPolicy::from(&FetchSettings::default())
    }
}

impl From<&FetchSettings> for FetchPolicy {
    fn from(settings: &FetchSettings) -> Self {
        Self {
            match_count: settings.match_count.min(MAX_MATCH_COUNT),
            match_detail_delay: Duration::from_millis(settings.match_detail_delay_ms),
            ranked_queue: settings.ranked_queue.clone(),
        }
    }
}

/// Fetches the whole roster, one player at a time.
pub struct RosterFetcher {
    api: Arc<dyn StatsApi>,
    policy: FetchPolicy,
}

impl RosterFetcher {
    pub fn new(api: Arc<dyn StatsApi>, policy: FetchPolicy) -> Self {
        Self { api, policy }
    }

    /// Fetch every player in roster order.
    ///
    /// Never fails as a whole: players that error are listed in
    /// [`RosterSnapshot::failures`] and the remaining players are still fetched.
    pub async fn fetch_roster(&self, roster: &[PlayerIdentity]) -> RosterSnapshot {
        info!(
            "Fetching {} players from {} backend",
            roster.len(),
            self.api.name()
        );

        let mut players = Vec::with_capacity(roster.len());
        let mut failures = Vec::new();

        for identity in roster {
            match self.fetch_player(identity).await {
                Ok(record) => {
                    info!(
                        "Fetched {}: {} matches, rank {}",
                        identity,
                        record.recent_matches.len(),
                        record
                            .rank
                            .as_ref()
                            .map(|r| format!("{} {}", r.tier, r.rank))
                            .unwrap_or_else(|| "unranked".to_string())
                    );
                    players.push(record);
                }
                Err(e) => {
                    warn!("Error fetching data for {}: {}", identity, e);
                    failures.push(FetchFailure {
                        player: identity.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        RosterSnapshot::new(players, failures)
    }

    /// Fetch one player's record.
    pub async fn fetch_player(&self, identity: &PlayerIdentity) -> Result<PlayerRecord, FetchError> {
        let account = self
            .api
            .account_by_riot_id(&identity.name, &identity.tag)
            .await?;
        let summoner = self.api.summoner_by_puuid(&account.puuid).await?;
        let rank = self.fetch_rank(identity, &summoner).await;
        let recent_matches = self.fetch_matches(&account.puuid).await?;

        Ok(PlayerRecord {
            name: account.game_name.unwrap_or_else(|| identity.name.clone()),
            tag: account.tag_line.unwrap_or_else(|| identity.tag.clone()),
            puuid: account.puuid.into(),
            summoner_id: summoner.id,
            profile_icon_id: summoner.profile_icon_id,
            rank,
            recent_matches,
        })
    }

    /// Ranked standing, or `None` when unranked or the lookup fails.
    async fn fetch_rank(
        &self,
        identity: &PlayerIdentity,
        summoner: &SummonerDto,
    ) -> Option<RankedStanding> {
        let Some(summoner_id) = summoner.id.as_deref() else {
            warn!("Summoner ID missing for {}, skipping rank lookup", identity);
            return None;
        };

        match self.api.league_entries(summoner_id).await {
            Ok(entries) => entries
                .iter()
                .find(|e| e.queue_type == self.policy.ranked_queue)
                .map(RankedStanding::from),
            Err(e) => {
                warn!("Failed to fetch league entries for {}: {}", identity, e);
                None
            }
        }
    }

    /// Recent match results, newest first.
    async fn fetch_matches(&self, puuid: &str) -> Result<Vec<MatchResult>, FetchError> {
        let ids = self.api.match_ids(puuid, self.policy.match_count).await?;
        let ids = dedup_ids(ids, self.policy.match_count);

        let mut results = Vec::with_capacity(ids.len());
        for (i, match_id) in ids.iter().enumerate() {
            if i > 0 && !self.policy.match_detail_delay.is_zero() {
                tokio::time::sleep(self.policy.match_detail_delay).await;
            }

            let detail = self.api.match_detail(match_id).await?;
            match detail.result_for(match_id, puuid) {
                Some(result) => results.push(result),
                None => debug!("{} not a participant in {}, skipping", puuid, match_id),
            }
        }

        Ok(results)
    }
}

/// Keep the first `limit` distinct ids, in order.
fn dedup_ids(ids: Vec<MatchId>, limit: usize) -> Vec<MatchId> {
    let mut seen = HashSet::new();
    ids.into_iter()
        .filter(|id| seen.insert(id.clone()))
        .take(limit)
        .collect()
}
