//! Upstream game-stats API.
//!
//! The roster fetcher talks to the API only through [`StatsApi`], so tests can
//! substitute an in-memory implementation.

mod client;
pub mod types;

#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

pub use client::{RiotClient, RiotClientConfig};
pub use types::{AccountDto, LeagueEntryDto, MatchDto, SummonerDto};

use crate::models::MatchId;

/// Errors that can occur while talking to the upstream API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Rate limited by {host}, retry after {retry_after_secs}s")]
    RateLimited { host: String, retry_after_secs: u64 },

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API key not configured (set {0})")]
    MissingApiKey(String),

    #[error("API key contains characters not allowed in a header")]
    InvalidApiKey,
}

/// The five upstream calls the roster fetcher needs.
#[async_trait]
pub trait StatsApi: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &'static str;

    /// Resolve a Riot ID (`name#tag`) to an account.
    async fn account_by_riot_id(&self, name: &str, tag: &str) -> Result<AccountDto, FetchError>;

    async fn summoner_by_puuid(&self, puuid: &str) -> Result<SummonerDto, FetchError>;

    async fn league_entries(&self, summoner_id: &str) -> Result<Vec<LeagueEntryDto>, FetchError>;

    /// Most recent match ids, newest first.
    async fn match_ids(&self, puuid: &str, count: usize) -> Result<Vec<MatchId>, FetchError>;

    async fn match_detail(&self, match_id: &MatchId) -> Result<MatchDto, FetchError>;
}
