//! reqwest implementation of [`StatsApi`] against the Riot developer API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::types::{AccountDto, LeagueEntryDto, MatchDto, SummonerDto};
use super::{FetchError, StatsApi};
use crate::config::RiotSettings;
use crate::models::MatchId;

const API_KEY_HEADER: &str = "x-riot-token";

/// Configuration for the upstream client.
#[derive(Debug, Clone)]
pub struct RiotClientConfig {
    pub api_key: String,

    /// Host for summoner and league endpoints, e.g. `https://tr1.api.riotgames.com`
    pub platform_base: Url,

    /// Host for account and match endpoints, e.g. `https://europe.api.riotgames.com`
    pub regional_base: Url,

    /// Request timeout
    pub timeout: Duration,

    pub user_agent: String,
}

impl RiotClientConfig {
    /// Build from settings, reading the API key from the configured environment variable.
    pub fn from_settings(settings: &RiotSettings) -> Result<Self, FetchError> {
        let api_key = std::env::var(&settings.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| FetchError::MissingApiKey(settings.api_key_env.clone()))?;

        Ok(Self {
            api_key,
            platform_base: routing_host(&settings.platform)?,
            regional_base: routing_host(&settings.region)?,
            timeout: Duration::from_secs(settings.timeout_seconds),
            user_agent: format!("tft-tracker/{}", env!("CARGO_PKG_VERSION")),
        })
    }
}

fn routing_host(routing: &str) -> Result<Url, FetchError> {
    let raw = format!("https://{}.api.riotgames.com/", routing);
    Url::parse(&raw).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", raw, e)))
}

/// Join already-unescaped path segments onto a base URL, percent-encoding each one.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, FetchError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| FetchError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// HTTP client for the Riot developer API.
pub struct RiotClient {
    client: Client,
    config: RiotClientConfig,
}

impl RiotClient {
    pub fn new(config: RiotClientConfig) -> Result<Self, FetchError> {
        let mut token = HeaderValue::from_str(&config.api_key)
            .map_err(|_| FetchError::InvalidApiKey)?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, token);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("tft-tracker")),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn from_settings(settings: &RiotSettings) -> Result<Self, FetchError> {
        Self::new(RiotClientConfig::from_settings(settings)?)
    }

    fn account_url(&self, name: &str, tag: &str) -> Result<Url, FetchError> {
        endpoint(
            &self.config.regional_base,
            &["riot", "account", "v1", "accounts", "by-riot-id", name, tag],
        )
    }

    fn summoner_url(&self, puuid: &str) -> Result<Url, FetchError> {
        endpoint(
            &self.config.platform_base,
            &["lol", "summoner", "v4", "summoners", "by-puuid", puuid],
        )
    }

    fn league_url(&self, summoner_id: &str) -> Result<Url, FetchError> {
        endpoint(
            &self.config.platform_base,
            &["tft", "league", "v1", "entries", "by-summoner", summoner_id],
        )
    }

    fn match_ids_url(&self, puuid: &str, count: usize) -> Result<Url, FetchError> {
        let mut url = endpoint(
            &self.config.regional_base,
            &["tft", "match", "v1", "matches", "by-puuid", puuid, "ids"],
        )?;
        url.query_pairs_mut()
            .append_pair("start", "0")
            .append_pair("count", &count.to_string());
        Ok(url)
    }

    fn match_url(&self, match_id: &MatchId) -> Result<Url, FetchError> {
        endpoint(
            &self.config.regional_base,
            &["tft", "match", "v1", "matches", match_id.as_str()],
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        debug!("GET {}", url.path());

        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(FetchError::RateLimited {
                host: url.host_str().unwrap_or("unknown").to_string(),
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl StatsApi for RiotClient {
    fn name(&self) -> &'static str {
        "riot"
    }

    async fn account_by_riot_id(&self, name: &str, tag: &str) -> Result<AccountDto, FetchError> {
        self.get_json(self.account_url(name, tag)?).await
    }

    async fn summoner_by_puuid(&self, puuid: &str) -> Result<SummonerDto, FetchError> {
        self.get_json(self.summoner_url(puuid)?).await
    }

    async fn league_entries(&self, summoner_id: &str) -> Result<Vec<LeagueEntryDto>, FetchError> {
        self.get_json(self.league_url(summoner_id)?).await
    }

    async fn match_ids(&self, puuid: &str, count: usize) -> Result<Vec<MatchId>, FetchError> {
        self.get_json(self.match_ids_url(puuid, count)?).await
    }

    async fn match_detail(&self, match_id: &MatchId) -> Result<MatchDto, FetchError> {
        self.get_json(self.match_url(match_id)?).await
    }
}
