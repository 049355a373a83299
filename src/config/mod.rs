//! Configuration loading and validation.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculate::FilterMode;
use crate::models::PlayerIdentity;
use crate::parse_duration;

/// Upper bound the upstream match-history endpoint serves per request.
pub const MAX_MATCH_COUNT: usize = 20;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Upstream API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiotSettings {
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Platform routing value for summoner and league lookups
    #[serde(default = "default_platform")]
    pub platform: String,

    /// Regional routing value for account and match lookups
    #[serde(default = "default_region")]
    pub region: String,

    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_api_key_env() -> String {
    "RIOT_API_KEY".to_string()
}

fn default_platform() -> String {
    "tr1".to_string()
}

fn default_region() -> String {
    "europe".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for RiotSettings {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            platform: default_platform(),
            region: default_region(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// How much history to pull per player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSettings {
    #[serde(default = "default_match_count")]
    pub match_count: usize,

    /// Pause between consecutive match detail requests
    #[serde(default = "default_match_detail_delay")]
    pub match_detail_delay_ms: u64,

    /// Queue whose league entry is reported as the player's rank
    #[serde(default = "default_ranked_queue")]
    pub ranked_queue: String,
}

fn default_match_count() -> usize {
    MAX_MATCH_COUNT
}

fn default_match_detail_delay() -> u64 {
    10
}

fn default_ranked_queue() -> String {
    "RANKED_TFT".to_string()
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            match_count: default_match_count(),
            match_detail_delay_ms: default_match_detail_delay(),
            ranked_queue: default_ranked_queue(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Background refresh settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshSettings {
    /// Re-poll interval (e.g. "60s", "5m")
    #[serde(default = "default_interval")]
    pub interval: String,

    /// Filter used by the dashboard when the request names none
    #[serde(default)]
    pub default_filter: FilterMode,
}

fn default_interval() -> String {
    "60s".to_string()
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            default_filter: FilterMode::default(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Players to track, in display order
    #[serde(default = "default_roster")]
    pub roster: Vec<PlayerIdentity>,

    #[serde(default)]
    pub riot: RiotSettings,

    #[serde(default)]
    pub fetch: FetchSettings,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub refresh: RefreshSettings,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_roster() -> Vec<PlayerIdentity> {
    vec![
        PlayerIdentity::new("azeotrop", "TR1"),
        PlayerIdentity::new("JitanX", "TR1"),
        PlayerIdentity::new("AAykut", "TR1"),
        PlayerIdentity::new("Atìì", "3233"),
    ]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            roster: default_roster(),
            riot: RiotSettings::default(),
            fetch: FetchSettings::default(),
            server: ServerConfig::default(),
            refresh: RefreshSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Parsed refresh interval.
    pub fn refresh_interval(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.refresh.interval)
            .filter(|d| !d.is_zero())
            .ok_or_else(|| {
                ConfigError::ValidationError(format!(
                    "Invalid refresh interval: {:?}",
                    self.refresh.interval
                ))
            })
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.roster.is_empty() {
            return Err(ConfigError::ValidationError(
                "Roster must list at least one player".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for player in &self.roster {
            if player.name.trim().is_empty() || player.tag.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "Roster entry {:?} needs both a name and a tag",
                    player.to_string()
                )));
            }
            if !seen.insert(player) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate roster entry: {}",
                    player
                )));
            }
        }

        if !(1..=MAX_MATCH_COUNT).contains(&self.fetch.match_count) {
            return Err(ConfigError::ValidationError(format!(
                "match_count must be between 1 and {}",
                MAX_MATCH_COUNT
            )));
        }

        if self.riot.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Riot API timeout must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        self.refresh_interval()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.log_level, "info");
        assert_eq!(config.roster.len(), 4);
        assert_eq!(config.roster[3], PlayerIdentity::new("Atìì", "3233"));
        assert_eq!(config.riot.api_key_env, "RIOT_API_KEY");
        assert_eq!(config.riot.platform, "tr1");
        assert_eq!(config.riot.region, "europe");
        assert_eq!(config.fetch.match_count, 20);
        assert_eq!(config.fetch.ranked_queue, "RANKED_TFT");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.refresh.default_filter, FilterMode::Last20);
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.refresh_interval().unwrap(), Duration::from_secs(60));
    }

    #[test]
    fn test_config_validation_empty_roster() {
        let mut config = AppConfig::default();
        config.roster.clear();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_duplicate_player() {
        let mut config = AppConfig::default();
        config.roster.push(PlayerIdentity::new("JitanX", "TR1"));

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("JitanX#TR1"));
    }

    #[test]
    fn test_config_validation_match_count() {
        let mut config = AppConfig::default();
        config.fetch.match_count = 0;
        assert!(config.validate().is_err());

        config.fetch.match_count = 21;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_timeout() {
        let mut config = AppConfig::default();
        config.riot.timeout_seconds = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_interval() {
        let mut config = AppConfig::default();
        config.refresh.interval = "soon".to_string();
        assert!(config.validate().is_err());

        config.refresh.interval = "0s".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [[roster]]
            name = "azeotrop"
            tag = "TR1"

            [[roster]]
            name = "JitanX"
            tag = "TR1"

            [refresh]
            interval = "5m"
            default_filter = "today"
            "#,
        )
        .unwrap();

        assert_eq!(config.roster.len(), 2);
        assert_eq!(config.refresh_interval().unwrap(), Duration::from_secs(300));
        assert_eq!(config.refresh.default_filter, FilterMode::Today);
        assert_eq!(config.fetch.match_detail_delay_ms, 10);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            log_level = "debug"

            [riot]
            platform = "euw1"

            [server]
            port = 9090
            "#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.riot.platform, "euw1");
        assert_eq!(config.riot.region, "europe");
        assert_eq!(config.server.port, 9090);
    }

    #[test]
    fn test_from_file_missing() {
        let err = AppConfig::from_file(Path::new("/nonexistent/tft-tracker.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError(_)));
    }

    #[test]
    fn test_from_toml_rejects_bad_filter() {
        let err = AppConfig::from_toml("[refresh]\ndefault_filter = \"last5\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
