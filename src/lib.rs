//! # TFT Tracker
//!
//! Tracks a fixed roster of Teamfight Tactics players: fetches their ranked
//! history, scores it on a custom points ladder and finds the matches they
//! played together.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (players, match results, snapshots)
//! - **riot**: Upstream game-stats API client
//! - **roster**: Per-player fetching with partial-failure tolerance
//! - **calculate**: Filtering, scoring, common matches, stats and rankings
//! - **sync**: Initial load, periodic re-poll and manual refresh
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod models;
pub mod riot;
pub mod roster;
pub mod sync;

pub use models::*;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "60s", "5m", "1h").
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        // Default to seconds
        (s, 1)
    };

    let num: u64 = num_str.trim().parse().ok()?;
    num.checked_mul(multiplier).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_hours() {
        assert_eq!(parse_duration("6h"), Some(Duration::from_secs(21600)));
    }

    #[test]
    fn test_parse_duration_minutes() {
        assert_eq!(parse_duration("30m"), Some(Duration::from_secs(1800)));
    }

    #[test]
    fn test_parse_duration_seconds() {
        assert_eq!(parse_duration("60s"), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_parse_duration_default_seconds() {
        assert_eq!(parse_duration("120"), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_parse_duration_invalid() {
        assert_eq!(parse_duration("abc"), None);
    }

    #[test]
    fn test_parse_duration_empty() {
        assert_eq!(parse_duration(""), None);
    }

    #[test]
    fn test_parse_duration_zero() {
        assert_eq!(parse_duration("0s"), Some(Duration::from_secs(0)));
    }

    #[test]
    fn test_parse_duration_large() {
        assert_eq!(parse_duration("9999h"), Some(Duration::from_secs(35996400)));
    }

    #[test]
    fn test_parse_duration_overflow() {
        assert_eq!(parse_duration("18446744073709551615h"), None);
    }

    #[test]
    fn test_parse_duration_negative() {
        assert_eq!(parse_duration("-5m"), None);
    }
}
