//! Match window selection for the active view.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{MatchResult, PlayerRecord};

/// Which slice of a player's history the view is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Matches started since local midnight
    Today,
    /// The 10 most recent matches
    Last10,
    /// The 20 most recent matches
    #[default]
    Last20,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown filter mode: {0} (expected today, last10 or last20)")]
pub struct ParseFilterModeError(pub String);

impl FilterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMode::Today => "today",
            FilterMode::Last10 => "last10",
            FilterMode::Last20 => "last20",
        }
    }

    /// Fixed window length, `None` for the calendar-day mode.
    pub fn window_len(&self) -> Option<usize> {
        match self {
            FilterMode::Today => None,
            FilterMode::Last10 => Some(10),
            FilterMode::Last20 => Some(20),
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterMode {
    type Err = ParseFilterModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(FilterMode::Today),
            "last10" => Ok(FilterMode::Last10),
            "last20" => Ok(FilterMode::Last20),
            _ => Err(ParseFilterModeError(s.to_string())),
        }
    }
}

/// A player together with the matches selected for the current view.
#[derive(Debug, Clone)]
pub struct PlayerWindow<'a> {
    pub player: &'a PlayerRecord,
    pub matches: Vec<&'a MatchResult>,
}

impl PlayerWindow<'_> {
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Local midnight of `now`'s calendar day, in `now`'s time zone.
///
/// When midnight falls into a DST gap the first valid instant after it is used.
pub fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let tz = now.timezone();
    let midnight = now.date_naive().and_time(NaiveTime::MIN);

    (0..=3)
        .find_map(|hours| {
            tz.from_local_datetime(&(midnight + Duration::hours(hours)))
                .earliest()
        })
        .unwrap_or_else(|| now.clone())
}

/// Filter a player's history against the local wall clock.
pub fn filter_matches(record: &PlayerRecord, mode: FilterMode) -> Vec<&MatchResult> {
    filter_matches_at(record, mode, &Local::now())
}

/// Filter a player's history as seen at `now`.
///
/// Relative order is preserved. `today` keeps matches started in
/// `[midnight, now)` of `now`'s calendar day.
pub fn filter_matches_at<'a, Tz: TimeZone>(
    record: &'a PlayerRecord,
    mode: FilterMode,
    now: &DateTime<Tz>,
) -> Vec<&'a MatchResult> {
    match mode.window_len() {
        Some(n) => record.recent_matches.iter().take(n).collect(),
        None => {
            let from = start_of_day(now).timestamp_millis();
            let until = now.timestamp_millis();
            record
                .recent_matches
                .iter()
                .filter(|m| (from..until).contains(&m.started_at_millis()))
                .collect()
        }
    }
}

/// Windows for every player, in input order.
pub fn windows_at<'a, Tz: TimeZone>(
    players: &'a [PlayerRecord],
    mode: FilterMode,
    now: &DateTime<Tz>,
) -> Vec<PlayerWindow<'a>> {
    players
        .iter()
        .map(|player| PlayerWindow {
            player,
            matches: filter_matches_at(player, mode, now),
        })
        .collect()
}
