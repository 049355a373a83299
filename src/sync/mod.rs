//! Refresh orchestrator.
//!
//! Keeps the published roster snapshot fresh:
//! 1. Fetch the whole roster from the upstream API
//! 2. Publish the new snapshot wholesale, even when every player failed
//! 3. Repeat on an interval, or on demand from the API
//!
//! Only one cycle runs at a time. Readers always see a complete snapshot.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::models::{PlayerIdentity, RosterSnapshot};
use crate::roster::RosterFetcher;

/// Errors that can occur during a refresh.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("No players configured")]
    NoRoster,

    #[error("No player data could be fetched ({failed} players failed)")]
    NoData { failed: usize },

    #[error("Refresh already in progress")]
    AlreadyRunning,

    #[error("Refresh cancelled")]
    Cancelled,

    #[error("Refresh aborted: {0}")]
    Aborted(String),
}

/// Configuration for refresh operations.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Players to fetch, in display order
    pub roster: Vec<PlayerIdentity>,

    /// Re-poll interval for periodic refresh
    pub interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            roster: Vec::new(),
            interval: Duration::from_secs(60),
        }
    }
}

/// The latest published snapshot, shared with the HTTP layer.
pub type SharedSnapshot = Arc<RwLock<Option<Arc<RosterSnapshot>>>>;

/// State of the refresh loop.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncState {
    /// Last refresh status
    pub status: SyncStatus,

    /// When the last refresh started
    pub last_sync_started: Option<DateTime<Utc>>,

    /// When the last refresh completed
    pub last_sync_completed: Option<DateTime<Utc>>,

    /// Players fetched in the last run
    pub players_fetched: u32,

    /// Players that failed in the last run
    pub players_failed: u32,

    /// Errors encountered
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}

/// Result of a refresh run.
#[derive(Debug, Clone)]
pub struct SyncResult {
    pub players_fetched: u32,
    pub players_failed: u32,
    pub errors: Vec<String>,
    pub duration: Duration,
}

/// Refresh orchestrator.
pub struct SyncOrchestrator {
    config: SyncConfig,
    fetcher: RosterFetcher,
    snapshot: SharedSnapshot,
    state: Arc<RwLock<SyncState>>,
    cancel_token: Arc<RwLock<bool>>,
}

impl SyncOrchestrator {
    /// Create a new orchestrator publishing into `snapshot`.
    pub fn new(config: SyncConfig, fetcher: RosterFetcher, snapshot: SharedSnapshot) -> Self {
        Self {
            config,
            fetcher,
            snapshot,
            state: Arc::new(RwLock::new(SyncState::default())),
            cancel_token: Arc::new(RwLock::new(false)),
        }
    }

    /// Get current refresh state.
    pub async fn state(&self) -> SyncState {
        self.state.read().await.clone()
    }

    /// The latest published snapshot, if any.
    pub async fn snapshot(&self) -> Option<Arc<RosterSnapshot>> {
        self.snapshot.read().await.clone()
    }

    /// Request cancellation of the periodic loop.
    pub async fn cancel(&self) {
        *self.cancel_token.write().await = true;
    }

    async fn is_cancelled(&self) -> bool {
        *self.cancel_token.read().await
    }

    /// Mark a cycle as running, unless one already is.
    async fn begin(&self) -> Result<(), SyncError> {
        let mut state = self.state.write().await;
        if state.status == SyncStatus::Running {
            return Err(SyncError::AlreadyRunning);
        }
        state.status = SyncStatus::Running;
        state.last_sync_started = Some(Utc::now());
        state.errors.clear();
        Ok(())
    }

    /// Run a single refresh cycle.
    pub async fn sync_once(&self) -> Result<SyncResult, SyncError> {
        self.admit().await?;
        self.run_cycle().await
    }

    async fn admit(&self) -> Result<(), SyncError> {
        if self.config.roster.is_empty() {
            return Err(SyncError::NoRoster);
        }
        if self.is_cancelled().await {
            return Err(SyncError::Cancelled);
        }
        self.begin().await
    }

    /// Fetch, publish and record the outcome of an admitted cycle.
    async fn run_cycle(&self) -> Result<SyncResult, SyncError> {
        let start = std::time::Instant::now();
        info!("Starting refresh of {} players", self.config.roster.len());

        let snapshot = self.fetcher.fetch_roster(&self.config.roster).await;

        let players_fetched = snapshot.players.len() as u32;
        let players_failed = snapshot.failures.len() as u32;
        let errors: Vec<String> = snapshot
            .failures
            .iter()
            .map(|f| format!("{}: {}", f.player, f.error))
            .collect();
        let has_data = !snapshot.is_empty();

        // An empty snapshot is published too, so readers see the outage as "no data".
        *self.snapshot.write().await = Some(Arc::new(snapshot));

        let duration = start.elapsed();

        {
            let mut state = self.state.write().await;
            state.last_sync_completed = Some(Utc::now());
            state.status = if has_data {
                SyncStatus::Completed
            } else {
                SyncStatus::Failed
            };
            state.players_fetched = players_fetched;
            state.players_failed = players_failed;
            state.errors = errors.clone();
        }

        if !has_data {
            warn!("Refresh produced no player data");
            return Err(SyncError::NoData {
                failed: players_failed as usize,
            });
        }

        info!(
            "Refresh completed: {} players fetched, {} failed in {:?}",
            players_fetched, players_failed, duration
        );

        Ok(SyncResult {
            players_fetched,
            players_failed,
            errors,
            duration,
        })
    }

    /// Run an admitted cycle on its own task, so a panic still releases the running slot.
    async fn run_admitted(self: &Arc<Self>) -> Result<SyncResult, SyncError> {
        let orchestrator = Arc::clone(self);
        match tokio::spawn(async move { orchestrator.run_cycle().await }).await {
            Ok(result) => result,
            Err(e) => {
                let message = e.to_string();
                error!("Refresh aborted: {}", message);

                let mut state = self.state.write().await;
                state.status = SyncStatus::Failed;
                state.last_sync_completed = Some(Utc::now());
                state.errors = vec![message.clone()];
                Err(SyncError::Aborted(message))
            }
        }
    }

    /// Run periodic refresh in the background. The first cycle starts immediately.
    pub async fn run_periodic(self: Arc<Self>) {
        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Starting periodic refresh every {:?}", self.config.interval);

        loop {
            ticker.tick().await;

            if self.is_cancelled().await {
                info!("Periodic refresh stopped");
                break;
            }

            let outcome = match self.admit().await {
                Ok(()) => self.run_admitted().await,
                Err(e) => Err(e),
            };

            match outcome {
                Ok(result) => {
                    info!(
                        "Periodic refresh completed: {} players",
                        result.players_fetched
                    );
                }
                Err(SyncError::Cancelled) => {
                    info!("Periodic refresh cancelled");
                    break;
                }
                Err(SyncError::AlreadyRunning) => {
                    info!("Skipping tick, refresh already in progress");
                }
                Err(e) => {
                    error!("Periodic refresh failed: {}", e);
                }
            }
        }
    }

    /// Admit a refresh and run it in the background.
    ///
    /// Returns the `running` state as soon as the cycle is admitted, or
    /// [`SyncError::AlreadyRunning`] if another cycle holds the slot.
    pub async fn start_background(self: &Arc<Self>) -> Result<SyncState, SyncError> {
        self.admit().await?;

        let orchestrator = Arc::clone(self);
        tokio::spawn(async move {
            match orchestrator.run_admitted().await {
                Ok(result) => info!(
                    "Manual refresh completed: {} players",
                    result.players_fetched
                ),
                Err(e) => error!("Manual refresh failed: {}", e),
            }
        });

        Ok(self.state().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::riot::mock::{match_dto, MockApi};
    use crate::riot::StatsApi;
    use crate::roster::FetchPolicy;

    fn policy() -> FetchPolicy {
        FetchPolicy {
            match_detail_delay: Duration::ZERO,
            ..FetchPolicy::default()
        }
    }

    fn api() -> MockApi {
        MockApi::new()
            .with_player("azeotrop", "TR1", "p-a", Some("s-a"))
            .with_player("JitanX", "TR1", "p-b", None)
            .with_match_ids("p-a", &["M1"])
            .with_match_ids("p-b", &["M1"])
            .with_match(match_dto("M1", 1_000, &[("p-a", 4), ("p-b", 7)]))
    }

    fn orchestrator(api: MockApi, roster: Vec<PlayerIdentity>) -> SyncOrchestrator {
        let api: Arc<dyn StatsApi> = Arc::new(api);
        SyncOrchestrator::new(
            SyncConfig {
                roster,
                interval: Duration::from_secs(60),
            },
            RosterFetcher::new(api, policy()),
            SharedSnapshot::default(),
        )
    }

    fn roster() -> Vec<PlayerIdentity> {
        vec![
            PlayerIdentity::new("azeotrop", "TR1"),
            PlayerIdentity::new("JitanX", "TR1"),
        ]
    }

    #[tokio::test]
    async fn test_sync_state_default() {
        let state = SyncState::default();
        assert_eq!(state.status, SyncStatus::Idle);
        assert!(state.last_sync_started.is_none());
    }

    #[tokio::test]
    async fn test_sync_no_roster() {
        let orchestrator = orchestrator(api(), vec![]);
        let result = orchestrator.sync_once().await;
        assert!(matches!(result, Err(SyncError::NoRoster)));
    }

    #[tokio::test]
    async fn test_sync_once_publishes_snapshot() {
        let orchestrator = orchestrator(api(), roster());
        assert!(orchestrator.snapshot().await.is_none());

        let result = orchestrator.sync_once().await.unwrap();
        assert_eq!(result.players_fetched, 2);
        assert_eq!(result.players_failed, 0);

        let snapshot = orchestrator.snapshot().await.unwrap();
        assert_eq!(snapshot.players.len(), 2);

        let state = orchestrator.state().await;
        assert_eq!(state.status, SyncStatus::Completed);
        assert!(state.last_sync_completed.is_some());
    }

    #[tokio::test]
    async fn test_partial_failure_still_publishes() {
        let mut players = roster();
        players.push(PlayerIdentity::new("Ghost", "EUW"));
        let orchestrator = orchestrator(api(), players);

        let result = orchestrator.sync_once().await.unwrap();

        assert_eq!(result.players_fetched, 2);
        assert_eq!(result.players_failed, 1);
        assert!(result.errors[0].starts_with("Ghost#EUW"));
    }

    #[tokio::test]
    async fn test_empty_cycle_replaces_previous_snapshot() {
        let shared = SharedSnapshot::default();
        let good = SyncOrchestrator::new(
            SyncConfig {
                roster: roster(),
                interval: Duration::from_secs(60),
            },
            RosterFetcher::new(Arc::new(api()), policy()),
            shared.clone(),
        );
        good.sync_once().await.unwrap();
        let before = good.snapshot().await.unwrap();

        let failing = SyncOrchestrator::new(
            SyncConfig {
                roster: vec![PlayerIdentity::new("Ghost", "EUW")],
                interval: Duration::from_secs(60),
            },
            RosterFetcher::new(Arc::new(api()), policy()),
            shared.clone(),
        );
        let result = failing.sync_once().await;

        assert!(matches!(result, Err(SyncError::NoData { failed: 1 })));
        assert_eq!(failing.state().await.status, SyncStatus::Failed);

        let after = failing.snapshot().await.unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert!(after.is_empty());
        assert_eq!(after.failures.len(), 1);
        assert_eq!(after.failures[0].player, PlayerIdentity::new("Ghost", "EUW"));
    }

    #[tokio::test]
    async fn test_overlapping_cycle_rejected() {
        let orchestrator = Arc::new(orchestrator(
            api().with_latency(Duration::from_millis(200)),
            roster(),
        ));

        let state = orchestrator.start_background().await.unwrap();
        assert_eq!(state.status, SyncStatus::Running);
        assert!(state.last_sync_started.is_some());

        assert!(matches!(
            orchestrator.start_background().await,
            Err(SyncError::AlreadyRunning)
        ));
        assert!(matches!(
            orchestrator.sync_once().await,
            Err(SyncError::AlreadyRunning)
        ));

        tokio::time::sleep(Duration::from_millis(800)).await;
        assert_eq!(orchestrator.state().await.status, SyncStatus::Completed);
        assert!(orchestrator.snapshot().await.is_some());
    }

    #[tokio::test]
    async fn test_cancelled_orchestrator_refuses_cycles() {
        let orchestrator = orchestrator(api(), roster());
        orchestrator.cancel().await;

        assert!(matches!(
            orchestrator.sync_once().await,
            Err(SyncError::Cancelled)
        ));
        assert!(orchestrator.snapshot().await.is_none());
    }

    #[tokio::test]
    async fn test_panicking_cycle_releases_running_slot() {
        let orchestrator = Arc::new(orchestrator(api().with_panic(), roster()));

        orchestrator.start_background().await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        let state = orchestrator.state().await;
        assert_eq!(state.status, SyncStatus::Failed);
        assert_eq!(state.errors.len(), 1);
        assert!(state.last_sync_completed.is_some());

        // The next refresh is admitted rather than rejected as overlapping
        let state = orchestrator.start_background().await.unwrap();
        assert_eq!(state.status, SyncStatus::Running);
    }

    #[tokio::test]
    async fn test_run_periodic_loads_immediately_and_stops_on_cancel() {
        let orchestrator = Arc::new(orchestrator(api(), roster()));

        let handle = tokio::spawn(orchestrator.clone().run_periodic());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(orchestrator.snapshot().await.is_some());

        orchestrator.cancel().await;
        handle.abort();
    }

    #[test]
    fn test_sync_state_serialization() {
        let state = SyncState {
            status: SyncStatus::Running,
            ..SyncState::default()
        };
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["status"], "running");
        assert_eq!(json["players_fetched"], 0);
    }
}
