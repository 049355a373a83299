use std::sync::Arc;

use crate::calculate::FilterMode;
use crate::sync::SyncOrchestrator;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<SyncOrchestrator>,

    /// Filter applied when a dashboard request names none
    pub default_filter: FilterMode,
}

impl AppState {
    pub fn new(orchestrator: Arc<SyncOrchestrator>, default_filter: FilterMode) -> Self {
        Self {
            orchestrator,
            default_filter,
        }
    }
}

#[cfg(test)]
pub(crate) fn test_state(
    api: crate::riot::mock::MockApi,
    roster: Vec<crate::models::PlayerIdentity>,
) -> AppState {
    test_state_sharing(api, roster, crate::sync::SharedSnapshot::default())
}

/// Like [`test_state`], publishing into an existing snapshot slot.
#[cfg(test)]
pub(crate) fn test_state_sharing(
    api: crate::riot::mock::MockApi,
    roster: Vec<crate::models::PlayerIdentity>,
    snapshot: crate::sync::SharedSnapshot,
) -> AppState {
    use std::time::Duration;

    use crate::roster::{FetchPolicy, RosterFetcher};
    use crate::sync::SyncConfig;

    let fetcher = RosterFetcher::new(
        Arc::new(api),
        FetchPolicy {
            match_detail_delay: Duration::ZERO,
            ..FetchPolicy::default()
        },
    );
    let orchestrator = SyncOrchestrator::new(
        SyncConfig {
            roster,
            interval: Duration::from_secs(60),
        },
        fetcher,
        snapshot,
    );

    AppState::new(Arc::new(orchestrator), FilterMode::default())
}
