//! View Cache
//!
//! The leaderboard and race views are shared by every user, so they are
//! computed once and served from memory. A background task rebuilds them
//! from scratch whenever the change feed reports a profile or sale change.
//!
//! The race also goes stale when the calendar month rolls over without any
//! writes, so readers check the cached month and rebuild when it is behind.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use gamesales_db::{DbResult, SalesStore};
use gamesales_engine::race::{aggregate_participants, month_start, month_window};
use gamesales_engine::{build_race, rank, RaceConfig, RaceView, RankingEntry};
use gamesales_types::{ChangeKind, GoalId, Profile, UserId};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::state::AppState;

/// Shared, derived views
#[derive(Debug, Clone)]
pub struct CachedViews {
    /// Every approved user in rank order
    pub ranked: Vec<RankingEntry>,
    /// This month's race
    pub race: RaceView,
    /// Month the race was computed for
    pub month: NaiveDate,
    pub refreshed_at: DateTime<Utc>,
}

/// In-memory cache of the shared views
#[derive(Debug, Default)]
pub struct ViewCache {
    views: RwLock<Option<CachedViews>>,
    high_water: RwLock<HashMap<GoalId, Decimal>>,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild every cached view from the store
    pub async fn refresh(&self, store: &dyn SalesStore, race: &RaceConfig) -> DbResult<()> {
        let now = Utc::now();
        let profiles = store.approved_profiles().await?;
        let (start, end) = month_window(now);
        let sales = store.approved_sales_between(start, end).await?;

        let ranked = rank(profiles.iter().map(RankingEntry::from).collect());
        let by_id: HashMap<UserId, Profile> =
            profiles.into_iter().map(|p| (p.id, p)).collect();
        let race_view = build_race(aggregate_participants(&sales, &by_id), race);

        debug!(
            ranked = ranked.len(),
            racers = race_view.markers().len(),
            "Rebuilt shared views"
        );

        *self.views.write() = Some(CachedViews {
            ranked,
            race: race_view,
            month: month_start(now),
            refreshed_at: now,
        });
        Ok(())
    }

    /// Current views, rebuilding first if never built or from a past month
    pub async fn current(&self, store: &dyn SalesStore, race: &RaceConfig) -> DbResult<CachedViews> {
        if let Some(views) = self.snapshot() {
            if views.month == month_start(Utc::now()) {
                return Ok(views);
            }
        }
        self.refresh(store, race).await?;
        self.snapshot()
            .ok_or_else(|| gamesales_db::DbError::Feed("view cache empty after refresh".to_string()))
    }

    /// Views as last built, without touching the store
    pub fn snapshot(&self) -> Option<CachedViews> {
        self.views.read().clone()
    }

    /// Drop cached views so the next reader rebuilds them
    pub fn invalidate(&self) {
        *self.views.write() = None;
    }

    /// Record `percent` for a goal and return the highest seen before it
    pub fn observe_goal(&self, goal_id: GoalId, percent: Decimal) -> Option<Decimal> {
        let mut marks = self.high_water.write();
        let previous = marks.get(&goal_id).copied();
        let highest = previous.map_or(percent, |p| p.max(percent));
        marks.insert(goal_id, highest);
        previous
    }
}

/// Keep the shared views in step with the change feed until the feed closes
pub fn spawn_refresher(state: Arc<AppState>) -> JoinHandle<()> {
    let mut subscription = state.store.feed().subscribe();

    tokio::spawn(async move {
        info!("View refresher started");
        while let Some(signal) = subscription.next().await {
            if !(signal.touches(ChangeKind::Profiles) || signal.touches(ChangeKind::Sales)) {
                continue;
            }
            if let Err(e) = state.views.refresh(state.store.as_ref(), &state.settings.race).await {
                warn!(error = %e, "View refresh failed; rebuilding on next read");
                state.views.invalidate();
            }
        }
        info!("Change feed closed; view refresher stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamesales_db::MemoryStore;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_refresh_builds_views() {
        let store = MemoryStore::demo();
        let cache = ViewCache::new();
        assert!(cache.snapshot().is_none());

        cache.refresh(&store, &RaceConfig::default()).await.unwrap();
        let views = cache.snapshot().unwrap();
        assert_eq!(views.ranked[0].display_name, "Ana Souza");
        assert!(!views.race.is_empty());
        assert_eq!(views.race.markers()[0].position, dec!(80));
    }

    #[tokio::test]
    async fn test_current_builds_on_first_read() {
        let store = MemoryStore::demo();
        let cache = ViewCache::new();
        let views = cache.current(&store, &RaceConfig::default()).await.unwrap();
        assert_eq!(views.month, month_start(Utc::now()));
    }

    async fn wait_for_views(state: &AppState) -> Option<CachedViews> {
        for _ in 0..100 {
            if let Some(views) = state.views.snapshot() {
                return Some(views);
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        None
    }

    #[tokio::test]
    async fn test_refresher_rebuilds_on_sales_change() {
        let state = Arc::new(AppState::test());
        let refresher = spawn_refresher(state.clone());
        assert!(state.views.snapshot().is_none());

        // Goal changes do not touch the shared views
        state.store.feed().publish(ChangeKind::Goals);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(state.views.snapshot().is_none());

        state.store.feed().publish(ChangeKind::Sales);
        let views = wait_for_views(&state).await.expect("views rebuilt after sales change");
        assert_eq!(views.ranked[0].display_name, "Ana Souza");
        assert_eq!(views.month, month_start(Utc::now()));

        refresher.abort();
    }

    #[tokio::test]
    async fn test_refresher_rebuilds_after_invalidate() {
        let state = Arc::new(AppState::test());
        state
            .views
            .refresh(state.store.as_ref(), &state.settings.race)
            .await
            .unwrap();
        let refresher = spawn_refresher(state.clone());

        state.views.invalidate();
        state.store.feed().publish(ChangeKind::Profiles);
        assert!(wait_for_views(&state).await.is_some());

        refresher.abort();
    }

    #[test]
    fn test_observe_goal_tracks_highest() {
        let cache = ViewCache::new();
        let goal = GoalId::new();
        assert_eq!(cache.observe_goal(goal, dec!(70)), None);
        assert_eq!(cache.observe_goal(goal, dec!(40)), Some(dec!(70)));
        assert_eq!(cache.observe_goal(goal, dec!(90)), Some(dec!(70)));
        assert_eq!(cache.observe_goal(goal, dec!(10)), Some(dec!(90)));
    }
}
