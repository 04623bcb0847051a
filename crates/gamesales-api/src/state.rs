//! Application State
//!
//! Shared state handed to every handler.

use std::sync::Arc;

use gamesales_db::SalesStore;
use gamesales_engine::{EngineError, EngineSettings, LevelTable};

use crate::views::ViewCache;

/// Application state shared across all handlers
pub struct AppState {
    /// Backend store
    pub store: Arc<dyn SalesStore>,
    /// Engine tunables
    pub settings: EngineSettings,
    /// Level table built from the settings
    pub levels: LevelTable,
    /// Leaderboard and race views
    pub views: ViewCache,
}

impl AppState {
    /// Create new application state, rejecting invalid engine settings
    pub fn new(store: Arc<dyn SalesStore>, settings: EngineSettings) -> Result<Self, EngineError> {
        let levels = settings.level_table()?;
        Ok(Self {
            store,
            settings,
            levels,
            views: ViewCache::new(),
        })
    }

    /// State over the in-memory demo store with default settings
    #[cfg(test)]
    pub fn test() -> Self {
        Self {
            store: Arc::new(gamesales_db::MemoryStore::demo()),
            settings: EngineSettings::default(),
            levels: LevelTable::default(),
            views: ViewCache::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_settings_rejected() {
        let mut settings = EngineSettings::default();
        settings.race.track_start = rust_decimal::Decimal::from(50);
        let store: Arc<dyn SalesStore> = Arc::new(gamesales_db::MemoryStore::new());
        assert!(AppState::new(store, settings).is_err());
    }
}
