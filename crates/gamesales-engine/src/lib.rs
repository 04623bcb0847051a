//! GameSales Engine - Progression and goal computations
//!
//! Pure, synchronous functions that turn stored records into display-ready
//! metrics. Nothing here performs I/O or holds state between calls, so every
//! view can be recomputed from scratch whenever its inputs change.
//!
//! # Components
//!
//! - **Levels**: level table and XP progress within a level
//! - **Goals**: goal completion, individual share and bonus tier unlocks
//! - **Leaderboard**: stable ranking by total points
//! - **Race**: monthly revenue mapped onto the race track
//! - **Achievements / Missions / Dashboard**: per-user derived views
//!
//! # Example
//!
//! ```
//! use gamesales_engine::goals::goal_progress;
//! use rust_decimal_macros::dec;
//!
//! let progress = goal_progress(dec!(15000), dec!(30000));
//! assert_eq!(progress.percent, dec!(50));
//! assert_eq!(progress.remaining, dec!(15000));
//! ```

pub mod achievements;
pub mod dashboard;
pub mod goals;
pub mod leaderboard;
pub mod levels;
pub mod missions;
pub mod race;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use achievements::{achievement_board, AchievementBoard, AchievementCard};
pub use dashboard::{dashboard, Dashboard};
pub use goals::{goal_board, goal_progress, individual_target, GoalBoard, GoalProgress, TierRetention, TierState};
pub use leaderboard::{leaderboard, rank, Medal, RankedEntry, RankingEntry};
pub use levels::{LevelSettings, LevelTable, XpProgress};
pub use missions::{mission_progress, missions_board, MissionProgress};
pub use race::{build_race, race_position, RaceConfig, RaceMarker, RaceParticipant, RaceView};

/// Engine configuration errors
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("Invalid level table: {0}")]
    InvalidLevelTable(String),

    #[error("Invalid race configuration: {0}")]
    InvalidRaceConfig(String),
}

/// Tunable engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Level table
    pub levels: LevelSettings,
    /// Race track geometry
    pub race: RaceConfig,
    /// Entries shown on the rankings page
    pub leaderboard_limit: usize,
    /// Whether bonus tiers stay unlocked after a correction
    pub tier_retention: TierRetention,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            levels: LevelSettings::default(),
            race: RaceConfig::default(),
            leaderboard_limit: leaderboard::DEFAULT_LEADERBOARD_LIMIT,
            tier_retention: TierRetention::Live,
        }
    }
}

impl EngineSettings {
    /// Validate the settings and build the level table
    pub fn level_table(&self) -> Result<LevelTable, EngineError> {
        self.validate()?;
        LevelTable::from_settings(&self.levels)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.race.track_span <= rust_decimal::Decimal::ZERO {
            return Err(EngineError::InvalidRaceConfig(
                "track span must be positive".to_string(),
            ));
        }
        if self.race.track_start < rust_decimal::Decimal::ZERO
            || self.race.track_end() > rust_decimal_macros::dec!(100)
        {
            return Err(EngineError::InvalidRaceConfig(
                "track band must stay within 0-100".to_string(),
            ));
        }
        Ok(())
    }
}
