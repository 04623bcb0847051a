//! Dashboard summary for the session user

use gamesales_types::{Role, Session, UserId};
use serde::{Deserialize, Serialize};

use crate::leaderboard::{position_of, RankingEntry};
use crate::levels::{LevelTable, XpProgress};

/// Progression summary shown on the home page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    pub user_id: UserId,
    pub display_name: String,
    pub role: Role,
    pub total_points: i64,
    pub total_experience: i64,
    /// Level as stored on the profile
    pub stored_level: i32,
    /// Level implied by the experience total
    pub derived_level: i32,
    /// Stored level disagrees with experience; resolves on a later refresh
    pub level_stale: bool,
    /// Progress within the stored level
    pub xp: XpProgress,
    /// 1-based leaderboard position, if ranked
    pub ranking_position: Option<usize>,
}

/// Build the dashboard from the session and the full ranked list
pub fn dashboard(session: &Session, table: &LevelTable, ranked: &[RankingEntry]) -> Dashboard {
    let progress = session.profile.progress();
    let derived_level = table.level_for(progress.total_experience);

    Dashboard {
        user_id: session.user_id(),
        display_name: session.profile.display_name.clone(),
        role: session.role(),
        total_points: progress.total_points,
        total_experience: progress.total_experience,
        stored_level: progress.current_level,
        derived_level,
        level_stale: derived_level != progress.current_level,
        xp: table.xp_progress(progress.total_experience, progress.current_level),
        ranking_position: position_of(ranked, session.user_id()),
    }
}
