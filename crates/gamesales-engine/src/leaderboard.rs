//! # Leaderboard Ranker
//!
//! Orders users by total points, highest first. The sort is stable, so users
//! with equal points keep the order the query returned them in. Only approved
//! users should be passed in; filtering is the query's job.

use gamesales_types::{Profile, UserId};
use serde::{Deserialize, Serialize};

/// Default number of entries shown on the rankings page
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 20;

// ============================================================================
// Ranking Entries
// ============================================================================

/// Read-only projection of a profile for leaderboard rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub user_id: UserId,
    pub display_name: String,
    pub total_points: i64,
    pub current_level: i32,
    pub avatar_ref: Option<String>,
}

impl From<&Profile> for RankingEntry {
    fn from(profile: &Profile) -> Self {
        Self {
            user_id: profile.id,
            display_name: profile.display_name.clone(),
            total_points: profile.total_points,
            current_level: profile.current_level,
            avatar_ref: profile.avatar_url.clone(),
        }
    }
}

/// Sort entries by total points descending, preserving input order on ties
pub fn rank(mut entries: Vec<RankingEntry>) -> Vec<RankingEntry> {
    entries.sort_by(|a, b| b.total_points.cmp(&a.total_points));
    entries
}

// ============================================================================
// Medals
// ============================================================================

/// Podium medal for the top three positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl Medal {
    /// Medal for a 1-based rank
    pub fn for_rank(rank: usize) -> Option<Self> {
        match rank {
            1 => Some(Self::Gold),
            2 => Some(Self::Silver),
            3 => Some(Self::Bronze),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Gold => "Gold",
            Self::Silver => "Silver",
            Self::Bronze => "Bronze",
        }
    }

    /// Get medal color (hex)
    pub fn color(&self) -> &'static str {
        match self {
            Self::Gold => "#FFD700",
            Self::Silver => "#C0C0C0",
            Self::Bronze => "#CD7F32",
        }
    }
}

// ============================================================================
// Leaderboard View
// ============================================================================

/// An entry with its 1-based position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub rank: usize,
    pub medal: Option<Medal>,
    #[serde(flatten)]
    pub entry: RankingEntry,
}

/// Rank entries and number them, keeping at most `limit`
pub fn leaderboard(entries: Vec<RankingEntry>, limit: usize) -> Vec<RankedEntry> {
    rank(entries)
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, entry)| RankedEntry {
            rank: i + 1,
            medal: Medal::for_rank(i + 1),
            entry,
        })
        .collect()
}

/// 1-based position of a user in an already ranked list
pub fn position_of(ranked: &[RankingEntry], user_id: UserId) -> Option<usize> {
    ranked
        .iter()
        .position(|e| e.user_id == user_id)
        .map(|i| i + 1)
}
