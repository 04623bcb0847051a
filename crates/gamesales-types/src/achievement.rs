//! Achievement catalog and unlock records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{AchievementId, UserId};

/// How rare an achievement is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Self::Common => "COMUM",
            Self::Rare => "RARO",
            Self::Epic => "EPICO",
            Self::Legendary => "LENDARIO",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "COMUM" => Some(Self::Common),
            "RARO" => Some(Self::Rare),
            "EPICO" => Some(Self::Epic),
            "LENDARIO" => Some(Self::Legendary),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Common => "Common",
            Self::Rare => "Rare",
            Self::Epic => "Epic",
            Self::Legendary => "Legendary",
        }
    }

    /// Get color for UI display
    pub fn color(&self) -> &'static str {
        match self {
            Self::Common => "#9CA3AF",
            Self::Rare => "#3B82F6",
            Self::Epic => "#A855F7",
            Self::Legendary => "#F59E0B",
        }
    }
}

/// An achievement in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: AchievementId,
    /// Stable code used by the backend's unlock rules
    pub code: String,
    pub name: String,
    pub description: String,
    /// Icon name or emoji
    pub icon: String,
    pub rarity: Rarity,
}

/// A user's unlock of an achievement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementUnlock {
    pub achievement_id: AchievementId,
    pub user_id: UserId,
    pub unlocked_at: DateTime<Utc>,
}
