//! Achievement board: the catalog joined with one user's unlocks

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use gamesales_types::{Achievement, AchievementId, AchievementUnlock, Rarity};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// One achievement as shown to a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementCard {
    pub achievement: Achievement,
    /// Set when the user has unlocked it
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl AchievementCard {
    pub fn is_unlocked(&self) -> bool {
        self.unlocked_at.is_some()
    }
}

/// Unlock counts for one rarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RarityCount {
    pub rarity: Rarity,
    pub unlocked: usize,
    pub total: usize,
}

/// All achievements for a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementBoard {
    /// Unlocked first (most recent first), then locked in catalog order
    pub cards: Vec<AchievementCard>,
    pub unlocked_count: usize,
    pub total: usize,
    /// Share of the catalog unlocked, 0-100
    pub completion_percent: Decimal,
    /// Counts per rarity, most common first
    pub by_rarity: Vec<RarityCount>,
}

/// Join the catalog with a user's unlocks.
///
/// Unlocks referencing achievements missing from the catalog are ignored.
/// When an achievement was unlocked more than once the earliest unlock wins.
pub fn achievement_board(catalog: &[Achievement], unlocks: &[AchievementUnlock]) -> AchievementBoard {
    let mut unlocked_at: HashMap<AchievementId, DateTime<Utc>> = HashMap::new();
    for unlock in unlocks {
        unlocked_at
            .entry(unlock.achievement_id)
            .and_modify(|at| *at = (*at).min(unlock.unlocked_at))
            .or_insert(unlock.unlocked_at);
    }

    let (mut unlocked, locked): (Vec<AchievementCard>, Vec<AchievementCard>) = catalog
        .iter()
        .map(|achievement| AchievementCard {
            unlocked_at: unlocked_at.get(&achievement.id).copied(),
            achievement: achievement.clone(),
        })
        .partition(AchievementCard::is_unlocked);

    unlocked.sort_by(|a, b| b.unlocked_at.cmp(&a.unlocked_at));

    let unlocked_count = unlocked.len();
    let total = catalog.len();
    let completion_percent = if total == 0 {
        Decimal::ZERO
    } else {
        (Decimal::from(unlocked_count as u64) * dec!(100) / Decimal::from(total as u64)).round_dp(1)
    };

    let by_rarity = [Rarity::Common, Rarity::Rare, Rarity::Epic, Rarity::Legendary]
        .into_iter()
        .map(|rarity| RarityCount {
            rarity,
            unlocked: unlocked.iter().filter(|c| c.achievement.rarity == rarity).count(),
            total: catalog.iter().filter(|a| a.rarity == rarity).count(),
        })
        .collect();

    let mut cards = unlocked;
    cards.extend(locked);

    AchievementBoard {
        cards,
        unlocked_count,
        total,
        completion_percent,
        by_rarity,
    }
}
