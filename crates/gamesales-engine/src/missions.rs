//! Mission progress for one user

use gamesales_types::{Mission, MissionCriterion, Sale, UserId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::goals::percent_of;

/// Progress toward a mission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionProgress {
    pub mission: Mission,
    /// Sales counted or amount summed so far
    pub current: Decimal,
    /// Completion percent, capped at 100
    pub percent: Decimal,
    pub completed: bool,
}

/// Measure `user_id`'s approved sales against a mission inside its window
pub fn mission_progress(mission: &Mission, user_id: UserId, sales: &[Sale]) -> MissionProgress {
    let counted = sales
        .iter()
        .filter(|s| s.seller_id == user_id && s.counts_between(mission.starts_at, mission.ends_at));

    let current = match mission.criterion {
        MissionCriterion::SaleCount => Decimal::from(counted.count() as u64),
        MissionCriterion::SaleValue => {
            counted.fold(Decimal::ZERO, |acc, s| acc.saturating_add(s.amount))
        }
    };

    let (percent, completed) = if mission.target_value <= Decimal::ZERO {
        (dec!(100), true)
    } else {
        let raw = percent_of(current, mission.target_value);
        (raw.min(dec!(100)).round_dp(1), current >= mission.target_value)
    };

    MissionProgress {
        mission: mission.clone(),
        current,
        percent,
        completed,
    }
}

/// Progress for every mission, completed ones last
pub fn missions_board(missions: &[Mission], user_id: UserId, sales: &[Sale]) -> Vec<MissionProgress> {
    let mut board: Vec<MissionProgress> = missions
        .iter()
        .map(|m| mission_progress(m, user_id, sales))
        .collect();
    board.sort_by_key(|p| p.completed);
    board
}
