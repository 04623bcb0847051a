//! # Goal Progress
//!
//! Team goal completion, the even individual share, and bonus tier unlock
//! state.
//!
//! Percentages are not clamped: a team at twice its target shows 200%.
//! Malformed targets (zero or negative) degrade to 0% with nothing remaining
//! instead of failing, since these values only feed a display.

use gamesales_types::{BonusTier, GoalDefinition};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

// ============================================================================
// Progress
// ============================================================================

/// Completion of a goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalProgress {
    /// `100 * current / target`, unclamped
    pub percent: Decimal,
    /// `max(0, target - current)`
    pub remaining: Decimal,
}

impl GoalProgress {
    /// Whether the goal target has been met
    pub fn is_reached(&self) -> bool {
        self.percent >= dec!(100)
    }
}

/// Completion percentage and remaining amount for a sales total
pub fn goal_progress(current_total: Decimal, target_amount: Decimal) -> GoalProgress {
    if target_amount <= Decimal::ZERO {
        return GoalProgress {
            percent: Decimal::ZERO,
            remaining: Decimal::ZERO,
        };
    }

    GoalProgress {
        percent: percent_of(current_total, target_amount),
        remaining: target_amount
            .checked_sub(current_total)
            .unwrap_or(Decimal::ZERO)
            .max(Decimal::ZERO),
    }
}

/// `100 * part / whole` for a positive `whole`, saturating instead of
/// overflowing the decimal range
pub(crate) fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    dec!(100)
        .checked_mul(part)
        .and_then(|scaled| scaled.checked_div(whole))
        .or_else(|| part.checked_div(whole).and_then(|ratio| ratio.checked_mul(dec!(100))))
        .unwrap_or(if part.is_sign_negative() { Decimal::MIN } else { Decimal::MAX })
}

/// Even share of the target per participant; zero participants count as one
pub fn individual_target(target_amount: Decimal, participant_count: u64) -> Decimal {
    target_amount / Decimal::from(participant_count.max(1))
}

// ============================================================================
// Bonus Tiers
// ============================================================================

/// Whether a tier that unlocks at `unlock_percent` is unlocked at `percent`
pub fn is_tier_unlocked(unlock_percent: i32, percent: Decimal) -> bool {
    percent >= Decimal::from(unlock_percent)
}

/// What happens to a tier once progress falls back below it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierRetention {
    /// Unlock state follows the current percent; corrections can revoke tiers
    #[default]
    Live,
    /// Unlock state follows the highest percent observed for the goal
    HighWaterMark,
}

impl TierRetention {
    /// Percent that tier unlocks are evaluated against
    pub fn effective_percent(&self, current: Decimal, high_water: Option<Decimal>) -> Decimal {
        match self {
            Self::Live => current,
            Self::HighWaterMark => high_water.map_or(current, |hw| hw.max(current)),
        }
    }
}

/// A bonus tier with its unlock state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierState {
    pub tier: BonusTier,
    pub unlocked: bool,
}

/// Tiers in ascending unlock order with their state at `percent`
pub fn tier_states(tiers: &[BonusTier], percent: Decimal) -> Vec<TierState> {
    let mut ordered: Vec<&BonusTier> = tiers.iter().collect();
    ordered.sort_by_key(|t| t.unlock_percent);

    ordered
        .into_iter()
        .map(|tier| TierState {
            unlocked: is_tier_unlocked(tier.unlock_percent, percent),
            tier: tier.clone(),
        })
        .collect()
}

// ============================================================================
// Goal Board
// ============================================================================

/// Everything the goals page shows for one goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalBoard {
    /// The goal itself
    pub goal: GoalDefinition,
    /// Sum of approved sales in the goal window
    pub team_total: Decimal,
    /// Completion
    pub progress: GoalProgress,
    /// Participants used for the individual share (never 0)
    pub participant_count: u64,
    /// Target per participant
    pub individual_target: Decimal,
    /// Whether 100% has been reached
    pub goal_reached: bool,
    /// Tiers in ascending unlock order
    pub tiers: Vec<TierState>,
}

/// Build the board for a goal.
///
/// `high_water` is the highest percent previously observed for this goal and
/// is only consulted under [`TierRetention::HighWaterMark`].
pub fn goal_board(
    goal: &GoalDefinition,
    team_total: Decimal,
    participant_count: u64,
    retention: TierRetention,
    high_water: Option<Decimal>,
) -> GoalBoard {
    let progress = goal_progress(team_total, goal.target_amount);
    let unlock_percent = retention.effective_percent(progress.percent, high_water);

    GoalBoard {
        goal: goal.clone(),
        team_total,
        progress,
        participant_count: participant_count.max(1),
        individual_target: individual_target(goal.target_amount, participant_count),
        goal_reached: progress.is_reached(),
        tiers: tier_states(&goal.tiers, unlock_percent),
    }
}
