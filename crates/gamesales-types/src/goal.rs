//! Team goals and their bonus tiers

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{GameSalesError, Result};
use crate::identity::{BonusTierId, GoalId};

/// Length of the period a goal covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodKind {
    Weekly,
    Monthly,
    Quarterly,
}

impl PeriodKind {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Self::Weekly => "SEMANAL",
            Self::Monthly => "MENSAL",
            Self::Quarterly => "TRIMESTRAL",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "SEMANAL" => Some(Self::Weekly),
            "MENSAL" => Some(Self::Monthly),
            "TRIMESTRAL" => Some(Self::Quarterly),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
        }
    }
}

/// Reward unlocked when team progress reaches `unlock_percent`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusTier {
    pub id: BonusTierId,
    pub goal_id: GoalId,
    /// Percent of the goal target (33, 66 and 100 by convention)
    pub unlock_percent: i32,
    pub title: String,
    pub description: Option<String>,
}

/// A team sales target over a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalDefinition {
    /// Goal ID
    pub id: GoalId,
    /// Period kind; at most one active goal per kind
    pub period_kind: PeriodKind,
    /// Team target amount
    pub target_amount: Decimal,
    /// First day of the period
    pub period_start: NaiveDate,
    /// Last day of the period (inclusive)
    pub period_end: NaiveDate,
    /// Superseded goals are deactivated, never deleted
    pub active: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Bonus tiers in storage order
    pub tiers: Vec<BonusTier>,
}

impl GoalDefinition {
    /// Half-open UTC window `[start, end)` covering every day of the period
    pub fn window(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        date_window(self.period_start, self.period_end)
    }
}

/// Converts an inclusive date range into a half-open UTC instant range
pub fn date_window(start: NaiveDate, end: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let from = start.and_time(chrono::NaiveTime::MIN).and_utc();
    let until = end
        .checked_add_days(Days::new(1))
        .unwrap_or(end)
        .and_time(chrono::NaiveTime::MIN)
        .and_utc();
    (from, until)
}

/// Input for one tier of a new goal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBonusTier {
    pub unlock_percent: i32,
    pub title: String,
    pub description: Option<String>,
}

/// Input for creating a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGoal {
    pub period_kind: PeriodKind,
    pub target_amount: Decimal,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub tiers: Vec<NewBonusTier>,
}

impl NewGoal {
    pub fn validate(&self) -> Result<()> {
        if self.target_amount <= Decimal::ZERO {
            return Err(GameSalesError::invalid_input(
                "target_amount",
                "goal target must be greater than zero",
            ));
        }
        if self.period_end < self.period_start {
            return Err(GameSalesError::invalid_input(
                "period_end",
                "period end must not be before period start",
            ));
        }
        if let Some(tier) = self.tiers.iter().find(|t| t.unlock_percent <= 0) {
            return Err(GameSalesError::invalid_input(
                "tiers",
                format!("tier '{}' must unlock above 0%", tier.title),
            ));
        }
        Ok(())
    }

    /// Materialise the goal with fresh ids
    pub fn into_definition(self, created_at: DateTime<Utc>) -> GoalDefinition {
        let id = GoalId::new();
        let tiers = self
            .tiers
            .into_iter()
            .map(|t| BonusTier {
                id: BonusTierId::new(),
                goal_id: id,
                unlock_percent: t.unlock_percent,
                title: t.title,
                description: t.description,
            })
            .collect();

        GoalDefinition {
            id,
            period_kind: self.period_kind,
            target_amount: self.target_amount,
            period_start: self.period_start,
            period_end: self.period_end,
            active: true,
            created_at,
            tiers,
        }
    }
}
