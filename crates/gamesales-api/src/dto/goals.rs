//! Goal DTOs

use chrono::NaiveDate;
use gamesales_types::{NewBonusTier, NewGoal, PeriodKind};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use super::validate_positive;

/// One bonus tier of a new goal
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BonusTierRequest {
    #[validate(range(min = 1, max = 1000, message = "Unlock percent must be 1-1000"))]
    pub unlock_percent: i32,

    #[validate(length(min = 1, max = 120, message = "Title must be 1-120 characters"))]
    pub title: String,

    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// Create goal request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGoalRequest {
    pub period_kind: PeriodKind,

    #[validate(custom(function = "validate_positive"))]
    pub target_amount: Decimal,

    /// First day, inclusive
    pub period_start: NaiveDate,

    /// Last day, inclusive
    pub period_end: NaiveDate,

    #[serde(default)]
    #[validate(nested)]
    pub tiers: Vec<BonusTierRequest>,
}

impl From<CreateGoalRequest> for NewGoal {
    fn from(req: CreateGoalRequest) -> Self {
        NewGoal {
            period_kind: req.period_kind,
            target_amount: req.target_amount,
            period_start: req.period_start,
            period_end: req.period_end,
            tiers: req
                .tiers
                .into_iter()
                .map(|t| NewBonusTier {
                    unlock_percent: t.unlock_percent,
                    title: t.title,
                    description: t.description,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_validation_is_nested() {
        let req: CreateGoalRequest = serde_json::from_str(
            r#"{
                "period_kind": "MONTHLY",
                "target_amount": "30000",
                "period_start": "2026-10-01",
                "period_end": "2026-10-31",
                "tiers": [{ "unlock_percent": 0, "title": "Pizza" }]
            }"#,
        )
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_goal_conversion() {
        let req: CreateGoalRequest = serde_json::from_str(
            r#"{
                "period_kind": "WEEKLY",
                "target_amount": 5000,
                "period_start": "2026-10-19",
                "period_end": "2026-10-25"
            }"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());

        let goal = NewGoal::from(req);
        assert_eq!(goal.period_kind, PeriodKind::Weekly);
        assert!(goal.tiers.is_empty());
        assert!(goal.validate().is_ok());
    }
}
