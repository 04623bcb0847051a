//! Missions: time-boxed challenges with a point reward

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::identity::{MissionId, TeamId, UserId};

/// Recurrence of a mission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissionKind {
    Daily,
    Weekly,
    Monthly,
    Special,
}

impl MissionKind {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Self::Daily => "DIARIA_PADRAO",
            Self::Weekly => "SEMANAL_PADRAO",
            Self::Monthly => "MENSAL_PADRAO",
            Self::Special => "ESPECIAL",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "DIARIA_PADRAO" => Some(Self::Daily),
            "SEMANAL_PADRAO" => Some(Self::Weekly),
            "MENSAL_PADRAO" => Some(Self::Monthly),
            "ESPECIAL" => Some(Self::Special),
            _ => None,
        }
    }
}

/// What a mission counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissionCriterion {
    /// Number of approved sales
    SaleCount,
    /// Sum of approved sale amounts
    SaleValue,
}

impl MissionCriterion {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Self::SaleCount => "QUANTIDADE_VENDAS",
            Self::SaleValue => "VALOR_REAIS",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "QUANTIDADE_VENDAS" => Some(Self::SaleCount),
            "VALOR_REAIS" => Some(Self::SaleValue),
            _ => None,
        }
    }
}

/// A mission definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    /// Mission ID
    pub id: MissionId,
    /// Name
    pub name: String,
    /// Description
    pub description: Option<String>,
    /// Recurrence
    pub kind: MissionKind,
    /// What is counted
    pub criterion: MissionCriterion,
    /// Count or amount to reach
    pub target_value: Decimal,
    /// Points awarded on completion
    pub reward_points: i64,
    /// Window start
    pub starts_at: DateTime<Utc>,
    /// Window end (exclusive)
    pub ends_at: DateTime<Utc>,
    /// Inactive missions are hidden
    pub active: bool,
    /// Restricts the mission to one team
    pub team_id: Option<TeamId>,
    /// Restricts the mission to one user
    pub user_id: Option<UserId>,
}

impl Mission {
    /// Whether the mission applies to the given user and team
    pub fn applies_to(&self, user_id: UserId, team_id: Option<TeamId>) -> bool {
        let user_ok = self.user_id.map_or(true, |u| u == user_id);
        let team_ok = match self.team_id {
            Some(team) => team_id == Some(team),
            None => true,
        };
        self.active && user_ok && team_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn mission() -> Mission {
        Mission {
            id: MissionId::new(),
            name: "Five a day".to_string(),
            description: None,
            kind: MissionKind::Daily,
            criterion: MissionCriterion::SaleCount,
            target_value: dec!(5),
            reward_points: 50,
            starts_at: Utc::now(),
            ends_at: Utc::now(),
            active: true,
            team_id: None,
            user_id: None,
        }
    }

    #[test]
    fn test_applies_to_scoping() {
        let user = UserId::new();
        let team = TeamId::new();

        let open = mission();
        assert!(open.applies_to(user, None));

        let mut team_only = mission();
        team_only.team_id = Some(team);
        assert!(team_only.applies_to(user, Some(team)));
        assert!(!team_only.applies_to(user, None));

        let mut personal = mission();
        personal.user_id = Some(UserId::new());
        assert!(!personal.applies_to(user, Some(team)));

        let mut inactive = mission();
        inactive.active = false;
        assert!(!inactive.applies_to(user, None));
    }

    #[test]
    fn test_mission_enum_mapping() {
        assert_eq!(MissionKind::from_db_str("ESPECIAL"), Some(MissionKind::Special));
        assert_eq!(
            MissionCriterion::from_db_str("VALOR_REAIS"),
            Some(MissionCriterion::SaleValue)
        );
    }
}
