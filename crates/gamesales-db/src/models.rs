//! Database models - mapped from PostgreSQL tables
//!
//! Row structs keep the backend's column names; enum columns are selected
//! as text and parsed into domain enums on conversion.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use gamesales_types::{
    Achievement, AchievementUnlock, BonusTier, GoalDefinition, Mission, MissionCriterion,
    MissionKind, PeriodKind, Profile, Rarity, Role, Sale, SaleKind, SaleStatus, SignupRequest,
    SignupStatus,
};

use crate::{DbError, DbResult};

// ============================================================================
// Profile Models
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbProfile {
    pub id: Uuid,
    pub nome: String,
    pub avatar_url: Option<String>,
    pub aprovado: bool,
    pub papel: String,
    pub pontos_total: i32,
    pub xp_total: i32,
    pub nivel_atual: i32,
    pub equipe_id: Option<Uuid>,
}

impl TryFrom<DbProfile> for Profile {
    type Error = DbError;

    fn try_from(row: DbProfile) -> DbResult<Self> {
        let role = Role::from_db_str(&row.papel).ok_or_else(|| DbError::decode("papel", &row.papel))?;
        Ok(Profile {
            id: row.id.into(),
            display_name: row.nome,
            avatar_url: row.avatar_url,
            approved: row.aprovado,
            role,
            total_points: i64::from(row.pontos_total),
            total_experience: i64::from(row.xp_total),
            current_level: row.nivel_atual,
            team_id: row.equipe_id.map(Into::into),
        })
    }
}

// ============================================================================
// Sale Models
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbSale {
    pub id: Uuid,
    pub usuario_id: Uuid,
    pub valor: Decimal,
    pub cliente: String,
    pub tipo_venda: String,
    pub status: String,
    pub data_venda: DateTime<Utc>,
    pub observacoes: Option<String>,
    pub pontos_base: i32,
    pub pontos_bonus: i32,
    pub pontos_totais: i32,
}

impl TryFrom<DbSale> for Sale {
    type Error = DbError;

    fn try_from(row: DbSale) -> DbResult<Self> {
        let kind = SaleKind::from_db_str(&row.tipo_venda)
            .ok_or_else(|| DbError::decode("tipo_venda", &row.tipo_venda))?;
        let status = SaleStatus::from_db_str(&row.status)
            .ok_or_else(|| DbError::decode("status", &row.status))?;
        Ok(Sale {
            id: row.id.into(),
            seller_id: row.usuario_id.into(),
            amount: row.valor,
            customer: row.cliente,
            kind,
            status,
            sold_at: row.data_venda,
            notes: row.observacoes,
            base_points: i64::from(row.pontos_base),
            bonus_points: i64::from(row.pontos_bonus),
            total_points: i64::from(row.pontos_totais),
        })
    }
}

// ============================================================================
// Goal Models
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbGoal {
    pub id: Uuid,
    pub periodo: String,
    pub valor_meta_time: Decimal,
    pub data_inicio: NaiveDate,
    pub data_fim: NaiveDate,
    pub ativa: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbBonusTier {
    pub id: Uuid,
    pub meta_id: Uuid,
    pub percentual_meta: i32,
    pub titulo: String,
    pub descricao: Option<String>,
}

impl From<DbBonusTier> for BonusTier {
    fn from(row: DbBonusTier) -> Self {
        BonusTier {
            id: row.id.into(),
            goal_id: row.meta_id.into(),
            unlock_percent: row.percentual_meta,
            title: row.titulo,
            description: row.descricao,
        }
    }
}

impl DbGoal {
    /// Convert with the tiers that belong to this goal
    pub fn into_definition(self, tiers: Vec<BonusTier>) -> DbResult<GoalDefinition> {
        let period_kind = PeriodKind::from_db_str(&self.periodo)
            .ok_or_else(|| DbError::decode("periodo", &self.periodo))?;
        Ok(GoalDefinition {
            id: self.id.into(),
            period_kind,
            target_amount: self.valor_meta_time,
            period_start: self.data_inicio,
            period_end: self.data_fim,
            active: self.ativa,
            created_at: self.created_at,
            tiers,
        })
    }
}

// ============================================================================
// Achievement Models
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbAchievement {
    pub id: Uuid,
    pub codigo_interno: String,
    pub nome: String,
    pub descricao: String,
    pub icone: String,
    pub raridade: String,
}

impl TryFrom<DbAchievement> for Achievement {
    type Error = DbError;

    fn try_from(row: DbAchievement) -> DbResult<Self> {
        let rarity = Rarity::from_db_str(&row.raridade)
            .ok_or_else(|| DbError::decode("raridade", &row.raridade))?;
        Ok(Achievement {
            id: row.id.into(),
            code: row.codigo_interno,
            name: row.nome,
            description: row.descricao,
            icon: row.icone,
            rarity,
        })
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbAchievementUnlock {
    pub conquista_id: Uuid,
    pub usuario_id: Uuid,
    pub data_desbloqueio: DateTime<Utc>,
}

impl From<DbAchievementUnlock> for AchievementUnlock {
    fn from(row: DbAchievementUnlock) -> Self {
        AchievementUnlock {
            achievement_id: row.conquista_id.into(),
            user_id: row.usuario_id.into(),
            unlocked_at: row.data_desbloqueio,
        }
    }
}

// ============================================================================
// Mission Models
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbMission {
    pub id: Uuid,
    pub nome: String,
    pub descricao: Option<String>,
    pub tipo: String,
    pub criterio_tipo: String,
    pub criterio_valor: Decimal,
    pub recompensa_pontos: i32,
    pub data_inicio: DateTime<Utc>,
    pub data_fim: DateTime<Utc>,
    pub ativa: bool,
    pub equipe_id: Option<Uuid>,
    pub usuario_id: Option<Uuid>,
}

impl TryFrom<DbMission> for Mission {
    type Error = DbError;

    fn try_from(row: DbMission) -> DbResult<Self> {
        let kind = MissionKind::from_db_str(&row.tipo).ok_or_else(|| DbError::decode("tipo", &row.tipo))?;
        let criterion = MissionCriterion::from_db_str(&row.criterio_tipo)
            .ok_or_else(|| DbError::decode("criterio_tipo", &row.criterio_tipo))?;
        Ok(Mission {
            id: row.id.into(),
            name: row.nome,
            description: row.descricao,
            kind,
            criterion,
            target_value: row.criterio_valor,
            reward_points: i64::from(row.recompensa_pontos),
            starts_at: row.data_inicio,
            ends_at: row.data_fim,
            active: row.ativa,
            team_id: row.equipe_id.map(Into::into),
            user_id: row.usuario_id.map(Into::into),
        })
    }
}

// ============================================================================
// Signup Models
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbSignupRequest {
    pub id: Uuid,
    pub usuario_id: Uuid,
    /// Joined from profiles
    pub nome: String,
    pub status: String,
    pub avaliado_por: Option<Uuid>,
    pub mensagem_recusa: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbSignupRequest> for SignupRequest {
    type Error = DbError;

    fn try_from(row: DbSignupRequest) -> DbResult<Self> {
        let status = SignupStatus::from_db_str(&row.status)
            .ok_or_else(|| DbError::decode("status", &row.status))?;
        Ok(SignupRequest {
            id: row.id.into(),
            user_id: row.usuario_id.into(),
            display_name: row.nome,
            status,
            reviewed_by: row.avaliado_por.map(Into::into),
            rejection_reason: row.mensagem_recusa,
            created_at: row.created_at,
        })
    }
}

/// Convert a batch of rows, failing on the first undecodable one
pub(crate) fn convert_all<R, T>(rows: Vec<R>) -> DbResult<Vec<T>>
where
    T: TryFrom<R, Error = DbError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_profile_row_conversion() {
        let row = DbProfile {
            id: Uuid::new_v4(),
            nome: "Ana".to_string(),
            avatar_url: None,
            aprovado: true,
            papel: "GESTOR".to_string(),
            pontos_total: 120,
            xp_total: 300,
            nivel_atual: 3,
            equipe_id: None,
        };
        let profile = Profile::try_from(row).unwrap();
        assert_eq!(profile.role, Role::Manager);
        assert_eq!(profile.total_experience, 300);
    }

    #[test]
    fn test_unknown_enum_value_rejected() {
        let row = DbSale {
            id: Uuid::new_v4(),
            usuario_id: Uuid::new_v4(),
            valor: dec!(100),
            cliente: "Cliente".to_string(),
            tipo_venda: "NOVA".to_string(),
            status: "ESTORNADA".to_string(),
            data_venda: Utc::now(),
            observacoes: None,
            pontos_base: 10,
            pontos_bonus: 0,
            pontos_totais: 10,
        };
        let err = Sale::try_from(row).unwrap_err();
        assert!(matches!(err, DbError::Decode(_)));
    }
}
