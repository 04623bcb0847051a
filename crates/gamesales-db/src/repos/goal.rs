//! Goal repository

use sqlx::PgPool;
use uuid::Uuid;

use gamesales_types::NewGoal;

use crate::{DbBonusTier, DbGoal, DbResult};

/// Team goals and their bonus tiers
pub struct GoalRepo {
    pool: PgPool,
}

impl GoalRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active goals, newest first
    pub async fn active(&self) -> DbResult<Vec<DbGoal>> {
        let goals = sqlx::query_as::<_, DbGoal>(
            r#"
            SELECT id, periodo, valor_meta_time, data_inicio, data_fim, ativa, created_at
            FROM metas_equipe
            WHERE ativa = TRUE
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(goals)
    }

    /// Tiers for a set of goals, ascending by unlock percent
    pub async fn tiers_for(&self, goal_ids: &[Uuid]) -> DbResult<Vec<DbBonusTier>> {
        let tiers = sqlx::query_as::<_, DbBonusTier>(
            r#"
            SELECT id, meta_id, percentual_meta, titulo, descricao
            FROM bonificacoes_meta
            WHERE meta_id = ANY($1)
            ORDER BY percentual_meta ASC
            "#,
        )
        .bind(goal_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(tiers)
    }

    /// Deactivate the current goal of the same period and insert the new one
    pub async fn create(&self, goal: &NewGoal) -> DbResult<(DbGoal, Vec<DbBonusTier>)> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE metas_equipe SET ativa = FALSE WHERE ativa = TRUE AND periodo = $1")
            .bind(goal.period_kind.as_db_str())
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, DbGoal>(
            r#"
            INSERT INTO metas_equipe (periodo, valor_meta_time, data_inicio, data_fim, ativa)
            VALUES ($1, $2, $3, $4, TRUE)
            RETURNING id, periodo, valor_meta_time, data_inicio, data_fim, ativa, created_at
            "#,
        )
        .bind(goal.period_kind.as_db_str())
        .bind(goal.target_amount)
        .bind(goal.period_start)
        .bind(goal.period_end)
        .fetch_one(&mut *tx)
        .await?;

        let mut tiers = Vec::with_capacity(goal.tiers.len());
        for tier in &goal.tiers {
            let tier_row = sqlx::query_as::<_, DbBonusTier>(
                r#"
                INSERT INTO bonificacoes_meta (meta_id, percentual_meta, titulo, descricao)
                VALUES ($1, $2, $3, $4)
                RETURNING id, meta_id, percentual_meta, titulo, descricao
                "#,
            )
            .bind(row.id)
            .bind(tier.unlock_percent)
            .bind(&tier.title)
            .bind(tier.description.as_deref())
            .fetch_one(&mut *tx)
            .await?;
            tiers.push(tier_row);
        }

        tx.commit().await?;

        Ok((row, tiers))
    }
}
