//! Profile repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::{DbProfile, DbResult};

const PROFILE_COLUMNS: &str = r#"
    id, nome, avatar_url, aprovado, papel::text AS papel,
    pontos_total, xp_total, nivel_atual, equipe_id
"#;

/// Profile repository for rankings, sessions and level sync
pub struct ProfileRepo {
    pool: PgPool,
}

impl ProfileRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Approved profiles ordered by total points, highest first
    pub async fn approved_by_points(&self) -> DbResult<Vec<DbProfile>> {
        let profiles = sqlx::query_as::<_, DbProfile>(&format!(
            "SELECT {} FROM profiles WHERE aprovado = TRUE ORDER BY pontos_total DESC",
            PROFILE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }

    /// Find profile by ID
    pub async fn find_by_id(&self, id: Uuid) -> DbResult<Option<DbProfile>> {
        let profile = sqlx::query_as::<_, DbProfile>(&format!(
            "SELECT {} FROM profiles WHERE id = $1",
            PROFILE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Number of approved sellers, used to split team goals
    pub async fn approved_seller_count(&self) -> DbResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM profiles WHERE aprovado = TRUE AND papel = 'VENDEDOR'",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }

    /// Overwrite the stored level
    pub async fn set_level(&self, id: Uuid, level: i32) -> DbResult<bool> {
        let result = sqlx::query("UPDATE profiles SET nivel_atual = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(level)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
