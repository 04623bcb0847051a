//! Achievement repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::{DbAchievement, DbAchievementUnlock, DbResult};

pub struct AchievementRepo {
    pool: PgPool,
}

impl AchievementRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Full catalog in display order
    pub async fn catalog(&self) -> DbResult<Vec<DbAchievement>> {
        let achievements = sqlx::query_as::<_, DbAchievement>(
            r#"
            SELECT id, codigo_interno, nome, descricao, icone, raridade::text AS raridade
            FROM conquistas
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(achievements)
    }

    /// Unlocks of one user
    pub async fn unlocks_for(&self, user_id: Uuid) -> DbResult<Vec<DbAchievementUnlock>> {
        let unlocks = sqlx::query_as::<_, DbAchievementUnlock>(
            r#"
            SELECT conquista_id, usuario_id, data_desbloqueio
            FROM conquistas_usuarios
            WHERE usuario_id = $1
            ORDER BY data_desbloqueio DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(unlocks)
    }
}
