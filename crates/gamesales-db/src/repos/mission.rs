//! Mission repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::{DbMission, DbResult};

pub struct MissionRepo {
    pool: PgPool,
}

impl MissionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active missions open to everyone, to the user's team, or to the user
    pub async fn active_for(&self, user_id: Uuid, team_id: Option<Uuid>) -> DbResult<Vec<DbMission>> {
        let missions = sqlx::query_as::<_, DbMission>(
            r#"
            SELECT id, nome, descricao, tipo::text AS tipo, criterio_tipo::text AS criterio_tipo,
                   criterio_valor, recompensa_pontos, data_inicio, data_fim, ativa,
                   equipe_id, usuario_id
            FROM missoes
            WHERE ativa = TRUE
              AND (usuario_id IS NULL OR usuario_id = $1)
              AND (equipe_id IS NULL OR equipe_id = $2)
            ORDER BY data_fim ASC
            "#,
        )
        .bind(user_id)
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(missions)
    }
}
