//! Signup request repository

use sqlx::PgPool;
use uuid::Uuid;

use gamesales_types::SignupStatus;

use crate::{DbError, DbResult, DbSignupRequest};

const SIGNUP_SELECT: &str = r#"
    SELECT s.id, s.usuario_id, p.nome, s.status, s.avaliado_por, s.mensagem_recusa, s.created_at
    FROM solicitacoes_cadastro s
    JOIN profiles p ON p.id = s.usuario_id
"#;

pub struct SignupRepo {
    pool: PgPool,
}

impl SignupRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Pending requests, oldest first
    pub async fn pending(&self) -> DbResult<Vec<DbSignupRequest>> {
        let requests = sqlx::query_as::<_, DbSignupRequest>(&format!(
            "{} WHERE s.status = 'PENDENTE' ORDER BY s.created_at ASC",
            SIGNUP_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    pub async fn find_by_id(&self, id: Uuid) -> DbResult<Option<DbSignupRequest>> {
        let request = sqlx::query_as::<_, DbSignupRequest>(&format!("{} WHERE s.id = $1", SIGNUP_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(request)
    }

    /// Approve the user and close the request in one transaction
    pub async fn approve(&self, id: Uuid, reviewer: Uuid) -> DbResult<DbSignupRequest> {
        let mut tx = self.pool.begin().await?;

        let user_id: Option<Uuid> = sqlx::query_scalar(
            "SELECT usuario_id FROM solicitacoes_cadastro WHERE id = $1 AND status = 'PENDENTE' FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let user_id = user_id.ok_or_else(|| DbError::not_found("Pending signup", id))?;

        sqlx::query("UPDATE profiles SET aprovado = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE solicitacoes_cadastro SET status = $2, avaliado_por = $3 WHERE id = $1")
            .bind(id)
            .bind(SignupStatus::Approved.as_db_str())
            .bind(reviewer)
            .execute(&mut *tx)
            .await?;

        let request = sqlx::query_as::<_, DbSignupRequest>(&format!("{} WHERE s.id = $1", SIGNUP_SELECT))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(request)
    }

    /// Close the request as rejected; the profile stays unapproved
    pub async fn reject(&self, id: Uuid, reviewer: Uuid, reason: Option<&str>) -> DbResult<DbSignupRequest> {
        let updated = sqlx::query(
            r#"
            UPDATE solicitacoes_cadastro
            SET status = $2, avaliado_por = $3, mensagem_recusa = $4
            WHERE id = $1 AND status = 'PENDENTE'
            "#,
        )
        .bind(id)
        .bind(SignupStatus::Rejected.as_db_str())
        .bind(reviewer)
        .bind(reason)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(DbError::not_found("Pending signup", id));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Signup", id))
    }
}
