//! Sale repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use gamesales_types::{NewSale, SaleStatus, SaleUpdate};

use crate::{DbError, DbResult, DbSale};

const SALE_COLUMNS: &str = r#"
    id, usuario_id, valor, cliente, tipo_venda::text AS tipo_venda, status::text AS status,
    data_venda, observacoes, pontos_base, pontos_bonus, pontos_totais
"#;

/// Sale repository: aggregates for goals and the race, plus the write paths
pub struct SaleRepo {
    pool: PgPool,
}

impl SaleRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Approved sales in `[start, end)`
    pub async fn approved_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> DbResult<Vec<DbSale>> {
        let sales = sqlx::query_as::<_, DbSale>(&format!(
            r#"
            SELECT {} FROM vendas
            WHERE status = 'APROVADA' AND data_venda >= $1 AND data_venda < $2
            ORDER BY data_venda ASC
            "#,
            SALE_COLUMNS
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Approved sales of one seller in `[start, end)`
    pub async fn approved_for_seller(
        &self,
        seller_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<DbSale>> {
        let sales = sqlx::query_as::<_, DbSale>(&format!(
            r#"
            SELECT {} FROM vendas
            WHERE usuario_id = $1 AND status = 'APROVADA'
              AND data_venda >= $2 AND data_venda < $3
            ORDER BY data_venda ASC
            "#,
            SALE_COLUMNS
        ))
        .bind(seller_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// All sales, newest first
    pub async fn recent(&self, limit: i64) -> DbResult<Vec<DbSale>> {
        let sales = sqlx::query_as::<_, DbSale>(&format!(
            "SELECT {} FROM vendas ORDER BY data_venda DESC LIMIT $1",
            SALE_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Find sale by ID
    pub async fn find_by_id(&self, id: Uuid) -> DbResult<Option<DbSale>> {
        let sale = sqlx::query_as::<_, DbSale>(&format!(
            "SELECT {} FROM vendas WHERE id = $1",
            SALE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Insert a sale and credit the seller when it is approved immediately.
    ///
    /// The sale starts PENDING when the seller's team requires approval.
    pub async fn record(&self, sale: &NewSale) -> DbResult<DbSale> {
        let mut tx = self.pool.begin().await?;

        let requires_approval: Option<bool> = sqlx::query_scalar(
            r#"
            SELECT COALESCE(e.vendas_exigem_aprovacao, FALSE)
            FROM profiles p
            LEFT JOIN equipes e ON e.id = p.equipe_id
            WHERE p.id = $1
            "#,
        )
        .bind(sale.seller_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        let requires_approval =
            requires_approval.ok_or_else(|| DbError::not_found("Seller", sale.seller_id))?;
        let status = if requires_approval {
            SaleStatus::Pending
        } else {
            SaleStatus::Approved
        };
        let points = i32::try_from(sale.points())
            .map_err(|_| DbError::InvalidInput("sale amount too large".to_string()))?;

        let row = sqlx::query_as::<_, DbSale>(&format!(
            r#"
            INSERT INTO vendas
                (usuario_id, valor, cliente, tipo_venda, status, data_venda, observacoes,
                 pontos_base, pontos_bonus, pontos_totais)
            VALUES ($1, $2, $3, $4::sale_type, $5::sale_status, COALESCE($6, NOW()), $7, $8, 0, $8)
            RETURNING {}
            "#,
            SALE_COLUMNS
        ))
        .bind(sale.seller_id.as_uuid())
        .bind(sale.total())
        .bind(sale.customer_or_default())
        .bind(sale.kind.as_db_str())
        .bind(status.as_db_str())
        .bind(sale.sold_at)
        .bind(sale.notes.as_deref())
        .bind(points)
        .fetch_one(&mut *tx)
        .await?;

        if status.is_approved() {
            sqlx::query(
                r#"
                UPDATE profiles
                SET pontos_total = pontos_total + $2, xp_total = xp_total + $2, updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(sale.seller_id.as_uuid())
            .bind(points)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(row)
    }

    /// Edit customer, amount and notes
    pub async fn update(&self, id: Uuid, update: &SaleUpdate) -> DbResult<Option<DbSale>> {
        let sale = sqlx::query_as::<_, DbSale>(&format!(
            r#"
            UPDATE vendas
            SET cliente = COALESCE($2, cliente),
                valor = COALESCE($3, valor),
                observacoes = COALESCE($4, observacoes)
            WHERE id = $1
            RETURNING {}
            "#,
            SALE_COLUMNS
        ))
        .bind(id)
        .bind(update.customer.as_deref())
        .bind(update.amount)
        .bind(update.notes.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Set the approval status
    pub async fn set_status(&self, id: Uuid, status: SaleStatus) -> DbResult<Option<DbSale>> {
        let sale = sqlx::query_as::<_, DbSale>(&format!(
            "UPDATE vendas SET status = $2::sale_status WHERE id = $1 RETURNING {}",
            SALE_COLUMNS
        ))
        .bind(id)
        .bind(status.as_db_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }
}
