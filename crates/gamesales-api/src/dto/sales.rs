//! Sale DTOs

use chrono::{DateTime, Utc};
use gamesales_types::{NewSale, Sale, SaleKind, SaleUpdate, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{validate_sale_amount, validate_sale_part};

/// Record sale request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordSaleRequest {
    /// Seller to credit; only a master may name someone else
    #[serde(default)]
    pub seller_id: Option<UserId>,

    #[validate(custom(function = "validate_sale_part"))]
    pub production: Decimal,

    #[serde(default)]
    #[validate(custom(function = "validate_sale_part"))]
    pub setup: Decimal,

    #[validate(length(max = 120, message = "Customer name must be at most 120 characters"))]
    pub customer: Option<String>,

    #[serde(default)]
    pub kind: SaleKind,

    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,

    pub sold_at: Option<DateTime<Utc>>,
}

impl RecordSaleRequest {
    pub fn into_new_sale(self, seller_id: UserId) -> NewSale {
        NewSale {
            seller_id,
            production: self.production,
            setup: self.setup,
            customer: self.customer,
            kind: self.kind,
            notes: self.notes,
            sold_at: self.sold_at,
        }
    }
}

/// A level change caused by a write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelChange {
    pub from: i32,
    pub to: i32,
}

/// Record sale response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSaleResponse {
    pub sale: Sale,
    /// Points credited now; zero while the sale awaits approval
    pub points_awarded: i64,
    pub pending_approval: bool,
    /// Present when the seller's stored level moved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_change: Option<LevelChange>,
}

/// Update sale request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateSaleRequest {
    #[validate(length(min = 1, max = 120, message = "Customer name must be 1-120 characters"))]
    pub customer: Option<String>,

    #[validate(custom(function = "validate_sale_amount"))]
    pub amount: Option<Decimal>,

    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,
}

impl From<UpdateSaleRequest> for SaleUpdate {
    fn from(req: UpdateSaleRequest) -> Self {
        SaleUpdate {
            customer: req.customer,
            amount: req.amount,
            notes: req.notes,
        }
    }
}

/// Sale listing query
#[derive(Debug, Clone, Deserialize)]
pub struct SalesQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

impl SalesQuery {
    pub const MAX_LIMIT: i64 = 500;

    /// Limit clamped to `1..=MAX_LIMIT`
    pub fn effective_limit(&self) -> i64 {
        self.limit.clamp(1, Self::MAX_LIMIT)
    }
}

impl Default for SalesQuery {
    fn default() -> Self {
        Self { limit: default_limit() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_record_sale_defaults() {
        let req: RecordSaleRequest = serde_json::from_str(r#"{ "production": "250.00" }"#).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.setup, Decimal::ZERO);
        assert_eq!(req.kind, SaleKind::New);

        let seller = UserId::new();
        let sale = req.into_new_sale(seller);
        assert_eq!(sale.total(), dec!(250.00));
        assert_eq!(sale.points(), 25);
        assert_eq!(sale.customer_or_default(), "Cliente");
    }

    #[test]
    fn test_negative_setup_rejected() {
        let req: RecordSaleRequest =
            serde_json::from_str(r#"{ "production": "100", "setup": "-1" }"#).unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("setup"));
    }

    #[test]
    fn test_amounts_above_ceiling_rejected() {
        let req: RecordSaleRequest = serde_json::from_str(
            r#"{ "production": "79228162514264337593543950335", "setup": "1" }"#,
        )
        .unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("production"));

        let req: RecordSaleRequest =
            serde_json::from_str(r#"{ "production": "1000000000", "setup": "0" }"#).unwrap();
        assert!(req.validate().is_ok());

        let req: UpdateSaleRequest =
            serde_json::from_str(r#"{ "amount": "1000000000.01" }"#).unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("amount"));
    }

    #[test]
    fn test_update_amount_must_be_positive() {
        let req: UpdateSaleRequest = serde_json::from_str(r#"{ "amount": "0" }"#).unwrap();
        assert!(req.validate().is_err());

        let req: UpdateSaleRequest = serde_json::from_str(r#"{ "notes": "renewed" }"#).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(SaleUpdate::from(req).notes.as_deref(), Some("renewed"));
    }

    #[test]
    fn test_sales_query_limit_clamped() {
        assert_eq!(SalesQuery { limit: 0 }.effective_limit(), 1);
        assert_eq!(SalesQuery { limit: 10_000 }.effective_limit(), 500);
        assert_eq!(SalesQuery::default().effective_limit(), 100);
    }
}
