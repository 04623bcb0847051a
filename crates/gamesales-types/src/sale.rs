//! Sale records and the sale write models

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{GameSalesError, Result};
use crate::identity::{SaleId, UserId};

/// Currency units per point awarded for a sale
pub const AMOUNT_PER_POINT: Decimal = dec!(10);

/// Largest amount a single sale may carry
pub const MAX_SALE_AMOUNT: Decimal = dec!(1000000000);

/// Customer name stored when the seller leaves it blank
pub const DEFAULT_CUSTOMER: &str = "Cliente";

/// Points awarded for a sale total: one point per full 10 units, never negative
pub fn points_for_amount(total: Decimal) -> i64 {
    if total <= Decimal::ZERO {
        return 0;
    }
    (total / AMOUNT_PER_POINT).floor().to_i64().unwrap_or(i64::MAX)
}

// ============================================================================
// Enums
// ============================================================================

/// Approval state of a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleStatus {
    /// Waiting for a manager when the team requires approval
    Pending,
    /// Counted toward goals, race and missions
    Approved,
    /// Rejected or cancelled; kept for history
    Rejected,
}

impl SaleStatus {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDENTE",
            Self::Approved => "APROVADA",
            Self::Rejected => "REJEITADA",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "PENDENTE" => Some(Self::Pending),
            "APROVADA" => Some(Self::Approved),
            "REJEITADA" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

/// Commercial kind of a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleKind {
    #[default]
    New,
    Upsell,
    CrossSell,
    Renewal,
}

impl SaleKind {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Self::New => "NOVA",
            Self::Upsell => "UPSELL",
            Self::CrossSell => "CROSS_SELL",
            Self::Renewal => "RENOVACAO",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "NOVA" => Some(Self::New),
            "UPSELL" => Some(Self::Upsell),
            "CROSS_SELL" => Some(Self::CrossSell),
            "RENOVACAO" => Some(Self::Renewal),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Upsell => "Upsell",
            Self::CrossSell => "Cross-sell",
            Self::Renewal => "Renewal",
        }
    }
}

// ============================================================================
// Sale
// ============================================================================

/// A recorded sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    /// Sale ID
    pub id: SaleId,
    /// Seller credited with the sale
    pub seller_id: UserId,
    /// Sale amount (production + setup)
    pub amount: Decimal,
    /// Customer name
    pub customer: String,
    /// Commercial kind
    pub kind: SaleKind,
    /// Approval state
    pub status: SaleStatus,
    /// When the sale happened
    pub sold_at: DateTime<Utc>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Points from the amount
    pub base_points: i64,
    /// Extra points (campaigns)
    pub bonus_points: i64,
    /// base + bonus
    pub total_points: i64,
}

impl Sale {
    /// Whether the sale counts toward aggregates in the half-open window `[start, end)`
    pub fn counts_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.status.is_approved() && self.sold_at >= start && self.sold_at < end
    }
}

/// Input for recording a sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSale {
    /// Seller credited with the sale
    pub seller_id: UserId,
    /// Recurring production value
    pub production: Decimal,
    /// One-off setup value
    pub setup: Decimal,
    /// Customer name, defaults to [`DEFAULT_CUSTOMER`]
    pub customer: Option<String>,
    pub kind: SaleKind,
    pub notes: Option<String>,
    /// Defaults to now
    pub sold_at: Option<DateTime<Utc>>,
}

impl NewSale {
    pub fn new(seller_id: UserId, production: Decimal, setup: Decimal) -> Self {
        Self {
            seller_id,
            production,
            setup,
            customer: None,
            kind: SaleKind::New,
            notes: None,
            sold_at: None,
        }
    }

    /// Sale amount stored on the record, saturating at the decimal range
    pub fn total(&self) -> Decimal {
        self.production.saturating_add(self.setup)
    }

    /// Points awarded for this sale
    pub fn points(&self) -> i64 {
        points_for_amount(self.total())
    }

    pub fn customer_or_default(&self) -> String {
        match self.customer.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => DEFAULT_CUSTOMER.to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.production < Decimal::ZERO || self.setup < Decimal::ZERO {
            return Err(GameSalesError::invalid_input(
                "amount",
                "production and setup must not be negative",
            ));
        }
        let total = self
            .production
            .checked_add(self.setup)
            .filter(|t| *t <= MAX_SALE_AMOUNT)
            .ok_or_else(|| {
                GameSalesError::invalid_input(
                    "amount",
                    format!("sale total must not exceed {}", MAX_SALE_AMOUNT),
                )
            })?;
        if total <= Decimal::ZERO {
            return Err(GameSalesError::invalid_input(
                "amount",
                "sale total must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Editable fields of an existing sale
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaleUpdate {
    pub customer: Option<String>,
    pub amount: Option<Decimal>,
    pub notes: Option<String>,
}

impl SaleUpdate {
    pub fn is_empty(&self) -> bool {
        self.customer.is_none() && self.amount.is_none() && self.notes.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(amount) = self.amount {
            if amount <= Decimal::ZERO {
                return Err(GameSalesError::invalid_input(
                    "amount",
                    "sale amount must be greater than zero",
                ));
            }
            if amount > MAX_SALE_AMOUNT {
                return Err(GameSalesError::invalid_input(
                    "amount",
                    format!("sale amount must not exceed {}", MAX_SALE_AMOUNT),
                ));
            }
        }
        Ok(())
    }

    /// Apply the update to a sale in place
    pub fn apply_to(&self, sale: &mut Sale) {
        if let Some(customer) = &self.customer {
            sale.customer = customer.clone();
        }
        if let Some(amount) = self.amount {
            sale.amount = amount;
        }
        if let Some(notes) = &self.notes {
            sale.notes = Some(notes.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_floor_division() {
        assert_eq!(points_for_amount(dec!(0)), 0);
        assert_eq!(points_for_amount(dec!(9.99)), 0);
        assert_eq!(points_for_amount(dec!(10)), 1);
        assert_eq!(points_for_amount(dec!(1599.90)), 159);
        assert_eq!(points_for_amount(dec!(-50)), 0);
    }

    #[test]
    fn test_new_sale_total_and_points() {
        let sale = NewSale::new(UserId::new(), dec!(1200), dec!(350));
        assert_eq!(sale.total(), dec!(1550));
        assert_eq!(sale.points(), 155);
        assert_eq!(sale.customer_or_default(), DEFAULT_CUSTOMER);
        assert!(sale.validate().is_ok());
    }

    #[test]
    fn test_new_sale_rejects_empty_total() {
        let sale = NewSale::new(UserId::new(), dec!(0), dec!(0));
        assert!(sale.validate().is_err());

        let negative = NewSale::new(UserId::new(), dec!(100), dec!(-1));
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_new_sale_rejects_oversized_total() {
        let overflowing = NewSale::new(UserId::new(), Decimal::MAX, dec!(1));
        assert_eq!(overflowing.total(), Decimal::MAX);
        assert!(overflowing.validate().is_err());

        let over_cap = NewSale::new(UserId::new(), MAX_SALE_AMOUNT, dec!(0.01));
        assert!(over_cap.validate().is_err());

        let at_cap = NewSale::new(UserId::new(), MAX_SALE_AMOUNT - dec!(500), dec!(500));
        assert!(at_cap.validate().is_ok());

        let update = SaleUpdate {
            amount: Some(MAX_SALE_AMOUNT + dec!(1)),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_status_db_mapping() {
        for status in [SaleStatus::Pending, SaleStatus::Approved, SaleStatus::Rejected] {
            assert_eq!(SaleStatus::from_db_str(status.as_db_str()), Some(status));
        }
        assert_eq!(SaleKind::from_db_str("CROSS_SELL"), Some(SaleKind::CrossSell));
    }

    #[test]
    fn test_update_applies_only_set_fields() {
        let mut sale = Sale {
            id: SaleId::new(),
            seller_id: UserId::new(),
            amount: dec!(500),
            customer: "Acme".to_string(),
            kind: SaleKind::New,
            status: SaleStatus::Approved,
            sold_at: Utc::now(),
            notes: None,
            base_points: 50,
            bonus_points: 0,
            total_points: 50,
        };
        let update = SaleUpdate {
            amount: Some(dec!(450)),
            ..Default::default()
        };
        update.apply_to(&mut sale);
        assert_eq!(sale.amount, dec!(450));
        assert_eq!(sale.customer, "Acme");
        assert!(SaleUpdate::default().is_empty());
    }
}
