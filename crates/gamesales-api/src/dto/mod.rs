//! Data Transfer Objects
//!
//! Request bodies and response envelopes. Engine views that are already
//! display-ready are returned as they are.

pub mod goals;
pub mod progress;
pub mod sales;
pub mod signups;

pub use goals::*;
pub use progress::*;
pub use sales::*;
pub use signups::*;

use gamesales_types::MAX_SALE_AMOUNT;
use rust_decimal::Decimal;
use validator::ValidationError;

/// Reject negative sale parts and parts above the per-sale ceiling
pub(crate) fn validate_sale_part(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("negative");
        err.message = Some("must not be negative".into());
        return Err(err);
    }
    validate_sale_cap(value)
}

/// Reject sale amounts that are not positive or exceed the per-sale ceiling
pub(crate) fn validate_sale_amount(value: &Decimal) -> Result<(), ValidationError> {
    validate_positive(value)?;
    validate_sale_cap(value)
}

fn validate_sale_cap(value: &Decimal) -> Result<(), ValidationError> {
    if *value > MAX_SALE_AMOUNT {
        let mut err = ValidationError::new("too_large");
        err.message = Some(format!("must not exceed {}", MAX_SALE_AMOUNT).into());
        return Err(err);
    }
    Ok(())
}

/// Reject zero and negative amounts
pub(crate) fn validate_positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        let mut err = ValidationError::new("not_positive");
        err.message = Some("must be greater than zero".into());
        return Err(err);
    }
    Ok(())
}
