//! Signup review DTOs

use serde::Deserialize;
use validator::Validate;

/// Reject signup request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RejectSignupRequest {
    /// Shown to the applicant
    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub reason: Option<String>,
}
