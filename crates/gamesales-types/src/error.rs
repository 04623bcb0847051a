//! Error types for GameSales

use thiserror::Error;

/// Result type for GameSales operations
pub type Result<T> = std::result::Result<T, GameSalesError>;

/// GameSales error types
#[derive(Debug, Clone, Error)]
pub enum GameSalesError {
    // ========================================================================
    // Input Errors
    // ========================================================================

    /// Invalid input
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    // ========================================================================
    // Lookup Errors
    // ========================================================================

    /// Entity not found
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    // ========================================================================
    // Access Errors
    // ========================================================================

    /// User has not been approved yet
    #[error("User {user_id} is awaiting approval")]
    AwaitingApproval { user_id: String },

    /// Role does not allow the operation
    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    /// Operation conflicts with the current state
    #[error("Conflict: {reason}")]
    Conflict { reason: String },

    // ========================================================================
    // System Errors
    // ========================================================================

    /// Internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl GameSalesError {
    /// Create an invalid input error
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Create a forbidden error
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::AwaitingApproval { .. } => "AWAITING_APPROVAL",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::Conflict { .. } => "CONFLICT",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            GameSalesError::invalid_input("amount", "negative").error_code(),
            "INVALID_INPUT"
        );
        assert_eq!(GameSalesError::not_found("Sale", "sale_1").error_code(), "NOT_FOUND");
        assert_eq!(GameSalesError::forbidden("staff only").error_code(), "FORBIDDEN");
    }

    #[test]
    fn test_error_messages() {
        let err = GameSalesError::not_found("Goal", "goal_42");
        assert_eq!(err.to_string(), "Goal goal_42 not found");
    }
}
