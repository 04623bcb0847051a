//! Signup requests reviewed by a master

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{SignupRequestId, UserId};

/// Review state of a signup request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignupStatus {
    Pending,
    Approved,
    Rejected,
}

impl SignupStatus {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDENTE",
            Self::Approved => "APROVADO",
            Self::Rejected => "RECUSADO",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "PENDENTE" => Some(Self::Pending),
            "APROVADO" => Some(Self::Approved),
            "RECUSADO" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// A request to join, created when a user signs up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRequest {
    /// Request ID
    pub id: SignupRequestId,
    /// The user who signed up
    pub user_id: UserId,
    /// Requester's display name (joined from profiles)
    pub display_name: String,
    /// Review state
    pub status: SignupStatus,
    /// Master who reviewed the request
    pub reviewed_by: Option<UserId>,
    /// Reason given on rejection
    pub rejection_reason: Option<String>,
    /// When the request was created
    pub created_at: DateTime<Utc>,
}

impl SignupRequest {
    pub fn is_pending(&self) -> bool {
        self.status == SignupStatus::Pending
    }
}
