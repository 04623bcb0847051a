//! Identity types for GameSales
//!
//! All identity types are strongly typed wrappers around UUIDs so a sale id
//! can never be passed where a user id is expected. The backend stores plain
//! UUID columns; the prefix only appears in the string form.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Macro to generate ID types with common implementations
macro_rules! define_id_type {
    ($name:ident, $prefix:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Parse from a string (with or without prefix)
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                let s = s.strip_prefix(concat!($prefix, "_")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }

            /// Get the inner UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Convert to prefixed string
            pub fn to_prefixed_string(&self) -> String {
                format!("{}_{}", $prefix, self.0)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", $prefix, self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }
    };
}

// People
define_id_type!(UserId, "user", "Unique identifier for a user profile");
define_id_type!(TeamId, "team", "Unique identifier for a sales team");
define_id_type!(SignupRequestId, "signup", "Unique identifier for a signup request");

// Sales and goals
define_id_type!(SaleId, "sale", "Unique identifier for a recorded sale");
define_id_type!(GoalId, "goal", "Unique identifier for a team goal");
define_id_type!(BonusTierId, "tier", "Unique identifier for a goal bonus tier");

// Progression
define_id_type!(AchievementId, "ach", "Unique identifier for an achievement");
define_id_type!(MissionId, "mission", "Unique identifier for a mission");
