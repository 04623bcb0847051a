//! Profiles, roles and sessions

use serde::{Deserialize, Serialize};

use crate::identity::{TeamId, UserId};

// ============================================================================
// Role
// ============================================================================

/// Role of a user inside the sales organisation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Full administrator: reviews signups, manages goals and sales
    Master,
    /// Team manager: manages goals and sales
    Manager,
    /// Seller: records their own sales
    Seller,
}

impl Role {
    /// Value stored in the backend's `user_role` enum
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Self::Master => "MASTER",
            Self::Manager => "GESTOR",
            Self::Seller => "VENDEDOR",
        }
    }

    /// Parse a backend `user_role` value
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "MASTER" => Some(Self::Master),
            "GESTOR" => Some(Self::Manager),
            "VENDEDOR" => Some(Self::Seller),
            _ => None,
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Master => "Master",
            Self::Manager => "Manager",
            Self::Seller => "Seller",
        }
    }

    /// Masters and managers may edit and cancel any sale, and create goals
    pub fn is_staff(&self) -> bool {
        matches!(self, Self::Master | Self::Manager)
    }
}

// ============================================================================
// Profile
// ============================================================================

/// A user profile as stored by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// User ID
    pub id: UserId,
    /// Display name
    pub display_name: String,
    /// Avatar reference (storage URL)
    pub avatar_url: Option<String>,
    /// Whether a master approved this user's signup
    pub approved: bool,
    /// Role
    pub role: Role,
    /// Total points accumulated
    pub total_points: i64,
    /// Total experience accumulated
    pub total_experience: i64,
    /// Level as last written by the backend (may lag `total_experience`)
    pub current_level: i32,
    /// Team membership
    pub team_id: Option<TeamId>,
}

impl Profile {
    /// Create an unapproved seller profile with no progress
    pub fn new(id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            avatar_url: None,
            approved: false,
            role: Role::Seller,
            total_points: 0,
            total_experience: 0,
            current_level: 1,
            team_id: None,
        }
    }

    /// Builder: set role
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Builder: mark approved
    pub fn approved(mut self) -> Self {
        self.approved = true;
        self
    }

    /// Builder: set points, experience and stored level
    pub fn with_progress(mut self, points: i64, experience: i64, level: i32) -> Self {
        self.total_points = points;
        self.total_experience = experience;
        self.current_level = level;
        self
    }

    /// Progression snapshot consumed by the engine
    pub fn progress(&self) -> UserProgress {
        UserProgress {
            total_experience: self.total_experience.max(0),
            total_points: self.total_points.max(0),
            current_level: self.current_level.max(1),
        }
    }
}

/// Progression fields of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProgress {
    pub total_experience: i64,
    pub total_points: i64,
    pub current_level: i32,
}

// ============================================================================
// Session
// ============================================================================

/// The authenticated user making a request, passed explicitly to every
/// operation that depends on who is asking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub profile: Profile,
}

impl Session {
    pub fn new(profile: Profile) -> Self {
        Self { profile }
    }

    pub fn user_id(&self) -> UserId {
        self.profile.id
    }

    pub fn role(&self) -> Role {
        self.profile.role
    }

    /// Unapproved users can sign in but see nothing until a master approves them
    pub fn is_approved(&self) -> bool {
        self.profile.approved
    }

    /// May list, edit and cancel sales of any seller, and create goals
    pub fn can_manage(&self) -> bool {
        self.is_approved() && self.role().is_staff()
    }

    /// May review signup requests and record sales on behalf of others
    pub fn is_master(&self) -> bool {
        self.is_approved() && self.role() == Role::Master
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_db_mapping() {
        for role in [Role::Master, Role::Manager, Role::Seller] {
            assert_eq!(Role::from_db_str(role.as_db_str()), Some(role));
        }
        assert_eq!(Role::from_db_str("ADMIN"), None);
    }

    #[test]
    fn test_progress_clamps_corrupt_rows() {
        let profile = Profile::new(UserId::new(), "Ana").with_progress(-5, -1, 0);
        let progress = profile.progress();
        assert_eq!(progress.total_points, 0);
        assert_eq!(progress.total_experience, 0);
        assert_eq!(progress.current_level, 1);
    }

    #[test]
    fn test_session_permissions() {
        let seller = Session::new(Profile::new(UserId::new(), "Bia").approved());
        assert!(seller.is_approved());
        assert!(!seller.can_manage());
        assert!(!seller.is_master());

        let manager = Session::new(
            Profile::new(UserId::new(), "Caio").with_role(Role::Manager).approved(),
        );
        assert!(manager.can_manage());
        assert!(!manager.is_master());

        let pending_master = Session::new(Profile::new(UserId::new(), "Dani").with_role(Role::Master));
        assert!(!pending_master.can_manage());
        assert!(!pending_master.is_master());
    }
}
