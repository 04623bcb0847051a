//! Change notifications
//!
//! The backend only says "data of kind X changed"; consumers reload
//! everything they derive from that kind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of data that changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Profiles,
    Sales,
    Goals,
    Achievements,
    Missions,
    Signups,
}

impl ChangeKind {
    /// All kinds, for full reloads
    pub const ALL: [ChangeKind; 6] = [
        Self::Profiles,
        Self::Sales,
        Self::Goals,
        Self::Achievements,
        Self::Missions,
        Self::Signups,
    ];

    /// Map a backend table name to the kind it belongs to
    pub fn from_table(table: &str) -> Option<Self> {
        match table {
            "profiles" => Some(Self::Profiles),
            "vendas" => Some(Self::Sales),
            "metas_equipe" | "bonificacoes_meta" => Some(Self::Goals),
            "conquistas" | "conquistas_usuarios" => Some(Self::Achievements),
            "missoes" | "missoes_usuarios" => Some(Self::Missions),
            "solicitacoes_cadastro" => Some(Self::Signups),
            _ => None,
        }
    }

    /// Whether the leaderboard or race views depend on this kind
    pub fn affects_standings(&self) -> bool {
        matches!(self, Self::Profiles | Self::Sales)
    }
}

/// A change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub at: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn now(kind: ChangeKind) -> Self {
        Self { kind, at: Utc::now() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_mapping() {
        assert_eq!(ChangeKind::from_table("vendas"), Some(ChangeKind::Sales));
        assert_eq!(ChangeKind::from_table("bonificacoes_meta"), Some(ChangeKind::Goals));
        assert_eq!(ChangeKind::from_table("audit_log"), None);
    }

    #[test]
    fn test_standings_dependency() {
        assert!(ChangeKind::Sales.affects_standings());
        assert!(ChangeKind::Profiles.affects_standings());
        assert!(!ChangeKind::Goals.affects_standings());
    }
}
