//! Participant roles: the five fixed seats of a debate.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Identity of an actor participating in a debate session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum RoleId {
    /// Runs the floor: announces phases and hands over turns.
    Moderator,
    /// Prepares both debaters with strategy before the floor opens.
    Coach,
    /// Scores the finished transcript and names a winner.
    Judge,
    /// Argues the affirmative position.
    DebaterFor,
    /// Argues the opposing position.
    DebaterAgainst,
}

impl RoleId {
    /// Every role, in registry order.
    pub const ALL: [RoleId; 5] = [
        Self::Moderator,
        Self::Coach,
        Self::Judge,
        Self::DebaterFor,
        Self::DebaterAgainst,
    ];

    /// Whether this role argues a side.
    pub fn is_debater(self) -> bool {
        matches!(self, Self::DebaterFor | Self::DebaterAgainst)
    }

    /// The opposing debater, if this role is a debater.
    pub fn opponent(self) -> Option<RoleId> {
        match self {
            Self::DebaterFor => Some(Self::DebaterAgainst),
            Self::DebaterAgainst => Some(Self::DebaterFor),
            _ => None,
        }
    }

    /// Human-facing label used when rendering transcripts.
    pub fn label(self) -> &'static str {
        match self {
            Self::Moderator => "Moderator",
            Self::Coach => "Coach",
            Self::Judge => "Judge",
            Self::DebaterFor => "Affirmative",
            Self::DebaterAgainst => "Negative",
        }
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Moderator => write!(f, "moderator"),
            Self::Coach => write!(f, "coach"),
            Self::Judge => write!(f, "judge"),
            Self::DebaterFor => write!(f, "debater_for"),
            Self::DebaterAgainst => write!(f, "debater_against"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_serde_name() {
        for role in RoleId::ALL {
            assert_eq!(serde_json::to_value(role).unwrap(), role.to_string());
        }
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert!(serde_json::from_str::<RoleId>("\"referee\"").is_err());
    }

    #[test]
    fn test_opponents() {
        assert_eq!(RoleId::DebaterFor.opponent(), Some(RoleId::DebaterAgainst));
        assert_eq!(RoleId::DebaterAgainst.opponent(), Some(RoleId::DebaterFor));
        assert_eq!(RoleId::Judge.opponent(), None);
        assert!(RoleId::DebaterFor.is_debater());
        assert!(!RoleId::Moderator.is_debater());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&RoleId::DebaterAgainst).unwrap();
        assert_eq!(json, "\"debater_against\"");
    }
}
