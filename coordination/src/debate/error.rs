//! Debate error types.

use thiserror::Error;

use super::contracts::StructuredSchema;
use super::roles::RoleId;
use super::state::{DebatePhase, TransitionError};

/// Result type alias for debate operations.
pub type DebateResult<T> = Result<T, DebateError>;

/// Error raised while configuring or running a debate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DebateError {
    /// A structured reply failed its contract (missing, malformed or blank fields).
    #[error("structured output from {role} failed the {schema} contract: {reason}")]
    StructuredOutput {
        role: RoleId,
        schema: StructuredSchema,
        reason: String,
    },

    /// The collaborator did not answer within the turn budget.
    #[error("{role} did not respond within {timeout_ms}ms during {phase}")]
    CollaboratorTimeout {
        role: RoleId,
        phase: DebatePhase,
        timeout_ms: u64,
    },

    /// The collaborator failed to answer at all.
    #[error("{role} unavailable during {phase}: {reason}")]
    CollaboratorUnavailable {
        role: RoleId,
        phase: DebatePhase,
        reason: String,
    },

    /// The whole-session time budget ran out between two turns.
    #[error("session budget exceeded ({elapsed_ms}ms / {budget_ms}ms)")]
    SessionBudgetExceeded { elapsed_ms: u64, budget_ms: u64 },

    /// Configuration rejected before any turn was taken.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The topic cannot be debated.
    #[error("invalid topic: {0}")]
    InvalidTopic(String),

    /// An actor was requested before the session fields it depends on exist.
    #[error("cannot build {role}: session field '{field}' is not populated")]
    MissingSnapshotField { role: RoleId, field: &'static str },

    /// A set-once session field was written twice.
    #[error("session field '{0}' is already set")]
    FieldAlreadySet(&'static str),

    #[error(transparent)]
    IllegalTransition(#[from] TransitionError),
}

impl DebateError {
    /// Whether a single local retry of the same invocation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StructuredOutput { .. })
    }

    /// Machine-readable code for tool callers and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::StructuredOutput { .. } => "STRUCTURED_OUTPUT",
            Self::CollaboratorTimeout { .. } => "COLLABORATOR_TIMEOUT",
            Self::CollaboratorUnavailable { .. } => "COLLABORATOR_UNAVAILABLE",
            Self::SessionBudgetExceeded { .. } => "SESSION_BUDGET_EXCEEDED",
            Self::InvalidConfiguration(_) => "INVALID_CONFIGURATION",
            Self::InvalidTopic(_) => "INVALID_TOPIC",
            Self::MissingSnapshotField { .. } => "MISSING_SNAPSHOT_FIELD",
            Self::FieldAlreadySet(_) => "FIELD_ALREADY_SET",
            Self::IllegalTransition(_) => "ILLEGAL_TRANSITION",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_role_and_phase() {
        let err = DebateError::CollaboratorTimeout {
            role: RoleId::Judge,
            phase: DebatePhase::Adjudication,
            timeout_ms: 500,
        };
        let text = err.to_string();
        assert!(text.contains("judge"));
        assert!(text.contains("adjudication"));
        assert!(text.contains("500ms"));
    }

    #[test]
    fn test_only_structured_output_is_retryable() {
        let structured = DebateError::StructuredOutput {
            role: RoleId::Coach,
            schema: StructuredSchema::CoachingSuggestion,
            reason: "blank".to_string(),
        };
        assert!(structured.is_retryable());
        assert!(!DebateError::InvalidConfiguration("x".to_string()).is_retryable());
        assert_eq!(structured.code(), "STRUCTURED_OUTPUT");
    }

    #[test]
    fn test_transition_error_converts() {
        let err: DebateError = TransitionError {
            from: DebatePhase::Init,
            to: DebatePhase::Terminal,
            reason: "skip".to_string(),
        }
        .into();
        assert_eq!(err.code(), "ILLEGAL_TRANSITION");
        assert!(err.to_string().contains("init"));
    }
}
