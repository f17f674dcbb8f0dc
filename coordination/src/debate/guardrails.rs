//! Time and size guardrails for debate sessions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Outcome when guardrails are evaluated between two turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuardrailOutcome {
    /// Continue debate; no guardrails triggered.
    Continue,
    /// Stop; the whole-session budget is spent.
    SessionBudgetExceeded { elapsed_ms: u64, budget_ms: u64 },
}

impl std::fmt::Display for GuardrailOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Continue => write!(f, "continue"),
            Self::SessionBudgetExceeded {
                elapsed_ms,
                budget_ms,
            } => {
                write!(
                    f,
                    "session_budget_exceeded ({}ms / {}ms)",
                    elapsed_ms, budget_ms
                )
            }
        }
    }
}

/// Configuration for debate guardrails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardrailConfig {
    /// Maximum wait for a single actor turn in milliseconds (0 = unlimited).
    pub turn_timeout_ms: u64,
    /// Maximum total debate time in milliseconds (0 = unlimited).
    pub session_timeout_ms: u64,
    /// Upper bound accepted for the free-debate round count.
    pub max_free_debate_rounds: u32,
}

impl Default for GuardrailConfig {
    fn default() -> Self {
        Self {
            turn_timeout_ms: 300_000,
            session_timeout_ms: 0,
            max_free_debate_rounds: 16,
        }
    }
}

/// Engine that evaluates guardrails against a running session.
pub struct GuardrailEngine {
    config: GuardrailConfig,
}

impl GuardrailEngine {
    /// Create a new guardrail engine.
    pub fn new(config: GuardrailConfig) -> Self {
        Self { config }
    }

    /// Budget for one actor turn, if bounded.
    pub fn turn_budget(&self) -> Option<Duration> {
        match self.config.turn_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    /// Evaluate whether any guardrail has triggered.
    ///
    /// Call this before each turn to determine whether to continue.
    pub fn evaluate(&self, elapsed_ms: u64) -> GuardrailOutcome {
        if self.config.session_timeout_ms > 0 && elapsed_ms >= self.config.session_timeout_ms {
            return GuardrailOutcome::SessionBudgetExceeded {
                elapsed_ms,
                budget_ms: self.config.session_timeout_ms,
            };
        }
        GuardrailOutcome::Continue
    }

    /// Get the configuration.
    pub fn config(&self) -> &GuardrailConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_session_continues() {
        let engine = GuardrailEngine::new(GuardrailConfig::default());
        assert_eq!(engine.evaluate(u64::MAX / 2), GuardrailOutcome::Continue);
    }

    #[test]
    fn test_session_budget_trips() {
        let engine = GuardrailEngine::new(GuardrailConfig {
            session_timeout_ms: 1_000,
            ..Default::default()
        });
        assert_eq!(engine.evaluate(999), GuardrailOutcome::Continue);
        let outcome = engine.evaluate(1_000);
        assert_eq!(
            outcome,
            GuardrailOutcome::SessionBudgetExceeded {
                elapsed_ms: 1_000,
                budget_ms: 1_000
            }
        );
        assert!(outcome.to_string().contains("1000ms / 1000ms"));
    }

    #[test]
    fn test_turn_budget() {
        let engine = GuardrailEngine::new(GuardrailConfig::default());
        assert_eq!(engine.turn_budget(), Some(Duration::from_secs(300)));

        let unbounded = GuardrailEngine::new(GuardrailConfig {
            turn_timeout_ms: 0,
            ..Default::default()
        });
        assert_eq!(unbounded.turn_budget(), None);
    }

    #[test]
    fn test_config_partial_deserialize_uses_defaults() {
        let config: GuardrailConfig = serde_json::from_str(r#"{"turn_timeout_ms": 5}"#).unwrap();
        assert_eq!(config.turn_timeout_ms, 5);
        assert_eq!(config.max_free_debate_rounds, 16);
    }
}
