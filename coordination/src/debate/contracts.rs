//! Structured extraction contracts and validation.
//!
//! Three phases require an actor to return typed data instead of prose:
//! position extraction (moderator), coaching (coach) and the verdict (judge).
//! The orchestrator validates every structured reply against its contract
//! before folding it into session state. Validation is fail-closed: a
//! missing, malformed or blank field is a contract violation, never a
//! silently defaulted value.
//!
//! ## Contract schemas
//!
//! ```text
//! PositionExtraction { position_for, position_against }
//! CoachingSuggestion { suggestion_for, suggestion_against }
//! VerdictRecord      { scores, winner, winning_position, key_arguments, score_rationale }
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::roles::RoleId;

/// Opposing positions extracted from the topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PositionExtraction {
    /// The affirmative side's stance, derived from the topic.
    pub position_for: String,
    /// The opposing side's stance, derived from the topic.
    pub position_against: String,
}

/// Preparation guidance for each debater.
///
/// Each suggestion names argument dimensions, concrete arguments and
/// delivery guidance. The text is passed verbatim into the debater's
/// instruction and never parsed further.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CoachingSuggestion {
    /// Guidance for the affirmative debater.
    pub suggestion_for: String,
    /// Guidance for the opposing debater.
    pub suggestion_against: String,
}

/// The judge's adjudication of a finished debate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VerdictRecord {
    /// Per-dimension and total scores for both sides.
    pub scores: String,
    /// The winning debater (`debater_for` or `debater_against`).
    pub winner: RoleId,
    /// The stance the winner argued.
    pub winning_position: String,
    /// The winner's most persuasive arguments.
    pub key_arguments: String,
    /// Why the winner came out ahead.
    pub score_rationale: String,
}

impl VerdictRecord {
    /// Compact one-line summary.
    pub fn summary_line(&self) -> String {
        format!(
            "winner={} ({}) | {}",
            self.winner,
            self.winner.label(),
            self.winning_position
        )
    }
}

/// Which contract a structured invocation must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuredSchema {
    PositionExtraction,
    CoachingSuggestion,
    Verdict,
}

impl StructuredSchema {
    /// JSON Schema document describing the expected payload.
    pub fn json_schema(self) -> serde_json::Value {
        let root = match self {
            Self::PositionExtraction => schemars::schema_for!(PositionExtraction),
            Self::CoachingSuggestion => schemars::schema_for!(CoachingSuggestion),
            Self::Verdict => schemars::schema_for!(VerdictRecord),
        };
        serde_json::to_value(root).unwrap_or(serde_json::Value::Null)
    }

    /// Field names the payload must carry, in declaration order.
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::PositionExtraction => &["position_for", "position_against"],
            Self::CoachingSuggestion => &["suggestion_for", "suggestion_against"],
            Self::Verdict => &[
                "scores",
                "winner",
                "winning_position",
                "key_arguments",
                "score_rationale",
            ],
        }
    }

    /// Validate a raw payload and convert it to its typed form.
    pub fn validate(
        self,
        payload: Option<&serde_json::Value>,
    ) -> Result<StructuredPayload, ContractViolation> {
        let value = payload.ok_or_else(|| ContractViolation::new(self, "no structured payload"))?;

        if !value.is_object() {
            return Err(ContractViolation::new(
                self,
                format!("payload must be a JSON object, got {}", json_kind(value)),
            ));
        }

        let typed = match self {
            Self::PositionExtraction => {
                let p: PositionExtraction = decode(self, value)?;
                require_text(self, "position_for", &p.position_for)?;
                require_text(self, "position_against", &p.position_against)?;
                StructuredPayload::Positions(p)
            }
            Self::CoachingSuggestion => {
                let c: CoachingSuggestion = decode(self, value)?;
                require_text(self, "suggestion_for", &c.suggestion_for)?;
                require_text(self, "suggestion_against", &c.suggestion_against)?;
                StructuredPayload::Coaching(c)
            }
            Self::Verdict => {
                let v: VerdictRecord = decode(self, value)?;
                if !v.winner.is_debater() {
                    return Err(ContractViolation::new(
                        self,
                        format!("winner must be a debater, got '{}'", v.winner),
                    ));
                }
                require_text(self, "scores", &v.scores)?;
                require_text(self, "winning_position", &v.winning_position)?;
                require_text(self, "key_arguments", &v.key_arguments)?;
                require_text(self, "score_rationale", &v.score_rationale)?;
                StructuredPayload::Verdict(v)
            }
        };

        Ok(typed)
    }
}

impl std::fmt::Display for StructuredSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PositionExtraction => write!(f, "position_extraction"),
            Self::CoachingSuggestion => write!(f, "coaching_suggestion"),
            Self::Verdict => write!(f, "verdict"),
        }
    }
}

/// A validated structured payload, attached to the message that carried it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "schema", rename_all = "snake_case")]
pub enum StructuredPayload {
    Positions(PositionExtraction),
    Coaching(CoachingSuggestion),
    Verdict(VerdictRecord),
}

impl StructuredPayload {
    /// The contract this payload satisfies.
    pub fn schema(&self) -> StructuredSchema {
        match self {
            Self::Positions(_) => StructuredSchema::PositionExtraction,
            Self::Coaching(_) => StructuredSchema::CoachingSuggestion,
            Self::Verdict(_) => StructuredSchema::Verdict,
        }
    }
}

/// A structured reply that failed its contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractViolation {
    pub schema: StructuredSchema,
    pub reason: String,
}

impl ContractViolation {
    fn new(schema: StructuredSchema, reason: impl Into<String>) -> Self {
        Self {
            schema,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} contract violated: {}", self.schema, self.reason)
    }
}

impl std::error::Error for ContractViolation {}

fn decode<T: serde::de::DeserializeOwned>(
    schema: StructuredSchema,
    value: &serde_json::Value,
) -> Result<T, ContractViolation> {
    serde_json::from_value(value.clone()).map_err(|e| ContractViolation::new(schema, e.to_string()))
}

fn require_text(
    schema: StructuredSchema,
    field: &str,
    value: &str,
) -> Result<(), ContractViolation> {
    if value.trim().is_empty() {
        return Err(ContractViolation::new(
            schema,
            format!("field '{}' is empty", field),
        ));
    }
    Ok(())
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
