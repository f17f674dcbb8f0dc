//! `start_debate`: the debate engine exposed as a named, one-argument tool.
//!
//! A chat loop can offer this tool to a model. The tool runs a complete
//! debate and returns the verdict as JSON text, or an abort notice.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::orchestrator::{DebateFailure, DebateOrchestrator};

/// Tool name registered with chat loops.
pub const START_DEBATE: &str = "start_debate";

/// Name, description and JSON Schema parameters of a callable tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StartDebateInput {
    /// The debate topic, e.g. "Remote work improves productivity".
    pub topic: String,
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid arguments for {START_DEBATE}: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Debate(Box<DebateFailure>),

    #[error("could not serialize the verdict: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<DebateFailure> for ToolError {
    fn from(failure: DebateFailure) -> Self {
        Self::Debate(Box::new(failure))
    }
}

/// Runs a full debate per call.
pub struct StartDebateTool {
    orchestrator: Arc<DebateOrchestrator>,
}

impl StartDebateTool {
    pub fn new(orchestrator: Arc<DebateOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub fn name(&self) -> &'static str {
        START_DEBATE
    }

    pub fn definition(&self) -> ToolDefinition {
        let schema = schemars::schema_for!(StartDebateInput);
        ToolDefinition {
            name: START_DEBATE.into(),
            description: "Run a formal debate on a topic: a moderator assigns the two \
                          positions, a coach prepares both debaters, they argue through \
                          opening, cross-examination, free debate and closing, and a judge \
                          scores them. Returns the judge's verdict as JSON."
                .into(),
            parameters: serde_json::to_value(schema).unwrap_or_else(|_| {
                serde_json::json!({
                    "type": "object",
                    "properties": { "topic": { "type": "string" } },
                    "required": ["topic"]
                })
            }),
        }
    }

    /// Call with raw JSON arguments, as a chat loop would.
    pub async fn call(&self, args: serde_json::Value) -> Result<String, ToolError> {
        let input: StartDebateInput = serde_json::from_value(args)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        self.call_typed(input).await
    }

    pub async fn call_typed(&self, input: StartDebateInput) -> Result<String, ToolError> {
        if input.topic.trim().is_empty() {
            return Err(ToolError::InvalidArguments("topic must not be empty".into()));
        }
        let outcome = self.orchestrator.run(&input.topic).await?;
        Ok(outcome.result_text()?)
    }
}
