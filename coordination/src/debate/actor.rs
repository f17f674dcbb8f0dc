//! Actor collaborator interface.
//!
//! The engine never produces content itself. Every turn is delegated to an
//! `ActorClient`, which receives the actor's rendered instruction, the turn
//! being taken and a read-only view of the transcript so far. How the reply
//! is produced (local model, remote API, retrieval) is the client's concern.

use async_trait::async_trait;
use thiserror::Error;

use super::contracts::StructuredSchema;
use super::protocol::Turn;
use super::registry::Actor;
use super::roles::RoleId;
use super::transcript::Message;

/// Everything a collaborator needs to take one turn.
#[derive(Debug, Clone, Copy)]
pub struct ActorRequest<'a> {
    pub session_id: &'a str,
    pub topic: &'a str,
    pub actor: &'a Actor,
    pub turn: Turn,
    /// Transcript so far, oldest first.
    pub context: &'a [Message],
}

impl ActorRequest<'_> {
    pub fn role(&self) -> RoleId {
        self.actor.role()
    }

    pub fn instruction(&self) -> &str {
        self.actor.instruction()
    }

    /// Contract the reply payload must satisfy, for structured turns.
    pub fn schema(&self) -> Option<StructuredSchema> {
        self.turn.schema
    }
}

/// What a collaborator returns for one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorReply {
    /// Spoken text recorded in the transcript.
    pub content: String,
    /// Raw structured payload, validated by the orchestrator.
    pub payload: Option<serde_json::Value>,
}

impl ActorReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            payload: None,
        }
    }

    pub fn structured(content: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            content: content.into(),
            payload: Some(payload),
        }
    }
}

/// Collaborator failure for a single turn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActorError {
    #[error("no response after {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    /// The collaborator could not produce a payload matching the schema.
    #[error("could not produce structured output: {0}")]
    StructuredOutput(String),
}

/// Produces actor turns.
#[async_trait]
pub trait ActorClient: Send + Sync {
    /// Take one turn. Suspends until the reply is available.
    async fn invoke(&self, request: ActorRequest<'_>) -> Result<ActorReply, ActorError>;
}
