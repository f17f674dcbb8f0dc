//! Debate lifecycle events
//!
//! Published by the orchestrator as a session runs. Observers only; nothing
//! in the engine reads them back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::debate::{DebatePhase, RoleId, StructuredSchema};

/// Session identifier carried by every event
pub type SessionId = String;

/// All debate lifecycle events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DebateEvent {
    /// A session was created and configuration accepted
    SessionStarted {
        session_id: SessionId,
        topic: String,
        free_debate_rounds: u32,
        timestamp: DateTime<Utc>,
    },

    /// The session moved into a turn-bearing phase
    PhaseEntered {
        session_id: SessionId,
        phase: DebatePhase,
        timestamp: DateTime<Utc>,
    },

    /// A turn was appended to the transcript
    TurnCompleted {
        session_id: SessionId,
        sequence: u32,
        phase: DebatePhase,
        speaker: RoleId,
        content: String,
        timestamp: DateTime<Utc>,
    },

    /// A structured payload passed its contract and was folded into the session
    StructuredExtracted {
        session_id: SessionId,
        speaker: RoleId,
        schema: StructuredSchema,
        timestamp: DateTime<Utc>,
    },

    /// The session reached a terminal phase
    SessionEnded {
        session_id: SessionId,
        phase: DebatePhase,
        turns: usize,
        /// Error code for failed sessions.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        timestamp: DateTime<Utc>,
    },
}

impl DebateEvent {
    /// Get the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            DebateEvent::SessionStarted { timestamp, .. } => *timestamp,
            DebateEvent::PhaseEntered { timestamp, .. } => *timestamp,
            DebateEvent::TurnCompleted { timestamp, .. } => *timestamp,
            DebateEvent::StructuredExtracted { timestamp, .. } => *timestamp,
            DebateEvent::SessionEnded { timestamp, .. } => *timestamp,
        }
    }

    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            DebateEvent::SessionStarted { .. } => "session_started",
            DebateEvent::PhaseEntered { .. } => "phase_entered",
            DebateEvent::TurnCompleted { .. } => "turn_completed",
            DebateEvent::StructuredExtracted { .. } => "structured_extracted",
            DebateEvent::SessionEnded { .. } => "session_ended",
        }
    }

    pub fn session_id(&self) -> &str {
        match self {
            DebateEvent::SessionStarted { session_id, .. }
            | DebateEvent::PhaseEntered { session_id, .. }
            | DebateEvent::TurnCompleted { session_id, .. }
            | DebateEvent::StructuredExtracted { session_id, .. }
            | DebateEvent::SessionEnded { session_id, .. } => session_id,
        }
    }

    /// Whether this is the last event a session publishes
    pub fn is_final(&self) -> bool {
        matches!(self, DebateEvent::SessionEnded { .. })
    }
}
