//! Debate Orchestration: Moderated Five-Role Debate
//!
//! A moderator, a coach, a judge and two debaters take turns in a fixed
//! sequence of phases. Three turns return structured data that later
//! phases depend on: the two positions, the coaching for each side and the
//! judge's verdict.
//!
//! # Debate Flow
//!
//! ```text
//! Init → ExtractPositions → Coaching → OpeningStatements → CrossExamination
//!          (positions)      (coaching)                            │
//!                                                                 ▼
//!  Terminal ← Adjudication ← ClosingStatements ←────────────── FreeDebate
//!  (verdict)                                                 (rounds × 2)
//!
//!  abort between any two turns → Aborted
//!  collaborator or contract failure → Failed
//! ```
//!
//! Actors are built lazily, the first time the schedule needs them, from
//! the session fields available at that moment. A debater is therefore
//! never built before positions and coaching exist.

pub mod actor;
pub mod config;
pub mod contracts;
pub mod error;
pub mod guardrails;
pub mod orchestrator;
pub mod prompts;
pub mod protocol;
pub mod registry;
pub mod roles;
pub mod state;
pub mod tool;
pub mod transcript;

pub use actor::{ActorClient, ActorError, ActorReply, ActorRequest};
pub use config::{
    DebateConfig, ModelBinding, RoleBindings, DEFAULT_FREE_DEBATE_ROUNDS, MAX_STRUCTURED_RETRY_LIMIT,
};
pub use contracts::{
    CoachingSuggestion, ContractViolation, PositionExtraction, StructuredPayload,
    StructuredSchema, VerdictRecord,
};
pub use error::{DebateError, DebateResult};
pub use guardrails::{GuardrailConfig, GuardrailEngine, GuardrailOutcome};
pub use orchestrator::{AbortHandle, DebateFailure, DebateOrchestrator, DebateOutcome};
pub use protocol::{
    expected_floor_turn_count, expected_turn_count, phase_turns, schedule, Turn, TurnCue,
};
pub use registry::{Actor, ActorSet, RoleRegistry};
pub use roles::RoleId;
pub use state::{DebatePhase, DebateSession, DebateTransition, SessionSnapshot, TransitionError};
pub use tool::{StartDebateInput, StartDebateTool, ToolDefinition, ToolError, START_DEBATE};
pub use transcript::{render_messages, Message, Transcript};
