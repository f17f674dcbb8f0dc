//! Debate Coordination Library
//!
//! This library provides:
//! - A phase state machine that runs a moderated debate between two
//!   debaters, with a coach preparing both sides and a judge scoring them
//! - Structured extraction contracts for positions, coaching and verdicts
//! - A lifecycle event bus for observers
//! - The `start_debate` tool entry point for chat loops
//!
//! The engine never produces content itself. Every turn is delegated to an
//! [`debate::ActorClient`] supplied by the caller.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use debate_coordination::debate::{DebateConfig, DebateOrchestrator};
//!
//! let orchestrator = DebateOrchestrator::new(DebateConfig::default(), Arc::new(client))?;
//! let outcome = orchestrator.run("Remote work improves productivity").await?;
//! println!("{}", outcome.summary_line());
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod debate;
pub mod events;

// Re-export key debate types
pub use debate::{
    AbortHandle, ActorClient, ActorError, ActorReply, ActorRequest, DebateConfig, DebateError,
    DebateFailure, DebateOrchestrator, DebateOutcome, DebatePhase, DebateSession, Message,
    RoleId, StartDebateTool, StructuredSchema, VerdictRecord,
};

// Re-export key event types
pub use events::{DebateEvent, EventBus, SharedEventBus};
