//! Command-line runner for moderated debates.
//!
//! Supplies the concrete pieces the engine leaves to its caller: a chat
//! completions actor, configuration loading and live progress output.

pub mod agents;
pub mod config;
pub mod report;
