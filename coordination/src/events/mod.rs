//! Debate lifecycle events
//!
//! The orchestrator publishes one event per phase entry, turn and
//! structured extraction, bracketed by session start and end. Observers
//! (live progress output, logs, tests) subscribe to the bus; the debate
//! never waits on them.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Orchestrator │────▶│  Event Bus   │────▶│  Subscribers │
//! │  (publish)   │     │  (broadcast) │     │   (recv)     │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```

pub mod bus;
pub mod types;

pub use bus::{EventBus, EventFilter, FilteredReceiver, SharedEventBus};
pub use types::{DebateEvent, SessionId};
