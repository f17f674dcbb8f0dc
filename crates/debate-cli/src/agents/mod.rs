//! Concrete debate actors.
//!
//! The engine only sees `ActorClient`; everything here is about reaching a
//! model and turning its reply into an `ActorReply`.

pub mod chat;

pub use chat::ChatCompletionsActor;
