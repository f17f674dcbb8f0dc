//! Role registry: builds actors bound to a role, a model and a rendered
//! instruction.
//!
//! An actor's instruction is rendered once, from the session snapshot valid
//! at construction, and never re-rendered. Actors whose instruction needs
//! positions or coaching cannot be built until those fields exist.

use serde::{Deserialize, Serialize};

use super::config::{ModelBinding, RoleBindings};
use super::error::DebateError;
use super::prompts;
use super::roles::RoleId;
use super::state::SessionSnapshot;

/// A constructed participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    role: RoleId,
    instruction: String,
    binding: ModelBinding,
    prompt_version: String,
}

impl Actor {
    pub fn role(&self) -> RoleId {
        self.role
    }

    /// The instruction rendered at construction time.
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn binding(&self) -> &ModelBinding {
        &self.binding
    }

    pub fn prompt_version(&self) -> &str {
        &self.prompt_version
    }
}

/// Factory for the five debate actors.
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    bindings: RoleBindings,
}

impl RoleRegistry {
    pub fn new(bindings: RoleBindings) -> Self {
        Self { bindings }
    }

    /// Build the actor for `role` from the given snapshot.
    pub fn build(&self, role: RoleId, snapshot: &SessionSnapshot<'_>) -> Result<Actor, DebateError> {
        let binding = self.bindings.get(role).cloned().ok_or_else(|| {
            DebateError::InvalidConfiguration(format!("missing model binding for {}", role))
        })?;

        let instruction = match role {
            RoleId::Moderator => prompts::moderator(snapshot),
            RoleId::Judge => prompts::judge(snapshot),
            RoleId::Coach => {
                let positions = snapshot
                    .positions
                    .ok_or(DebateError::MissingSnapshotField {
                        role,
                        field: "positions",
                    })?;
                prompts::coach(
                    snapshot,
                    &positions.position_for,
                    &positions.position_against,
                )
            }
            RoleId::DebaterFor | RoleId::DebaterAgainst => {
                let positions = snapshot
                    .positions
                    .ok_or(DebateError::MissingSnapshotField {
                        role,
                        field: "positions",
                    })?;
                let coaching = snapshot
                    .coaching
                    .ok_or(DebateError::MissingSnapshotField {
                        role,
                        field: "coaching",
                    })?;
                let affirmative = role == RoleId::DebaterFor;
                let (position, guidance) = if affirmative {
                    (&positions.position_for, &coaching.suggestion_for)
                } else {
                    (&positions.position_against, &coaching.suggestion_against)
                };
                prompts::debater(snapshot, affirmative, position, guidance)
            }
        };

        tracing::debug!(
            role = %role,
            model = %binding.model,
            prompt_version = prompts::PROMPT_VERSION,
            "Actor constructed"
        );

        Ok(Actor {
            role,
            instruction,
            binding,
            prompt_version: prompts::PROMPT_VERSION.to_string(),
        })
    }
}

/// Lazily constructed actor set for one session.
///
/// Each slot is filled on first use and kept for the rest of the run.
#[derive(Debug, Clone, Default)]
pub struct ActorSet {
    actors: Vec<Actor>,
}

impl ActorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, role: RoleId) -> Option<&Actor> {
        self.actors.iter().find(|a| a.role == role)
    }

    /// Return the actor for `role`, building it from `snapshot` if absent.
    pub fn get_or_build(
        &mut self,
        registry: &RoleRegistry,
        role: RoleId,
        snapshot: &SessionSnapshot<'_>,
    ) -> Result<&Actor, DebateError> {
        let index = match self.actors.iter().position(|a| a.role == role) {
            Some(index) => index,
            None => {
                let actor = registry.build(role, snapshot)?;
                self.actors.push(actor);
                self.actors.len() - 1
            }
        };
        Ok(&self.actors[index])
    }

    /// Roles constructed so far, in construction order.
    pub fn constructed(&self) -> Vec<RoleId> {
        self.actors.iter().map(|a| a.role).collect()
    }

    pub fn into_actors(self) -> Vec<Actor> {
        self.actors
    }
}
