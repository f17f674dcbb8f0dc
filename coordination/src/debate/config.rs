//! Debate configuration: round count, per-role model bindings, guardrails.
//!
//! Configuration is an immutable value handed to the orchestrator at
//! construction. Nothing in the engine reads process-wide state.

use serde::{Deserialize, Serialize};

use super::error::DebateError;
use super::guardrails::GuardrailConfig;
use super::roles::RoleId;

/// Default number of free-debate exchanges.
pub const DEFAULT_FREE_DEBATE_ROUNDS: u32 = 4;

/// Upper bound on extra attempts for a rejected structured reply.
pub const MAX_STRUCTURED_RETRY_LIMIT: u32 = 16;

/// Opaque handle telling the collaborator which model serves a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBinding {
    /// Model name as understood by the serving endpoint.
    pub model: String,
    /// Endpoint override for this role (collaborator default when absent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Whether the model should spend extra effort reasoning before it answers.
    #[serde(default)]
    pub reasoning: bool,
}

impl ModelBinding {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            endpoint: None,
            temperature: None,
            reasoning: false,
        }
    }

    pub fn with_reasoning(mut self, reasoning: bool) -> Self {
        self.reasoning = reasoning;
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = Some(endpoint.to_string());
        self
    }
}

/// One binding slot per role. Every slot must be filled to run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleBindings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderator: Option<ModelBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coach: Option<ModelBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judge: Option<ModelBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debater_for: Option<ModelBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debater_against: Option<ModelBinding>,
}

impl RoleBindings {
    /// Bind every role to the same model.
    pub fn uniform(binding: ModelBinding) -> Self {
        Self {
            moderator: Some(binding.clone()),
            coach: Some(binding.clone()),
            judge: Some(binding.clone()),
            debater_for: Some(binding.clone()),
            debater_against: Some(binding),
        }
    }

    pub fn get(&self, role: RoleId) -> Option<&ModelBinding> {
        self.slot(role).as_ref()
    }

    pub fn set(&mut self, role: RoleId, binding: ModelBinding) {
        *self.slot_mut(role) = Some(binding);
    }

    pub fn clear(&mut self, role: RoleId) {
        *self.slot_mut(role) = None;
    }

    /// Roles with no binding.
    pub fn missing(&self) -> Vec<RoleId> {
        RoleId::ALL
            .into_iter()
            .filter(|role| self.get(*role).is_none())
            .collect()
    }

    fn slot(&self, role: RoleId) -> &Option<ModelBinding> {
        match role {
            RoleId::Moderator => &self.moderator,
            RoleId::Coach => &self.coach,
            RoleId::Judge => &self.judge,
            RoleId::DebaterFor => &self.debater_for,
            RoleId::DebaterAgainst => &self.debater_against,
        }
    }

    fn slot_mut(&mut self, role: RoleId) -> &mut Option<ModelBinding> {
        match role {
            RoleId::Moderator => &mut self.moderator,
            RoleId::Coach => &mut self.coach,
            RoleId::Judge => &mut self.judge,
            RoleId::DebaterFor => &mut self.debater_for,
            RoleId::DebaterAgainst => &mut self.debater_against,
        }
    }
}

/// Configuration for the debate orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebateConfig {
    /// Number of (for, against) exchanges in free debate.
    pub free_debate_rounds: u32,
    /// Extra attempts allowed when a structured reply fails its contract.
    pub structured_retry_limit: u32,
    /// Model binding per role. A `[bindings]` table replaces the defaults as a whole.
    pub bindings: RoleBindings,
    /// Guardrail configuration.
    pub guardrails: GuardrailConfig,
}

impl Default for DebateConfig {
    fn default() -> Self {
        let plus = ModelBinding::new("qwen-plus-latest");
        let max = ModelBinding::new("qwen-max-latest").with_reasoning(true);
        Self {
            free_debate_rounds: DEFAULT_FREE_DEBATE_ROUNDS,
            structured_retry_limit: 1,
            bindings: RoleBindings {
                moderator: Some(plus.clone()),
                coach: Some(plus.clone().with_reasoning(true)),
                judge: Some(plus.with_reasoning(true)),
                debater_for: Some(max.clone()),
                debater_against: Some(max),
            },
            guardrails: GuardrailConfig::default(),
        }
    }
}

impl DebateConfig {
    /// Parse a TOML document. Omitted keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, DebateError> {
        toml::from_str(source)
            .map_err(|e| DebateError::InvalidConfiguration(format!("malformed config: {}", e)))
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String, DebateError> {
        toml::to_string_pretty(self)
            .map_err(|e| DebateError::InvalidConfiguration(format!("unserializable config: {}", e)))
    }

    /// Check the configuration before any turn is taken.
    pub fn validate(&self) -> Result<(), DebateError> {
        if self.free_debate_rounds < 1 {
            return Err(DebateError::InvalidConfiguration(
                "free_debate_rounds must be at least 1".to_string(),
            ));
        }

        let cap = self.guardrails.max_free_debate_rounds;
        if self.free_debate_rounds > cap {
            return Err(DebateError::InvalidConfiguration(format!(
                "free_debate_rounds {} exceeds the maximum of {}",
                self.free_debate_rounds, cap
            )));
        }

        if self.structured_retry_limit > MAX_STRUCTURED_RETRY_LIMIT {
            return Err(DebateError::InvalidConfiguration(format!(
                "structured_retry_limit {} exceeds the maximum of {}",
                self.structured_retry_limit, MAX_STRUCTURED_RETRY_LIMIT
            )));
        }

        let missing = self.bindings.missing();
        if !missing.is_empty() {
            let names: Vec<String> = missing.iter().map(|r| r.to_string()).collect();
            return Err(DebateError::InvalidConfiguration(format!(
                "missing model binding for: {}",
                names.join(", ")
            )));
        }

        for role in RoleId::ALL {
            if let Some(binding) = self.bindings.get(role) {
                if binding.model.trim().is_empty() {
                    return Err(DebateError::InvalidConfiguration(format!(
                        "model binding for {} has an empty model name",
                        role
                    )));
                }
            }
        }

        Ok(())
    }
}
