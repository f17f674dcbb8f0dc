//! Debate orchestrator: drives a session from topic to verdict.
//!
//! Ties together the turn schedule, the role registry, the collaborator and
//! the guardrails. One call to [`DebateOrchestrator::run`] owns one session
//! and its actors from creation until the result is returned; nothing is
//! shared between runs.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::actor::{ActorClient, ActorError, ActorReply, ActorRequest};
use super::config::DebateConfig;
use super::contracts::{StructuredPayload, VerdictRecord};
use super::error::DebateError;
use super::guardrails::{GuardrailEngine, GuardrailOutcome};
use super::protocol::{phase_turns, Turn};
use super::registry::{Actor, ActorSet, RoleRegistry};
use super::roles::RoleId;
use super::state::{DebatePhase, DebateSession, DebateTransition};
use super::transcript::Message;
use crate::events::{DebateEvent, EventBus};

/// Caller-side cancellation for a running debate.
///
/// Aborting takes effect between two turns: a turn already in flight
/// finishes and is recorded first.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle {
    token: CancellationToken,
}

impl AbortHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request an abort. Idempotent.
    pub fn abort(&self) {
        self.token.cancel();
    }

    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once an abort has been requested.
    pub async fn aborted(&self) {
        self.token.cancelled().await
    }
}

/// Outcome of a debate that ended without error: completed or aborted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateOutcome {
    /// Final phase the debate ended in (`Terminal` or `Aborted`).
    pub terminal_phase: DebatePhase,
    /// The verdict, for completed debates.
    pub verdict: Option<VerdictRecord>,
    /// Actors constructed during the run, in construction order.
    pub actors: Vec<Actor>,
    /// The session at completion.
    pub session: DebateSession,
}

impl DebateOutcome {
    /// Whether the debate reached a verdict.
    pub fn is_success(&self) -> bool {
        self.terminal_phase == DebatePhase::Terminal
    }

    pub fn is_aborted(&self) -> bool {
        self.terminal_phase == DebatePhase::Aborted
    }

    /// Every recorded turn, oldest first.
    pub fn transcript(&self) -> &[Message] {
        self.session.transcript().messages()
    }

    /// Turns from the opening statements onwards, without the two
    /// preparation turns.
    pub fn debate_turns(&self) -> &[Message] {
        self.session
            .transcript()
            .from_phase(DebatePhase::OpeningStatements)
    }

    pub fn transitions(&self) -> &[DebateTransition] {
        &self.session.transitions
    }

    /// The actor built for `role`, if the run got far enough to need it.
    pub fn actor(&self, role: RoleId) -> Option<&Actor> {
        self.actors.iter().find(|a| a.role() == role)
    }

    /// Phase the abort interrupted, for aborted debates.
    pub fn aborted_in(&self) -> Option<DebatePhase> {
        if !self.is_aborted() {
            return None;
        }
        self.session.transitions.last().map(|t| t.from)
    }

    /// Human-readable abort notice, for aborted debates.
    pub fn abort_notice(&self) -> Option<String> {
        let phase = self.aborted_in()?;
        Some(format!(
            "Debate on \"{}\" was aborted during {} after {} turns; no verdict was reached.",
            self.session.topic(),
            phase,
            self.session.transcript().len()
        ))
    }

    /// The verdict as pretty-printed JSON, for completed debates.
    pub fn verdict_text(&self) -> serde_json::Result<Option<String>> {
        self.verdict
            .as_ref()
            .map(serde_json::to_string_pretty)
            .transpose()
    }

    /// The run's external result: the verdict JSON, or the abort notice.
    pub fn result_text(&self) -> serde_json::Result<String> {
        match self.verdict_text()? {
            Some(text) => Ok(text),
            None => Ok(self
                .abort_notice()
                .unwrap_or_else(|| format!("Debate ended in {} without a verdict.", self.terminal_phase))),
        }
    }

    /// Full outcome as pretty-printed JSON, transcript included.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Compact summary line.
    pub fn summary_line(&self) -> String {
        match (&self.verdict, self.terminal_phase) {
            (Some(verdict), _) => format!(
                "[COMPLETE] {} turns | {} | topic={}",
                self.session.transcript().len(),
                verdict.summary_line(),
                self.session.topic()
            ),
            (None, phase) => format!(
                "[{}] {} turns | topic={}",
                phase.to_string().to_uppercase(),
                self.session.transcript().len(),
                self.session.topic()
            ),
        }
    }
}

/// A debate that ended in `Failed`.
///
/// Carries the session as it stood at the failure so the caller can
/// inspect everything said before it.
#[derive(Debug, Clone)]
pub struct DebateFailure {
    pub error: DebateError,
    /// Phase the session was in when the error occurred.
    pub failed_in: DebatePhase,
    pub actors: Vec<Actor>,
    pub session: DebateSession,
}

impl DebateFailure {
    pub fn transcript(&self) -> &[Message] {
        self.session.transcript().messages()
    }
}

impl std::fmt::Display for DebateFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "debate {} failed during {} after {} turns: {}",
            self.session.id,
            self.failed_in,
            self.session.transcript().len(),
            self.error
        )
    }
}

impl std::error::Error for DebateFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// How the turn loop stopped without error.
enum Flow {
    Completed,
    Aborted,
}

/// The debate orchestrator.
///
/// Construction validates the configuration, so an invalid round count or
/// a missing binding fails before any session exists.
pub struct DebateOrchestrator {
    config: DebateConfig,
    client: Arc<dyn ActorClient>,
    registry: RoleRegistry,
    engine: GuardrailEngine,
    events: EventBus,
    abort: AbortHandle,
}

impl DebateOrchestrator {
    /// Create an orchestrator with its own event bus.
    pub fn new(config: DebateConfig, client: Arc<dyn ActorClient>) -> Result<Self, DebateError> {
        config.validate()?;
        let registry = RoleRegistry::new(config.bindings.clone());
        let engine = GuardrailEngine::new(config.guardrails.clone());
        Ok(Self {
            config,
            client,
            registry,
            engine,
            events: EventBus::new(),
            abort: AbortHandle::new(),
        })
    }

    /// Publish lifecycle events on `events` instead of a private bus.
    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    /// Use `abort` as the cancellation handle for [`run`](Self::run).
    pub fn with_abort_handle(mut self, abort: AbortHandle) -> Self {
        self.abort = abort;
        self
    }

    pub fn config(&self) -> &DebateConfig {
        &self.config
    }

    /// Handle that aborts runs started with [`run`](Self::run).
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Subscribe to lifecycle events of subsequent runs.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<DebateEvent> {
        self.events.subscribe()
    }

    /// Run a full debate on `topic`.
    pub async fn run(&self, topic: &str) -> Result<DebateOutcome, DebateFailure> {
        self.run_with_abort(topic, &self.abort).await
    }

    /// Run a full debate on `topic`, observing `abort` between turns.
    pub async fn run_with_abort(
        &self,
        topic: &str,
        abort: &AbortHandle,
    ) -> Result<DebateOutcome, DebateFailure> {
        let session_id = uuid::Uuid::new_v4().to_string();
        let topic = topic.trim();
        let mut run = SessionRun {
            orchestrator: self,
            session: DebateSession::new(&session_id, topic, self.config.free_debate_rounds),
            actors: ActorSet::new(),
            started: Instant::now(),
        };

        info!(
            session_id = %session_id,
            topic,
            rounds = self.config.free_debate_rounds,
            "Debate started"
        );
        self.events.publish(DebateEvent::SessionStarted {
            session_id: session_id.clone(),
            topic: topic.to_string(),
            free_debate_rounds: self.config.free_debate_rounds,
            timestamp: Utc::now(),
        });

        let result = match run.validate_topic() {
            Ok(()) => run.drive(abort).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(flow) => Ok(run.finish(flow)),
            Err(error) => Err(run.fail(error)),
        }
    }
}

/// State owned by one run.
struct SessionRun<'o> {
    orchestrator: &'o DebateOrchestrator,
    session: DebateSession,
    actors: ActorSet,
    started: Instant,
}

impl SessionRun<'_> {
    fn validate_topic(&self) -> Result<(), DebateError> {
        if self.session.topic().is_empty() {
            return Err(DebateError::InvalidTopic(
                "topic must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    async fn drive(&mut self, abort: &AbortHandle) -> Result<Flow, DebateError> {
        let rounds = self.session.free_debate_rounds;

        for phase in DebatePhase::PROTOCOL {
            if abort.is_aborted() {
                return Ok(Flow::Aborted);
            }
            self.session.advance("previous phase complete")?;
            debug_assert_eq!(self.session.phase, phase);
            info!(session_id = %self.session.id, phase = %phase, "Phase entered");
            self.publish(DebateEvent::PhaseEntered {
                session_id: self.session.id.clone(),
                phase,
                timestamp: Utc::now(),
            });

            for turn in phase_turns(phase, rounds) {
                if abort.is_aborted() {
                    return Ok(Flow::Aborted);
                }
                self.check_budget()?;
                self.take_turn(turn).await?;
            }
        }

        self.session.advance("verdict recorded")?;
        Ok(Flow::Completed)
    }

    fn check_budget(&self) -> Result<(), DebateError> {
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        match self.orchestrator.engine.evaluate(elapsed_ms) {
            GuardrailOutcome::Continue => Ok(()),
            GuardrailOutcome::SessionBudgetExceeded {
                elapsed_ms,
                budget_ms,
            } => Err(DebateError::SessionBudgetExceeded {
                elapsed_ms,
                budget_ms,
            }),
        }
    }

    /// Invoke the collaborator for one turn and record the result.
    ///
    /// Structured turns are retried up to the configured limit when the
    /// reply fails its contract. Nothing is appended for a failed turn.
    async fn take_turn(&mut self, turn: Turn) -> Result<(), DebateError> {
        let max_attempts = match turn.schema {
            Some(_) => self
                .orchestrator
                .config
                .structured_retry_limit
                .saturating_add(1),
            None => 1,
        };

        let mut attempt = 0;
        let (content, payload) = loop {
            attempt += 1;
            let reply = self.invoke(turn).await;
            match reply.and_then(|reply| self.check_reply(turn, reply)) {
                Ok(accepted) => break accepted,
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    warn!(
                        session_id = %self.session.id,
                        role = %turn.role,
                        attempt,
                        error = %e,
                        "Structured reply rejected, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        };

        let message = self
            .session
            .record_turn(turn.role, content, payload.clone())
            .clone();
        debug!(
            session_id = %self.session.id,
            sequence = message.sequence,
            phase = %message.phase,
            speaker = %message.speaker,
            "Turn recorded"
        );
        self.publish(DebateEvent::TurnCompleted {
            session_id: self.session.id.clone(),
            sequence: message.sequence,
            phase: message.phase,
            speaker: message.speaker,
            content: message.content,
            timestamp: message.recorded_at,
        });

        if let Some(payload) = payload {
            let schema = payload.schema();
            match payload {
                StructuredPayload::Positions(p) => self.session.set_positions(p)?,
                StructuredPayload::Coaching(c) => self.session.set_coaching(c)?,
                StructuredPayload::Verdict(v) => self.session.set_verdict(v)?,
            }
            info!(
                session_id = %self.session.id,
                role = %turn.role,
                schema = %schema,
                "Structured output extracted"
            );
            self.publish(DebateEvent::StructuredExtracted {
                session_id: self.session.id.clone(),
                speaker: turn.role,
                schema,
                timestamp: Utc::now(),
            });
        }

        Ok(())
    }

    /// Build the actor if needed, then call the collaborator under the
    /// turn budget.
    async fn invoke(&mut self, turn: Turn) -> Result<ActorReply, DebateError> {
        let orchestrator = self.orchestrator;
        let snapshot = self.session.snapshot();
        let actor = self
            .actors
            .get_or_build(&orchestrator.registry, turn.role, &snapshot)?;

        let request = ActorRequest {
            session_id: &self.session.id,
            topic: self.session.topic(),
            actor,
            turn,
            context: self.session.transcript().messages(),
        };

        let call = orchestrator.client.invoke(request);
        let result = match orchestrator.engine.turn_budget() {
            Some(budget) => match tokio::time::timeout(budget, call).await {
                Ok(result) => result,
                Err(_) => Err(ActorError::Timeout {
                    after_ms: budget.as_millis() as u64,
                }),
            },
            None => call.await,
        };

        result.map_err(|e| match e {
            ActorError::Timeout { after_ms } => DebateError::CollaboratorTimeout {
                role: turn.role,
                phase: turn.phase,
                timeout_ms: after_ms,
            },
            ActorError::Unavailable(reason) => DebateError::CollaboratorUnavailable {
                role: turn.role,
                phase: turn.phase,
                reason,
            },
            ActorError::StructuredOutput(reason) => match turn.schema {
                Some(schema) => DebateError::StructuredOutput {
                    role: turn.role,
                    schema,
                    reason,
                },
                None => DebateError::CollaboratorUnavailable {
                    role: turn.role,
                    phase: turn.phase,
                    reason: format!("unexpected structured failure on a spoken turn: {}", reason),
                },
            },
        })
    }

    /// Validate a reply against the turn's contract.
    fn check_reply(
        &self,
        turn: Turn,
        reply: ActorReply,
    ) -> Result<(String, Option<StructuredPayload>), DebateError> {
        let Some(schema) = turn.schema else {
            return Ok((reply.content, None));
        };

        let payload = schema
            .validate(reply.payload.as_ref())
            .map_err(|violation| DebateError::StructuredOutput {
                role: turn.role,
                schema,
                reason: violation.reason,
            })?;

        let content = if reply.content.trim().is_empty() {
            reply
                .payload
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_default()
        } else {
            reply.content
        };
        Ok((content, Some(payload)))
    }

    fn publish(&self, event: DebateEvent) {
        self.orchestrator.events.publish(event);
    }

    fn finish(mut self, flow: Flow) -> DebateOutcome {
        if let Flow::Aborted = flow {
            let phase = self.session.phase;
            if let Err(e) = self.session.transition(DebatePhase::Aborted, "abort requested") {
                warn!(session_id = %self.session.id, error = %e, "Abort transition rejected");
            }
            warn!(
                session_id = %self.session.id,
                phase = %phase,
                turns = self.session.transcript().len(),
                "Debate aborted"
            );
        } else {
            info!(
                session_id = %self.session.id,
                turns = self.session.transcript().len(),
                "Debate complete"
            );
        }

        self.publish(DebateEvent::SessionEnded {
            session_id: self.session.id.clone(),
            phase: self.session.phase,
            turns: self.session.transcript().len(),
            error: None,
            timestamp: Utc::now(),
        });

        DebateOutcome {
            terminal_phase: self.session.phase,
            verdict: self.session.verdict().cloned(),
            actors: self.actors.into_actors(),
            session: self.session,
        }
    }

    fn fail(mut self, error: DebateError) -> DebateFailure {
        let failed_in = self.session.phase;
        if let Err(e) = self.session.transition(DebatePhase::Failed, &error.to_string()) {
            warn!(session_id = %self.session.id, error = %e, "Failure transition rejected");
        }
        warn!(
            session_id = %self.session.id,
            phase = %failed_in,
            code = error.code(),
            error = %error,
            status = %self.session.status_line(),
            "Debate failed"
        );

        self.publish(DebateEvent::SessionEnded {
            session_id: self.session.id.clone(),
            phase: self.session.phase,
            turns: self.session.transcript().len(),
            error: Some(error.code().to_string()),
            timestamp: Utc::now(),
        });

        DebateFailure {
            error,
            failed_in,
            actors: self.actors.into_actors(),
            session: self.session,
        }
    }
}
