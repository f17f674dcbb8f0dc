//! Debate state machine: phases, transitions, and session tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::contracts::{CoachingSuggestion, PositionExtraction, StructuredPayload, VerdictRecord};
use super::error::DebateError;
use super::roles::RoleId;
use super::transcript::{Message, Transcript};

/// Phase of a debate session.
///
/// Phases run strictly forward in declaration order. `Terminal`, `Aborted`
/// and `Failed` end the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebatePhase {
    /// Session created, nothing said yet.
    Init,
    /// Moderator derives the two positions from the topic.
    ExtractPositions,
    /// Coach prepares both debaters.
    Coaching,
    OpeningStatements,
    CrossExamination,
    FreeDebate,
    ClosingStatements,
    /// Moderator hands over to the judge, judge returns the verdict.
    Adjudication,
    /// Verdict recorded; debate succeeded.
    Terminal,
    /// Cancelled by the caller between two turns.
    Aborted,
    /// A collaborator or contract failure ended the session.
    Failed,
}

impl DebatePhase {
    /// The phases that carry actor turns, in protocol order.
    pub const PROTOCOL: [DebatePhase; 7] = [
        Self::ExtractPositions,
        Self::Coaching,
        Self::OpeningStatements,
        Self::CrossExamination,
        Self::FreeDebate,
        Self::ClosingStatements,
        Self::Adjudication,
    ];

    /// Whether this is a terminal phase.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Terminal | Self::Aborted | Self::Failed)
    }

    /// Whether this phase allows transition to a new phase.
    pub fn can_transition(self) -> bool {
        !self.is_terminal()
    }

    /// The next phase on the success path.
    pub fn successor(self) -> Option<DebatePhase> {
        match self {
            Self::Init => Some(Self::ExtractPositions),
            Self::ExtractPositions => Some(Self::Coaching),
            Self::Coaching => Some(Self::OpeningStatements),
            Self::OpeningStatements => Some(Self::CrossExamination),
            Self::CrossExamination => Some(Self::FreeDebate),
            Self::FreeDebate => Some(Self::ClosingStatements),
            Self::ClosingStatements => Some(Self::Adjudication),
            Self::Adjudication => Some(Self::Terminal),
            Self::Terminal | Self::Aborted | Self::Failed => None,
        }
    }

    /// Valid transitions from this phase.
    pub fn valid_transitions(self) -> Vec<DebatePhase> {
        match self.successor() {
            Some(next) => vec![next, Self::Aborted, Self::Failed],
            None => Vec::new(),
        }
    }
}

impl std::fmt::Display for DebatePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::ExtractPositions => write!(f, "extract_positions"),
            Self::Coaching => write!(f, "coaching"),
            Self::OpeningStatements => write!(f, "opening_statements"),
            Self::CrossExamination => write!(f, "cross_examination"),
            Self::FreeDebate => write!(f, "free_debate"),
            Self::ClosingStatements => write!(f, "closing_statements"),
            Self::Adjudication => write!(f, "adjudication"),
            Self::Terminal => write!(f, "terminal"),
            Self::Aborted => write!(f, "aborted"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A phase transition record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateTransition {
    /// Previous phase.
    pub from: DebatePhase,
    /// New phase.
    pub to: DebatePhase,
    /// When the transition occurred.
    pub timestamp: DateTime<Utc>,
    /// Reason for the transition.
    pub reason: String,
}

/// Error for invalid state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionError {
    pub from: DebatePhase,
    pub to: DebatePhase,
    pub reason: String,
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid transition {} → {}: {}",
            self.from, self.to, self.reason
        )
    }
}

impl std::error::Error for TransitionError {}

/// Read-only view of the session fields instructions are rendered from.
#[derive(Debug, Clone, Copy)]
pub struct SessionSnapshot<'a> {
    pub topic: &'a str,
    pub positions: Option<&'a PositionExtraction>,
    pub coaching: Option<&'a CoachingSuggestion>,
    pub free_debate_rounds: u32,
}

/// One debate run: topic, extracted state, transcript and verdict.
///
/// Positions, coaching and the verdict are each set exactly once. The
/// transcript only grows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateSession {
    /// Unique session identifier.
    pub id: String,
    /// Current phase.
    pub phase: DebatePhase,
    /// Free-debate exchange count for this run.
    pub free_debate_rounds: u32,
    /// Transition history.
    pub transitions: Vec<DebateTransition>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    topic: String,
    positions: Option<PositionExtraction>,
    coaching: Option<CoachingSuggestion>,
    transcript: Transcript,
    verdict: Option<VerdictRecord>,
}

impl DebateSession {
    /// Create a new debate session.
    pub fn new(id: &str, topic: &str, free_debate_rounds: u32) -> Self {
        Self {
            id: id.to_string(),
            phase: DebatePhase::Init,
            free_debate_rounds,
            transitions: Vec::new(),
            created_at: Utc::now(),
            topic: topic.to_string(),
            positions: None,
            coaching: None,
            transcript: Transcript::new(),
            verdict: None,
        }
    }

    /// Transition to a new phase with a reason.
    pub fn transition(&mut self, to: DebatePhase, reason: &str) -> Result<(), TransitionError> {
        let allowed = self.phase.valid_transitions();
        if !allowed.contains(&to) {
            return Err(TransitionError {
                from: self.phase,
                to,
                reason: format!("not a valid transition (allowed: {:?})", allowed),
            });
        }

        self.transitions.push(DebateTransition {
            from: self.phase,
            to,
            timestamp: Utc::now(),
            reason: reason.to_string(),
        });
        self.phase = to;
        Ok(())
    }

    /// Advance along the success path.
    pub fn advance(&mut self, reason: &str) -> Result<DebatePhase, TransitionError> {
        let next = self.phase.successor().ok_or_else(|| TransitionError {
            from: self.phase,
            to: self.phase,
            reason: "phase is terminal".to_string(),
        })?;
        self.transition(next, reason)?;
        Ok(next)
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn positions(&self) -> Option<&PositionExtraction> {
        self.positions.as_ref()
    }

    pub fn coaching(&self) -> Option<&CoachingSuggestion> {
        self.coaching.as_ref()
    }

    pub fn verdict(&self) -> Option<&VerdictRecord> {
        self.verdict.as_ref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Record the extracted positions. Allowed once.
    pub fn set_positions(&mut self, positions: PositionExtraction) -> Result<(), DebateError> {
        if self.positions.is_some() {
            return Err(DebateError::FieldAlreadySet("positions"));
        }
        self.positions = Some(positions);
        Ok(())
    }

    /// Record the coaching text. Allowed once.
    pub fn set_coaching(&mut self, coaching: CoachingSuggestion) -> Result<(), DebateError> {
        if self.coaching.is_some() {
            return Err(DebateError::FieldAlreadySet("coaching"));
        }
        self.coaching = Some(coaching);
        Ok(())
    }

    /// Record the verdict. Allowed once.
    pub fn set_verdict(&mut self, verdict: VerdictRecord) -> Result<(), DebateError> {
        if self.verdict.is_some() {
            return Err(DebateError::FieldAlreadySet("verdict"));
        }
        self.verdict = Some(verdict);
        Ok(())
    }

    /// Append a turn spoken in the current phase.
    pub fn record_turn(
        &mut self,
        speaker: RoleId,
        content: impl Into<String>,
        payload: Option<StructuredPayload>,
    ) -> &Message {
        let phase = self.phase;
        self.transcript.append(speaker, phase, content, payload)
    }

    /// The fields actor instructions are rendered from, as of now.
    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        SessionSnapshot {
            topic: &self.topic,
            positions: self.positions.as_ref(),
            coaching: self.coaching.as_ref(),
            free_debate_rounds: self.free_debate_rounds,
        }
    }

    /// Whether the debate has ended.
    pub fn is_complete(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Compact status line.
    pub fn status_line(&self) -> String {
        format!(
            "[{}] {} turns | {} free-debate rounds | topic={}",
            self.phase,
            self.transcript.len(),
            self.free_debate_rounds,
            self.topic
        )
    }
}
