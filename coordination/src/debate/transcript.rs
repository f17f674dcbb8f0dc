//! Append-only transcript of everything said in a session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::contracts::StructuredPayload;
use super::roles::RoleId;
use super::state::DebatePhase;

/// One actor turn, immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Position in the transcript (0-indexed).
    pub sequence: u32,
    /// Who spoke.
    pub speaker: RoleId,
    /// Phase the turn belongs to.
    pub phase: DebatePhase,
    /// What was said.
    pub content: String,
    /// Validated structured data, for structured turns only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<StructuredPayload>,
    /// When the turn was recorded.
    pub recorded_at: DateTime<Utc>,
}

/// Ordered, append-only message log.
///
/// Only the orchestrator holds a mutable transcript. Actors receive
/// `&[Message]` views and never write to it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn and return the recorded message.
    pub fn append(
        &mut self,
        speaker: RoleId,
        phase: DebatePhase,
        content: impl Into<String>,
        payload: Option<StructuredPayload>,
    ) -> &Message {
        let sequence = self.messages.len() as u32;
        self.messages.push(Message {
            sequence,
            speaker,
            phase,
            content: content.into(),
            payload,
            recorded_at: Utc::now(),
        });
        &self.messages[sequence as usize]
    }

    /// Read-only view of every message in order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Speakers in transcript order.
    pub fn speakers(&self) -> Vec<RoleId> {
        self.messages.iter().map(|m| m.speaker).collect()
    }

    /// Messages recorded during one phase.
    pub fn in_phase(&self, phase: DebatePhase) -> Vec<&Message> {
        self.messages.iter().filter(|m| m.phase == phase).collect()
    }

    /// The contiguous tail starting at the first message of `phase`.
    ///
    /// Empty if no message of that phase has been recorded yet.
    pub fn from_phase(&self, phase: DebatePhase) -> &[Message] {
        match self.messages.iter().position(|m| m.phase == phase) {
            Some(start) => &self.messages[start..],
            None => &[],
        }
    }

    /// Plain-text rendering, one `Label: content` block per turn.
    pub fn render(&self) -> String {
        render_messages(&self.messages)
    }
}

/// Render a slice of messages as a readable script.
pub fn render_messages(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("[{}] {}: {}", m.phase, m.speaker.label(), m.content.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_assigns_sequence() {
        let mut t = Transcript::new();
        t.append(RoleId::Moderator, DebatePhase::OpeningStatements, "Welcome", None);
        let second = t.append(RoleId::DebaterFor, DebatePhase::OpeningStatements, "I argue", None);
        assert_eq!(second.sequence, 1);
        assert_eq!(t.len(), 2);
        assert_eq!(
            t.speakers(),
            vec![RoleId::Moderator, RoleId::DebaterFor]
        );
    }

    #[test]
    fn test_from_phase_slices_tail() {
        let mut t = Transcript::new();
        t.append(RoleId::Moderator, DebatePhase::ExtractPositions, "positions", None);
        t.append(RoleId::Coach, DebatePhase::Coaching, "coaching", None);
        t.append(RoleId::Moderator, DebatePhase::OpeningStatements, "open", None);
        t.append(RoleId::DebaterFor, DebatePhase::OpeningStatements, "for", None);

        let tail = t.from_phase(DebatePhase::OpeningStatements);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].sequence, 2);
        assert!(t.from_phase(DebatePhase::FreeDebate).is_empty());
    }

    #[test]
    fn test_in_phase_filters() {
        let mut t = Transcript::new();
        t.append(RoleId::Moderator, DebatePhase::ClosingStatements, "close", None);
        t.append(RoleId::DebaterAgainst, DebatePhase::ClosingStatements, "no", None);
        t.append(RoleId::Moderator, DebatePhase::Adjudication, "judge now", None);
        assert_eq!(t.in_phase(DebatePhase::ClosingStatements).len(), 2);
        assert_eq!(t.in_phase(DebatePhase::Adjudication).len(), 1);
    }

    #[test]
    fn test_render_uses_labels() {
        let mut t = Transcript::new();
        t.append(RoleId::DebaterAgainst, DebatePhase::FreeDebate, "  Not so.  ", None);
        assert_eq!(t.render(), "[free_debate] Negative: Not so.");
    }
}
