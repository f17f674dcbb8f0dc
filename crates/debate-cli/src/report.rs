//! Live progress output: prints each phase banner and turn as the debate
//! runs.

use std::io::Write;

use debate_coordination::debate::DebatePhase;
use debate_coordination::events::DebateEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::warn;

/// Human title of a turn-bearing phase.
pub fn phase_title(phase: DebatePhase) -> &'static str {
    match phase {
        DebatePhase::ExtractPositions => "Assigning positions",
        DebatePhase::Coaching => "Coaching",
        DebatePhase::OpeningStatements => "Opening statements",
        DebatePhase::CrossExamination => "Cross-examination",
        DebatePhase::FreeDebate => "Free debate",
        DebatePhase::ClosingStatements => "Closing statements",
        DebatePhase::Adjudication => "Adjudication",
        DebatePhase::Init => "Preparing",
        DebatePhase::Terminal => "Finished",
        DebatePhase::Aborted => "Aborted",
        DebatePhase::Failed => "Failed",
    }
}

/// Text printed for one event, if any.
pub fn format_event(event: &DebateEvent) -> Option<String> {
    match event {
        DebateEvent::SessionStarted { topic, .. } => Some(format!("Debate topic: {}\n", topic)),
        DebateEvent::PhaseEntered { phase, .. } => {
            Some(format!("===== {} =====\n", phase_title(*phase)))
        }
        DebateEvent::TurnCompleted {
            speaker, content, ..
        } => Some(format!("{}:\n{}\n", speaker.label(), content.trim())),
        DebateEvent::StructuredExtracted { .. } => None,
        DebateEvent::SessionEnded { phase, turns, .. } => Some(format!(
            "===== {} after {} turns =====\n",
            phase_title(*phase),
            turns
        )),
    }
}

/// Print events to `out` until the session ends or the bus closes.
pub fn spawn_reporter<W>(mut events: broadcast::Receiver<DebateEvent>, mut out: W) -> JoinHandle<()>
where
    W: Write + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(text) = format_event(&event) {
                        if let Err(e) = writeln!(out, "{}", text).and_then(|_| out.flush()) {
                            warn!("Failed to write progress: {e}");
                            return;
                        }
                    }
                    if event.is_final() {
                        return;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Progress output fell behind; events dropped");
                }
                Err(RecvError::Closed) => return,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use debate_coordination::debate::{RoleId, StructuredSchema};
    use debate_coordination::events::EventBus;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_format_turn() {
        let event = DebateEvent::TurnCompleted {
            session_id: "s".to_string(),
            sequence: 3,
            phase: DebatePhase::OpeningStatements,
            speaker: RoleId::DebaterAgainst,
            content: "  I disagree.  ".to_string(),
            timestamp: Utc::now(),
        };
        assert_eq!(format_event(&event).unwrap(), "Negative:\nI disagree.\n");
    }

    #[test]
    fn test_structured_events_are_silent() {
        let event = DebateEvent::StructuredExtracted {
            session_id: "s".to_string(),
            speaker: RoleId::Coach,
            schema: StructuredSchema::CoachingSuggestion,
            timestamp: Utc::now(),
        };
        assert!(format_event(&event).is_none());
    }

    #[tokio::test]
    async fn test_reporter_stops_after_session_end() {
        let bus = EventBus::new();
        let buf = SharedBuf::default();
        let handle = spawn_reporter(bus.subscribe(), buf.clone());

        bus.publish(DebateEvent::PhaseEntered {
            session_id: "s".to_string(),
            phase: DebatePhase::FreeDebate,
            timestamp: Utc::now(),
        });
        bus.publish(DebateEvent::SessionEnded {
            session_id: "s".to_string(),
            phase: DebatePhase::Aborted,
            turns: 9,
            error: None,
            timestamp: Utc::now(),
        });
        handle.await.unwrap();

        let text = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(text.contains("===== Free debate ====="));
        assert!(text.contains("===== Aborted after 9 turns ====="));
    }
}
