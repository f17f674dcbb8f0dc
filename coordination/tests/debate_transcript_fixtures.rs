//! Golden transcript fixtures: deterministic debate transcripts for the
//! complete, aborted and failed paths to prevent behavioral regressions.
//!
//! Each fixture runs a full debate against a fixed script and verifies the
//! exact transcript and session state.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use debate_coordination::debate::{
    render_messages, AbortHandle, ActorClient, ActorError, ActorReply, ActorRequest,
    DebateConfig, DebateOrchestrator, DebateOutcome, DebatePhase, RoleId, TurnCue,
};

/// Replies with a fixed line per (role, cue).
struct FixtureClient {
    abort: Option<(DebatePhase, AbortHandle)>,
}

#[async_trait]
impl ActorClient for FixtureClient {
    async fn invoke(&self, request: ActorRequest<'_>) -> Result<ActorReply, ActorError> {
        if let Some((phase, handle)) = &self.abort {
            if request.turn.phase == *phase {
                handle.abort();
            }
        }

        let role = request.role();
        let reply = match request.turn.cue {
            TurnCue::ExtractPositions => ActorReply::structured(
                "Affirmative: four-day weeks raise output. Negative: they do not.",
                json!({
                    "position_for": "A four-day week raises output",
                    "position_against": "A four-day week lowers output"
                }),
            ),
            TurnCue::Coach => ActorReply::structured(
                "Both sides are briefed.",
                json!({
                    "suggestion_for": "Cite the pilot trials",
                    "suggestion_against": "Cite service coverage gaps"
                }),
            ),
            TurnCue::Announce => ActorReply::text("The floor is open."),
            TurnCue::OpeningStatement => ActorReply::text(format!("{} opens.", role.label())),
            TurnCue::PoseQuestions => ActorReply::text(format!("{} asks.", role.label())),
            TurnCue::AnswerQuestions => ActorReply::text(format!("{} answers.", role.label())),
            TurnCue::Rebuttal { round } => {
                ActorReply::text(format!("{} rebuts in round {}.", role.label(), round))
            }
            TurnCue::ClosingStatement => ActorReply::text(format!("{} closes.", role.label())),
            TurnCue::CallVerdict => ActorReply::text("The floor is closed. Judge, your verdict."),
            TurnCue::Adjudicate => ActorReply::structured(
                "The affirmative wins.",
                json!({
                    "scores": "Affirmative 34/40, Negative 30/40",
                    "winner": "debater_for",
                    "winning_position": "A four-day week raises output",
                    "key_arguments": "Pilot trials showed stable output with fewer hours",
                    "score_rationale": "Stronger evidence and sharper rebuttals"
                }),
            ),
        };
        Ok(reply)
    }
}

async fn run_fixture(rounds: u32, abort_in: Option<DebatePhase>) -> DebateOutcome {
    let handle = AbortHandle::new();
    let client = FixtureClient {
        abort: abort_in.map(|phase| (phase, handle.clone())),
    };
    let config = DebateConfig {
        free_debate_rounds: rounds,
        ..Default::default()
    };
    DebateOrchestrator::new(config, Arc::new(client))
        .unwrap()
        .with_abort_handle(handle)
        .run("A four-day work week improves productivity")
        .await
        .unwrap()
}

const TWO_ROUND_SCRIPT: &str = "\
[opening_statements] Moderator: The floor is open.

[opening_statements] Affirmative: Affirmative opens.

[opening_statements] Moderator: The floor is open.

[opening_statements] Negative: Negative opens.

[cross_examination] Moderator: The floor is open.

[cross_examination] Affirmative: Affirmative asks.

[cross_examination] Negative: Negative answers.

[cross_examination] Moderator: The floor is open.

[cross_examination] Negative: Negative asks.

[cross_examination] Affirmative: Affirmative answers.

[free_debate] Moderator: The floor is open.

[free_debate] Affirmative: Affirmative rebuts in round 1.

[free_debate] Negative: Negative rebuts in round 1.

[free_debate] Affirmative: Affirmative rebuts in round 2.

[free_debate] Negative: Negative rebuts in round 2.

[closing_statements] Moderator: The floor is open.

[closing_statements] Negative: Negative closes.

[closing_statements] Affirmative: Affirmative closes.

[adjudication] Moderator: The floor is closed. Judge, your verdict.

[adjudication] Judge: The affirmative wins.";

// ── Fixture: complete two-round debate ─────────────────────────────

#[tokio::test]
async fn fixture_complete_two_round_debate() {
    let outcome = run_fixture(2, None).await;

    assert!(outcome.is_success());
    assert_eq!(render_messages(outcome.debate_turns()), TWO_ROUND_SCRIPT);

    let preparation = &outcome.transcript()[..2];
    assert_eq!(preparation[0].speaker, RoleId::Moderator);
    assert_eq!(preparation[0].phase, DebatePhase::ExtractPositions);
    assert_eq!(preparation[1].speaker, RoleId::Coach);
    assert_eq!(preparation[1].phase, DebatePhase::Coaching);

    let verdict = outcome.verdict.as_ref().unwrap();
    assert_eq!(verdict.winner, RoleId::DebaterFor);
    assert_eq!(verdict.scores, "Affirmative 34/40, Negative 30/40");
    assert!(outcome.summary_line().starts_with("[COMPLETE] 22 turns | winner=debater_for"));
}

// ── Fixture: one-round debate ──────────────────────────────────────

#[tokio::test]
async fn fixture_single_round_free_debate() {
    let outcome = run_fixture(1, None).await;

    let free: Vec<String> = outcome
        .session
        .transcript()
        .in_phase(DebatePhase::FreeDebate)
        .into_iter()
        .map(|m| m.content.clone())
        .collect();
    assert_eq!(
        free,
        vec![
            "The floor is open.",
            "Affirmative rebuts in round 1.",
            "Negative rebuts in round 1.",
        ]
    );
    assert_eq!(outcome.transcript().len(), 20);
}

// ── Fixture: abort during cross-examination ────────────────────────

#[tokio::test]
async fn fixture_abort_during_cross_examination() {
    let outcome = run_fixture(2, Some(DebatePhase::CrossExamination)).await;

    // The first cross-examination turn is in flight when the abort arrives;
    // it is recorded, then the session stops.
    assert!(outcome.is_aborted());
    assert_eq!(outcome.transcript().len(), 7);
    assert_eq!(outcome.aborted_in(), Some(DebatePhase::CrossExamination));
    assert_eq!(
        render_messages(outcome.debate_turns()),
        TWO_ROUND_SCRIPT
            .split("\n\n")
            .take(5)
            .collect::<Vec<_>>()
            .join("\n\n")
    );
    assert!(outcome.session.coaching().is_some());
    assert!(outcome.verdict.is_none());
    assert_eq!(
        outcome.abort_notice().unwrap(),
        "Debate on \"A four-day work week improves productivity\" was aborted during \
         cross_examination after 7 turns; no verdict was reached."
    );
}

// ── Fixture: deterministic replay ──────────────────────────────────

#[tokio::test]
async fn fixture_deterministic_replay() {
    let first = run_fixture(3, None).await;
    let second = run_fixture(3, None).await;

    assert_ne!(first.session.id, second.session.id);
    assert_eq!(
        first.session.transcript().render(),
        second.session.transcript().render()
    );
    assert_eq!(first.verdict, second.verdict);
}

// ── Fixture: exported JSON reloads ─────────────────────────────────

#[tokio::test]
async fn fixture_export_reloads() {
    let outcome = run_fixture(2, None).await;
    let text = outcome.to_json().unwrap();

    let reloaded: DebateOutcome = serde_json::from_str(&text).unwrap();
    assert_eq!(reloaded.terminal_phase, DebatePhase::Terminal);
    assert_eq!(reloaded.transcript(), outcome.transcript());
    assert_eq!(reloaded.verdict, outcome.verdict);
    assert_eq!(reloaded.session.topic(), outcome.session.topic());

    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["terminal_phase"], "terminal");
    assert_eq!(value["session"]["transcript"]["messages"][0]["payload"]["schema"], "positions");
}
