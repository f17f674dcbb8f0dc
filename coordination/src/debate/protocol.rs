//! The fixed turn schedule of a debate.
//!
//! Control flow lives here and only here: which role speaks, in which
//! phase, in which order, and whether the turn must return structured data.
//! Instruction text never drives sequencing.
//!
//! ```text
//! ExtractPositions   Moderator*
//! Coaching           Coach*
//! OpeningStatements  Moderator, For, Moderator, Against
//! CrossExamination   Moderator, For, Against, Moderator, Against, For
//! FreeDebate         Moderator, (For, Against) × rounds
//! ClosingStatements  Moderator, Against, For
//! Adjudication       Moderator, Judge*
//!                                          (* = structured turn)
//! ```

use serde::{Deserialize, Serialize};

use super::contracts::StructuredSchema;
use super::roles::RoleId;
use super::state::DebatePhase;

/// What a turn is for, so collaborators can phrase their cue.
///
/// Narrative only; the orchestrator never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnCue {
    ExtractPositions,
    Coach,
    /// Moderator opens a phase or hands the floor to a debater.
    Announce,
    OpeningStatement,
    /// Put 3–5 direct questions to the opponent.
    PoseQuestions,
    /// Answer the opponent's questions directly, without counter-questions.
    AnswerQuestions,
    /// One exchange of free debate (1-indexed).
    Rebuttal { round: u32 },
    ClosingStatement,
    /// Moderator closes the floor and calls for the verdict.
    CallVerdict,
    Adjudicate,
}

/// One scheduled actor invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub phase: DebatePhase,
    pub role: RoleId,
    pub cue: TurnCue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<StructuredSchema>,
}

impl Turn {
    fn spoken(phase: DebatePhase, role: RoleId, cue: TurnCue) -> Self {
        Self {
            phase,
            role,
            cue,
            schema: None,
        }
    }

    fn structured(
        phase: DebatePhase,
        role: RoleId,
        cue: TurnCue,
        schema: StructuredSchema,
    ) -> Self {
        Self {
            phase,
            role,
            cue,
            schema: Some(schema),
        }
    }

    pub fn is_structured(&self) -> bool {
        self.schema.is_some()
    }
}

/// The turns of one phase, in order. Empty for phases without turns.
pub fn phase_turns(phase: DebatePhase, free_debate_rounds: u32) -> Vec<Turn> {
    use RoleId::*;
    use TurnCue::*;

    match phase {
        DebatePhase::ExtractPositions => vec![Turn::structured(
            phase,
            Moderator,
            TurnCue::ExtractPositions,
            StructuredSchema::PositionExtraction,
        )],
        DebatePhase::Coaching => vec![Turn::structured(
            phase,
            RoleId::Coach,
            TurnCue::Coach,
            StructuredSchema::CoachingSuggestion,
        )],
        DebatePhase::OpeningStatements => vec![
            Turn::spoken(phase, Moderator, Announce),
            Turn::spoken(phase, DebaterFor, OpeningStatement),
            Turn::spoken(phase, Moderator, Announce),
            Turn::spoken(phase, DebaterAgainst, OpeningStatement),
        ],
        // The target of each round of questions answers before it asks.
        DebatePhase::CrossExamination => vec![
            Turn::spoken(phase, Moderator, Announce),
            Turn::spoken(phase, DebaterFor, PoseQuestions),
            Turn::spoken(phase, DebaterAgainst, AnswerQuestions),
            Turn::spoken(phase, Moderator, Announce),
            Turn::spoken(phase, DebaterAgainst, PoseQuestions),
            Turn::spoken(phase, DebaterFor, AnswerQuestions),
        ],
        DebatePhase::FreeDebate => {
            let mut turns = Vec::with_capacity(1 + 2 * free_debate_rounds as usize);
            turns.push(Turn::spoken(phase, Moderator, Announce));
            for round in 1..=free_debate_rounds {
                turns.push(Turn::spoken(phase, DebaterFor, Rebuttal { round }));
                turns.push(Turn::spoken(phase, DebaterAgainst, Rebuttal { round }));
            }
            turns
        }
        // Closing order reverses the opening order.
        DebatePhase::ClosingStatements => vec![
            Turn::spoken(phase, Moderator, Announce),
            Turn::spoken(phase, DebaterAgainst, ClosingStatement),
            Turn::spoken(phase, DebaterFor, ClosingStatement),
        ],
        DebatePhase::Adjudication => vec![
            Turn::spoken(phase, Moderator, CallVerdict),
            Turn::structured(phase, Judge, Adjudicate, StructuredSchema::Verdict),
        ],
        DebatePhase::Init
        | DebatePhase::Terminal
        | DebatePhase::Aborted
        | DebatePhase::Failed => Vec::new(),
    }
}

/// Every turn of a complete run, in invocation order.
pub fn schedule(free_debate_rounds: u32) -> Vec<Turn> {
    DebatePhase::PROTOCOL
        .iter()
        .flat_map(|phase| phase_turns(*phase, free_debate_rounds))
        .collect()
}

/// Total invocations of a complete run.
pub fn expected_turn_count(free_debate_rounds: u32) -> usize {
    18 + 2 * free_debate_rounds as usize
}

/// Invocations from `OpeningStatements` through `Adjudication`.
pub fn expected_floor_turn_count(free_debate_rounds: u32) -> usize {
    expected_turn_count(free_debate_rounds) - 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use RoleId::*;

    fn roles(turns: &[Turn]) -> Vec<RoleId> {
        turns.iter().map(|t| t.role).collect()
    }

    #[test]
    fn test_opening_is_for_first() {
        let turns = phase_turns(DebatePhase::OpeningStatements, 4);
        assert_eq!(
            roles(&turns),
            vec![Moderator, DebaterFor, Moderator, DebaterAgainst]
        );
    }

    #[test]
    fn test_closing_is_against_first() {
        let turns = phase_turns(DebatePhase::ClosingStatements, 4);
        assert_eq!(roles(&turns), vec![Moderator, DebaterAgainst, DebaterFor]);
    }

    #[test]
    fn test_cross_examination_answer_before_counter_question() {
        let turns = phase_turns(DebatePhase::CrossExamination, 4);
        assert_eq!(
            roles(&turns),
            vec![
                Moderator,
                DebaterFor,
                DebaterAgainst,
                Moderator,
                DebaterAgainst,
                DebaterFor
            ]
        );
        assert_eq!(turns[2].cue, TurnCue::AnswerQuestions);
        assert_eq!(turns[4].cue, TurnCue::PoseQuestions);
    }

    #[test]
    fn test_free_debate_pairs() {
        let turns = phase_turns(DebatePhase::FreeDebate, 3);
        assert_eq!(turns.len(), 7);
        assert_eq!(turns[0].role, Moderator);
        for (i, pair) in turns[1..].chunks(2).enumerate() {
            assert_eq!(pair[0].role, DebaterFor);
            assert_eq!(pair[1].role, DebaterAgainst);
            assert_eq!(pair[0].cue, TurnCue::Rebuttal { round: i as u32 + 1 });
        }
    }

    #[test]
    fn test_structured_turns() {
        let structured: Vec<_> = schedule(2).into_iter().filter(Turn::is_structured).collect();
        assert_eq!(structured.len(), 3);
        assert_eq!(structured[0].schema, Some(StructuredSchema::PositionExtraction));
        assert_eq!(structured[1].schema, Some(StructuredSchema::CoachingSuggestion));
        assert_eq!(structured[2].role, Judge);
    }

    #[test]
    fn test_counts_match_schedule() {
        for rounds in 1..=6 {
            assert_eq!(schedule(rounds).len(), expected_turn_count(rounds));
        }
        assert_eq!(expected_floor_turn_count(2), 20);
    }

    #[test]
    fn test_equal_debater_turns() {
        for rounds in 1..=5 {
            let all = schedule(rounds);
            let fors = all.iter().filter(|t| t.role == DebaterFor).count();
            let againsts = all.iter().filter(|t| t.role == DebaterAgainst).count();
            assert_eq!(fors, againsts);
        }
    }

    #[test]
    fn test_terminal_phases_have_no_turns() {
        assert!(phase_turns(DebatePhase::Init, 4).is_empty());
        assert!(phase_turns(DebatePhase::Terminal, 4).is_empty());
        assert!(phase_turns(DebatePhase::Aborted, 4).is_empty());
    }
}
