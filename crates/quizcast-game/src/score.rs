//! The scoring engine: a pure function from submission to verdict.
//!
//! No shared state, no clocks — elapsed time comes in as a number the room
//! actor measured. Idempotency (never re-scoring an already-answered
//! question) is enforced by the caller, not here: by the time a payload
//! reaches [`score`], the room actor has already decided it counts.

use std::collections::HashSet;

use quizcast_protocol::AnswerPayload;

use crate::question::displayed_indices;
use crate::text;
use crate::Question;

/// Points for a fully correct answer, before the speed bonus.
pub const BASE_POINTS: u32 = 1000;

/// Maximum speed bonus, awarded at elapsed time zero.
pub const MAX_SPEED_BONUS: u32 = 700;

/// The bonus window never stretches past this, however long the question's
/// time limit is — after three minutes nobody is being rewarded for speed.
pub const BONUS_WINDOW_CAP_MS: u64 = 180_000;

/// The outcome of scoring one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// Whether the answer was fully correct. No partial credit.
    pub correct: bool,
    /// Points awarded: base + speed bonus when correct, 0 otherwise.
    pub points: u32,
}

/// Scores a submitted payload against a question.
///
/// `shuffle` is the display permutation stored when the question was shown
/// (`None` for single-choice). A payload whose kind doesn't match the
/// question kind is simply incorrect — a confused client is not an error
/// condition worth crashing a room over.
pub fn score(
    question: &Question,
    shuffle: Option<&[usize]>,
    payload: &AnswerPayload,
    elapsed_ms: u64,
    time_limit_ms: u64,
) -> Verdict {
    let correct = is_correct(question, shuffle, payload);
    let points = if correct {
        BASE_POINTS + speed_bonus(elapsed_ms, time_limit_ms)
    } else {
        0
    };
    Verdict { correct, points }
}

/// The speed bonus: `floor(700 · max(0, 1 − elapsed/window))` where
/// `window = min(time_limit, 180 000 ms)`.
///
/// Non-increasing in elapsed time, exactly [`MAX_SPEED_BONUS`] at zero,
/// exactly 0 once `elapsed >= window`.
pub fn speed_bonus(elapsed_ms: u64, time_limit_ms: u64) -> u32 {
    let window = time_limit_ms.min(BONUS_WINDOW_CAP_MS);
    if window == 0 || elapsed_ms >= window {
        return 0;
    }
    let remaining = 1.0 - elapsed_ms as f64 / window as f64;
    (MAX_SPEED_BONUS as f64 * remaining).floor() as u32
}

fn is_correct(
    question: &Question,
    shuffle: Option<&[usize]>,
    payload: &AnswerPayload,
) -> bool {
    match (question, payload) {
        (
            Question::TokenAssembly { tokens, answer_text, .. },
            AnswerPayload::Tokens { tokens: submitted },
        ) => {
            let required = required_stems(tokens, answer_text);
            let given: HashSet<String> = submitted
                .iter()
                .map(|t| text::stem_phrase(&text::normalize(t)))
                .filter(|s| !s.is_empty())
                .collect();
            // Exact set equality: same size, same elements. Order and
            // duplicates in the submission are irrelevant.
            !required.is_empty() && given == required
        }
        (
            Question::MultiSelect { options, correct, .. },
            AnswerPayload::Selections { selected },
        ) => {
            let expected =
                displayed_indices(correct, options.len(), shuffle);
            sorted_joined(selected) == sorted_joined(&expected)
        }
        (
            Question::SingleChoice { correct, .. },
            AnswerPayload::Choice { choice },
        ) => choice == correct,
        // Payload kind doesn't match the question kind.
        _ => false,
    }
}

/// Derives the required token set for a token-assembly question: every bank
/// token that occurs in the canonical answer text (normalized comparison),
/// deduplicated by stem.
fn required_stems(tokens: &[String], answer_text: &str) -> HashSet<String> {
    let answer = text::normalize(answer_text);
    tokens
        .iter()
        .filter_map(|t| {
            let norm = text::normalize(t);
            if !norm.is_empty() && answer.contains(&norm) {
                Some(text::stem_phrase(&norm))
            } else {
                None
            }
        })
        .collect()
}

/// Canonical comparison form for index sets: sorted and comma-joined.
fn sorted_joined(indices: &[usize]) -> String {
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();
    sorted
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn token_question() -> Question {
        Question::TokenAssembly {
            case_text: "Paciente febril.".into(),
            prompt: "Monte a conduta inicial.".into(),
            tokens: vec![
                "coletar culturas".into(),
                "antibiótico".into(),
                "antitérmico".into(),
                "alta imediata".into(),
            ],
            answer_text:
                "Coletar culturas e iniciar antibiótico precocemente.".into(),
        }
    }

    fn multi_question() -> Question {
        Question::MultiSelect {
            case_text: "case".into(),
            prompt: "pick two".into(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct: vec![0, 2],
            select_count: 2,
        }
    }

    fn single_question() -> Question {
        Question::SingleChoice {
            prompt: "?".into(),
            choices: vec!["w".into(), "x".into(), "y".into(), "z".into()],
            correct: 1,
        }
    }

    // =====================================================================
    // speed_bonus()
    // =====================================================================

    #[test]
    fn test_speed_bonus_full_at_zero_elapsed() {
        assert_eq!(speed_bonus(0, 30_000), MAX_SPEED_BONUS);
    }

    #[test]
    fn test_speed_bonus_zero_at_window_end() {
        assert_eq!(speed_bonus(30_000, 30_000), 0);
        assert_eq!(speed_bonus(31_000, 30_000), 0);
    }

    #[test]
    fn test_speed_bonus_window_capped_at_three_minutes() {
        // A 10-minute time limit still uses the 180 s bonus window.
        assert_eq!(speed_bonus(180_000, 600_000), 0);
        assert_eq!(speed_bonus(90_000, 600_000), MAX_SPEED_BONUS / 2);
    }

    #[test]
    fn test_speed_bonus_is_monotonically_non_increasing() {
        let mut last = u32::MAX;
        for elapsed in (0..=40_000).step_by(500) {
            let bonus = speed_bonus(elapsed, 30_000);
            assert!(bonus <= last, "bonus rose at elapsed={elapsed}");
            last = bonus;
        }
    }

    #[test]
    fn test_speed_bonus_halfway_is_half() {
        assert_eq!(speed_bonus(15_000, 30_000), MAX_SPEED_BONUS / 2);
    }

    #[test]
    fn test_speed_bonus_zero_time_limit_is_zero() {
        assert_eq!(speed_bonus(0, 0), 0);
    }

    // =====================================================================
    // Token-assembly scoring
    // =====================================================================

    #[test]
    fn test_score_token_assembly_exact_set_scores_full() {
        let verdict = score(
            &token_question(),
            Some(&[3, 1, 0, 2]),
            &AnswerPayload::Tokens {
                tokens: vec!["coletar culturas".into(), "antibiótico".into()],
            },
            0,
            30_000,
        );
        assert!(verdict.correct);
        assert_eq!(verdict.points, BASE_POINTS + MAX_SPEED_BONUS);
    }

    #[test]
    fn test_score_token_assembly_order_and_duplicates_ignored() {
        let verdict = score(
            &token_question(),
            None,
            &AnswerPayload::Tokens {
                tokens: vec![
                    "Antibiótico".into(),
                    "coletar  culturas".into(),
                    "antibiotico".into(), // duplicate modulo accent
                ],
            },
            1_000,
            30_000,
        );
        assert!(verdict.correct);
    }

    #[test]
    fn test_score_token_assembly_inflected_forms_match() {
        // "antibióticos" stems to the same key as the bank's "antibiótico".
        let verdict = score(
            &token_question(),
            None,
            &AnswerPayload::Tokens {
                tokens: vec![
                    "coletar culturas".into(),
                    "antibióticos".into(),
                ],
            },
            0,
            30_000,
        );
        assert!(verdict.correct);
    }

    #[test]
    fn test_score_token_assembly_missing_token_is_incorrect() {
        let verdict = score(
            &token_question(),
            None,
            &AnswerPayload::Tokens { tokens: vec!["antibiótico".into()] },
            0,
            30_000,
        );
        assert!(!verdict.correct);
        assert_eq!(verdict.points, 0);
    }

    #[test]
    fn test_score_token_assembly_extra_token_is_incorrect() {
        let verdict = score(
            &token_question(),
            None,
            &AnswerPayload::Tokens {
                tokens: vec![
                    "coletar culturas".into(),
                    "antibiótico".into(),
                    "alta imediata".into(),
                ],
            },
            0,
            30_000,
        );
        assert!(!verdict.correct);
    }

    // =====================================================================
    // Multi-select scoring
    // =====================================================================

    #[test]
    fn test_score_multi_select_through_permutation() {
        // Display order: c, a, d, b — canonical correct {a, c} sit at
        // display positions 1 and 0.
        let verdict = score(
            &multi_question(),
            Some(&[2, 0, 3, 1]),
            &AnswerPayload::Selections { selected: vec![1, 0] },
            0,
            30_000,
        );
        assert!(verdict.correct);
    }

    #[test]
    fn test_score_multi_select_wrong_set_is_incorrect() {
        let verdict = score(
            &multi_question(),
            Some(&[2, 0, 3, 1]),
            &AnswerPayload::Selections { selected: vec![2, 3] },
            0,
            30_000,
        );
        assert!(!verdict.correct);
    }

    #[test]
    fn test_score_multi_select_partial_is_incorrect() {
        // One right option out of two required: no partial credit.
        let verdict = score(
            &multi_question(),
            None,
            &AnswerPayload::Selections { selected: vec![0] },
            0,
            30_000,
        );
        assert!(!verdict.correct);
        assert_eq!(verdict.points, 0);
    }

    // =====================================================================
    // Single-choice scoring
    // =====================================================================

    #[test]
    fn test_score_single_choice_correct_and_incorrect() {
        let q = single_question();
        let right = score(
            &q,
            None,
            &AnswerPayload::Choice { choice: 1 },
            5_000,
            30_000,
        );
        assert!(right.correct);
        assert!(right.points > BASE_POINTS);

        let wrong = score(
            &q,
            None,
            &AnswerPayload::Choice { choice: 0 },
            5_000,
            30_000,
        );
        assert!(!wrong.correct);
        assert_eq!(wrong.points, 0);
    }

    // =====================================================================
    // Cross-kind payloads
    // =====================================================================

    #[test]
    fn test_score_mismatched_payload_kind_is_incorrect() {
        let verdict = score(
            &single_question(),
            None,
            &AnswerPayload::Tokens { tokens: vec!["x".into()] },
            0,
            30_000,
        );
        assert!(!verdict.correct);
        assert_eq!(verdict.points, 0);
    }

    #[test]
    fn test_score_is_deterministic() {
        let q = multi_question();
        let payload = AnswerPayload::Selections { selected: vec![0, 2] };
        let a = score(&q, None, &payload, 7_000, 30_000);
        let b = score(&q, None, &payload, 7_000, 30_000);
        assert_eq!(a, b);
    }
}
