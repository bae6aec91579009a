//! Question records: the canonical, answer-bearing form of a question.
//!
//! A [`Question`] is what the bank stores. Players never see it directly —
//! they see a [`QuestionView`] produced by [`Question::view`], which strips
//! the answer and applies the room's display permutation. At reveal time,
//! [`Question::reveal`] re-expresses the canonical answer through that same
//! permutation so clients can highlight the options players actually saw.

use serde::{Deserialize, Serialize};

use quizcast_protocol::{CorrectAnswer, QuestionView};

use crate::text;

/// One question record, tagged by kind.
///
/// The serialized form is the question-bank interchange format:
/// `{ "kind": "multi_select", "options": [...], "correct": [...], ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Question {
    /// Reconstruct a target statement by picking tokens from a bank.
    /// Scored by stemmed set-equality, not token order.
    TokenAssembly {
        /// Scenario text shown above the prompt.
        case_text: String,
        /// The question prompt.
        prompt: String,
        /// Token bank, canonical order.
        tokens: Vec<String>,
        /// The full canonical answer statement. The required token set is
        /// derived from this text, not listed separately.
        answer_text: String,
    },
    /// Select exactly `select_count` of the options.
    MultiSelect {
        /// Scenario text shown above the prompt.
        case_text: String,
        /// The question prompt.
        prompt: String,
        /// Options, canonical order.
        options: Vec<String>,
        /// Indices into `options` that are correct, canonical order.
        correct: Vec<usize>,
        /// How many options the player must select.
        select_count: usize,
    },
    /// Classic A–D question; one correct choice, never shuffled.
    SingleChoice {
        /// The question prompt.
        prompt: String,
        /// Choices, canonical order.
        choices: Vec<String>,
        /// Index into `choices` of the correct answer.
        correct: usize,
    },
}

impl Question {
    /// Whether this kind gets a display permutation when shown.
    ///
    /// Token banks and multi-select options are shuffled so the canonical
    /// order leaks nothing; single-choice presentation is the canonical
    /// order by contract.
    pub fn needs_shuffle(&self) -> bool {
        matches!(self, Self::TokenAssembly { .. } | Self::MultiSelect { .. })
    }

    /// Number of display positions a permutation must cover.
    pub fn display_len(&self) -> usize {
        match self {
            Self::TokenAssembly { tokens, .. } => tokens.len(),
            Self::MultiSelect { options, .. } => options.len(),
            Self::SingleChoice { choices, .. } => choices.len(),
        }
    }

    /// Checks the record for internal consistency.
    ///
    /// Returns a human-readable reason on failure; the bank refuses to
    /// load sets containing invalid records.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::TokenAssembly { tokens, answer_text, .. } => {
                if tokens.is_empty() {
                    return Err("token bank is empty".into());
                }
                if answer_text.trim().is_empty() {
                    return Err("answer text is empty".into());
                }
                // At least one bank token must occur in the answer text,
                // otherwise only an empty submission could ever be correct.
                let answer = text::normalize(answer_text);
                let any_required = tokens.iter().any(|t| {
                    let t = text::normalize(t);
                    !t.is_empty() && answer.contains(&t)
                });
                if !any_required {
                    return Err(
                        "no bank token occurs in the answer text".into()
                    );
                }
                Ok(())
            }
            Self::MultiSelect { options, correct, select_count, .. } => {
                if options.is_empty() {
                    return Err("option list is empty".into());
                }
                if *select_count == 0 || *select_count > options.len() {
                    return Err(format!(
                        "select_count {select_count} out of range for {} options",
                        options.len()
                    ));
                }
                if correct.len() != *select_count {
                    return Err(format!(
                        "{} correct indices but select_count is {select_count}",
                        correct.len()
                    ));
                }
                if correct.iter().any(|i| *i >= options.len()) {
                    return Err("correct index out of range".into());
                }
                let mut sorted = correct.clone();
                sorted.sort_unstable();
                sorted.dedup();
                if sorted.len() != correct.len() {
                    return Err("duplicate correct index".into());
                }
                Ok(())
            }
            Self::SingleChoice { choices, correct, .. } => {
                if choices.is_empty() {
                    return Err("choice list is empty".into());
                }
                if *correct >= choices.len() {
                    return Err(format!(
                        "correct index {correct} out of range for {} choices",
                        choices.len()
                    ));
                }
                Ok(())
            }
        }
    }

    /// Builds the player-facing view, applying a display permutation.
    ///
    /// `shuffle[d]` is the canonical index shown at display position `d`.
    /// Pass `None` for kinds that present canonical order. A permutation of
    /// the wrong length is a caller bug; display falls back to canonical
    /// order rather than panicking mid-game.
    pub fn view(&self, shuffle: Option<&[usize]>) -> QuestionView {
        match self {
            Self::TokenAssembly { case_text, prompt, tokens, .. } => {
                QuestionView::TokenAssembly {
                    case_text: case_text.clone(),
                    prompt: prompt.clone(),
                    tokens: permuted(tokens, shuffle),
                }
            }
            Self::MultiSelect {
                case_text, prompt, options, select_count, ..
            } => QuestionView::MultiSelect {
                case_text: case_text.clone(),
                prompt: prompt.clone(),
                options: permuted(options, shuffle),
                select_count: *select_count,
            },
            Self::SingleChoice { prompt, choices, .. } => {
                QuestionView::SingleChoice {
                    prompt: prompt.clone(),
                    choices: choices.clone(),
                }
            }
        }
    }

    /// The canonical answer, re-expressed in the display order the
    /// question was shown in (same `shuffle` as [`Question::view`]).
    pub fn reveal(&self, shuffle: Option<&[usize]>) -> CorrectAnswer {
        match self {
            Self::TokenAssembly { answer_text, .. } => {
                CorrectAnswer::TokenAssembly {
                    answer_text: answer_text.clone(),
                }
            }
            Self::MultiSelect { correct, options, .. } => {
                CorrectAnswer::MultiSelect {
                    indices: displayed_indices(correct, options.len(), shuffle),
                }
            }
            Self::SingleChoice { correct, .. } => {
                CorrectAnswer::SingleChoice { index: *correct }
            }
        }
    }
}

/// Reorders `items` so position `d` holds `items[shuffle[d]]`.
fn permuted(items: &[String], shuffle: Option<&[usize]>) -> Vec<String> {
    match shuffle {
        Some(perm) if perm.len() == items.len() => {
            perm.iter().map(|&i| items[i].clone()).collect()
        }
        _ => items.to_vec(),
    }
}

/// Maps canonical correct indices into display positions.
pub(crate) fn displayed_indices(
    correct: &[usize],
    len: usize,
    shuffle: Option<&[usize]>,
) -> Vec<usize> {
    match shuffle {
        Some(perm) if perm.len() == len => (0..len)
            .filter(|d| correct.contains(&perm[*d]))
            .collect(),
        _ => {
            let mut sorted = correct.to_vec();
            sorted.sort_unstable();
            sorted
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
