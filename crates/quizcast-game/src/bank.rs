//! Question-bank collaborator: where question sets come from.
//!
//! Quizcast doesn't author quiz content — that's the deployment's job
//! (a CMS export, a JSON file, a database). The core only defines the
//! [`QuestionBank`] trait: give me a game type, get back a validated,
//! owned list of [`Question`] records.
//!
//! Loads return *owned copies* on purpose: each room keeps its own list
//! and does per-question permutation bookkeeping, which must never touch
//! the shared templates.

use std::collections::HashMap;

use crate::Question;

/// Errors from loading or validating a question set.
#[derive(Debug, thiserror::Error)]
pub enum BankError {
    /// No question set registered under this game type.
    #[error("unknown game type: {0}")]
    UnknownGameType(String),

    /// A record in the set failed validation.
    #[error("invalid question {index} in {game_type}: {reason}")]
    InvalidQuestion {
        /// Which set the record belongs to.
        game_type: String,
        /// Position of the record in the set.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// The bank source wasn't parseable.
    #[error("bank parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Loads the ordered question set for a game type.
///
/// Implementations must return records that already passed
/// [`Question::validate`] — the room layer trusts loaded sets.
pub trait QuestionBank: Send + Sync {
    /// Returns an owned copy of the question set for `game_type`.
    ///
    /// # Errors
    /// [`BankError::UnknownGameType`] when no set is registered.
    fn load(&self, game_type: &str) -> Result<Vec<Question>, BankError>;

    /// Lists the registered game types (for diagnostics and demo UIs).
    fn game_types(&self) -> Vec<String>;
}

// ---------------------------------------------------------------------------
// StaticBank
// ---------------------------------------------------------------------------

/// An in-memory [`QuestionBank`]: game types mapped to fixed question
/// lists, validated at insertion time.
///
/// This is the implementation demos and tests use; a deployment backed by
/// real content would implement [`QuestionBank`] itself.
#[derive(Debug, Default)]
pub struct StaticBank {
    sets: HashMap<String, Vec<Question>>,
}

impl StaticBank {
    /// Creates an empty bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a question set under a game type.
    ///
    /// # Errors
    /// [`BankError::InvalidQuestion`] for the first record that fails
    /// validation; nothing is registered in that case.
    pub fn add_game(
        &mut self,
        game_type: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<(), BankError> {
        let game_type = game_type.into();
        for (index, q) in questions.iter().enumerate() {
            q.validate().map_err(|reason| BankError::InvalidQuestion {
                game_type: game_type.clone(),
                index,
                reason,
            })?;
        }
        self.sets.insert(game_type, questions);
        Ok(())
    }

    /// Builds a bank from a JSON object of `game_type → [question, ...]`.
    ///
    /// # Errors
    /// [`BankError::Parse`] on malformed JSON, or the first validation
    /// failure.
    pub fn from_json(json: &str) -> Result<Self, BankError> {
        let sets: HashMap<String, Vec<Question>> = serde_json::from_str(json)?;
        let mut bank = Self::new();
        for (game_type, questions) in sets {
            bank.add_game(game_type, questions)?;
        }
        Ok(bank)
    }
}

impl QuestionBank for StaticBank {
    fn load(&self, game_type: &str) -> Result<Vec<Question>, BankError> {
        self.sets
            .get(game_type)
            .cloned()
            .ok_or_else(|| BankError::UnknownGameType(game_type.to_string()))
    }

    fn game_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.sets.keys().cloned().collect();
        types.sort();
        types
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_question() -> Question {
        Question::SingleChoice {
            prompt: "?".into(),
            choices: vec!["a".into(), "b".into()],
            correct: 0,
        }
    }

    #[test]
    fn test_load_unknown_game_type_errors() {
        let bank = StaticBank::new();
        let err = bank.load("mystery").unwrap_err();
        assert!(matches!(err, BankError::UnknownGameType(t) if t == "mystery"));
    }

    #[test]
    fn test_add_game_and_load_returns_copy() {
        let mut bank = StaticBank::new();
        bank.add_game("demo", vec![sample_question()]).unwrap();

        let mut first = bank.load("demo").unwrap();
        // Mutating the loaded copy must not affect later loads.
        first.clear();
        assert_eq!(bank.load("demo").unwrap().len(), 1);
    }

    #[test]
    fn test_add_game_rejects_invalid_record() {
        let mut bank = StaticBank::new();
        let bad = Question::SingleChoice {
            prompt: "?".into(),
            choices: vec!["only".into()],
            correct: 9,
        };
        let err = bank.add_game("demo", vec![sample_question(), bad]);
        match err {
            Err(BankError::InvalidQuestion { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected InvalidQuestion, got {other:?}"),
        }
        // Nothing registered after the failure.
        assert!(bank.load("demo").is_err());
    }

    #[test]
    fn test_from_json_parses_and_validates() {
        let bank = StaticBank::from_json(
            r#"{
                "demo": [
                    {
                        "kind": "single_choice",
                        "prompt": "?",
                        "choices": ["a", "b"],
                        "correct": 1
                    }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(bank.game_types(), vec!["demo"]);
        assert_eq!(bank.load("demo").unwrap().len(), 1);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            StaticBank::from_json("not json"),
            Err(BankError::Parse(_))
        ));
    }
}
