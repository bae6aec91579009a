//! Pure game rules for Quizcast: question records, answer scoring, and
//! leaderboard projection.
//!
//! Nothing in this crate is async and nothing does I/O. The room layer
//! feeds it a question, a submitted payload, and an elapsed time; it
//! answers with a verdict. That purity is what makes the scoring pipeline
//! trivially testable and deterministic under concurrent submissions —
//! serialization is the room actor's job, not this crate's.
//!
//! # Key pieces
//!
//! - [`Question`] — the three question kinds and their player-facing views
//! - [`QuestionBank`] — the collaborator seam for loading question sets
//! - [`score`] — `(question, payload, elapsed) → Verdict`
//! - [`project`] — `players → ranked standings`

mod bank;
mod leaderboard;
mod question;
mod score;
mod text;

pub use bank::{BankError, QuestionBank, StaticBank};
pub use leaderboard::{Contender, project};
pub use question::Question;
pub use score::{
    BASE_POINTS, BONUS_WINDOW_CAP_MS, MAX_SPEED_BONUS, Verdict, score,
    speed_bonus,
};
