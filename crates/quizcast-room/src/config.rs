//! Room configuration and the phase state machine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// What happens to a room when its host's connection drops.
///
/// Exactly one policy applies per room, fixed at creation. There is no
/// hybrid: either host departure always closes the room, or it always
/// tries to promote before closing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostExitPolicy {
    /// Close the room immediately and notify everyone.
    CloseRoom,
    /// Hand the host role to the earliest-joined online player; close
    /// only when nobody is online to take over.
    PromoteSuccessor,
}

/// Configuration for a room instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Maximum players in the roster. Unknown identities beyond this are
    /// rejected; known identities may always resume.
    pub capacity: usize,

    /// How long a disconnected player's state is preserved before the
    /// record is hard-removed.
    pub grace_window: Duration,

    /// Countdown length for each question.
    pub question_time_limit: Duration,

    /// What to do when the host's connection drops.
    pub host_exit: HostExitPolicy,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            capacity: 40,
            grace_window: Duration::from_millis(180_000),
            question_time_limit: Duration::from_secs(30),
            host_exit: HostExitPolicy::CloseRoom,
        }
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The phase of a room. Governs which events the room will accept.
///
/// ```text
/// Lobby → Question ⇄ Reveal → Ended
/// ```
///
/// Only the host connection drives transitions: `start_game` takes
/// Lobby → Question, `reveal_answer` takes Question → Reveal, and
/// `next_question` takes Reveal back to Question (or to Ended after the
/// last question). `Ended` is terminal; closing the room is not a phase
/// but the destruction of the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Players are gathering; no question shown yet.
    Lobby,
    /// A question is live and submissions are accepted.
    Question,
    /// The answer is on screen; submissions are closed.
    Reveal,
    /// The game finished; final standings were broadcast.
    Ended,
}

impl Phase {
    /// Whether unknown identities may still join freely.
    pub fn in_lobby(&self) -> bool {
        matches!(self, Self::Lobby)
    }

    /// Whether answer submissions are accepted right now.
    pub fn accepts_answers(&self) -> bool {
        matches!(self, Self::Question)
    }

    /// Whether the game has finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ended)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lobby => write!(f, "lobby"),
            Self::Question => write!(f, "question"),
            Self::Reveal => write!(f, "reveal"),
            Self::Ended => write!(f, "ended"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_accepts_answers_only_in_question() {
        assert!(!Phase::Lobby.accepts_answers());
        assert!(Phase::Question.accepts_answers());
        assert!(!Phase::Reveal.accepts_answers());
        assert!(!Phase::Ended.accepts_answers());
    }

    #[test]
    fn test_phase_terminal_only_when_ended() {
        assert!(Phase::Ended.is_terminal());
        assert!(!Phase::Reveal.is_terminal());
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Lobby.to_string(), "lobby");
        assert_eq!(Phase::Question.to_string(), "question");
    }

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!(config.capacity, 40);
        assert_eq!(config.grace_window, Duration::from_millis(180_000));
        assert_eq!(config.host_exit, HostExitPolicy::CloseRoom);
    }
}
