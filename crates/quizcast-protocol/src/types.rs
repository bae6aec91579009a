//! Core protocol types shared by every Quizcast layer.
//!
//! Everything here either travels on the wire (views, payloads, leaderboard
//! rows) or identifies something across layers (room codes, player
//! identities, connection ids). The room and server crates build on these;
//! nothing in this module knows about sockets or game state.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A player's persistent identity: an opaque token supplied by the caller.
///
/// This token survives reconnects — the client stores it locally and presents
/// it on `join`/`rejoin` so the server can rebind a fresh connection to the
/// same player record. The server never interprets its contents.
///
/// `Identity` is the primary key for player records everywhere. Connection
/// ids are transient attributes of a player, never map keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(pub String);

impl Identity {
    /// Returns the raw token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Opaque identifier for a single transport connection.
///
/// Assigned by the transport when a socket is accepted; a player who
/// reconnects gets a *new* `ConnectionId` bound to the *same* [`Identity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Room codes
// ---------------------------------------------------------------------------

/// A short, human-typeable room identifier.
///
/// Codes are always [`RoomCode::LEN`] characters drawn from
/// [`RoomCode::ALPHABET`] — uppercase letters and digits with the easily
/// confused I/O/0/1 removed, since players read these off a projector and
/// type them on phones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Fixed code length.
    pub const LEN: usize = 5;

    /// Characters a code may contain. No I, O, 0, or 1.
    pub const ALPHABET: &'static [u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

    /// Normalizes and validates caller-supplied input.
    ///
    /// Trims whitespace and uppercases before checking, so `" ab2cd "` and
    /// `"AB2CD"` parse to the same code. Returns `None` when the result is
    /// not a well-formed code.
    pub fn parse(input: &str) -> Option<Self> {
        let code = input.trim().to_ascii_uppercase();
        if code.len() != Self::LEN {
            return None;
        }
        if !code.bytes().all(|b| Self::ALPHABET.contains(&b)) {
            return None;
        }
        Some(Self(code))
    }

    /// Wraps a string the caller guarantees is already a valid code
    /// (e.g. freshly generated by the registry).
    pub fn from_generated(code: String) -> Self {
        debug_assert!(
            code.len() == Self::LEN
                && code.bytes().all(|b| Self::ALPHABET.contains(&b)),
            "generated code must already be canonical"
        );
        Self(code)
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Error codes
// ---------------------------------------------------------------------------

/// The closed set of error codes reported to clients.
///
/// Serialized in SCREAMING_SNAKE_CASE — `ErrorCode::AlreadyInGame` travels
/// as `"ALREADY_IN_GAME"` — because that is what client UIs switch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No active room with the given code.
    RoomNotFound,
    /// The room is at its occupancy ceiling.
    RoomFull,
    /// The identity is bound to a different active room and `force` was
    /// not set.
    AlreadyInGame,
    /// The room is past the lobby and the identity is unknown to it.
    GameAlreadyStarted,
    /// The identity is not in the room's roster (rejoin after eviction,
    /// or never joined).
    PlayerNotFound,
    /// A host-only request came from a connection that is not the host.
    NotHost,
    /// The game cannot start because the question list is empty.
    NoQuestions,
    /// The question bank has no set for the requested game type.
    UnknownGameType,
    /// The request is valid but not in the room's current phase.
    WrongPhase,
    /// Malformed or out-of-place request.
    BadRequest,
    /// The room exists but its actor is not responding (shutting down).
    RoomUnavailable,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Matches the serialized form so logs and wire agree.
        let s = match self {
            Self::RoomNotFound => "ROOM_NOT_FOUND",
            Self::RoomFull => "ROOM_FULL",
            Self::AlreadyInGame => "ALREADY_IN_GAME",
            Self::GameAlreadyStarted => "GAME_ALREADY_STARTED",
            Self::PlayerNotFound => "PLAYER_NOT_FOUND",
            Self::NotHost => "NOT_HOST",
            Self::NoQuestions => "NO_QUESTIONS",
            Self::UnknownGameType => "UNKNOWN_GAME_TYPE",
            Self::WrongPhase => "WRONG_PHASE",
            Self::BadRequest => "BAD_REQUEST",
            Self::RoomUnavailable => "ROOM_UNAVAILABLE",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Room and player summaries
// ---------------------------------------------------------------------------

/// Minimal room descriptor sent back on creation and join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    /// The room's join code.
    pub code: RoomCode,
}

/// One row of a lobby roster broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyPlayer {
    /// Display name chosen at join time.
    pub name: String,
    /// Avatar reference (opaque to the server; the client resolves it).
    pub avatar: Option<String>,
    /// Current accumulated score.
    pub score: u32,
    /// Whether the player currently has a live connection.
    pub online: bool,
}

/// One row of a ranked leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position after sorting.
    pub rank: usize,
    /// The player's persistent identity.
    pub identity: Identity,
    /// Display name.
    pub name: String,
    /// Avatar reference.
    pub avatar: Option<String>,
    /// Accumulated score.
    pub score: u32,
    /// Whether the player currently has a live connection.
    pub online: bool,
}

// ---------------------------------------------------------------------------
// Question views — what a player is allowed to see
// ---------------------------------------------------------------------------

/// A question as presented to players: prompt and options only, with any
/// shuffle already applied. Views never carry the canonical answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionView {
    /// Assemble an answer by picking tokens from a bank.
    TokenAssembly {
        /// Scenario text shown above the prompt.
        case_text: String,
        /// The question prompt.
        prompt: String,
        /// Token bank in display (shuffled) order.
        tokens: Vec<String>,
    },
    /// Select a fixed number of options.
    MultiSelect {
        /// Scenario text shown above the prompt.
        case_text: String,
        /// The question prompt.
        prompt: String,
        /// Options in display (shuffled) order.
        options: Vec<String>,
        /// How many options must be selected.
        select_count: usize,
    },
    /// Pick exactly one choice. Choices keep canonical order.
    SingleChoice {
        /// The question prompt.
        prompt: String,
        /// Choices, A–D style, in canonical order.
        choices: Vec<String>,
    },
}

/// The canonical answer broadcast at reveal time, expressed in the same
/// display order the question was shown in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CorrectAnswer {
    /// The full target statement for a token-assembly question.
    TokenAssembly {
        /// Canonical answer text.
        answer_text: String,
    },
    /// Correct option positions *as displayed* (already mapped through the
    /// shuffle the players saw).
    MultiSelect {
        /// Correct display indices, ascending.
        indices: Vec<usize>,
    },
    /// The single correct choice index.
    SingleChoice {
        /// Correct choice index (canonical order — single-choice questions
        /// are never shuffled).
        index: usize,
    },
}

// ---------------------------------------------------------------------------
// Answer payloads — what a player submits
// ---------------------------------------------------------------------------

/// A player's submitted answer. The variant must match the question kind;
/// a mismatch is simply scored as incorrect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerPayload {
    /// Tokens picked for a token-assembly question. Order and duplicates
    /// do not affect scoring.
    Tokens {
        /// The picked tokens, as displayed.
        tokens: Vec<String>,
    },
    /// Display indices selected for a multi-select question.
    Selections {
        /// Selected display indices.
        selected: Vec<usize>,
    },
    /// The single choice picked for a single-choice question.
    Choice {
        /// Selected choice index.
        choice: usize,
    },
}

// =========================================================================
// Tests
// =========================================================================
