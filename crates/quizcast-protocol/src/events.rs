//! The event vocabulary: everything a client may send and everything the
//! server may emit.
//!
//! Both enums are internally tagged (`#[serde(tag = "type")]`), so a frame
//! looks like `{ "type": "join", "room": "AB2CD", ... }`. This keeps the
//! wire format flat and easy to handle in browser clients, and it makes
//! ingress validation automatic: an unknown `type` or a missing field fails
//! deserialization before any handler runs.

use serde::{Deserialize, Serialize};

use crate::types::{
    AnswerPayload, CorrectAnswer, ErrorCode, Identity, LeaderboardEntry,
    LobbyPlayer, QuestionView, RoomCode, RoomSummary,
};

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// Events accepted from clients.
///
/// Room codes arrive as raw strings, not [`RoomCode`] — client input is
/// untrusted and gets normalized/validated by the handler before any lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    // -- Host actions --

    /// "Open a room for this game type." The sender becomes the host.
    CreateRoom {
        /// Which question set to load.
        game_type: String,
        /// The host's display name (shown in lobby UIs).
        display_name: String,
    },

    /// Host only: lobby → first question.
    StartGame {
        /// Target room code.
        room: String,
    },

    /// Host only: question → reveal. Broadcasts the canonical answer and a
    /// fresh leaderboard.
    RevealAnswer {
        /// Target room code.
        room: String,
    },

    /// Host only: reveal → next question, or reveal → game over after the
    /// last question.
    NextQuestion {
        /// Target room code.
        room: String,
    },

    /// Host only: close the room immediately.
    CloseRoom {
        /// Target room code.
        room: String,
    },

    // -- Player actions --

    /// Join a room as a player (or resume, when the identity is already
    /// known to the room).
    Join {
        /// Target room code.
        room: String,
        /// Display name.
        display_name: String,
        /// Avatar reference, if the client picked one.
        #[serde(default)]
        avatar: Option<String>,
        /// Persistent identity token (client-generated, stored locally).
        identity: Identity,
        /// When set, a binding to a *different* room is torn down instead
        /// of rejecting with `ALREADY_IN_GAME`.
        #[serde(default)]
        force: bool,
    },

    /// Rebind a fresh connection to an identity already in the room.
    Rejoin {
        /// Target room code.
        room: String,
        /// Persistent identity token.
        identity: Identity,
    },

    /// Submit an answer for the current question.
    SubmitAnswer {
        /// Target room code.
        room: String,
        /// The answer payload; its kind must match the current question.
        payload: AnswerPayload,
    },

    /// Presence ping while in a room.
    Heartbeat {
        /// Target room code.
        room: String,
    },
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// Events emitted by the server.
///
/// For a given room, emission order always matches the order state changes
/// were applied — a `reveal` always precedes the `leaderboard` computed
/// because of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// To the creating host: the room exists and has this code.
    RoomCreated {
        /// The new room.
        room: RoomSummary,
    },

    /// Broadcast: current lobby roster.
    LobbyUpdate {
        /// The room this update is for (clients may sit on stale pages).
        room: RoomCode,
        /// Number of players in the roster.
        player_count: usize,
        /// Roster rows.
        players: Vec<LobbyPlayer>,
    },

    /// To a joining/rejoining player: you are in.
    Joined {
        /// The room joined.
        room: RoomSummary,
        /// Echo of the player's identity, so clients can persist it.
        identity: Identity,
    },

    /// Broadcast: a question is now live.
    NewQuestion {
        /// 1-based question number.
        idx: usize,
        /// Total questions in this game.
        total: usize,
        /// Milliseconds on the countdown. On a resend after rejoin this is
        /// the *remaining* time, not the full limit.
        time_limit_ms: u64,
        /// The question as players should see it.
        question: QuestionView,
    },

    /// Broadcast: the canonical answer, in display order.
    Reveal {
        /// The answer.
        correct: CorrectAnswer,
    },

    /// Broadcast: current standings.
    Leaderboard {
        /// Ranked rows, best first.
        entries: Vec<LeaderboardEntry>,
    },

    /// To the submitting player only: how their answer scored.
    AnswerAck {
        /// Whether the answer was fully correct.
        correct: bool,
        /// Points awarded for this answer (0 when incorrect).
        points: u32,
        /// The player's total score after this answer.
        your_score: u32,
    },

    /// Broadcast: the game finished; final standings.
    GameOver {
        /// Final ranked rows.
        leaderboard: Vec<LeaderboardEntry>,
    },

    /// Broadcast: the room no longer exists.
    RoomClosed {
        /// Human-readable reason ("closed by host", "host left", ...).
        reason: String,
    },

    /// To the originating connection only: the request failed.
    Error {
        /// Machine-readable code the client switches on.
        code: ErrorCode,
        /// Human-readable detail for logs and debugging.
        message: String,
    },
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! One shape test per interesting variant — the tag and field names are
    //! what the client SDK parses, so drift here breaks real clients.

    use super::*;

    // =====================================================================
    // ClientEvent
    // =====================================================================

    #[test]
    fn test_client_event_join_json_format() {
        let ev = ClientEvent::Join {
            room: "AB2CD".into(),
            display_name: "Rita".into(),
            avatar: Some("owl.svg".into()),
            identity: Identity::from("p_1"),
            force: true,
        };
        let json: serde_json::Value = serde_json::to_value(&ev).unwrap();

        assert_eq!(json["type"], "join");
        assert_eq!(json["room"], "AB2CD");
        assert_eq!(json["display_name"], "Rita");
        assert_eq!(json["identity"], "p_1");
        assert_eq!(json["force"], true);
    }

    #[test]
    fn test_client_event_join_defaults_force_and_avatar() {
        // Clients that predate `force` keep working.
        let json = r#"{
            "type": "join",
            "room": "AB2CD",
            "display_name": "Rita",
            "identity": "p_1"
        }"#;
        let ev: ClientEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            ev,
            ClientEvent::Join {
                room: "AB2CD".into(),
                display_name: "Rita".into(),
                avatar: None,
                identity: Identity::from("p_1"),
                force: false,
            }
        );
    }

    #[test]
    fn test_client_event_create_room_round_trip() {
        let ev = ClientEvent::CreateRoom {
            game_type: "sepsis_basics".into(),
            display_name: "Dr. Host".into(),
        };
        let bytes = serde_json::to_vec(&ev).unwrap();
        let decoded: ClientEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(ev, decoded);
    }

    #[test]
    fn test_client_event_submit_answer_json_format() {
        let ev = ClientEvent::SubmitAnswer {
            room: "AB2CD".into(),
            payload: AnswerPayload::Selections { selected: vec![0, 2] },
        };
        let json: serde_json::Value = serde_json::to_value(&ev).unwrap();

        assert_eq!(json["type"], "submit_answer");
        assert_eq!(json["payload"]["kind"], "selections");
        assert_eq!(json["payload"]["selected"], serde_json::json!([0, 2]));
    }

    #[test]
    fn test_client_event_host_transitions_round_trip() {
        for ev in [
            ClientEvent::StartGame { room: "AB2CD".into() },
            ClientEvent::RevealAnswer { room: "AB2CD".into() },
            ClientEvent::NextQuestion { room: "AB2CD".into() },
            ClientEvent::CloseRoom { room: "AB2CD".into() },
            ClientEvent::Heartbeat { room: "AB2CD".into() },
        ] {
            let bytes = serde_json::to_vec(&ev).unwrap();
            let decoded: ClientEvent = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(ev, decoded);
        }
    }

    #[test]
    fn test_client_event_unknown_type_fails() {
        let result: Result<ClientEvent, _> =
            serde_json::from_str(r#"{"type": "fly_to_moon", "speed": 9000}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_client_event_missing_field_fails() {
        // join without an identity must not decode.
        let result: Result<ClientEvent, _> = serde_json::from_str(
            r#"{"type": "join", "room": "AB2CD", "display_name": "x"}"#,
        );
        assert!(result.is_err());
    }

    // =====================================================================
    // ServerEvent
    // =====================================================================

    #[test]
    fn test_server_event_new_question_json_format() {
        let ev = ServerEvent::NewQuestion {
            idx: 1,
            total: 10,
            time_limit_ms: 30_000,
            question: QuestionView::SingleChoice {
                prompt: "Pick one".into(),
                choices: vec!["a".into(), "b".into()],
            },
        };
        let json: serde_json::Value = serde_json::to_value(&ev).unwrap();

        assert_eq!(json["type"], "new_question");
        assert_eq!(json["idx"], 1);
        assert_eq!(json["total"], 10);
        assert_eq!(json["time_limit_ms"], 30_000);
        assert_eq!(json["question"]["kind"], "single_choice");
    }

    #[test]
    fn test_server_event_answer_ack_round_trip() {
        let ev = ServerEvent::AnswerAck {
            correct: true,
            points: 1700,
            your_score: 1700,
        };
        let bytes = serde_json::to_vec(&ev).unwrap();
        let decoded: ServerEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(ev, decoded);
    }

    #[test]
    fn test_server_event_error_json_format() {
        let ev = ServerEvent::Error {
            code: ErrorCode::RoomNotFound,
            message: "no room AB2CD".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&ev).unwrap();

        assert_eq!(json["type"], "error");
        assert_eq!(json["code"], "ROOM_NOT_FOUND");
    }

    #[test]
    fn test_server_event_lobby_update_round_trip() {
        let ev = ServerEvent::LobbyUpdate {
            room: RoomCode::parse("AB2CD").unwrap(),
            player_count: 1,
            players: vec![LobbyPlayer {
                name: "Rita".into(),
                avatar: None,
                score: 0,
                online: true,
            }],
        };
        let bytes = serde_json::to_vec(&ev).unwrap();
        let decoded: ServerEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(ev, decoded);
    }

    #[test]
    fn test_server_event_game_over_round_trip() {
        let ev = ServerEvent::GameOver {
            leaderboard: vec![LeaderboardEntry {
                rank: 1,
                identity: Identity::from("p_1"),
                name: "Rita".into(),
                avatar: None,
                score: 3400,
                online: true,
            }],
        };
        let bytes = serde_json::to_vec(&ev).unwrap();
        let decoded: ServerEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(ev, decoded);
    }

    #[test]
    fn test_server_event_reveal_round_trip() {
        let ev = ServerEvent::Reveal {
            correct: CorrectAnswer::SingleChoice { index: 2 },
        };
        let bytes = serde_json::to_vec(&ev).unwrap();
        let decoded: ServerEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(ev, decoded);
    }
}
