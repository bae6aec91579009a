//! Error types for the room layer.

use quizcast_game::BankError;
use quizcast_protocol::{ErrorCode, Identity, RoomCode};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No active room with this code.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// The room's roster is at its occupancy ceiling.
    #[error("room {0} is full")]
    Full(RoomCode),

    /// The identity is bound to another active room and `force` was not
    /// set. The caller can retry with `force` to migrate.
    #[error("identity {0} is already in another game")]
    AlreadyInGame(Identity),

    /// The room is past the lobby and the identity is unknown to it.
    #[error("room {0} already started")]
    GameAlreadyStarted(RoomCode),

    /// The identity is not in the room's roster.
    #[error("player {0} not found in room")]
    PlayerNotFound(Identity),

    /// A host-only operation was requested by a non-host connection.
    #[error("not the host of room {0}")]
    NotHost(RoomCode),

    /// Loading the question set failed (unknown game type, invalid record).
    #[error(transparent)]
    Bank(#[from] BankError),

    /// The room's command channel is closed or full (actor shutting down).
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),
}

impl RoomError {
    /// The wire error code reported to the originating connection.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::RoomNotFound,
            Self::Full(_) => ErrorCode::RoomFull,
            Self::AlreadyInGame(_) => ErrorCode::AlreadyInGame,
            Self::GameAlreadyStarted(_) => ErrorCode::GameAlreadyStarted,
            Self::PlayerNotFound(_) => ErrorCode::PlayerNotFound,
            Self::NotHost(_) => ErrorCode::NotHost,
            Self::Bank(BankError::UnknownGameType(_)) => {
                ErrorCode::UnknownGameType
            }
            Self::Bank(_) => ErrorCode::BadRequest,
            Self::Unavailable(_) => ErrorCode::RoomUnavailable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let code = RoomCode::parse("AB2CD").unwrap();
        assert_eq!(
            RoomError::NotFound(code.clone()).code(),
            ErrorCode::RoomNotFound
        );
        assert_eq!(
            RoomError::AlreadyInGame(Identity::from("p")).code(),
            ErrorCode::AlreadyInGame
        );
        assert_eq!(
            RoomError::Bank(BankError::UnknownGameType("x".into())).code(),
            ErrorCode::UnknownGameType
        );
    }
}
