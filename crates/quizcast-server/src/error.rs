//! Unified error type for the server crate.

use quizcast_protocol::ProtocolError;
use quizcast_room::RoomError;

use crate::transport::TransportError;

/// Top-level error that wraps the per-layer errors.
///
/// The `#[from]` attributes let `?` convert layer errors automatically,
/// so the accept loop and handler deal with a single type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (not found, full, conflicts).
    #[error(transparent)]
    Room(#[from] RoomError),
}
