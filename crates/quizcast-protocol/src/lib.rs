//! Wire protocol for Quizcast.
//!
//! This crate defines the "language" that quiz clients and the server speak:
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`QuestionView`], etc.) —
//!   the event structures that travel on the wire, plus the identifier
//!   newtypes shared by every layer.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those events are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the room layer
//! (game state). It doesn't know about connections or rooms — it only knows
//! how to describe and serialize events.
//!
//! Every inbound frame decodes into exactly one [`ClientEvent`] variant.
//! Unknown tags and malformed shapes fail at this boundary, so core logic
//! only ever sees well-formed events.

mod codec;
mod error;
mod events;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use events::{ClientEvent, ServerEvent};
pub use types::{
    AnswerPayload, ConnectionId, CorrectAnswer, ErrorCode, Identity,
    LeaderboardEntry, LobbyPlayer, QuestionView, RoomCode, RoomSummary,
};
