//! The Quizcast server: WebSocket transport, per-connection handling, and
//! the accept loop, tied to the room layer.
//!
//! The stack, bottom to top:
//!
//! ```text
//! transport  — raw WebSocket frames ([`WebSocketTransport`])
//! protocol   — typed events, JSON codec (quizcast-protocol)
//! rooms      — registry + room actors (quizcast-room)
//! handler    — one task per connection, routing events both ways
//! ```
//!
//! Build a server with [`QuizcastServerBuilder`], hand it a
//! [`QuestionBank`](quizcast_game::QuestionBank), and call
//! [`QuizcastServer::run`].

mod error;
mod handler;
mod server;
mod transport;

pub use error::ServerError;
pub use server::{QuizcastServer, QuizcastServerBuilder};
pub use transport::{TransportError, WebSocketConnection, WebSocketTransport};
