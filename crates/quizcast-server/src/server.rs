//! `QuizcastServer` builder and accept loop.
//!
//! This is the entry point for running a quiz server. It ties the layers
//! together: transport → protocol → rooms.

use std::sync::Arc;

use tokio::sync::Mutex;

use quizcast_game::QuestionBank;
use quizcast_protocol::JsonCodec;
use quizcast_room::{RoomConfig, RoomRegistry};

use crate::ServerError;
use crate::handler::handle_connection;
use crate::transport::WebSocketTransport;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The registry
/// lock is only held for routing — room work happens in the room actors.
pub(crate) struct ServerState {
    pub(crate) registry: Mutex<RoomRegistry>,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a Quizcast server.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use quizcast_game::StaticBank;
/// use quizcast_server::QuizcastServerBuilder;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let server = QuizcastServerBuilder::new()
///     .bind("0.0.0.0:3000")
///     .build(Arc::new(StaticBank::new()))
///     .await?;
/// server.run().await?;
/// # Ok(())
/// # }
/// ```
pub struct QuizcastServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
}

impl QuizcastServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            room_config: RoomConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the room configuration (capacity, grace window, host-exit
    /// policy) applied to every room.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Binds the transport and builds the server with the given question
    /// bank.
    pub async fn build(
        self,
        bank: Arc<dyn QuestionBank>,
    ) -> Result<QuizcastServer, ServerError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            registry: Mutex::new(RoomRegistry::new(self.room_config, bank)),
            codec: JsonCodec,
        });

        Ok(QuizcastServer { transport, state })
    }
}

impl Default for QuizcastServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Quizcast server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct QuizcastServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl QuizcastServer {
    /// Creates a new builder.
    pub fn builder() -> QuizcastServerBuilder {
        QuizcastServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop, spawning a handler task per connection. Runs
    /// until the process is terminated.
    pub async fn run(mut self) -> Result<(), ServerError> {
        tracing::info!("Quizcast server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(handle_connection(conn, state));
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
