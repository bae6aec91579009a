//! Room registry: owns the set of active rooms, generates join codes, and
//! routes everything that crosses room boundaries.
//!
//! The registry is the only place that sees more than one room at a time.
//! It keeps an identity → room index so a join can detect "already in
//! another game" — but the index is *advisory*: the room actor is the
//! authority on who is actually present, and the registry verifies against
//! it before rejecting anyone. Identity migration is two causally ordered
//! single-room operations (expel from the old room, then join the new),
//! never a cross-room transaction.

use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;

use quizcast_game::QuestionBank;
use quizcast_protocol::{ConnectionId, Identity, RoomCode};

use crate::session::{spawn_room, DisconnectOutcome, EventSender, RoomHandle};
use crate::{RoomConfig, RoomError};

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Manages all active rooms and the identity → room index.
///
/// Owned by the server behind a `Mutex`; room-internal work happens in the
/// room actors, so the lock is only held for routing.
pub struct RoomRegistry {
    /// Active rooms, keyed by join code.
    rooms: HashMap<RoomCode, RoomHandle>,

    /// Which room each identity was last routed to. Advisory — repaired
    /// whenever the room actor disproves an entry.
    index: HashMap<Identity, RoomCode>,

    /// The question-bank collaborator.
    bank: Arc<dyn QuestionBank>,

    /// Configuration applied to every room this registry creates.
    config: RoomConfig,
}

impl RoomRegistry {
    /// Creates an empty registry.
    pub fn new(config: RoomConfig, bank: Arc<dyn QuestionBank>) -> Self {
        Self {
            rooms: HashMap::new(),
            index: HashMap::new(),
            bank,
            config,
        }
    }

    /// Creates a new room for a game type and returns its code.
    ///
    /// Loads the question set through the bank (each room gets its own
    /// copy), draws a collision-free code, and spawns the room actor. The
    /// actor immediately sends the host an empty lobby snapshot.
    ///
    /// # Errors
    /// [`RoomError::Bank`] when the game type is unknown or its set is
    /// invalid. Code collisions are retried internally and never surface.
    pub fn create_room(
        &mut self,
        game_type: &str,
        host_conn: ConnectionId,
        host_sender: EventSender,
    ) -> Result<RoomCode, RoomError> {
        let questions = self.bank.load(game_type)?;
        let code = self.generate_code();

        let handle = spawn_room(
            code.clone(),
            self.config.clone(),
            questions,
            host_conn,
            host_sender,
            DEFAULT_CHANNEL_SIZE,
        );
        self.rooms.insert(code.clone(), handle);
        tracing::info!(room = %code, game_type, "room created");
        Ok(code)
    }

    /// Looks up a room by code.
    pub fn lookup(&self, code: &RoomCode) -> Option<RoomHandle> {
        self.rooms.get(code).cloned()
    }

    /// Closes a room: broadcast the closure notice, stop the actor (which
    /// cancels every outstanding eviction timer), and drop all index
    /// entries pointing at it.
    pub async fn close_room(
        &mut self,
        code: &RoomCode,
        reason: &str,
    ) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .remove(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        let _ = handle.close(reason.to_string()).await;
        self.index.retain(|_, c| c != code);
        tracing::info!(room = %code, reason, "room closed");
        Ok(())
    }

    /// Closes a room on behalf of a connection, verifying host authority
    /// first.
    ///
    /// # Errors
    /// [`RoomError::NotHost`] when the requester isn't the room's host.
    pub async fn close_room_by(
        &mut self,
        conn: ConnectionId,
        code: &RoomCode,
        reason: &str,
    ) -> Result<(), RoomError> {
        let handle = self
            .lookup(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        let info = handle.info().await?;
        if info.host_conn != conn {
            return Err(RoomError::NotHost(code.clone()));
        }
        self.close_room(code, reason).await
    }

    /// Routes a join, resolving cross-room identity conflicts.
    ///
    /// An identity bound to a *different* room is rejected with
    /// [`RoomError::AlreadyInGame`] unless `force` is set or the old
    /// binding turns out to be offline or gone — in which case the old
    /// room expels the player first (remove-then-add).
    pub async fn join(
        &mut self,
        code: &RoomCode,
        identity: Identity,
        display_name: String,
        avatar: Option<String>,
        conn: ConnectionId,
        sender: EventSender,
        force: bool,
    ) -> Result<(), RoomError> {
        let handle = self
            .lookup(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        self.resolve_conflict(code, &identity, force).await?;

        handle
            .join(identity.clone(), display_name, avatar, conn, sender)
            .await?;
        self.index.insert(identity, code.clone());
        Ok(())
    }

    /// Routes a rejoin: the identity must already be in the target room.
    pub async fn rejoin(
        &mut self,
        code: &RoomCode,
        identity: Identity,
        conn: ConnectionId,
        sender: EventSender,
    ) -> Result<(), RoomError> {
        let handle = self
            .lookup(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        handle.rejoin(identity.clone(), conn, sender).await?;
        self.index.insert(identity, code.clone());
        Ok(())
    }

    /// Routes a transport-level disconnect. When the room reports its host
    /// is gone (per its host-exit policy), the registry closes it.
    pub async fn connection_lost(
        &mut self,
        code: &RoomCode,
        conn: ConnectionId,
        identity: Option<Identity>,
    ) {
        let Some(handle) = self.lookup(code) else {
            return;
        };
        match handle.connection_lost(conn, identity).await {
            Ok(DisconnectOutcome::HostGone) => {
                let _ = self.close_room(code, "host left").await;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(
                    room = %code, error = %e, "disconnect routing failed"
                );
            }
        }
    }

    /// The room an identity is currently indexed to, if any.
    pub fn room_of(&self, identity: &Identity) -> Option<RoomCode> {
        self.index.get(identity).cloned()
    }

    /// Number of active rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Codes of all active rooms.
    pub fn active_codes(&self) -> Vec<RoomCode> {
        self.rooms.keys().cloned().collect()
    }

    /// Checks whether an identity is live somewhere else and tears the
    /// stale binding down when migration is allowed.
    async fn resolve_conflict(
        &mut self,
        target: &RoomCode,
        identity: &Identity,
        force: bool,
    ) -> Result<(), RoomError> {
        let Some(prev_code) = self.index.get(identity).cloned() else {
            return Ok(());
        };
        if prev_code == *target {
            // Rejoining the same room; the actor handles resumes itself.
            return Ok(());
        }

        let Some(prev) = self.lookup(&prev_code) else {
            // The old room is gone; the entry is stale.
            self.index.remove(identity);
            return Ok(());
        };

        match prev.presence(identity.clone()).await {
            Ok(Some(presence)) if presence.online && !force => {
                Err(RoomError::AlreadyInGame(identity.clone()))
            }
            Ok(Some(_)) => {
                // Offline (or force): tear down the old binding first.
                prev.expel(identity.clone()).await?;
                self.index.remove(identity);
                tracing::info!(
                    %identity,
                    from = %prev_code,
                    to = %target,
                    "identity migrated between rooms"
                );
                Ok(())
            }
            Ok(None) => {
                // Already evicted over there; just repair the index.
                self.index.remove(identity);
                Ok(())
            }
            Err(_) => {
                // Old room unresponsive (closing); treat as gone.
                self.index.remove(identity);
                Ok(())
            }
        }
    }

    /// Draws a code not used by any active room.
    ///
    /// With 32^5 possibilities and a handful of rooms, collisions are
    /// rare; the loop retries until unique.
    fn generate_code(&self) -> RoomCode {
        let mut rng = rand::rng();
        loop {
            let code: String = (0..RoomCode::LEN)
                .map(|_| {
                    let i = rng.random_range(0..RoomCode::ALPHABET.len());
                    RoomCode::ALPHABET[i] as char
                })
                .collect();
            let code = RoomCode::from_generated(code);
            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
    }
}
