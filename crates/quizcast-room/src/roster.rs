//! The player roster: per-room records keyed by persistent identity.
//!
//! A [`Player`] survives its connection. Disconnects only clear the
//! transient binding (connection id + outbound sender) and flip the online
//! flag; score, name, and submission history stay until the eviction timer
//! fires with the player still offline.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::task::AbortHandle;

use quizcast_game::Contender;
use quizcast_protocol::{ConnectionId, Identity, LobbyPlayer};

use crate::session::EventSender;

/// Record of a player's latest scored answer. Written at most once per
/// question index — the gate against double scoring.
#[derive(Debug, Clone)]
pub(crate) struct Submission {
    /// Which question this was for.
    pub question_index: usize,
    /// Time from question start to submission.
    pub elapsed: Duration,
    /// Whether it scored as correct.
    pub correct: bool,
    /// Points awarded.
    pub points: u32,
}

/// One player's state inside a room.
pub(crate) struct Player {
    pub identity: Identity,
    pub name: String,
    pub avatar: Option<String>,
    /// Current transport binding; `None` while offline.
    pub conn: Option<ConnectionId>,
    /// Outbound event channel for the current connection.
    pub sender: Option<EventSender>,
    /// Accumulated score. Only ever increased.
    pub score: u32,
    pub last_submission: Option<Submission>,
    pub online: bool,
    /// Join order, used for deterministic host promotion.
    pub joined_seq: u64,
    /// Updated by heartbeats and any inbound activity.
    pub last_seen: Instant,
    /// Armed while offline; aborted on rebind or expulsion.
    pub evict_timer: Option<AbortHandle>,
}

impl Player {
    /// Binds a fresh connection and clears any pending eviction.
    pub fn rebind(&mut self, conn: ConnectionId, sender: EventSender) {
        self.conn = Some(conn);
        self.sender = Some(sender);
        self.online = true;
        self.last_seen = Instant::now();
        self.cancel_evict_timer();
    }

    /// Clears the transport binding and marks the player offline.
    pub fn unbind(&mut self) {
        self.conn = None;
        self.sender = None;
        self.online = false;
    }

    /// Aborts the armed eviction timer, if any.
    pub fn cancel_evict_timer(&mut self) {
        if let Some(timer) = self.evict_timer.take() {
            timer.abort();
        }
    }
}

/// All players of one room, keyed by identity.
#[derive(Default)]
pub(crate) struct Roster {
    players: HashMap<Identity, Player>,
    next_seq: u64,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fresh player record bound to the given connection.
    pub fn insert_new(
        &mut self,
        identity: Identity,
        name: String,
        avatar: Option<String>,
        conn: ConnectionId,
        sender: EventSender,
    ) -> &mut Player {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.players.insert(
            identity.clone(),
            Player {
                identity: identity.clone(),
                name,
                avatar,
                conn: Some(conn),
                sender: Some(sender),
                score: 0,
                last_submission: None,
                online: true,
                joined_seq: seq,
                last_seen: Instant::now(),
                evict_timer: None,
            },
        );
        self.players.get_mut(&identity).expect("just inserted")
    }

    pub fn get(&self, identity: &Identity) -> Option<&Player> {
        self.players.get(identity)
    }

    pub fn get_mut(&mut self, identity: &Identity) -> Option<&mut Player> {
        self.players.get_mut(identity)
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.players.contains_key(identity)
    }

    /// Removes a record, aborting its timer first.
    pub fn remove(&mut self, identity: &Identity) -> Option<Player> {
        let mut player = self.players.remove(identity)?;
        player.cancel_evict_timer();
        Some(player)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Lobby rows in join order (stable for lobby UIs).
    pub fn lobby_players(&self) -> Vec<LobbyPlayer> {
        let mut players: Vec<&Player> = self.players.values().collect();
        players.sort_by_key(|p| p.joined_seq);
        players
            .into_iter()
            .map(|p| LobbyPlayer {
                name: p.name.clone(),
                avatar: p.avatar.clone(),
                score: p.score,
                online: p.online,
            })
            .collect()
    }

    /// Projection input for the leaderboard.
    pub fn contenders(&self) -> Vec<Contender> {
        self.players
            .values()
            .map(|p| Contender {
                identity: p.identity.clone(),
                name: p.name.clone(),
                avatar: p.avatar.clone(),
                score: p.score,
                online: p.online,
            })
            .collect()
    }

    /// Outbound senders of everyone currently online.
    pub fn online_senders(&self) -> impl Iterator<Item = &EventSender> {
        self.players
            .values()
            .filter(|p| p.online)
            .filter_map(|p| p.sender.as_ref())
    }

    /// The earliest-joined online player other than the departing
    /// connection — the host-promotion candidate.
    pub fn promote_candidate(
        &self,
        departing: ConnectionId,
    ) -> Option<ConnectionId> {
        self.players
            .values()
            .filter(|p| p.online && p.conn.is_some() && p.conn != Some(departing))
            .min_by_key(|p| p.joined_seq)
            .and_then(|p| p.conn)
    }

    /// Aborts every armed eviction timer (room teardown).
    pub fn abort_all_timers(&mut self) {
        for player in self.players.values_mut() {
            player.cancel_evict_timer();
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
