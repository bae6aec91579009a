//! Room actor: an isolated Tokio task that owns one quiz session.
//!
//! Each room runs in its own task, communicating with the outside world
//! through an mpsc channel — no shared mutable state, just message
//! passing. Because one task owns everything, all the racy parts of the
//! spec fall out naturally:
//!
//! - a submission can never be scored twice, because the duplicate check
//!   and the score write happen in the same handler invocation;
//! - an eviction timer firing against a concurrent rebind is safe, because
//!   the timer only *posts a command* back into this channel — by the time
//!   it runs, a rebind that won the race has already cleared the offline
//!   flag and the eviction is a no-op;
//! - broadcast order always matches state-change order, because events are
//!   pushed into per-connection queues synchronously inside each handler.

use std::collections::HashMap;
use std::time::Instant;

use rand::seq::SliceRandom;
use tokio::sync::{mpsc, oneshot};

use quizcast_game::{Question, project, score};
use quizcast_protocol::{
    AnswerPayload, ConnectionId, ErrorCode, Identity, RoomCode, RoomSummary,
    ServerEvent,
};

use crate::roster::{Roster, Submission};
use crate::{HostExitPolicy, Phase, RoomConfig, RoomError};

/// Channel sender for delivering outbound events to one connection.
///
/// Cheap to clone; the writer side lives in the connection's pump task.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// What happened to a room when a connection dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectOutcome {
    /// The host is gone and the room should be closed by the registry.
    HostGone,
    /// A player was marked offline and their eviction timer armed.
    Marked,
    /// The connection wasn't current for anyone (stale disconnect).
    Ignored,
}

/// A player's presence as seen by the room, for cross-room conflict checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerPresence {
    /// Whether the player currently has a live connection.
    pub online: bool,
}

/// A snapshot of room metadata (not the full game state).
#[derive(Debug, Clone)]
pub struct RoomInfo {
    /// The room's join code.
    pub code: RoomCode,
    /// Current phase.
    pub phase: Phase,
    /// Players in the roster (online or offline).
    pub player_count: usize,
    /// The connection currently holding the host role.
    pub host_conn: ConnectionId,
}

/// Commands sent to a room actor through its channel.
///
/// Variants with a `oneshot::Sender` are request/response: the caller
/// awaits the reply. The rest are fire-and-forget; any response the player
/// should see goes out through their registered [`EventSender`].
pub(crate) enum RoomCommand {
    Join {
        identity: Identity,
        display_name: String,
        avatar: Option<String>,
        conn: ConnectionId,
        sender: EventSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Rejoin {
        identity: Identity,
        conn: ConnectionId,
        sender: EventSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Submit {
        identity: Identity,
        payload: AnswerPayload,
    },
    Heartbeat {
        identity: Identity,
    },
    StartGame {
        conn: ConnectionId,
    },
    RevealAnswer {
        conn: ConnectionId,
    },
    NextQuestion {
        conn: ConnectionId,
    },
    /// Forcibly remove a player (identity migration to another room).
    Expel {
        identity: Identity,
        reply: oneshot::Sender<()>,
    },
    /// Posted by an eviction timer; a no-op if the player came back.
    EvictIfOffline {
        identity: Identity,
    },
    /// Transport-level disconnect notification.
    ConnectionLost {
        conn: ConnectionId,
        identity: Option<Identity>,
        reply: oneshot::Sender<DisconnectOutcome>,
    },
    Presence {
        identity: Identity,
        reply: oneshot::Sender<Option<PlayerPresence>>,
    },
    Info {
        reply: oneshot::Sender<RoomInfo>,
    },
    Close {
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// RoomHandle
// ---------------------------------------------------------------------------

/// Handle to a running room actor. Used to send commands to it.
///
/// Cheap to clone — it's an `mpsc::Sender` wrapper. The [`RoomRegistry`]
/// holds one per room.
///
/// [`RoomRegistry`]: crate::RoomRegistry
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// The room's join code.
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Adds (or resumes) a player.
    pub async fn join(
        &self,
        identity: Identity,
        display_name: String,
        avatar: Option<String>,
        conn: ConnectionId,
        sender: EventSender,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Join {
            identity,
            display_name,
            avatar,
            conn,
            sender,
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?
    }

    /// Rebinds a fresh connection to a known identity.
    pub async fn rejoin(
        &self,
        identity: Identity,
        conn: ConnectionId,
        sender: EventSender,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Rejoin {
            identity,
            conn,
            sender,
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?
    }

    /// Delivers an answer submission (fire-and-forget; the ack goes out
    /// through the player's event channel).
    pub async fn submit(
        &self,
        identity: Identity,
        payload: AnswerPayload,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Submit { identity, payload }).await
    }

    /// Records a presence ping.
    pub async fn heartbeat(&self, identity: Identity) -> Result<(), RoomError> {
        self.send(RoomCommand::Heartbeat { identity }).await
    }

    /// Host request: lobby → first question.
    pub async fn start_game(&self, conn: ConnectionId) -> Result<(), RoomError> {
        self.send(RoomCommand::StartGame { conn }).await
    }

    /// Host request: question → reveal.
    pub async fn reveal_answer(
        &self,
        conn: ConnectionId,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::RevealAnswer { conn }).await
    }

    /// Host request: reveal → next question or game over.
    pub async fn next_question(
        &self,
        conn: ConnectionId,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::NextQuestion { conn }).await
    }

    /// Forcibly removes a player and waits for it to take effect.
    pub async fn expel(&self, identity: Identity) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Expel { identity, reply: reply_tx })
            .await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Reports a dropped connection; the outcome tells the registry
    /// whether the room must be closed.
    pub async fn connection_lost(
        &self,
        conn: ConnectionId,
        identity: Option<Identity>,
    ) -> Result<DisconnectOutcome, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::ConnectionLost {
            conn,
            identity,
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Queries a player's presence (for cross-room conflict checks).
    pub async fn presence(
        &self,
        identity: Identity,
    ) -> Result<Option<PlayerPresence>, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Presence { identity, reply: reply_tx })
            .await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Requests the current room info.
    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Info { reply: reply_tx }).await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Tells the room to broadcast a closure notice and shut down.
    pub async fn close(&self, reason: String) -> Result<(), RoomError> {
        self.send(RoomCommand::Close { reason }).await
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }
}

// ---------------------------------------------------------------------------
// RoomActor
// ---------------------------------------------------------------------------

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    code: RoomCode,
    config: RoomConfig,
    host_conn: ConnectionId,
    host_sender: EventSender,
    phase: Phase,
    questions: Vec<Question>,
    /// Index of the question currently shown (valid once past the lobby).
    current: usize,
    /// When the current question was shown; the countdown baseline.
    question_started: Option<Instant>,
    /// Display permutation per shown question index, retained so the
    /// reveal can map canonical answers into the shown order.
    shuffles: HashMap<usize, Vec<usize>>,
    roster: Roster,
    /// Clone of our own command sender, handed to eviction timers.
    commands: mpsc::Sender<RoomCommand>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop, processing commands until closed.
    async fn run(mut self) {
        tracing::info!(room = %self.code, "room actor started");

        // Initial lobby snapshot for the host's screen (player count 0).
        self.broadcast_membership();

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    identity,
                    display_name,
                    avatar,
                    conn,
                    sender,
                    reply,
                } => {
                    let result = self
                        .handle_join(identity, display_name, avatar, conn, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Rejoin { identity, conn, sender, reply } => {
                    let result = self.handle_rejoin(identity, conn, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Submit { identity, payload } => {
                    self.handle_submit(identity, payload);
                }
                RoomCommand::Heartbeat { identity } => {
                    if let Some(player) = self.roster.get_mut(&identity) {
                        player.last_seen = Instant::now();
                    }
                }
                RoomCommand::StartGame { conn } => self.handle_start(conn),
                RoomCommand::RevealAnswer { conn } => self.handle_reveal(conn),
                RoomCommand::NextQuestion { conn } => self.handle_next(conn),
                RoomCommand::Expel { identity, reply } => {
                    self.handle_expel(identity);
                    let _ = reply.send(());
                }
                RoomCommand::EvictIfOffline { identity } => {
                    self.handle_evict_if_offline(identity);
                }
                RoomCommand::ConnectionLost { conn, identity, reply } => {
                    let outcome = self.handle_connection_lost(conn, identity);
                    let _ = reply.send(outcome);
                }
                RoomCommand::Presence { identity, reply } => {
                    let presence = self
                        .roster
                        .get(&identity)
                        .map(|p| PlayerPresence { online: p.online });
                    let _ = reply.send(presence);
                }
                RoomCommand::Info { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::Close { reason } => {
                    tracing::info!(room = %self.code, %reason, "room closing");
                    self.broadcast(ServerEvent::RoomClosed { reason });
                    break;
                }
            }
        }

        // Teardown is atomic from the outside: the registry already
        // dropped the handle, and no command can arrive past this point.
        self.roster.abort_all_timers();
        tracing::info!(room = %self.code, "room actor stopped");
    }

    // -- Join / rejoin ----------------------------------------------------

    fn handle_join(
        &mut self,
        identity: Identity,
        display_name: String,
        avatar: Option<String>,
        conn: ConnectionId,
        sender: EventSender,
    ) -> Result<(), RoomError> {
        if self.roster.contains(&identity) {
            // Known identity: this is a resume, allowed in any phase.
            // The fresh join may carry a new name or avatar.
            let player = self.roster.get_mut(&identity).expect("just checked");
            player.name = display_name;
            player.avatar = avatar;
            player.rebind(conn, sender);
            tracing::info!(
                room = %self.code, %identity, "player resumed via join"
            );
        } else {
            if !self.phase.in_lobby() {
                return Err(RoomError::GameAlreadyStarted(self.code.clone()));
            }
            if self.roster.len() >= self.config.capacity {
                return Err(RoomError::Full(self.code.clone()));
            }
            self.roster
                .insert_new(identity.clone(), display_name, avatar, conn, sender);
            tracing::info!(
                room = %self.code,
                %identity,
                players = self.roster.len(),
                "player joined"
            );
        }

        self.send_snapshot(&identity);
        self.broadcast_membership();
        Ok(())
    }

    fn handle_rejoin(
        &mut self,
        identity: Identity,
        conn: ConnectionId,
        sender: EventSender,
    ) -> Result<(), RoomError> {
        let Some(player) = self.roster.get_mut(&identity) else {
            return Err(RoomError::PlayerNotFound(identity));
        };
        player.rebind(conn, sender);
        tracing::info!(room = %self.code, %identity, "player rebound");

        self.send_snapshot(&identity);
        self.broadcast_membership();
        Ok(())
    }

    /// Resends the current phase to one player: the live question with
    /// *remaining* time, the reveal if the answer is up, or the final
    /// standings if the game ended.
    fn send_snapshot(&self, identity: &Identity) {
        let Some(player) = self.roster.get(identity) else {
            return;
        };
        let Some(sender) = player.sender.as_ref() else {
            return;
        };

        let _ = sender.send(ServerEvent::Joined {
            room: RoomSummary { code: self.code.clone() },
            identity: identity.clone(),
        });

        match self.phase {
            Phase::Lobby => {
                let _ = sender.send(self.membership_event());
            }
            Phase::Question => {
                let question = &self.questions[self.current];
                let shuffle = self.shuffles.get(&self.current);
                let limit = self.config.question_time_limit;
                let remaining = self
                    .question_started
                    .map(|t| limit.saturating_sub(t.elapsed()))
                    .unwrap_or(limit);
                let _ = sender.send(ServerEvent::NewQuestion {
                    idx: self.current + 1,
                    total: self.questions.len(),
                    time_limit_ms: remaining.as_millis() as u64,
                    question: question.view(shuffle.map(Vec::as_slice)),
                });
                // If they already answered this question before dropping,
                // restore the ack so their screen shows the result.
                if let Some(sub) = player
                    .last_submission
                    .as_ref()
                    .filter(|s| s.question_index == self.current)
                {
                    let _ = sender.send(ServerEvent::AnswerAck {
                        correct: sub.correct,
                        points: sub.points,
                        your_score: player.score,
                    });
                }
            }
            Phase::Reveal => {
                let question = &self.questions[self.current];
                let shuffle = self.shuffles.get(&self.current);
                let _ = sender.send(ServerEvent::Reveal {
                    correct: question.reveal(shuffle.map(Vec::as_slice)),
                });
                let _ = sender.send(ServerEvent::Leaderboard {
                    entries: project(&self.roster.contenders()),
                });
            }
            Phase::Ended => {
                let _ = sender.send(ServerEvent::GameOver {
                    leaderboard: project(&self.roster.contenders()),
                });
            }
        }
    }

    // -- Submissions ------------------------------------------------------

    fn handle_submit(&mut self, identity: Identity, payload: AnswerPayload) {
        let Some(elapsed) =
            self.question_started.map(|t| t.elapsed())
        else {
            tracing::debug!(
                room = %self.code, %identity, "submit before any question"
            );
            self.send_error_to(&identity, ErrorCode::WrongPhase, "no question is live");
            return;
        };

        if !self.phase.accepts_answers() {
            tracing::debug!(
                room = %self.code,
                %identity,
                phase = %self.phase,
                "submit outside question phase"
            );
            self.send_error_to(
                &identity,
                ErrorCode::WrongPhase,
                "submissions are closed",
            );
            return;
        }

        let Some(player) = self.roster.get_mut(&identity) else {
            tracing::warn!(
                room = %self.code, %identity, "submit from unknown identity"
            );
            return;
        };

        // At most one scored submission per question per player. A repeat
        // is a no-op — it never reaches the scoring engine again.
        if let Some(prev) = player
            .last_submission
            .as_ref()
            .filter(|s| s.question_index == self.current)
        {
            tracing::debug!(
                room = %self.code,
                %identity,
                prev_points = prev.points,
                prev_elapsed_ms = prev.elapsed.as_millis() as u64,
                "duplicate submission ignored"
            );
            return;
        }

        let question = &self.questions[self.current];
        let shuffle = self.shuffles.get(&self.current).map(Vec::as_slice);
        let limit_ms = self.config.question_time_limit.as_millis() as u64;
        let verdict = score(
            question,
            shuffle,
            &payload,
            elapsed.as_millis() as u64,
            limit_ms,
        );

        player.score += verdict.points;
        player.last_submission = Some(Submission {
            question_index: self.current,
            elapsed,
            correct: verdict.correct,
            points: verdict.points,
        });
        player.last_seen = Instant::now();

        tracing::debug!(
            room = %self.code,
            %identity,
            correct = verdict.correct,
            points = verdict.points,
            "answer scored"
        );

        let total = player.score;
        if let Some(sender) = player.sender.as_ref() {
            let _ = sender.send(ServerEvent::AnswerAck {
                correct: verdict.correct,
                points: verdict.points,
                your_score: total,
            });
        }
    }

    // -- Host-driven phase transitions ------------------------------------

    /// Checks host authority and expected phase for a transition request.
    ///
    /// Unauthorized or out-of-order requests are dropped without a reply —
    /// logged so operators can see them, invisible to the requester.
    fn transition_allowed(&self, conn: ConnectionId, expected: Phase) -> bool {
        if conn != self.host_conn {
            tracing::warn!(
                room = %self.code,
                %conn,
                "transition request from non-host ignored"
            );
            return false;
        }
        if self.phase != expected {
            tracing::warn!(
                room = %self.code,
                phase = %self.phase,
                expected = %expected,
                "out-of-phase transition request ignored"
            );
            return false;
        }
        true
    }

    fn handle_start(&mut self, conn: ConnectionId) {
        if !self.transition_allowed(conn, Phase::Lobby) {
            return;
        }
        if self.questions.is_empty() {
            self.broadcast(ServerEvent::Error {
                code: ErrorCode::NoQuestions,
                message: "this game has no questions".into(),
            });
            return;
        }
        self.enter_question(0);
    }

    fn handle_reveal(&mut self, conn: ConnectionId) {
        if !self.transition_allowed(conn, Phase::Question) {
            return;
        }
        self.phase = Phase::Reveal;

        let question = &self.questions[self.current];
        let shuffle = self.shuffles.get(&self.current).map(Vec::as_slice);
        // Reveal first, then the leaderboard it produced — clients rely
        // on this order.
        self.broadcast(ServerEvent::Reveal {
            correct: question.reveal(shuffle),
        });
        self.broadcast(ServerEvent::Leaderboard {
            entries: project(&self.roster.contenders()),
        });
        tracing::info!(
            room = %self.code,
            question = self.current + 1,
            "answer revealed"
        );
    }

    fn handle_next(&mut self, conn: ConnectionId) {
        if !self.transition_allowed(conn, Phase::Reveal) {
            return;
        }
        if self.current + 1 < self.questions.len() {
            self.enter_question(self.current + 1);
        } else {
            self.phase = Phase::Ended;
            self.broadcast(ServerEvent::GameOver {
                leaderboard: project(&self.roster.contenders()),
            });
            tracing::info!(room = %self.code, "game over");
        }
    }

    fn enter_question(&mut self, index: usize) {
        self.current = index;
        let question = &self.questions[index];

        // Shuffle option/token positions for kinds that present in random
        // order; the permutation is retained for the reveal.
        if question.needs_shuffle() {
            let mut perm: Vec<usize> = (0..question.display_len()).collect();
            perm.shuffle(&mut rand::rng());
            self.shuffles.insert(index, perm);
        }

        self.phase = Phase::Question;
        self.question_started = Some(Instant::now());

        let shuffle = self.shuffles.get(&index).map(Vec::as_slice);
        self.broadcast(ServerEvent::NewQuestion {
            idx: index + 1,
            total: self.questions.len(),
            time_limit_ms: self.config.question_time_limit.as_millis() as u64,
            question: question.view(shuffle),
        });
        tracing::info!(
            room = %self.code,
            question = index + 1,
            total = self.questions.len(),
            "question started"
        );
    }

    // -- Disconnects, eviction, expulsion ---------------------------------

    fn handle_connection_lost(
        &mut self,
        conn: ConnectionId,
        identity: Option<Identity>,
    ) -> DisconnectOutcome {
        if conn == self.host_conn {
            match self.config.host_exit {
                HostExitPolicy::CloseRoom => {
                    return DisconnectOutcome::HostGone;
                }
                HostExitPolicy::PromoteSuccessor => {
                    match self.roster.promote_candidate(conn) {
                        Some(successor) => {
                            self.host_conn = successor;
                            tracing::info!(
                                room = %self.code,
                                new_host = %successor,
                                "host left, promoted successor"
                            );
                        }
                        None => return DisconnectOutcome::HostGone,
                    }
                }
            }
        }

        let Some(identity) = identity else {
            return DisconnectOutcome::Ignored;
        };
        let Some(player) = self.roster.get_mut(&identity) else {
            return DisconnectOutcome::Ignored;
        };
        // Only the player's *current* connection may mark them offline. A
        // late disconnect from a superseded connection must not knock a
        // rebound player back offline.
        if player.conn != Some(conn) {
            tracing::debug!(
                room = %self.code, %identity, %conn, "stale disconnect ignored"
            );
            return DisconnectOutcome::Ignored;
        }

        player.unbind();
        player.cancel_evict_timer();
        self.arm_eviction(identity.clone());
        tracing::info!(
            room = %self.code,
            %identity,
            grace_ms = self.config.grace_window.as_millis() as u64,
            "player offline, eviction timer armed"
        );
        DisconnectOutcome::Marked
    }

    /// Spawns the grace-window timer for an offline player.
    ///
    /// The timer doesn't mutate anything itself — it posts
    /// [`RoomCommand::EvictIfOffline`] back into this room's channel, so
    /// the fire-time offline check runs under the actor's serialization.
    fn arm_eviction(&mut self, identity: Identity) {
        let commands = self.commands.clone();
        let grace = self.config.grace_window;
        let timer_identity = identity.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            let _ = commands
                .send(RoomCommand::EvictIfOffline { identity: timer_identity })
                .await;
        });
        if let Some(player) = self.roster.get_mut(&identity) {
            player.evict_timer = Some(handle.abort_handle());
        } else {
            handle.abort();
        }
    }

    fn handle_evict_if_offline(&mut self, identity: Identity) {
        match self.roster.get(&identity) {
            Some(player) if !player.online => {
                let idle_ms = player.last_seen.elapsed().as_millis() as u64;
                self.roster.remove(&identity);
                tracing::info!(
                    room = %self.code,
                    %identity,
                    idle_ms,
                    "player evicted after grace window"
                );
                self.broadcast_membership();
            }
            Some(_) => {
                // Lost the race against a rebind — the player is back.
                tracing::debug!(
                    room = %self.code, %identity, "eviction raced rebind, no-op"
                );
            }
            None => {}
        }
    }

    fn handle_expel(&mut self, identity: Identity) {
        if self.roster.remove(&identity).is_some() {
            tracing::info!(
                room = %self.code, %identity, "player expelled (migrated away)"
            );
            self.broadcast_membership();
        }
    }

    // -- Outbound ---------------------------------------------------------

    /// The roster broadcast appropriate for the current phase: a lobby
    /// update while gathering, a leaderboard once the game is running.
    fn membership_event(&self) -> ServerEvent {
        if self.phase.in_lobby() {
            ServerEvent::LobbyUpdate {
                room: self.code.clone(),
                player_count: self.roster.len(),
                players: self.roster.lobby_players(),
            }
        } else {
            ServerEvent::Leaderboard {
                entries: project(&self.roster.contenders()),
            }
        }
    }

    fn broadcast_membership(&self) {
        self.broadcast(self.membership_event());
    }

    /// Sends an event to the host and every online player. Fire-and-forget:
    /// a gone receiver just drops the event.
    fn broadcast(&self, event: ServerEvent) {
        let _ = self.host_sender.send(event.clone());
        for sender in self.roster.online_senders() {
            // The host may also hold a player record (promoted successor);
            // don't double-send to the same channel.
            if !sender.same_channel(&self.host_sender) {
                let _ = sender.send(event.clone());
            }
        }
    }

    fn send_error_to(
        &self,
        identity: &Identity,
        code: ErrorCode,
        message: &str,
    ) {
        if let Some(sender) =
            self.roster.get(identity).and_then(|p| p.sender.as_ref())
        {
            let _ = sender.send(ServerEvent::Error {
                code,
                message: message.to_string(),
            });
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            code: self.code.clone(),
            phase: self.phase,
            player_count: self.roster.len(),
            host_conn: self.host_conn,
        }
    }
}

/// Spawns a new room actor task and returns a handle to communicate with it.
///
/// `channel_size` bounds the command channel — if it fills up, senders
/// wait (backpressure).
pub(crate) fn spawn_room(
    code: RoomCode,
    config: RoomConfig,
    questions: Vec<Question>,
    host_conn: ConnectionId,
    host_sender: EventSender,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        code: code.clone(),
        config,
        host_conn,
        host_sender,
        phase: Phase::Lobby,
        questions,
        current: 0,
        question_started: None,
        shuffles: HashMap::new(),
        roster: Roster::new(),
        commands: tx.clone(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle { code, sender: tx }
}
