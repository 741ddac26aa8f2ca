//! Room actor: an isolated Tokio task that owns one session.
//!
//! Each room runs in its own task and is driven exclusively through an
//! mpsc command channel — the actor model. That channel is the room's
//! linearization point: no two operations on the same room interleave,
//! while distinct rooms proceed fully in parallel. The round deadline is
//! just another command on the same channel, so the end-of-round
//! transition is serialized like any client-triggered operation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use orbiter_protocol::{
    Catalog, Material, OutcomeEntry, PlayerEntry, PlayerId, RoundSchedule,
    ServerEvent,
};
use orbiter_timer::RoundTimer;
use tokio::sync::{mpsc, oneshot};

use crate::outcome::summarize;
use crate::{Player, RoomError, RoomPhase, RoundConfig};

/// Channel sender for delivering events to one player's connection.
pub type PlayerSender = mpsc::UnboundedSender<ServerEvent>;

/// What `leave` reports back to the registry.
#[derive(Debug, Clone, Copy)]
pub struct LeaveOutcome {
    /// Whether the identity was actually a member.
    pub was_member: bool,
    /// Whether the room is now empty (and its actor has stopped).
    pub now_empty: bool,
}

/// A point-in-time view of a room.
#[derive(Debug, Clone)]
pub struct RoomSnapshot {
    /// The room's name.
    pub room: String,
    /// Current lifecycle phase.
    pub phase: RoomPhase,
    /// Players, ordered by identity.
    pub players: Vec<PlayerEntry>,
    /// The host, if the room is non-empty.
    pub host: Option<PlayerId>,
    /// The live round schedule; `None` outside `Running`.
    pub schedule: Option<RoundSchedule>,
}

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in most variants is a reply channel — the caller
/// sends a command and awaits the response on it.
pub(crate) enum RoomCommand {
    /// Add or re-add a player.
    Join {
        player_id: PlayerId,
        team_name: String,
        sender: PlayerSender,
        reply: oneshot::Sender<RoomSnapshot>,
    },

    /// Remove a player.
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<LeaveOutcome>,
    },

    /// Flip the lobby ready flag. Silently ignored outside the lobby or
    /// for identities that are not members, so no reply channel.
    ToggleReady { player_id: PlayerId },

    /// Replace a player's selections and reported totals wholesale.
    UpdateSelection {
        player_id: PlayerId,
        selections: HashMap<String, Material>,
        total_mass: f64,
        total_cost: f64,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Start the countdown (host only, not while one is running).
    StartRound {
        player_id: PlayerId,
        duration: Duration,
        reply: oneshot::Sender<Result<RoundSchedule, RoomError>>,
    },

    /// Fetch the stored end-of-round summary (empty until Finished).
    Summary {
        reply: oneshot::Sender<Vec<OutcomeEntry>>,
    },

    /// Fetch the current room state.
    Snapshot { reply: oneshot::Sender<RoomSnapshot> },

    /// The round deadline elapsed. Sent only by the room's own timer;
    /// `round` guards against a stale fire from a superseded round.
    RoundElapsed { round: u64 },
}

/// Handle to a running room actor. Cheap to clone — it's an
/// `mpsc::Sender` plus the room's name.
#[derive(Clone)]
pub struct RoomHandle {
    name: String,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// The room's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the actor has stopped (empty room cleaned itself up).
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Adds or re-adds a player; returns the updated room state.
    pub async fn join(
        &self,
        player_id: PlayerId,
        team_name: String,
        sender: PlayerSender,
    ) -> Result<RoomSnapshot, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Join {
            player_id,
            team_name,
            sender,
            reply: reply_tx,
        })
        .await?;
        self.recv(reply_rx).await
    }

    /// Removes a player.
    pub async fn leave(
        &self,
        player_id: PlayerId,
    ) -> Result<LeaveOutcome, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Leave {
            player_id,
            reply: reply_tx,
        })
        .await?;
        self.recv(reply_rx).await
    }

    /// Flips the player's ready flag (lobby only; silent no-op otherwise).
    pub async fn toggle_ready(
        &self,
        player_id: PlayerId,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::ToggleReady { player_id }).await
    }

    /// Replaces a player's selections and totals.
    pub async fn update_selection(
        &self,
        player_id: PlayerId,
        selections: HashMap<String, Material>,
        total_mass: f64,
        total_cost: f64,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::UpdateSelection {
            player_id,
            selections,
            total_mass,
            total_cost,
            reply: reply_tx,
        })
        .await?;
        self.recv(reply_rx).await?
    }

    /// Starts the countdown.
    pub async fn start_round(
        &self,
        player_id: PlayerId,
        duration: Duration,
    ) -> Result<RoundSchedule, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::StartRound {
            player_id,
            duration,
            reply: reply_tx,
        })
        .await?;
        self.recv(reply_rx).await?
    }

    /// Returns the stored summary (empty until a round has finished).
    pub async fn summary(&self) -> Result<Vec<OutcomeEntry>, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Summary { reply: reply_tx }).await?;
        self.recv(reply_rx).await
    }

    /// Returns the current room state.
    pub async fn snapshot(&self) -> Result<RoomSnapshot, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Snapshot { reply: reply_tx }).await?;
        self.recv(reply_rx).await
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RoomError::Unavailable(self.name.clone()))
    }

    async fn recv<T>(
        &self,
        reply: oneshot::Receiver<T>,
    ) -> Result<T, RoomError> {
        reply
            .await
            .map_err(|_| RoomError::Unavailable(self.name.clone()))
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    name: String,
    phase: RoomPhase,
    config: RoundConfig,
    catalog: Arc<Catalog>,
    players: HashMap<PlayerId, Player>,
    /// Per-player outbound channels.
    senders: HashMap<PlayerId, PlayerSender>,
    host: Option<PlayerId>,
    /// Bumped on every round start; stale timer fires carry an old value.
    round_seq: u64,
    schedule: Option<RoundSchedule>,
    summary: Vec<OutcomeEntry>,
    timer: RoundTimer,
    /// Sender into our own channel, cloned into the round timer.
    command_tx: mpsc::Sender<RoomCommand>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop until the room empties out.
    async fn run(mut self) {
        tracing::info!(room = %self.name, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    player_id,
                    team_name,
                    sender,
                    reply,
                } => {
                    let snapshot =
                        self.handle_join(player_id, team_name, sender);
                    let _ = reply.send(snapshot);
                }
                RoomCommand::Leave { player_id, reply } => {
                    let outcome = self.handle_leave(player_id);
                    let _ = reply.send(outcome);
                    if outcome.now_empty {
                        break;
                    }
                }
                RoomCommand::ToggleReady { player_id } => {
                    self.handle_toggle_ready(player_id);
                }
                RoomCommand::UpdateSelection {
                    player_id,
                    selections,
                    total_mass,
                    total_cost,
                    reply,
                } => {
                    let result = self.handle_update_selection(
                        player_id, selections, total_mass, total_cost,
                    );
                    let _ = reply.send(result);
                }
                RoomCommand::StartRound {
                    player_id,
                    duration,
                    reply,
                } => {
                    let result = self.handle_start_round(player_id, duration);
                    let _ = reply.send(result);
                }
                RoomCommand::Summary { reply } => {
                    let _ = reply.send(self.summary.clone());
                }
                RoomCommand::Snapshot { reply } => {
                    let _ = reply.send(self.snapshot());
                }
                RoomCommand::RoundElapsed { round } => {
                    self.handle_round_elapsed(round);
                }
            }
        }

        self.timer.disarm();
        tracing::info!(room = %self.name, "room actor stopped");
    }

    fn handle_join(
        &mut self,
        player_id: PlayerId,
        team_name: String,
        sender: PlayerSender,
    ) -> RoomSnapshot {
        // Re-joining replaces the old record wholesale: fresh ready flag,
        // empty selections, new outbound channel.
        let player = Player::new(player_id.clone(), team_name);
        tracing::info!(
            room = %self.name,
            %player_id,
            team = %player.team_name,
            phase = %self.phase,
            "player joined"
        );
        self.players.insert(player_id.clone(), player);
        self.senders.insert(player_id.clone(), sender);

        if self.host.is_none() {
            tracing::info!(room = %self.name, %player_id, "host assigned");
            self.host = Some(player_id);
        }

        self.broadcast_player_list();
        self.snapshot()
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> LeaveOutcome {
        if self.players.remove(&player_id).is_none() {
            return LeaveOutcome {
                was_member: false,
                now_empty: self.players.is_empty(),
            };
        }
        self.senders.remove(&player_id);

        tracing::info!(
            room = %self.name,
            %player_id,
            players = self.players.len(),
            "player left"
        );

        if self.host.as_ref() == Some(&player_id) {
            // Deterministic hand-off: smallest remaining identity.
            self.host = self.players.keys().min().cloned();
            if let Some(host) = &self.host {
                tracing::info!(room = %self.name, %host, "host reassigned");
            }
        }

        let now_empty = self.players.is_empty();
        if now_empty {
            // A pending deadline must not fire into a dead room.
            self.timer.disarm();
        } else {
            self.broadcast_player_list();
        }

        LeaveOutcome {
            was_member: true,
            now_empty,
        }
    }

    fn handle_toggle_ready(&mut self, player_id: PlayerId) {
        if !self.phase.is_lobby() {
            return;
        }
        let Some(player) = self.players.get_mut(&player_id) else {
            return;
        };
        player.ready = !player.ready;
        tracing::debug!(
            room = %self.name,
            %player_id,
            ready = player.ready,
            "ready toggled"
        );
        self.broadcast_player_list();
    }

    fn handle_update_selection(
        &mut self,
        player_id: PlayerId,
        selections: HashMap<String, Material>,
        total_mass: f64,
        total_cost: f64,
    ) -> Result<(), RoomError> {
        let Some(player) = self.players.get_mut(&player_id) else {
            return Err(RoomError::UnknownPlayer(player_id));
        };
        player.selections.replace(
            selections,
            total_mass,
            total_cost,
            &self.catalog,
        );
        self.broadcast_player_list();
        Ok(())
    }

    fn handle_start_round(
        &mut self,
        player_id: PlayerId,
        duration: Duration,
    ) -> Result<RoundSchedule, RoomError> {
        if self.host.as_ref() != Some(&player_id) {
            return Err(RoomError::NotHost(player_id));
        }
        if !self.phase.accepts_start() {
            return Err(RoomError::AlreadyRunning);
        }

        // A start from Finished is the fresh-start reset: the previous
        // summary and ready flags go, selections stay.
        self.summary.clear();
        for player in self.players.values_mut() {
            player.ready = false;
        }

        self.phase = RoomPhase::Running;
        self.round_seq += 1;

        let duration_ms = duration.as_millis() as u64;
        let game_start_time = now_ms();
        let schedule = RoundSchedule {
            game_start_time,
            game_end_time: game_start_time + duration_ms,
            duration_ms,
        };
        self.schedule = Some(schedule);

        self.timer.arm(
            duration,
            self.command_tx.clone(),
            RoomCommand::RoundElapsed {
                round: self.round_seq,
            },
        );

        tracing::info!(
            room = %self.name,
            %player_id,
            duration_ms,
            round = self.round_seq,
            "round started"
        );

        self.broadcast(ServerEvent::RoundStarted {
            room: self.name.clone(),
            schedule,
        });

        Ok(schedule)
    }

    fn handle_round_elapsed(&mut self, round: u64) {
        if !self.phase.is_running() || round != self.round_seq {
            tracing::trace!(
                room = %self.name,
                round,
                current = self.round_seq,
                "stale round deadline ignored"
            );
            return;
        }

        self.phase = RoomPhase::Finished;
        self.schedule = None;

        let mut summary: Vec<OutcomeEntry> = self
            .players
            .values()
            .map(|p| summarize(p, self.config.mass_threshold))
            .collect();
        summary.sort_by(|a, b| a.team_name.cmp(&b.team_name));
        self.summary = summary;

        tracing::info!(
            room = %self.name,
            round,
            teams = self.summary.len(),
            "round finished"
        );

        self.broadcast(ServerEvent::RoundFinished {
            room: self.name.clone(),
            summary: self.summary.clone(),
        });
    }

    fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room: self.name.clone(),
            phase: self.phase,
            players: self.player_entries(),
            host: self.host.clone(),
            schedule: self.schedule,
        }
    }

    /// Player entries ordered by identity, so lists are stable across
    /// broadcasts regardless of hash-map iteration order.
    fn player_entries(&self) -> Vec<PlayerEntry> {
        let mut entries: Vec<PlayerEntry> =
            self.players.values().map(Player::entry).collect();
        entries.sort_by(|a, b| a.player_id.cmp(&b.player_id));
        entries
    }

    fn broadcast_player_list(&self) {
        self.broadcast(ServerEvent::PlayerList {
            room: self.name.clone(),
            players: self.player_entries(),
            host: self.host.clone(),
        });
    }

    /// Sends an event to every player. Closed receivers (connections that
    /// just dropped) are silently skipped.
    fn broadcast(&self, event: ServerEvent) {
        for sender in self.senders.values() {
            let _ = sender.send(event.clone());
        }
    }
}

/// Wall-clock milliseconds since the Unix epoch.
fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Spawns a new room actor task and returns a handle to it.
///
/// `channel_size` bounds the command queue — senders wait when it fills.
pub(crate) fn spawn_room(
    name: String,
    config: RoundConfig,
    catalog: Arc<Catalog>,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        name: name.clone(),
        phase: RoomPhase::Lobby,
        config,
        catalog,
        players: HashMap::new(),
        senders: HashMap::new(),
        host: None,
        round_seq: 0,
        schedule: None,
        summary: Vec::new(),
        timer: RoundTimer::new(),
        command_tx: tx.clone(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle { name, sender: tx }
}
