//! Room registry: the single source of truth for which rooms exist.
//!
//! An explicit object — no process-wide statics — created once at startup
//! and owned (behind a lock) by whatever drives the transport. It maps
//! room names to actor handles, routes operations, and publishes a
//! rooms-list feed for broadcast.

use std::collections::HashMap;
use std::sync::Arc;

use orbiter_protocol::{Catalog, Material, OutcomeEntry, PlayerId, RoundSchedule};
use tokio::sync::watch;

use crate::room::spawn_room;
use crate::{
    PlayerSender, RoomError, RoomHandle, RoomSnapshot, RoundConfig,
};

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Creates, looks up, and removes rooms, and routes operations to them.
///
/// Not internally synchronized: the owner serializes access (the server
/// keeps it behind a `tokio::sync::Mutex`). Per-room work still runs in
/// parallel — the registry only brokers handles; every room operation is
/// processed by that room's own actor task.
pub struct RoomRegistry {
    /// Active rooms, keyed by name (case-sensitive).
    rooms: HashMap<String, RoomHandle>,
    config: RoundConfig,
    catalog: Arc<Catalog>,
    /// Publishes a sorted name list whenever the set of rooms changes.
    rooms_tx: watch::Sender<Vec<String>>,
}

impl RoomRegistry {
    /// Creates an empty registry with the given game rules and catalog.
    pub fn new(config: RoundConfig, catalog: Arc<Catalog>) -> Self {
        let (rooms_tx, _) = watch::channel(Vec::new());
        Self {
            rooms: HashMap::new(),
            config,
            catalog,
            rooms_tx,
        }
    }

    /// Returns the room with `name`, creating it in Lobby phase if it
    /// does not exist. Idempotent.
    ///
    /// # Errors
    /// [`RoomError::InvalidName`] when `name` is empty or whitespace-only.
    pub fn create_or_get(
        &mut self,
        name: &str,
    ) -> Result<RoomHandle, RoomError> {
        if name.trim().is_empty() {
            return Err(RoomError::InvalidName);
        }

        if let Some(handle) = self.rooms.get(name) {
            // An actor that emptied out may have stopped between calls;
            // treat its stale handle as absent and respawn below.
            if !handle.is_closed() {
                return Ok(handle.clone());
            }
        }

        let handle = spawn_room(
            name.to_string(),
            self.config.clone(),
            Arc::clone(&self.catalog),
            DEFAULT_CHANNEL_SIZE,
        );
        self.rooms.insert(name.to_string(), handle.clone());
        tracing::info!(room = %name, "room created");
        self.publish_rooms();
        Ok(handle)
    }

    /// A point-in-time snapshot of all room names, sorted.
    pub fn room_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rooms.keys().cloned().collect();
        names.sort();
        names
    }

    /// The number of active rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Subscribes to rooms-list changes.
    ///
    /// The receiver always holds the latest sorted name list; a new value
    /// is published whenever a room is created or removed.
    pub fn watch_rooms(&self) -> watch::Receiver<Vec<String>> {
        self.rooms_tx.subscribe()
    }

    /// Removes the named room if it has no players. No-op when the room
    /// does not exist or is still populated.
    pub async fn remove_room_if_empty(&mut self, name: &str) {
        let Some(handle) = self.rooms.get(name) else {
            return;
        };
        let empty = if handle.is_closed() {
            true
        } else {
            match handle.snapshot().await {
                Ok(snapshot) => snapshot.players.is_empty(),
                Err(_) => true,
            }
        };
        if empty {
            self.rooms.remove(name);
            tracing::info!(room = %name, "empty room removed");
            self.publish_rooms();
        }
    }

    /// Joins (creating the room on first sight of the name) and returns
    /// the updated room state.
    pub async fn join(
        &mut self,
        room: &str,
        player_id: PlayerId,
        team_name: String,
        sender: PlayerSender,
    ) -> Result<RoomSnapshot, RoomError> {
        let handle = self.create_or_get(room)?;
        match handle
            .join(player_id.clone(), team_name.clone(), sender.clone())
            .await
        {
            Ok(snapshot) => Ok(snapshot),
            // The actor shut down between lookup and delivery (last player
            // left concurrently). Respawn once and retry.
            Err(RoomError::Unavailable(_)) => {
                self.rooms.remove(room);
                let handle = self.create_or_get(room)?;
                handle.join(player_id, team_name, sender).await
            }
            Err(e) => Err(e),
        }
    }

    /// Removes the player from the room; drops the room once empty.
    pub async fn leave(
        &mut self,
        room: &str,
        player_id: PlayerId,
    ) -> Result<(), RoomError> {
        let outcome = self.get(room)?.leave(player_id).await?;
        if outcome.now_empty {
            self.rooms.remove(room);
            tracing::info!(room = %room, "last player left, room removed");
            self.publish_rooms();
        }
        Ok(())
    }

    /// Flips the player's lobby ready flag.
    pub async fn toggle_ready(
        &self,
        room: &str,
        player_id: PlayerId,
    ) -> Result<(), RoomError> {
        self.get(room)?.toggle_ready(player_id).await
    }

    /// Replaces the player's selections and reported totals.
    pub async fn update_selection(
        &self,
        room: &str,
        player_id: PlayerId,
        selections: HashMap<String, Material>,
        total_mass: f64,
        total_cost: f64,
    ) -> Result<(), RoomError> {
        self.get(room)?
            .update_selection(player_id, selections, total_mass, total_cost)
            .await
    }

    /// Starts a round using the configured duration.
    pub async fn start_round(
        &self,
        room: &str,
        player_id: PlayerId,
    ) -> Result<RoundSchedule, RoomError> {
        self.get(room)?
            .start_round(player_id, self.config.round_duration)
            .await
    }

    /// Returns the stored summary for the room's last finished round.
    pub async fn summary(
        &self,
        room: &str,
    ) -> Result<Vec<OutcomeEntry>, RoomError> {
        self.get(room)?.summary().await
    }

    /// Returns the room's current state.
    pub async fn snapshot(
        &self,
        room: &str,
    ) -> Result<RoomSnapshot, RoomError> {
        self.get(room)?.snapshot().await
    }

    fn get(&self, room: &str) -> Result<&RoomHandle, RoomError> {
        self.rooms
            .get(room)
            .ok_or_else(|| RoomError::UnknownRoom(room.to_string()))
    }

    fn publish_rooms(&self) {
        self.rooms_tx.send_replace(self.room_names());
    }
}
