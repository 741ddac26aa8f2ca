//! Room lifecycle management for Orbiter.
//!
//! Each room runs as an isolated Tokio task (actor model) owning its
//! player set, host, phase, and round deadline. The [`RoomRegistry`] is
//! the single source of truth for which rooms exist.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — creates/removes rooms, routes operations
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`RoomPhase`] — lifecycle state machine (Lobby/Running/Finished)
//! - [`RoundConfig`] — game rules (round duration, mass threshold)
//! - [`Player`] / [`SelectionStore`] — per-player state
//! - [`outcome`] — the pure pass/fail verdict engine

mod config;
mod error;
pub mod outcome;
mod player;
mod registry;
mod room;

pub use config::{RoomPhase, RoundConfig};
pub use error::RoomError;
pub use player::{Player, SelectionStore};
pub use registry::RoomRegistry;
pub use room::{LeaveOutcome, PlayerSender, RoomHandle, RoomSnapshot};
