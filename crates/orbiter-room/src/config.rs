//! Round configuration and the room phase state machine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoundConfig
// ---------------------------------------------------------------------------

/// Game-rule configuration supplied at startup.
///
/// The core treats these as read-only input; it never derives them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundConfig {
    /// How long a round runs once the host starts it.
    pub round_duration: Duration,

    /// Total mass above which takeoff fails, in kg.
    pub mass_threshold: f64,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            round_duration: Duration::from_secs(10 * 60),
            mass_threshold: 50_000.0,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomPhase
// ---------------------------------------------------------------------------

/// The lifecycle phase of a room.
///
/// ```text
/// Lobby → Running → Finished
///   ↑                  │
///   └──(fresh start)───┘
/// ```
///
/// - **Lobby**: players join, toggle ready, tinker with selections.
/// - **Running**: the countdown is live. Joining and selection updates are
///   still allowed; ready toggles are not.
/// - **Finished**: the round ended and the summary is available. Terminal
///   for that round — but the host may start a fresh round, which loops
///   the room back through Lobby into Running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomPhase {
    Lobby,
    Running,
    Finished,
}

impl RoomPhase {
    /// Returns `true` while a countdown is live.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns `true` if ready toggles are meaningful in this phase.
    pub fn is_lobby(&self) -> bool {
        matches!(self, Self::Lobby)
    }

    /// Returns `true` once a summary exists for the last round.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }

    /// Whether `start_round` may fire from this phase.
    ///
    /// Lobby starts normally; Finished is the "fresh start" reset path.
    /// Only a live round blocks a new one.
    pub fn accepts_start(&self) -> bool {
        !self.is_running()
    }
}

impl std::fmt::Display for RoomPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lobby => write!(f, "Lobby"),
            Self::Running => write!(f, "Running"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_accepts_start_except_while_running() {
        assert!(RoomPhase::Lobby.accepts_start());
        assert!(RoomPhase::Finished.accepts_start());
        assert!(!RoomPhase::Running.accepts_start());
    }

    #[test]
    fn test_phase_predicates() {
        assert!(RoomPhase::Lobby.is_lobby());
        assert!(!RoomPhase::Running.is_lobby());
        assert!(RoomPhase::Running.is_running());
        assert!(RoomPhase::Finished.is_finished());
        assert!(!RoomPhase::Lobby.is_finished());
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(RoomPhase::Lobby.to_string(), "Lobby");
        assert_eq!(RoomPhase::Running.to_string(), "Running");
        assert_eq!(RoomPhase::Finished.to_string(), "Finished");
    }

    #[test]
    fn test_round_config_default() {
        let config = RoundConfig::default();
        assert_eq!(config.round_duration, Duration::from_secs(600));
        assert_eq!(config.mass_threshold, 50_000.0);
    }
}
