//! Wire types for the Orbiter lobby protocol.
//!
//! Everything here is a structure that travels between a client and the
//! server as JSON. Field names are camelCase on the wire because that is
//! what the browser client sends and expects; the serde attributes do the
//! renaming so the Rust side stays idiomatic.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Material;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// An opaque, per-connection player identifier.
///
/// The client mints this itself (e.g. `p-k3x9qv2f`) and presents it with
/// every request. The server never interprets the contents — it is only a
/// stable key, unique within a room. `#[serde(transparent)]` keeps it a
/// plain JSON string on the wire rather than `{ "0": "..." }`.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Creates a `PlayerId` from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// ---------------------------------------------------------------------------
// Room snapshots
// ---------------------------------------------------------------------------

/// One player as shown in a room's player list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerEntry {
    /// The player's opaque identifier.
    pub player_id: PlayerId,
    /// Display name of the team.
    pub team_name: String,
    /// Lobby ready flag.
    pub ready: bool,
    /// Client-reported total mass in kg.
    pub total_mass: f64,
    /// Client-reported total cost.
    pub total_cost: f64,
}

/// The absolute timing of a running round.
///
/// Both endpoints are wall-clock milliseconds since the Unix epoch, so every
/// client can derive the same countdown locally regardless of message
/// latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSchedule {
    /// When the round started.
    pub game_start_time: u64,
    /// When the round ends.
    pub game_end_time: u64,
    /// `game_end_time - game_start_time`, for convenience.
    pub duration_ms: u64,
}

/// One team's end-of-round result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeEntry {
    /// Display name of the team.
    pub team_name: String,
    /// Client-reported total mass in kg.
    pub total_mass: f64,
    /// Client-reported total cost.
    pub total_cost: f64,
    /// The team's final material choice per part.
    pub selections: HashMap<String, Material>,
    /// Whether the craft got off the pad (mass under the threshold).
    pub takeoff_success: bool,
    /// Whether the craft survived re-entry (sufficient insulation).
    pub reentry_survive: bool,
    /// Human-readable verdict.
    pub outcome: String,
}

// ---------------------------------------------------------------------------
// Requests and events
// ---------------------------------------------------------------------------

/// Client → server requests.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON, e.g.
/// `{ "type": "CreateOrJoin", "room": "Alpha", "playerId": "p-1", ... }`,
/// which is the easiest shape to build and dispatch on in a browser client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum ClientRequest {
    /// Join the named room, creating it if it does not exist yet.
    /// A blank `team_name` gets a generated tag server-side.
    CreateOrJoin {
        room: String,
        player_id: PlayerId,
        #[serde(default)]
        team_name: String,
    },

    /// Leave the named room.
    Leave { room: String, player_id: PlayerId },

    /// Flip the lobby ready flag.
    ToggleReady { room: String, player_id: PlayerId },

    /// Replace the player's selections and reported totals wholesale.
    UpdateSelection {
        room: String,
        player_id: PlayerId,
        selections: HashMap<String, Material>,
        total_mass: f64,
        total_cost: f64,
    },

    /// Start the countdown (host only).
    StartRound { room: String, player_id: PlayerId },

    /// Ask for the current list of room names.
    ListRooms,

    /// Ask for the end-of-round summary (empty until the round finishes).
    GetSummary { room: String },
}

/// Server → client events: direct replies and room broadcasts alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Reply to a successful `CreateOrJoin`.
    RoomJoined {
        room: String,
        players: Vec<PlayerEntry>,
        host: Option<PlayerId>,
    },

    /// Broadcast: the room's player list (or host) changed.
    PlayerList {
        room: String,
        players: Vec<PlayerEntry>,
        host: Option<PlayerId>,
    },

    /// Broadcast: the host started a round.
    RoundStarted {
        room: String,
        #[serde(flatten)]
        schedule: RoundSchedule,
    },

    /// Broadcast: the countdown elapsed and outcomes are in.
    RoundFinished {
        room: String,
        summary: Vec<OutcomeEntry>,
    },

    /// Reply to `ListRooms`, and broadcast whenever the set of rooms changes.
    RoomsList { names: Vec<String> },

    /// Reply to `GetSummary`.
    Summary {
        room: String,
        summary: Vec<OutcomeEntry>,
    },

    /// Something went wrong. `code` follows HTTP conventions
    /// (400 bad request, 403 forbidden, 404 not found, 409 conflict).
    Error { code: u16, message: String },
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Wire-shape tests. The browser client builds and parses these JSON
    //! structures by hand, so the exact field names and tagging matter;
    //! a serde attribute regression here breaks every client silently.

    use super::*;

    fn material(rating: u32) -> Material {
        Material {
            name: "Aluminium".into(),
            density: 2700.0,
            price: 2.0,
            thermal: "High".into(),
            insulation_rating: rating,
        }
    }

    // =====================================================================
    // PlayerId
    // =====================================================================

    #[test]
    fn test_player_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&PlayerId::new("p-abc123")).unwrap();
        assert_eq!(json, "\"p-abc123\"");
    }

    #[test]
    fn test_player_id_deserializes_from_plain_string() {
        let pid: PlayerId = serde_json::from_str("\"p-abc123\"").unwrap();
        assert_eq!(pid, PlayerId::new("p-abc123"));
    }

    #[test]
    fn test_player_id_display() {
        assert_eq!(PlayerId::new("p-7").to_string(), "p-7");
    }

    #[test]
    fn test_player_id_orders_lexicographically() {
        // Host hand-off picks the smallest remaining id, so the ordering
        // of the newtype must follow the inner string.
        let a = PlayerId::new("p-aaa");
        let b = PlayerId::new("p-bbb");
        assert!(a < b);
    }

    // =====================================================================
    // ClientRequest
    // =====================================================================

    #[test]
    fn test_create_or_join_json_format() {
        let req = ClientRequest::CreateOrJoin {
            room: "Alpha".into(),
            player_id: PlayerId::new("p-1"),
            team_name: "Rocketeers".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&req).unwrap();

        assert_eq!(json["type"], "CreateOrJoin");
        assert_eq!(json["room"], "Alpha");
        assert_eq!(json["playerId"], "p-1");
        assert_eq!(json["teamName"], "Rocketeers");
    }

    #[test]
    fn test_create_or_join_team_name_defaults_when_missing() {
        // Older clients omit teamName entirely; `#[serde(default)]` turns
        // that into an empty string (which the room replaces with a tag).
        let json = r#"{"type":"CreateOrJoin","room":"Alpha","playerId":"p-1"}"#;
        let req: ClientRequest = serde_json::from_str(json).unwrap();
        assert!(matches!(
            req,
            ClientRequest::CreateOrJoin { team_name, .. } if team_name.is_empty()
        ));
    }

    #[test]
    fn test_update_selection_json_format() {
        let mut selections = HashMap::new();
        selections.insert("Jet engine".to_string(), material(3));
        let req = ClientRequest::UpdateSelection {
            room: "Alpha".into(),
            player_id: PlayerId::new("p-1"),
            selections,
            total_mass: 54000.0,
            total_cost: 108000.0,
        };
        let json: serde_json::Value = serde_json::to_value(&req).unwrap();

        assert_eq!(json["type"], "UpdateSelection");
        assert_eq!(json["totalMass"], 54000.0);
        assert_eq!(json["totalCost"], 108000.0);
        assert_eq!(
            json["selections"]["Jet engine"]["insulationRating"],
            3
        );
    }

    #[test]
    fn test_list_rooms_round_trip() {
        let req = ClientRequest::ListRooms;
        let bytes = serde_json::to_vec(&req).unwrap();
        let decoded: ClientRequest = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(req, decoded);
    }

    #[test]
    fn test_start_round_round_trip() {
        let req = ClientRequest::StartRound {
            room: "Alpha".into(),
            player_id: PlayerId::new("p-1"),
        };
        let bytes = serde_json::to_vec(&req).unwrap();
        let decoded: ClientRequest = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(req, decoded);
    }

    // =====================================================================
    // ServerEvent
    // =====================================================================

    #[test]
    fn test_round_started_flattens_schedule() {
        // The client reads gameEndTime straight off the event object, so
        // the schedule must flatten rather than nest.
        let ev = ServerEvent::RoundStarted {
            room: "Alpha".into(),
            schedule: RoundSchedule {
                game_start_time: 1_000,
                game_end_time: 3_000,
                duration_ms: 2_000,
            },
        };
        let json: serde_json::Value = serde_json::to_value(&ev).unwrap();

        assert_eq!(json["type"], "RoundStarted");
        assert_eq!(json["gameStartTime"], 1_000);
        assert_eq!(json["gameEndTime"], 3_000);
        assert_eq!(json["durationMs"], 2_000);
    }

    #[test]
    fn test_player_list_json_format() {
        let ev = ServerEvent::PlayerList {
            room: "Alpha".into(),
            players: vec![PlayerEntry {
                player_id: PlayerId::new("p-1"),
                team_name: "Rocketeers".into(),
                ready: true,
                total_mass: 0.0,
                total_cost: 0.0,
            }],
            host: Some(PlayerId::new("p-1")),
        };
        let json: serde_json::Value = serde_json::to_value(&ev).unwrap();

        assert_eq!(json["type"], "PlayerList");
        assert_eq!(json["host"], "p-1");
        assert_eq!(json["players"][0]["teamName"], "Rocketeers");
        assert_eq!(json["players"][0]["ready"], true);
    }

    #[test]
    fn test_player_list_without_host_serializes_null() {
        let ev = ServerEvent::PlayerList {
            room: "Alpha".into(),
            players: vec![],
            host: None,
        };
        let json: serde_json::Value = serde_json::to_value(&ev).unwrap();
        assert!(json["host"].is_null());
    }

    #[test]
    fn test_round_finished_round_trip() {
        let ev = ServerEvent::RoundFinished {
            room: "Alpha".into(),
            summary: vec![OutcomeEntry {
                team_name: "Rocketeers".into(),
                total_mass: 40000.0,
                total_cost: 90000.0,
                selections: HashMap::new(),
                takeoff_success: true,
                reentry_survive: false,
                outcome: "Burnt on re-entry (Insufficient insulation)".into(),
            }],
        };
        let bytes = serde_json::to_vec(&ev).unwrap();
        let decoded: ServerEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(ev, decoded);
    }

    #[test]
    fn test_outcome_entry_uses_camel_case_fields() {
        let entry = OutcomeEntry {
            team_name: "Rocketeers".into(),
            total_mass: 60000.0,
            total_cost: 1.0,
            selections: HashMap::new(),
            takeoff_success: false,
            reentry_survive: true,
            outcome: "Failed on takeoff (Too heavy)".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["teamName"], "Rocketeers");
        assert_eq!(json["totalMass"], 60000.0);
        assert_eq!(json["takeoffSuccess"], false);
        assert_eq!(json["reentrySurvive"], true);
    }

    #[test]
    fn test_error_event_json_format() {
        let ev = ServerEvent::Error {
            code: 403,
            message: "only the host can start a round".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&ev).unwrap();

        assert_eq!(json["type"], "Error");
        assert_eq!(json["code"], 403);
    }

    #[test]
    fn test_rooms_list_round_trip() {
        let ev = ServerEvent::RoomsList {
            names: vec!["Alpha".into(), "Beta".into()],
        };
        let bytes = serde_json::to_vec(&ev).unwrap();
        let decoded: ServerEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(ev, decoded);
    }

    // =====================================================================
    // Malformed input
    // =====================================================================

    #[test]
    fn test_decode_garbage_returns_error() {
        let garbage = b"not json at all";
        let result: Result<ClientRequest, _> = serde_json::from_slice(garbage);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_unknown_request_type_returns_error() {
        let unknown = r#"{"type": "SelfDestruct", "room": "Alpha"}"#;
        let result: Result<ClientRequest, _> = serde_json::from_str(unknown);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_missing_required_field_returns_error() {
        // StartRound without playerId must not silently default.
        let missing = r#"{"type": "StartRound", "room": "Alpha"}"#;
        let result: Result<ClientRequest, _> = serde_json::from_str(missing);
        assert!(result.is_err());
    }
}
