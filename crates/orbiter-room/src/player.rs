//! Player state: team identity, ready flag, and the selection store.

use std::collections::HashMap;

use orbiter_protocol::{Catalog, Material, PlayerEntry, PlayerId};
use rand::Rng;

// ---------------------------------------------------------------------------
// SelectionStore
// ---------------------------------------------------------------------------

/// A player's chosen material per part, plus their reported totals.
///
/// Replaced wholesale on every update. The totals are what the client
/// reports — the server does not re-derive them from the catalog. That is
/// a documented trust boundary: a buggy or malicious client can misreport
/// mass and cost, and the outcome engine will believe it. What the store
/// DOES enforce is shape: unknown part names are dropped rather than kept
/// verbatim, and negative totals are clamped to zero.
#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    chosen: HashMap<String, Material>,
    total_mass: f64,
    total_cost: f64,
}

impl SelectionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the entire store with a new selection set.
    ///
    /// Entries whose part name is not in `catalog` are discarded.
    pub fn replace(
        &mut self,
        selections: HashMap<String, Material>,
        total_mass: f64,
        total_cost: f64,
        catalog: &Catalog,
    ) {
        let mut chosen = HashMap::with_capacity(selections.len());
        for (part, material) in selections {
            if catalog.is_known_part(&part) {
                chosen.insert(part, material);
            } else {
                tracing::warn!(part, "dropping selection for unknown part");
            }
        }
        self.chosen = chosen;
        self.total_mass = total_mass.max(0.0);
        self.total_cost = total_cost.max(0.0);
    }

    /// The material chosen for `part`, if any.
    pub fn material_for(&self, part: &str) -> Option<&Material> {
        self.chosen.get(part)
    }

    /// All current selections.
    pub fn chosen(&self) -> &HashMap<String, Material> {
        &self.chosen
    }

    /// Reported total mass in kg.
    pub fn total_mass(&self) -> f64 {
        self.total_mass
    }

    /// Reported total cost.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// One player inside a room.
#[derive(Debug, Clone)]
pub struct Player {
    /// Opaque per-connection identifier.
    pub id: PlayerId,
    /// Display name; generated if the client sent a blank one.
    pub team_name: String,
    /// Lobby ready flag.
    pub ready: bool,
    /// Current selections and reported totals.
    pub selections: SelectionStore,
}

impl Player {
    /// Creates a fresh player: not ready, nothing selected.
    ///
    /// A blank or whitespace-only `team_name` is replaced with a generated
    /// `Team-xxxx` tag so every player has something displayable.
    pub fn new(id: PlayerId, team_name: impl Into<String>) -> Self {
        let team_name = team_name.into();
        let team_name = if team_name.trim().is_empty() {
            generate_team_tag()
        } else {
            team_name
        };
        Self {
            id,
            team_name,
            ready: false,
            selections: SelectionStore::new(),
        }
    }

    /// The wire representation of this player for player-list events.
    pub fn entry(&self) -> PlayerEntry {
        PlayerEntry {
            player_id: self.id.clone(),
            team_name: self.team_name.clone(),
            ready: self.ready,
            total_mass: self.selections.total_mass(),
            total_cost: self.selections.total_cost(),
        }
    }
}

/// Generates a `Team-xxxx` tag with a 4-hex-char suffix.
fn generate_team_tag() -> String {
    let bytes: [u8; 2] = rand::rng().random();
    let suffix: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!("Team-{suffix}")
}
