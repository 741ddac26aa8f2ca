//! The outcome engine: pure verdicts from a player's final selections.
//!
//! Two staged checks, evaluated in a significant order:
//!
//! 1. **Takeoff** — reported total mass must not exceed the threshold.
//!    A takeoff failure dominates everything else: an over-heavy craft
//!    fails on the pad no matter how well it is insulated.
//! 2. **Re-entry** — the material chosen for the thermal insulation part
//!    must have an insulation rating of at least 1. No selection for that
//!    part counts as rating 0.
//!
//! `evaluate` has no side effects and is safe to call repeatedly and in
//! parallel across players.

use orbiter_protocol::{INSULATION_PART, OutcomeEntry};

use crate::Player;
use crate::player::SelectionStore;

/// The pass/fail verdict per stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Mass was at or under the threshold.
    pub takeoff_success: bool,
    /// Insulation rating was sufficient to survive re-entry.
    pub reentry_survive: bool,
}

impl Outcome {
    /// The aggregate human-readable label. Takeoff failure wins.
    pub fn label(&self) -> &'static str {
        if !self.takeoff_success {
            "Failed on takeoff (Too heavy)"
        } else if !self.reentry_survive {
            "Burnt on re-entry (Insufficient insulation)"
        } else {
            "Successful launch and re-entry"
        }
    }
}

/// Evaluates a selection store against the mass threshold.
pub fn evaluate(selections: &SelectionStore, mass_threshold: f64) -> Outcome {
    let insulation_rating = selections
        .material_for(INSULATION_PART)
        .map(|m| m.insulation_rating)
        .unwrap_or(0);

    Outcome {
        takeoff_success: selections.total_mass() <= mass_threshold,
        reentry_survive: insulation_rating >= 1,
    }
}

/// Builds the end-of-round summary entry for one player.
pub fn summarize(player: &Player, mass_threshold: f64) -> OutcomeEntry {
    let outcome = evaluate(&player.selections, mass_threshold);
    OutcomeEntry {
        team_name: player.team_name.clone(),
        total_mass: player.selections.total_mass(),
        total_cost: player.selections.total_cost(),
        selections: player.selections.chosen().clone(),
        takeoff_success: outcome.takeoff_success,
        reentry_survive: outcome.reentry_survive,
        outcome: outcome.label().to_string(),
    }
}
