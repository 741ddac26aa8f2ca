//! The shuttle part and material catalog.
//!
//! Read-only reference data supplied to the server at startup. The parts
//! define the closed set of valid keys in a player's selections; the
//! materials are what clients choose from and echo back inside selection
//! payloads. The server never recomputes mass/cost from these figures —
//! they exist for validation (known part names) and for the insulation
//! outcome rule.

use serde::{Deserialize, Serialize};

/// The part name the re-entry outcome rule keys on.
pub const INSULATION_PART: &str = "Plane thermal insulation";

/// One fixed shuttle part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Catalog name, and the key used in selection maps.
    pub name: String,
    /// Surface area in m².
    pub area: f64,
    /// Volume in m³ (assuming 0.1 m thickness).
    pub volume: f64,
}

/// One material a part can be built from.
///
/// Travels on the wire inside selection payloads, so the field names are
/// camelCase to match the client (`insulationRating`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    /// Catalog name.
    pub name: String,
    /// Density in kg/m³.
    pub density: f64,
    /// Price per kg.
    pub price: f64,
    /// Qualitative thermal rating ("Very Low" through "High").
    pub thermal: String,
    /// Integer insulation rating; ≥ 1 survives re-entry.
    pub insulation_rating: u32,
}

/// The full catalog: parts plus materials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// The closed set of shuttle parts.
    pub parts: Vec<Part>,
    /// The materials available for every part.
    pub materials: Vec<Material>,
}

impl Catalog {
    /// The reference catalog: four parts, six materials.
    pub fn reference() -> Self {
        fn part(name: &str, area: f64, volume: f64) -> Part {
            Part { name: name.to_string(), area, volume }
        }
        fn material(
            name: &str,
            density: f64,
            price: f64,
            thermal: &str,
            insulation_rating: u32,
        ) -> Material {
            Material {
                name: name.to_string(),
                density,
                price,
                thermal: thermal.to_string(),
                insulation_rating,
            }
        }

        Self {
            parts: vec![
                part("Nose tip and wing tips", 120.0, 2.0),
                part("Main plane body (fuselage)", 800.0, 80.0),
                part(INSULATION_PART, 600.0, 60.0),
                part("Jet engine", 200.0, 20.0),
            ],
            materials: vec![
                material("Titanium oxide", 4500.0, 234.0, "High", 3),
                material("Silicon dioxide (glass)", 2500.0, 130.0, "Low", 1),
                material(
                    "Reinforced Graphite (carbon fibre)",
                    1600.0,
                    7250.0,
                    "Medium",
                    2,
                ),
                material("Tungsten", 19300.0, 343.0, "High", 3),
                material("Borosilicate tiles", 144.2, 6000.0, "Very Low", 0),
                material("Aluminium", 2700.0, 2.0, "High", 3),
            ],
        }
    }

    /// Looks up a part by name.
    pub fn part(&self, name: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.name == name)
    }

    /// Looks up a material by name.
    pub fn material(&self, name: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.name == name)
    }

    /// Whether `name` is a valid selection key.
    pub fn is_known_part(&self, name: &str) -> bool {
        self.part(name).is_some()
    }
}
