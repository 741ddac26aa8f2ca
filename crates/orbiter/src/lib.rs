//! # Orbiter
//!
//! Multiplayer lobby backend for a shuttle materials-engineering game.
//!
//! Players join named rooms, privately pick a material for each shuttle
//! part, and the host launches a timed round. When the countdown ends,
//! every team receives a computed outcome: did the craft get off the pad
//! (mass), and did it survive re-entry (insulation)?
//!
//! The server is a thin shell over the layered crates:
//!
//! ```text
//! orbiter-transport (WebSocket) → orbiter-protocol (wire JSON)
//!     → orbiter-room (registry + room actors + outcome engine)
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use orbiter::OrbiterServer;
//!
//! # async fn run() -> Result<(), orbiter::OrbiterError> {
//! let server = OrbiterServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::OrbiterError;
pub use server::{OrbiterServer, OrbiterServerBuilder};

// Re-exported for server embedders and tests.
pub use orbiter_protocol::{
    Catalog, ClientRequest, INSULATION_PART, Material, PlayerId, ServerEvent,
};
pub use orbiter_room::RoundConfig;
