//! Wire protocol and reference catalog for Orbiter.
//!
//! This crate defines the language that clients and the server speak:
//!
//! - **Types** ([`ClientRequest`], [`ServerEvent`], [`PlayerEntry`],
//!   [`OutcomeEntry`], …) — the structures that travel on the wire.
//! - **Catalog** ([`Part`], [`Material`], [`Catalog`]) — the read-only
//!   shuttle part and material reference data.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong doing so.
//!
//! The protocol layer knows nothing about connections, rooms, or timers —
//! it only describes data.

mod catalog;
mod codec;
mod error;
mod types;

pub use catalog::{Catalog, INSULATION_PART, Material, Part};
pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientRequest, OutcomeEntry, PlayerEntry, PlayerId, RoundSchedule,
    ServerEvent,
};
