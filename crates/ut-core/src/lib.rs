//! `ut-core`: foundational types for the `rust_ut` unit-tactics framework.
//!
//! Every other `ut-*` crate depends on this one.  It has no `ut-*`
//! dependencies and only `rand` and `thiserror` externally, plus optional
//! `serde`.
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `EntityId`, `AgentId`, `TeamId`                           |
//! | [`geo`]         | `Vec2I`, `Vec2F`, `Rect2I`, sector helpers                |
//! | [`time`]        | `Tick`, `SimClock`, `Ticker`, `Millis`                    |
//! | [`rng`]         | `AgentRng` (per-agent), `SimRng` (world), weighted picks  |
//! | [`species`]     | `Species`, `MobClass`, `Personality`                      |
//! | [`structure`]   | `StructureKind`, `Zone`                                   |
//! | [`config`]      | `SimConfig`, `AiConfig`                                   |
//! | [`error`]       | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod species;
pub mod structure;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{AiConfig, SimConfig};
pub use error::{CoreError, CoreResult};
pub use geo::{Rect2I, Vec2F, Vec2I};
pub use ids::{AgentId, EntityId, TeamId};
pub use rng::{AgentRng, SimRng};
pub use species::{MobClass, Personality, Preference, Species};
pub use structure::{StructureKind, Zone};
pub use time::{Millis, SimClock, Tick, Ticker, MINUTE, VERY_LONG_TICK};
