//! `ut-agent`: per-agent state and the agent arena.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`state`]       | `Mode`, `Action`, `Focus`, `TrackList`, `AgentState`       |
//! | [`perception`]  | `PerceptionCache` (friend/enemy lists on a slow ticker)    |
//! | [`needs`]       | `Needs`, building fulfilment                               |
//! | [`store`]       | `AgentStore` (SoA arrays), `AgentSlot`, `AgentRngs`        |
//! | [`builder`]     | `AgentStoreBuilder`                                        |
//! | [`error`]       | `AgentError`, `AgentResult<T>`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on modes and needs.      |

pub mod builder;
pub mod error;
pub mod needs;
pub mod perception;
pub mod state;
pub mod store;

#[cfg(test)]
mod tests;

pub use builder::AgentStoreBuilder;
pub use error::{AgentError, AgentResult};
pub use needs::{fulfilled_by_building, Needs, DECAY_TIME, ENERGY, FOOD, FUN, NUM_NEEDS};
pub use perception::{is_hostile, PerceptionCache};
pub use state::{Action, AgentState, Focus, Mode, TrackList, VisitorState};
pub use store::{AgentRngs, AgentSlot, AgentStore};
