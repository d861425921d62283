//! `ut-world`: everything the scheduler consumes from its surroundings.
//!
//! The scheduler is written against the [`World`] trait and never touches a
//! concrete engine.  This crate defines that contract, the messages and news
//! that cross it, and [`GridWorld`], a small in-memory implementation used by
//! the tests and the demo.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`world`]   | `EntityAccess`, `MapInfo`, `SpatialQuery`, `Navigation`, `BuildingRegistry`, `WorkQueue`, `Economy`, `Commands`, `World` |
//! | [`entity`]  | Snapshots: `EntityInfo`, `BuildingInfo`, `Loadout`, `SectorInfo`, … |
//! | [`message`] | `AgentMessage`, `WorldEvent`, `NewsEvent`, `NewsLog`          |
//! | [`grid`]    | `GridWorld` (R-tree queries, Dijkstra paths, movers)          |
//! | [`error`]   | `WorldError`, `WorldResult<T>`                                |
//!
//! `World` is a supertrait; its methods are only callable with the sub-traits
//! in scope, so consumers write `use ut_world::prelude::*;`.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on messages and snapshots. |

pub mod entity;
pub mod error;
pub mod grid;
pub mod message;
pub mod world;


pub use entity::{
    porch_cell, BuildingCounts, BuildingInfo, CellEffects, CoreInfo, EntityInfo, EntityKind,
    FindMode, Inventory, ItemKind, Loadout, MeleeWeapon, PlayerHome, Port, RangedWeapon, Relation,
    SectorInfo, SpawnSpec, WalletId, WorkJob,
};
pub use error::{WorldError, WorldResult};
pub use grid::{Body, GridWorld};
pub use message::{AgentMessage, NewsEvent, NewsKind, NewsLog, WorldEvent};
pub use world::{
    BuildingRegistry, Commands, Economy, EntityAccess, MapInfo, Navigation, SpatialQuery, World,
    WorkQueue,
};

/// The collaborator traits, for glob import.
pub mod prelude {
    pub use crate::world::{
        BuildingRegistry, Commands, Economy, EntityAccess, MapInfo, Navigation, SpatialQuery,
        World, WorkQueue,
    };
}
