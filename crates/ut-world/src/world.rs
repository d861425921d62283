//! The collaborator contracts the scheduler is written against.
//!
//! The scheduler never implements spatial indexing, pathfinding, the economy
//! ledger, or persistence itself.  It reaches them through these traits,
//! grouped by concern and combined into [`World`].  Every method is object
//! safe so agents can be ticked against `&mut dyn World`.

use ut_core::{EntityId, Millis, Personality, Rect2I, StructureKind, TeamId, Vec2F, Vec2I};

use crate::entity::{
    BuildingCounts, BuildingInfo, CellEffects, EntityInfo, FindMode, Inventory, Loadout,
    PlayerHome, Relation, SectorInfo, SpawnSpec, WalletId, WorkJob,
};
use crate::message::{AgentMessage, WorldEvent};

/// Entity lookups.  A `None` always means "gone"; callers drop the id.
pub trait EntityAccess {
    fn entity(&self, id: EntityId) -> Option<EntityInfo>;
    /// Ids of every mob, in id order.
    fn mobs(&self) -> Vec<EntityId>;
    fn relation(&self, a: TeamId, b: TeamId) -> Relation;
    fn loadout(&self, id: EntityId) -> Loadout;
    fn inventory(&self, id: EntityId) -> Inventory;
    fn personality(&self, id: EntityId) -> Personality;
    /// Sector of the domain the entity belongs to, if any.
    fn home_sector(&self, id: EntityId) -> Option<Vec2I>;
    fn team_population(&self, team: TeamId) -> usize;
    /// Mid-animation; the agent must not act this frame.
    fn action_locked(&self, id: EntityId) -> bool;
}

/// Map and sector metadata.
pub trait MapInfo {
    fn sector_info(&self, sector: Vec2I) -> Option<SectorInfo>;
    fn player_home(&self) -> Option<PlayerHome>;
    /// Summed growth stage of corrupted plants inside `bounds`.
    fn corruption(&self, bounds: Rect2I) -> u32;
    /// Tradeable crystal held by a team.
    fn stockpile(&self, team: TeamId) -> u32;
    /// Land that can take a building (no rock, inside the map).
    fn is_buildable(&self, cell: Vec2I) -> bool;
    fn is_paved(&self, cell: Vec2I) -> bool;
    /// Building or plant standing on `cell`.
    fn occupant(&self, cell: Vec2I) -> Option<EntityId>;
    /// Share of a farm's grow area that is actually growing, in `[0, 1]`.
    fn farm_efficiency(&self, farm: EntityId) -> f32;
}

pub trait SpatialQuery {
    /// Entities within `radius` of `center` accepted by `filter`, nearest
    /// first (ties by id).
    fn query_near(
        &self,
        center: Vec2F,
        radius: f32,
        filter: &dyn Fn(&EntityInfo) -> bool,
    ) -> Vec<EntityId>;
}

pub trait Navigation {
    fn has_straight_path(&self, from: Vec2F, to: Vec2F) -> bool;
    fn calc_path(&self, from: Vec2F, to: Vec2F) -> Option<f32>;
    /// Best standing spot to work on `target` and the cost to get there.
    fn calc_work_path(&self, from: Vec2F, target: Rect2I) -> Option<(Vec2F, f32)>;
}

pub trait BuildingRegistry {
    fn find_building(
        &self,
        kind: StructureKind,
        sector: Vec2I,
        mode: FindMode,
        near: Vec2F,
    ) -> Option<EntityId>;
    fn building_counts(&self, sector: Vec2I) -> BuildingCounts;
    fn buildings_in_sector(&self, sector: Vec2I) -> Vec<EntityId>;
    fn building_info(&self, id: EntityId) -> Option<BuildingInfo>;
    /// The building whose porch is `cell`.
    fn query_porch(&self, cell: Vec2I) -> Option<EntityId>;
}

pub trait WorkQueue {
    /// Queue an order; `false` if one already exists at `pos`.
    fn add_action(&mut self, pos: Vec2I, kind: StructureKind, rotation: i32, variant: u32) -> bool;
    fn has_task(&self, pos: Vec2I) -> bool;
    fn remove_task(&mut self, pos: Vec2I);
    fn jobs(&self, sector: Vec2I) -> Vec<WorkJob>;
}

pub trait Economy {
    /// Move `amount` from `from` into `to`.  `false` (and no transfer) if
    /// `from` cannot cover it.
    fn deposit(&mut self, to: WalletId, from: WalletId, amount: u32) -> bool;
    fn can_withdraw(&self, wallet: WalletId, amount: u32) -> bool;
    fn balance(&self, wallet: WalletId) -> u32;
}

/// Side-effecting requests.  The world validates and may refuse any of them.
pub trait Commands {
    fn set_destination(&mut self, id: EntityId, dest: Vec2F);
    fn stop(&mut self, id: EntityId);
    fn is_moving(&self, id: EntityId) -> bool;

    fn melee(&mut self, attacker: EntityId, target: EntityId) -> bool;
    fn shoot(&mut self, attacker: EntityId, target: EntityId) -> bool;
    fn damage(&mut self, target: EntityId, amount: f32, source: Option<EntityId>);

    fn pickup(&mut self, agent: EntityId, item: EntityId) -> bool;
    fn eat(&mut self, agent: EntityId) -> bool;
    fn use_building(&mut self, agent: EntityId, building: EntityId) -> bool;
    fn repair(&mut self, agent: EntityId, building: EntityId) -> bool;

    fn construct(
        &mut self,
        pos: Vec2I,
        kind: StructureKind,
        rotation: i32,
        team: TeamId,
    ) -> Option<EntityId>;
    /// Apply a tile edit: `Clear` removes rock and removable structures,
    /// `Pave` paves, `Ice` raises rock.
    fn edit_tile(&mut self, pos: Vec2I, kind: StructureKind) -> bool;

    fn enter_cell(&mut self, agent: EntityId, cell: Vec2I) -> CellEffects;
    fn visit_flag(&mut self, agent: EntityId, pos: Vec2I) -> bool;

    fn spawn(&mut self, spec: SpawnSpec) -> EntityId;
    fn despawn(&mut self, id: EntityId);
    fn set_team(&mut self, id: EntityId, team: TeamId);
    fn send(&mut self, to: EntityId, msg: AgentMessage);

    /// Run the world's own simulation (movement, cooldowns) forward.
    fn advance(&mut self, delta: Millis);
    fn drain_events(&mut self) -> Vec<WorldEvent>;
}

/// Everything the scheduler needs from its surroundings.
pub trait World:
    EntityAccess + MapInfo + SpatialQuery + Navigation + BuildingRegistry + WorkQueue + Economy + Commands
{
}

impl<T> World for T where
    T: EntityAccess
        + MapInfo
        + SpatialQuery
        + Navigation
        + BuildingRegistry
        + WorkQueue
        + Economy
        + Commands
{
}
