//! Read-only snapshots the world hands to the scheduler.
//!
//! The scheduler never holds references into world storage.  Every query
//! returns a small owned value, so a cached `EntityId` that has gone stale
//! simply resolves to `None` next time.

use std::collections::BTreeMap;

use ut_core::geo::to_sector;
use ut_core::{EntityId, Rect2I, Species, StructureKind, TeamId, Vec2F, Vec2I};

/// How one team regards another.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Relation {
    Friend,
    Neutral,
    Enemy,
}

/// Things that can lie on the ground and be picked up.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemKind {
    Gold,
    Crystal,
    Fruit,
    Elixir,
    Weapon,
}

impl ItemKind {
    /// Worth picking up whenever it is seen, not only when foraging.
    pub fn is_loot(self) -> bool {
        matches!(self, ItemKind::Gold | ItemKind::Crystal | ItemKind::Weapon)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntityKind {
    Mob(Species),
    Building(StructureKind),
    Item(ItemKind),
    /// `evil` plants feed the corruption metric watched by rising plots.
    Plant { stage: u8, evil: bool },
    /// A rally marker placed by the player.
    Flag,
}

/// Snapshot of one entity.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityInfo {
    pub id:          EntityId,
    pub kind:        EntityKind,
    pub team:        TeamId,
    pub pos:         Vec2F,
    /// Unit vector the entity is facing.
    pub heading:     Vec2F,
    pub hp_fraction: f32,
}

impl EntityInfo {
    #[inline]
    pub fn species(&self) -> Option<Species> {
        match self.kind {
            EntityKind::Mob(sp) => Some(sp),
            _ => None,
        }
    }

    /// Mobs move; buildings, items, plants and flags do not.
    #[inline]
    pub fn is_mobile(&self) -> bool {
        matches!(self.kind, EntityKind::Mob(_))
    }

    #[inline]
    pub fn structure(&self) -> Option<StructureKind> {
        match self.kind {
            EntityKind::Building(k) => Some(k),
            _ => None,
        }
    }

    #[inline]
    pub fn item(&self) -> Option<ItemKind> {
        match self.kind {
            EntityKind::Item(k) => Some(k),
            _ => None,
        }
    }

    #[inline]
    pub fn cell(&self) -> Vec2I {
        self.pos.to_cell()
    }

    #[inline]
    pub fn sector(&self) -> Vec2I {
        to_sector(self.cell())
    }
}

// ── Equipment ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangedWeapon {
    /// Distance at which the hit chance crosses the "worth shooting" line.
    pub effective_range: f32,
    pub has_ammo:        bool,
    /// Off cooldown and able to fire this frame.
    pub ready:           bool,
    pub explosive:       bool,
}

#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeleeWeapon {
    pub ready: bool,
}

#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Loadout {
    pub melee:  Option<MeleeWeapon>,
    pub ranged: Option<RangedWeapon>,
}

/// Summary of what an entity carries.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Inventory {
    pub free_slots: u32,
    pub gold:       u32,
    pub crystals:   u32,
    /// Edible items carried for later.
    pub food:       u32,
    /// Harvested fruit waiting to go to a distillery.
    pub fruit:      u32,
}

impl Inventory {
    #[inline]
    pub fn has_space(&self) -> bool {
        self.free_slots > 0
    }
}

// ── Buildings and sectors ─────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct BuildingInfo {
    pub id:          EntityId,
    pub kind:        StructureKind,
    pub team:        TeamId,
    pub bounds:      Rect2I,
    pub porch:       Option<Vec2I>,
    pub rotation:    i32,
    pub hp_fraction: f32,
    /// Goods for sale (elixir at a bar, items at a market).
    pub stock:       u32,
    /// How well the building's surroundings match its zone, in `[-1, 1]`.
    pub zone_fit:    f32,
}

/// Porch cell of a building whose footprint is `bounds`, facing `rotation`
/// degrees (0 = +y, 90 = +x, 180 = −y, 270 = −x).
pub fn porch_cell(bounds: Rect2I, rotation: i32) -> Vec2I {
    match rotation.rem_euclid(360) {
        90 => Vec2I::new(bounds.max.x + 1, bounds.min.y),
        180 => Vec2I::new(bounds.min.x, bounds.min.y - 1),
        270 => Vec2I::new(bounds.min.x - 1, bounds.min.y),
        _ => Vec2I::new(bounds.min.x, bounds.max.y + 1),
    }
}

/// Search strategy for [`crate::BuildingRegistry::find_building`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum FindMode {
    Nearest,
    /// Any match; lets several agents spread over equivalent buildings.
    Any,
}

/// Per-kind building count for one sector.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildingCounts(pub BTreeMap<StructureKind, u32>);

impl BuildingCounts {
    #[inline]
    pub fn get(&self, kind: StructureKind) -> u32 {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    pub fn add(&mut self, kind: StructureKind) {
        *self.0.entry(kind).or_insert(0) += 1;
    }
}

/// A sector's exit and the precomputed tile path from the core to it.
#[derive(Clone, Debug, PartialEq)]
pub struct Port {
    /// 0 = north, 1 = east, 2 = south, 3 = west.
    pub id:   u8,
    pub pos:  Vec2I,
    /// Cells from just outside the core to `pos`, in walking order.
    pub path: Vec<Vec2I>,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CoreInfo {
    pub pos:    Vec2I,
    pub team:   TeamId,
    /// Someone currently controls the core.
    pub in_use: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SectorInfo {
    pub sector: Vec2I,
    pub core:   Option<CoreInfo>,
    pub ports:  Vec<Port>,
}

impl SectorInfo {
    pub fn port(&self, id: u8) -> Option<&Port> {
        self.ports.iter().find(|p| p.id == id)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PlayerHome {
    pub sector:  Vec2I,
    pub team:    TeamId,
    pub temples: u32,
}

/// One pending order in a domain's work queue.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WorkJob {
    pub id:        u32,
    pub pos:       Vec2I,
    pub structure: StructureKind,
    pub rotation:  i32,
    pub variant:   u32,
}

impl WorkJob {
    /// Cells the finished job will cover.
    pub fn bounds(&self) -> Rect2I {
        let size = self.structure.size();
        Rect2I::from_pair(self.pos, self.pos + Vec2I::new(size - 1, size - 1))
    }
}

// ── Economy ───────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WalletId {
    /// The reserve bank funds flow back to.
    Bank,
    Team(TeamId),
    Entity(EntityId),
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// What stepping onto a new cell did to the agent.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CellEffects {
    pub morale: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpawnSpec {
    pub kind: EntityKind,
    pub team: TeamId,
    pub pos:  Vec2F,
    pub home: Option<Vec2I>,
}
