//! `GridWorld`, an in-memory world that implements every collaborator trait.
//!
//! It exists so the scheduler can be exercised end to end without a game
//! engine: tests and the demo binary build a small map, drop units and
//! buildings on it, and hand it to the driver.  It is deliberately simple.
//! Combat is a flat damage roll, movement is a fixed-speed walk along a
//! Dijkstra path, and the economy is a table of integer wallets.
//!
//! Entities live in a `BTreeMap` so every iteration (queries, movement,
//! building searches) happens in id order and a run is reproducible.

mod index;
mod movement;
mod path;

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use ut_core::geo::{inner_sector_bounds, sector_bounds, sector_center, to_sector, SECTOR_SIZE};
use ut_core::{EntityId, Millis, Personality, Rect2I, Species, StructureKind, TeamId, Vec2F, Vec2I};

use crate::entity::{
    porch_cell, BuildingCounts, BuildingInfo, CellEffects, CoreInfo, EntityInfo, EntityKind,
    FindMode, Inventory, ItemKind, Loadout, MeleeWeapon, PlayerHome, Port, Relation, SectorInfo,
    SpawnSpec, WalletId, WorkJob,
};
use crate::error::{WorldError, WorldResult};
use crate::message::{AgentMessage, WorldEvent};
use crate::world::{
    BuildingRegistry, Commands, Economy, EntityAccess, MapInfo, Navigation, SpatialQuery,
    WorkQueue,
};

use index::SpatialIndex;
use movement::{Mover, StepOutcome};
use path::{dijkstra, PAVED_STEP_COST, STEP_COST};

const MELEE_REACH: f32 = 1.5;
const MELEE_DAMAGE: f32 = 0.25;
const SHOT_DAMAGE: f32 = 0.2;
const REPAIR_AMOUNT: f32 = 0.2;
const FLAG_MORALE_RADIUS: i32 = 3;
const FLAG_MORALE: f64 = 0.02;
const CORRUPTION_MORALE: f64 = -0.02;
const DEFAULT_SLOTS: u32 = 4;

#[derive(Clone, Copy, Debug, Default)]
struct Tile {
    rock:  bool,
    paved: bool,
}

/// Full state of one entity.
#[derive(Clone, Debug)]
pub struct Body {
    pub info:        EntityInfo,
    /// Cells covered; a single cell for everything but buildings.
    pub bounds:      Rect2I,
    pub loadout:     Loadout,
    pub inventory:   Inventory,
    pub personality: Personality,
    pub home:        Option<Vec2I>,
    pub locked:      bool,
    pub rotation:    i32,
    pub stock:       u32,
    pub zone_fit:    f32,
    pub efficiency:  f32,
}

impl Body {
    fn new(kind: EntityKind, team: TeamId, pos: Vec2F, bounds: Rect2I) -> Self {
        let mobile = matches!(kind, EntityKind::Mob(_));
        Self {
            info: EntityInfo {
                id: EntityId::INVALID,
                kind,
                team,
                pos,
                heading: Vec2F::new(0.0, 1.0),
                hp_fraction: 1.0,
            },
            bounds,
            loadout: if mobile {
                Loadout { melee: Some(MeleeWeapon { ready: true }), ranged: None }
            } else {
                Loadout::default()
            },
            inventory: Inventory {
                free_slots: if mobile { DEFAULT_SLOTS } else { 0 },
                ..Inventory::default()
            },
            personality: Personality::default(),
            home: None,
            locked: false,
            rotation: 0,
            stock: 0,
            zone_fit: 0.0,
            efficiency: 1.0,
        }
    }

    fn is_building(&self) -> bool {
        matches!(self.info.kind, EntityKind::Building(_))
    }

    /// Distance from `from` to the nearest point of this body's footprint.
    fn reach_from(&self, from: Vec2F) -> f32 {
        if !self.is_building() {
            return from.distance(self.info.pos);
        }
        let min = Vec2F::new(self.bounds.min.x as f32, self.bounds.min.y as f32);
        let max = Vec2F::new(self.bounds.max.x as f32 + 1.0, self.bounds.max.y as f32 + 1.0);
        let nearest = Vec2F::new(from.x.clamp(min.x, max.x), from.y.clamp(min.y, max.y));
        from.distance(nearest)
    }
}

/// In-memory reference world.
pub struct GridWorld {
    size:        i32,
    tiles:       Vec<Tile>,
    bodies:      BTreeMap<EntityId, Body>,
    next_id:     u32,
    /// Building footprints: cell → building.
    footprint:   FxHashMap<Vec2I, EntityId>,
    plants:      FxHashMap<Vec2I, EntityId>,
    porches:     FxHashMap<Vec2I, EntityId>,
    movers:      BTreeMap<EntityId, Mover>,
    index:       SpatialIndex,
    relations:   FxHashMap<(TeamId, TeamId), Relation>,
    wallets:     FxHashMap<WalletId, u32>,
    stockpiles:  FxHashMap<TeamId, u32>,
    sectors:     FxHashMap<Vec2I, SectorInfo>,
    player_home: Option<PlayerHome>,
    jobs:        BTreeMap<Vec2I, WorkJob>,
    next_job:    u32,
    events:      Vec<WorldEvent>,
    elapsed_ms:  u64,
}

impl GridWorld {
    /// A blank map of `sectors × sectors` sectors.
    pub fn new(sectors: i32) -> Self {
        let size = sectors.max(1) * SECTOR_SIZE;
        Self {
            size,
            tiles: vec![Tile::default(); (size * size) as usize],
            bodies: BTreeMap::new(),
            next_id: 1,
            footprint: FxHashMap::default(),
            plants: FxHashMap::default(),
            porches: FxHashMap::default(),
            movers: BTreeMap::new(),
            index: SpatialIndex::default(),
            relations: FxHashMap::default(),
            wallets: FxHashMap::default(),
            stockpiles: FxHashMap::default(),
            sectors: FxHashMap::default(),
            player_home: None,
            jobs: BTreeMap::new(),
            next_job: 1,
            events: Vec::new(),
            elapsed_ms: 0,
        }
    }

    /// Cells along one side of the map.
    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    #[inline]
    pub fn in_bounds(&self, cell: Vec2I) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.size && cell.y < self.size
    }

    // ── Population ───────────────────────────────────────────────────────

    pub fn add_mob(&mut self, species: Species, team: TeamId, pos: Vec2F) -> EntityId {
        let body = Body::new(EntityKind::Mob(species), team, pos, Rect2I::from_cell(pos.to_cell()));
        self.insert(body, false)
    }

    /// Place a finished building with its lower-left corner on `pos`.
    pub fn add_building(
        &mut self,
        kind: StructureKind,
        team: TeamId,
        pos: Vec2I,
        rotation: i32,
    ) -> WorldResult<EntityId> {
        let bounds = self.check_footprint(kind, pos)?;
        let mut body = Body::new(EntityKind::Building(kind), team, bounds.center(), bounds);
        body.rotation = rotation;
        Ok(self.insert(body, false))
    }

    pub fn add_item(&mut self, kind: ItemKind, pos: Vec2F) -> EntityId {
        let body = Body::new(EntityKind::Item(kind), TeamId::ROGUE, pos, Rect2I::from_cell(pos.to_cell()));
        self.insert(body, false)
    }

    pub fn add_plant(&mut self, cell: Vec2I, stage: u8, evil: bool) -> WorldResult<EntityId> {
        if !self.in_bounds(cell) {
            return Err(WorldError::OutOfBounds(cell));
        }
        if self.occupant(cell).is_some() {
            return Err(WorldError::Blocked(cell));
        }
        let body = Body::new(
            EntityKind::Plant { stage, evil },
            TeamId::ROGUE,
            cell.center(),
            Rect2I::from_cell(cell),
        );
        Ok(self.insert(body, false))
    }

    pub fn add_flag(&mut self, cell: Vec2I, team: TeamId) -> EntityId {
        let body = Body::new(EntityKind::Flag, team, cell.center(), Rect2I::from_cell(cell));
        self.insert(body, false)
    }

    /// Register a core at the centre of `sector` with one port per edge and
    /// a straight tile path from the core to each port.
    pub fn add_core(&mut self, sector: Vec2I, team: TeamId) -> WorldResult<()> {
        let centre = sector_center(sector);
        if !self.in_bounds(centre) {
            return Err(WorldError::OutOfBounds(centre));
        }
        let bounds = sector_bounds(sector);
        let exits = [
            (0u8, Vec2I::new(0, 1), Vec2I::new(centre.x, bounds.max.y)),
            (1, Vec2I::new(1, 0), Vec2I::new(bounds.max.x, centre.y)),
            (2, Vec2I::new(0, -1), Vec2I::new(centre.x, bounds.min.y)),
            (3, Vec2I::new(-1, 0), Vec2I::new(bounds.min.x, centre.y)),
        ];
        let ports = exits
            .iter()
            .map(|&(id, dir, pos)| {
                let mut path = Vec::new();
                let mut cell = centre + dir;
                while cell != pos {
                    path.push(cell);
                    cell += dir;
                }
                path.push(pos);
                Port { id, pos, path }
            })
            .collect();
        self.sectors.insert(
            sector,
            SectorInfo {
                sector,
                core: Some(CoreInfo { pos: centre, team, in_use: team != TeamId::ROGUE }),
                ports,
            },
        );
        Ok(())
    }

    pub fn remove_core(&mut self, sector: Vec2I) -> WorldResult<()> {
        let info = self.sectors.get_mut(&sector).ok_or(WorldError::NoCore(sector))?;
        info.core = None;
        Ok(())
    }

    pub fn set_player_home(&mut self, sector: Vec2I, team: TeamId, temples: u32) {
        self.player_home = Some(PlayerHome { sector, team, temples });
    }

    pub fn clear_player_home(&mut self) {
        self.player_home = None;
    }

    // ── Tuning ───────────────────────────────────────────────────────────

    pub fn set_rock(&mut self, cell: Vec2I, rock: bool) {
        if let Some(t) = self.tile_mut(cell) {
            t.rock = rock;
        }
    }

    pub fn set_pave(&mut self, cell: Vec2I, paved: bool) {
        if let Some(t) = self.tile_mut(cell) {
            t.paved = paved;
        }
    }

    /// Symmetric override of the default team relation.
    pub fn set_relation(&mut self, a: TeamId, b: TeamId, relation: Relation) {
        self.relations.insert(team_pair(a, b), relation);
    }

    pub fn set_loadout(&mut self, id: EntityId, loadout: Loadout) -> WorldResult<()> {
        self.body_mut(id)?.loadout = loadout;
        Ok(())
    }

    pub fn set_inventory(&mut self, id: EntityId, inventory: Inventory) -> WorldResult<()> {
        self.body_mut(id)?.inventory = inventory;
        Ok(())
    }

    pub fn set_personality(&mut self, id: EntityId, personality: Personality) -> WorldResult<()> {
        self.body_mut(id)?.personality = personality;
        Ok(())
    }

    pub fn set_home(&mut self, id: EntityId, sector: Option<Vec2I>) -> WorldResult<()> {
        self.body_mut(id)?.home = sector;
        Ok(())
    }

    pub fn set_hp(&mut self, id: EntityId, hp: f32) -> WorldResult<()> {
        self.body_mut(id)?.info.hp_fraction = hp.clamp(0.0, 1.0);
        Ok(())
    }

    pub fn set_heading(&mut self, id: EntityId, heading: Vec2F) -> WorldResult<()> {
        self.body_mut(id)?.info.heading = heading.normalized();
        Ok(())
    }

    pub fn set_locked(&mut self, id: EntityId, locked: bool) -> WorldResult<()> {
        self.body_mut(id)?.locked = locked;
        Ok(())
    }

    pub fn set_stock(&mut self, id: EntityId, stock: u32) -> WorldResult<()> {
        self.body_mut(id)?.stock = stock;
        Ok(())
    }

    pub fn set_zone_fit(&mut self, id: EntityId, fit: f32) -> WorldResult<()> {
        self.body_mut(id)?.zone_fit = fit.clamp(-1.0, 1.0);
        Ok(())
    }

    pub fn set_farm_efficiency(&mut self, id: EntityId, efficiency: f32) -> WorldResult<()> {
        self.body_mut(id)?.efficiency = efficiency.clamp(0.0, 1.0);
        Ok(())
    }

    pub fn set_stockpile(&mut self, team: TeamId, amount: u32) {
        self.stockpiles.insert(team, amount);
    }

    /// Set a wallet's balance outright.
    pub fn fund(&mut self, wallet: WalletId, amount: u32) {
        self.wallets.insert(wallet, amount);
    }

    pub fn teleport(&mut self, id: EntityId, pos: Vec2F) -> WorldResult<()> {
        let body = self.body_mut(id)?;
        body.info.pos = pos;
        body.bounds = Rect2I::from_cell(pos.to_cell());
        self.reindex();
        Ok(())
    }

    // ── Inspection ───────────────────────────────────────────────────────

    pub fn body(&self, id: EntityId) -> Option<&Body> {
        self.bodies.get(&id)
    }

    pub fn position(&self, id: EntityId) -> Option<Vec2F> {
        self.bodies.get(&id).map(|b| b.info.pos)
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityInfo> {
        self.bodies.values().map(|b| &b.info)
    }

    // ── Internals ────────────────────────────────────────────────────────

    fn tile(&self, cell: Vec2I) -> Option<&Tile> {
        if !self.in_bounds(cell) {
            return None;
        }
        self.tiles.get((cell.y * self.size + cell.x) as usize)
    }

    fn tile_mut(&mut self, cell: Vec2I) -> Option<&mut Tile> {
        if !self.in_bounds(cell) {
            return None;
        }
        let i = (cell.y * self.size + cell.x) as usize;
        self.tiles.get_mut(i)
    }

    fn body_mut(&mut self, id: EntityId) -> WorldResult<&mut Body> {
        self.bodies.get_mut(&id).ok_or(WorldError::UnknownEntity(id))
    }

    fn passable(&self, cell: Vec2I) -> bool {
        matches!(self.tile(cell), Some(t) if !t.rock) && !self.footprint.contains_key(&cell)
    }

    fn step_cost(&self, cell: Vec2I) -> Option<u32> {
        if !self.passable(cell) {
            return None;
        }
        let paved = self.tile(cell).is_some_and(|t| t.paved);
        Some(if paved { PAVED_STEP_COST } else { STEP_COST })
    }

    fn find_path(&self, from: Vec2F, to: Vec2F) -> Option<path::GridPath> {
        let goal = to.to_cell();
        dijkstra(self.size, from.to_cell(), |c| c == goal, |c| self.step_cost(c))
    }

    fn check_footprint(&self, kind: StructureKind, pos: Vec2I) -> WorldResult<Rect2I> {
        let size = kind.size();
        let bounds = Rect2I::from_pair(pos, pos + Vec2I::new(size - 1, size - 1));
        for cell in bounds.cells() {
            if !self.in_bounds(cell) {
                return Err(WorldError::OutOfBounds(cell));
            }
            if !self.is_buildable(cell) || self.occupant(cell).is_some() {
                return Err(WorldError::Blocked(cell));
            }
        }
        Ok(bounds)
    }

    fn insert(&mut self, mut body: Body, announce: bool) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        body.info.id = id;
        match body.info.kind {
            EntityKind::Building(kind) => {
                for cell in body.bounds.cells() {
                    self.footprint.insert(cell, id);
                }
                if kind.has_porch() {
                    self.porches.insert(porch_cell(body.bounds, body.rotation), id);
                }
            }
            EntityKind::Plant { .. } => {
                self.plants.insert(body.bounds.min, id);
            }
            _ => {}
        }
        self.bodies.insert(id, body);
        if announce {
            self.events.push(WorldEvent::Spawned(id));
        }
        self.reindex();
        id
    }

    fn remove(&mut self, id: EntityId) -> Option<Body> {
        let body = self.bodies.remove(&id)?;
        self.footprint.retain(|_, v| *v != id);
        self.plants.retain(|_, v| *v != id);
        self.porches.retain(|_, v| *v != id);
        self.movers.remove(&id);
        self.events.push(WorldEvent::Despawned(id));
        self.reindex();
        Some(body)
    }

    fn reindex(&mut self) {
        let entries = self.bodies.values().map(|b| (b.info.id, b.info.pos));
        self.index.rebuild(entries);
    }

    fn message(&mut self, to: EntityId, msg: AgentMessage) {
        self.events.push(WorldEvent::Message { to, msg });
    }
}

#[inline]
fn team_pair(a: TeamId, b: TeamId) -> (TeamId, TeamId) {
    if a <= b { (a, b) } else { (b, a) }
}

// ── EntityAccess ──────────────────────────────────────────────────────────────

impl EntityAccess for GridWorld {
    fn mobs(&self) -> Vec<EntityId> {
        self.bodies
            .values()
            .filter(|b| b.info.is_mobile())
            .map(|b| b.info.id)
            .collect()
    }

    fn entity(&self, id: EntityId) -> Option<EntityInfo> {
        self.bodies.get(&id).map(|b| b.info.clone())
    }

    fn relation(&self, a: TeamId, b: TeamId) -> Relation {
        if let Some(r) = self.relations.get(&team_pair(a, b)) {
            return *r;
        }
        if a == b { Relation::Friend } else { Relation::Enemy }
    }

    fn loadout(&self, id: EntityId) -> Loadout {
        self.bodies.get(&id).map(|b| b.loadout).unwrap_or_default()
    }

    fn inventory(&self, id: EntityId) -> Inventory {
        self.bodies.get(&id).map(|b| b.inventory).unwrap_or_default()
    }

    fn personality(&self, id: EntityId) -> Personality {
        self.bodies.get(&id).map(|b| b.personality).unwrap_or_default()
    }

    fn home_sector(&self, id: EntityId) -> Option<Vec2I> {
        self.bodies.get(&id).and_then(|b| b.home)
    }

    fn team_population(&self, team: TeamId) -> usize {
        self.bodies
            .values()
            .filter(|b| b.info.is_mobile() && b.info.team == team)
            .count()
    }

    fn action_locked(&self, id: EntityId) -> bool {
        self.bodies.get(&id).is_some_and(|b| b.locked)
    }
}

// ── MapInfo ───────────────────────────────────────────────────────────────────

impl MapInfo for GridWorld {
    fn sector_info(&self, sector: Vec2I) -> Option<SectorInfo> {
        self.sectors.get(&sector).cloned()
    }

    fn player_home(&self) -> Option<PlayerHome> {
        self.player_home
    }

    fn corruption(&self, bounds: Rect2I) -> u32 {
        self.plants
            .iter()
            .filter(|(cell, _)| bounds.contains(**cell))
            .filter_map(|(_, id)| match self.bodies.get(id)?.info.kind {
                EntityKind::Plant { stage, evil: true } => Some(stage as u32),
                _ => None,
            })
            .sum()
    }

    fn stockpile(&self, team: TeamId) -> u32 {
        self.stockpiles.get(&team).copied().unwrap_or(0)
    }

    fn is_buildable(&self, cell: Vec2I) -> bool {
        matches!(self.tile(cell), Some(t) if !t.rock)
            && inner_sector_bounds(to_sector(cell)).contains(cell)
    }

    fn is_paved(&self, cell: Vec2I) -> bool {
        self.tile(cell).is_some_and(|t| t.paved)
    }

    fn occupant(&self, cell: Vec2I) -> Option<EntityId> {
        self.footprint.get(&cell).or_else(|| self.plants.get(&cell)).copied()
    }

    fn farm_efficiency(&self, farm: EntityId) -> f32 {
        self.bodies.get(&farm).map_or(0.0, |b| b.efficiency)
    }
}

// ── SpatialQuery ──────────────────────────────────────────────────────────────

impl SpatialQuery for GridWorld {
    fn query_near(
        &self,
        center: Vec2F,
        radius: f32,
        filter: &dyn Fn(&EntityInfo) -> bool,
    ) -> Vec<EntityId> {
        let mut hits: Vec<(f32, EntityId)> = self
            .index
            .within(center, radius)
            .filter_map(|id| self.bodies.get(&id))
            .filter(|b| filter(&b.info))
            .map(|b| (b.info.pos.distance(center), b.info.id))
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        hits.into_iter().map(|(_, id)| id).collect()
    }
}

// ── Navigation ────────────────────────────────────────────────────────────────

impl Navigation for GridWorld {
    fn has_straight_path(&self, from: Vec2F, to: Vec2F) -> bool {
        let (start, end) = (from.to_cell(), to.to_cell());
        let steps = (from.distance(to) / 0.25).ceil() as i32;
        (1..steps).all(|i| {
            let t = i as f32 / steps as f32;
            let cell = (from + (to - from) * t).to_cell();
            cell == start || cell == end || self.passable(cell)
        })
    }

    fn calc_path(&self, from: Vec2F, to: Vec2F) -> Option<f32> {
        self.find_path(from, to).map(|p| p.cells_cost())
    }

    fn calc_work_path(&self, from: Vec2F, target: Rect2I) -> Option<(Vec2F, f32)> {
        let ring = target.outset(1);
        let path = dijkstra(
            self.size,
            from.to_cell(),
            |c| ring.contains(c) && self.passable(c),
            |c| self.step_cost(c),
        )?;
        let stand = path.cells.last().copied().unwrap_or(from.to_cell());
        Some((stand.center(), path.cells_cost()))
    }
}

// ── BuildingRegistry ──────────────────────────────────────────────────────────

impl BuildingRegistry for GridWorld {
    fn find_building(
        &self,
        kind: StructureKind,
        sector: Vec2I,
        mode: FindMode,
        near: Vec2F,
    ) -> Option<EntityId> {
        let mut matches = self.bodies.values().filter(|b| {
            b.info.structure() == Some(kind) && to_sector(b.bounds.min) == sector
        });
        match mode {
            FindMode::Any => matches.next().map(|b| b.info.id),
            FindMode::Nearest => matches
                .min_by(|a, b| {
                    a.info.pos.distance(near).total_cmp(&b.info.pos.distance(near))
                })
                .map(|b| b.info.id),
        }
    }

    fn building_counts(&self, sector: Vec2I) -> BuildingCounts {
        let mut counts = BuildingCounts::default();
        for b in self.bodies.values() {
            if let Some(kind) = b.info.structure() {
                if to_sector(b.bounds.min) == sector {
                    counts.add(kind);
                }
            }
        }
        counts
    }

    fn buildings_in_sector(&self, sector: Vec2I) -> Vec<EntityId> {
        self.bodies
            .values()
            .filter(|b| b.is_building() && to_sector(b.bounds.min) == sector)
            .map(|b| b.info.id)
            .collect()
    }

    fn building_info(&self, id: EntityId) -> Option<BuildingInfo> {
        let b = self.bodies.get(&id)?;
        let kind = b.info.structure()?;
        Some(BuildingInfo {
            id,
            kind,
            team: b.info.team,
            bounds: b.bounds,
            porch: kind.has_porch().then(|| porch_cell(b.bounds, b.rotation)),
            rotation: b.rotation,
            hp_fraction: b.info.hp_fraction,
            stock: b.stock,
            zone_fit: b.zone_fit,
        })
    }

    fn query_porch(&self, cell: Vec2I) -> Option<EntityId> {
        self.porches.get(&cell).copied()
    }
}

// ── WorkQueue ─────────────────────────────────────────────────────────────────

impl WorkQueue for GridWorld {
    fn add_action(&mut self, pos: Vec2I, kind: StructureKind, rotation: i32, variant: u32) -> bool {
        if self.jobs.contains_key(&pos) || !self.in_bounds(pos) {
            return false;
        }
        let id = self.next_job;
        self.next_job += 1;
        self.jobs.insert(pos, WorkJob { id, pos, structure: kind, rotation, variant });

        let sector = to_sector(pos);
        let workers: Vec<EntityId> = self
            .bodies
            .values()
            .filter(|b| b.info.species().is_some_and(|s| s.does_work()) && b.home == Some(sector))
            .map(|b| b.info.id)
            .collect();
        for w in workers {
            self.message(w, AgentMessage::WorkQueueUpdated);
        }
        true
    }

    fn has_task(&self, pos: Vec2I) -> bool {
        self.jobs.contains_key(&pos)
    }

    fn remove_task(&mut self, pos: Vec2I) {
        self.jobs.remove(&pos);
    }

    fn jobs(&self, sector: Vec2I) -> Vec<WorkJob> {
        self.jobs.values().filter(|j| to_sector(j.pos) == sector).copied().collect()
    }
}

// ── Economy ───────────────────────────────────────────────────────────────────

impl Economy for GridWorld {
    fn deposit(&mut self, to: WalletId, from: WalletId, amount: u32) -> bool {
        if !self.can_withdraw(from, amount) {
            return false;
        }
        *self.wallets.entry(from).or_insert(0) -= amount;
        *self.wallets.entry(to).or_insert(0) += amount;
        true
    }

    fn can_withdraw(&self, wallet: WalletId, amount: u32) -> bool {
        self.balance(wallet) >= amount
    }

    fn balance(&self, wallet: WalletId) -> u32 {
        self.wallets.get(&wallet).copied().unwrap_or(0)
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

impl Commands for GridWorld {
    fn set_destination(&mut self, id: EntityId, dest: Vec2F) {
        let Some(from) = self.position(id) else { return };
        self.movers.remove(&id);
        match self.find_path(from, dest) {
            Some(path) => {
                self.movers.insert(id, Mover::new(dest, path.cells));
            }
            None => {
                tracing::trace!(%id, ?dest, "no path");
                self.message(id, AgentMessage::DestinationBlocked);
            }
        }
    }

    fn stop(&mut self, id: EntityId) {
        self.movers.remove(&id);
    }

    fn is_moving(&self, id: EntityId) -> bool {
        self.movers.contains_key(&id)
    }

    fn melee(&mut self, attacker: EntityId, target: EntityId) -> bool {
        let (Some(a), Some(t)) = (self.bodies.get(&attacker), self.bodies.get(&target)) else {
            return false;
        };
        let ready = a.loadout.melee.is_some_and(|m| m.ready);
        if !ready || t.reach_from(a.info.pos) > MELEE_REACH {
            return false;
        }
        self.damage(target, MELEE_DAMAGE, Some(attacker));
        true
    }

    fn shoot(&mut self, attacker: EntityId, target: EntityId) -> bool {
        let (Some(a), Some(t)) = (self.bodies.get(&attacker), self.bodies.get(&target)) else {
            return false;
        };
        let Some(gun) = a.loadout.ranged else { return false };
        let (from, to) = (a.info.pos, t.info.pos);
        if !gun.has_ammo || from.distance(to) > gun.effective_range * 2.0 {
            return false;
        }
        if !self.has_straight_path(from, to) {
            return false;
        }
        self.damage(target, SHOT_DAMAGE, Some(attacker));
        true
    }

    fn damage(&mut self, target: EntityId, amount: f32, source: Option<EntityId>) {
        let Some(body) = self.bodies.get_mut(&target) else { return };
        body.info.hp_fraction = (body.info.hp_fraction - amount).max(0.0);
        let dead = body.info.hp_fraction <= 0.0;
        let mobile = body.info.is_mobile();

        if let Some(source) = source.filter(|s| *s != target) {
            if mobile && !dead {
                self.message(target, AgentMessage::Damaged { source });
            }
        }
        if dead {
            if let Some(body) = self.remove(target) {
                if let EntityKind::Building(kind) = body.info.kind {
                    self.events.push(WorldEvent::BuildingLost {
                        id: target,
                        kind,
                        pos: body.bounds.min,
                        rotation: body.rotation,
                        team: body.info.team,
                    });
                }
            }
        }
    }

    fn pickup(&mut self, agent: EntityId, item: EntityId) -> bool {
        let (Some(a), Some(i)) = (self.bodies.get(&agent), self.bodies.get(&item)) else {
            return false;
        };
        let Some(kind) = i.info.item() else { return false };
        if a.info.pos.distance(i.info.pos) > MELEE_REACH {
            return false;
        }
        let mut inv = a.inventory;
        match kind {
            ItemKind::Gold => inv.gold += 1,
            ItemKind::Crystal => inv.crystals += 1,
            ItemKind::Fruit | ItemKind::Elixir | ItemKind::Weapon => {
                if !inv.has_space() {
                    return false;
                }
                inv.free_slots -= 1;
                match kind {
                    ItemKind::Fruit => inv.fruit += 1,
                    ItemKind::Elixir => inv.food += 1,
                    _ => {}
                }
            }
        }
        if let Some(a) = self.bodies.get_mut(&agent) {
            a.inventory = inv;
        }
        self.remove(item);
        true
    }

    fn eat(&mut self, agent: EntityId) -> bool {
        let Some(a) = self.bodies.get_mut(&agent) else { return false };
        if a.inventory.food == 0 {
            return false;
        }
        a.inventory.food -= 1;
        a.inventory.free_slots += 1;
        true
    }

    fn use_building(&mut self, agent: EntityId, building: EntityId) -> bool {
        let Some(pos) = self.position(agent) else { return false };
        let Some(carried) = self.bodies.get(&agent).map(|a| a.inventory) else { return false };
        let Some(b) = self.bodies.get_mut(&building) else { return false };
        if !b.is_building() || b.reach_from(pos) > MELEE_REACH {
            return false;
        }
        let team = b.info.team;
        let mut left = carried;
        match b.info.structure() {
            Some(StructureKind::Bar) => {
                if b.stock == 0 {
                    return false;
                }
                b.stock -= 1;
            }
            // Cargo drop-offs.
            Some(StructureKind::Distillery) => {
                b.stock += left.fruit;
                left.free_slots += left.fruit;
                left.fruit = 0;
            }
            Some(StructureKind::Vault) => {
                *self.wallets.entry(WalletId::Team(team)).or_insert(0) += left.gold;
                *self.stockpiles.entry(team).or_insert(0) += left.crystals;
                left.gold = 0;
                left.crystals = 0;
            }
            _ => {}
        }
        if left != carried {
            if let Some(a) = self.bodies.get_mut(&agent) {
                a.inventory = left;
            }
        }
        true
    }

    fn repair(&mut self, agent: EntityId, building: EntityId) -> bool {
        let Some(pos) = self.position(agent) else { return false };
        let Some(b) = self.bodies.get_mut(&building) else { return false };
        if !b.is_building() || b.info.hp_fraction >= 1.0 || b.reach_from(pos) > MELEE_REACH {
            return false;
        }
        b.info.hp_fraction = (b.info.hp_fraction + REPAIR_AMOUNT).min(1.0);
        true
    }

    fn construct(
        &mut self,
        pos: Vec2I,
        kind: StructureKind,
        rotation: i32,
        team: TeamId,
    ) -> Option<EntityId> {
        if !kind.is_building() {
            return None;
        }
        let bounds = self.check_footprint(kind, pos).ok()?;
        let mut body = Body::new(EntityKind::Building(kind), team, bounds.center(), bounds);
        body.rotation = rotation;
        Some(self.insert(body, true))
    }

    fn edit_tile(&mut self, pos: Vec2I, kind: StructureKind) -> bool {
        if !self.in_bounds(pos) {
            return false;
        }
        match kind {
            StructureKind::Clear => {
                if let Some(id) = self.occupant(pos) {
                    self.remove(id);
                }
                self.set_rock(pos, false);
                true
            }
            StructureKind::Pave => {
                if self.occupant(pos).is_some() || self.tile(pos).is_some_and(|t| t.rock) {
                    return false;
                }
                self.set_pave(pos, true);
                true
            }
            StructureKind::Ice => {
                if self.occupant(pos).is_some() {
                    return false;
                }
                self.set_pave(pos, false);
                self.set_rock(pos, true);
                true
            }
            _ => false,
        }
    }

    fn enter_cell(&mut self, agent: EntityId, cell: Vec2I) -> CellEffects {
        let Some(team) = self.bodies.get(&agent).map(|b| b.info.team) else {
            return CellEffects::default();
        };
        let mut morale = 0.0;
        for b in self.bodies.values() {
            let d = b.bounds.min.chebyshev(cell);
            match b.info.kind {
                EntityKind::Flag if b.info.team == team && d <= FLAG_MORALE_RADIUS => {
                    morale += FLAG_MORALE
                }
                EntityKind::Plant { evil: true, .. } if d <= 1 => morale += CORRUPTION_MORALE,
                _ => {}
            }
        }
        CellEffects { morale }
    }

    fn visit_flag(&mut self, agent: EntityId, pos: Vec2I) -> bool {
        let Some(at) = self.position(agent) else { return false };
        let flag_here = self
            .bodies
            .values()
            .any(|b| b.info.kind == EntityKind::Flag && b.bounds.min == pos);
        flag_here && at.distance(pos.center()) <= MELEE_REACH
    }

    fn spawn(&mut self, spec: SpawnSpec) -> EntityId {
        let bounds = match spec.kind {
            EntityKind::Building(kind) => {
                let min = spec.pos.to_cell();
                Rect2I::from_pair(min, min + Vec2I::new(kind.size() - 1, kind.size() - 1))
            }
            _ => Rect2I::from_cell(spec.pos.to_cell()),
        };
        let mut body = Body::new(spec.kind, spec.team, spec.pos, bounds);
        body.home = spec.home;
        self.insert(body, true)
    }

    fn despawn(&mut self, id: EntityId) {
        self.remove(id);
    }

    fn set_team(&mut self, id: EntityId, team: TeamId) {
        if let Some(b) = self.bodies.get_mut(&id) {
            b.info.team = team;
        }
    }

    fn send(&mut self, to: EntityId, msg: AgentMessage) {
        self.message(to, msg);
    }

    fn advance(&mut self, delta: Millis) {
        self.elapsed_ms += delta as u64;
        let ids: Vec<EntityId> = self.movers.keys().copied().collect();
        for id in ids {
            let Some(mut mover) = self.movers.remove(&id) else { continue };
            let Some((mut pos, mut heading)) =
                self.bodies.get(&id).map(|b| (b.info.pos, b.info.heading))
            else {
                continue;
            };
            let outcome = mover.advance(&mut pos, &mut heading, delta, |c| self.passable(c));
            if let Some(b) = self.bodies.get_mut(&id) {
                b.info.pos = pos;
                b.info.heading = heading;
                b.bounds = Rect2I::from_cell(pos.to_cell());
            }
            match outcome {
                StepOutcome::Moving => {
                    self.movers.insert(id, mover);
                }
                StepOutcome::Arrived => self.message(id, AgentMessage::DestinationReached),
                StepOutcome::Blocked => self.message(id, AgentMessage::DestinationBlocked),
            }
        }
        self.reindex();
    }

    fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }
}
