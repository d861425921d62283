//! `DomainPlanner`: one faction's builder brain for the sector it holds.

use ut_core::geo::{inner_sector_bounds, sector_center, to_sector, SECTOR_SIZE};
use ut_core::{EntityId, Millis, Rect2I, SimRng, Species, StructureKind, TeamId, Ticker, Vec2I};
use ut_task::ReservationRegistry;
use ut_world::prelude::*;
use ut_world::{
    BuildingInfo, CoreInfo, EntityInfo, EntityKind, NewsEvent, NewsKind, NewsLog, SpawnSpec,
    WalletId,
};

use crate::road::{BuildZone, RoadMap, FARM_GROW_RAD, MAX_ROADS};
use crate::{Archetype, DomainError, DomainResult, PlanStep, QuotaTable, RebuildQueue};

pub const WORKER_COST: u32 = 20;
pub const PLANNER_PERIOD: Millis = 2000;
pub const PLANNER_JITTER: Millis = 1000;
/// Summed farm efficiency that keeps one distillery supplied.
pub const FARM_OUTPUT_PER_DISTILLERY: f32 = 1.5;
/// Crystals the team must hold before it builds an exchange.
pub const STOCKPILE_GATE: u32 = 8;
/// Natural and industrial buildings keep this many cells apart.
pub const ZONE_CONFLICT_RANGE: i32 = 3;
/// Road cells kept paved past the furthest building on that road.
pub const REPAVE_MARGIN: usize = 2;
/// Tile orders one step may queue.
const MAX_TILE_ORDERS: usize = 8;

pub struct DomainPlanner {
    team:           TeamId,
    sector:         Vec2I,
    archetype:      Archetype,
    quotas:         QuotaTable,
    roads:          RoadMap,
    /// Furthest road cell index with a building beside it, per road.
    build_distance: [usize; MAX_ROADS],
    ticker:         Ticker,
    rebuild:        RebuildQueue,
}

impl DomainPlanner {
    /// Read the sector's roads once and claim the ground already built on.
    pub fn new(
        team: TeamId,
        sector: Vec2I,
        archetype: Archetype,
        world: &dyn World,
        quotas: QuotaTable,
        rng: &mut SimRng,
    ) -> DomainResult<Self> {
        let info = world.sector_info(sector).ok_or(DomainError::NoCore(sector))?;
        if info.core.is_none() {
            return Err(DomainError::NoCore(sector));
        }
        let mut roads = RoadMap::from_sector(&info);
        for b in sector_buildings(world, sector) {
            roads.mark_used(b.bounds);
            if let Some(p) = b.porch {
                roads.mark_used(Rect2I::from_cell(p));
            }
        }

        let ticker = Ticker::new(PLANNER_PERIOD + rng.gen_range(0..PLANNER_JITTER));
        let rebuild = RebuildQueue::new(team, sector, rng);

        tracing::info!(team = %team, ?sector, %archetype, roads = roads.roads().len(), "domain planner created");
        Ok(Self {
            team,
            sector,
            archetype,
            quotas,
            roads,
            build_distance: [0; MAX_ROADS],
            ticker,
            rebuild,
        })
    }

    pub fn team(&self) -> TeamId {
        self.team
    }

    pub fn sector(&self) -> Vec2I {
        self.sector
    }

    pub fn archetype(&self) -> Archetype {
        self.archetype
    }

    pub fn roads(&self) -> &RoadMap {
        &self.roads
    }

    pub fn build_distance(&self) -> &[usize; MAX_ROADS] {
        &self.build_distance
    }

    pub fn rebuild(&self) -> &RebuildQueue {
        &self.rebuild
    }

    /// Remember a destroyed building of ours so it gets rebuilt.
    pub fn on_building_lost(&mut self, kind: StructureKind, pos: Vec2I, rotation: i32, team: TeamId) {
        self.rebuild.on_building_lost(kind, pos, rotation, team);
    }

    /// Advance the tickers; `true` if anything was queued or bought.
    pub fn tick(
        &mut self,
        delta: Millis,
        world: &mut dyn World,
        reg: &ReservationRegistry,
        news: &mut NewsLog,
    ) -> bool {
        let rebuilt = self.rebuild.tick(delta, world, news);
        if !self.ticker.fired(delta) {
            return rebuilt;
        }
        let Some(core) = owned_core(world, self.team, self.sector) else {
            return rebuilt;
        };

        for &step in self.archetype.priorities() {
            let acted = match step {
                PlanStep::BuyWorkers => self.buy_workers(world, core, news),
                PlanStep::ClearDisconnected => self.clear_disconnected(world),
                PlanStep::Roads => self.repave_roads(world),
                PlanStep::Plaza => self.build_plaza(world, core),
                PlanStep::Build(kind) => self.build_structure(world, reg, kind),
            };
            if acted {
                tracing::debug!(team = %self.team, ?step, "domain step");
                return true;
            }
        }
        rebuilt
    }

    // ── Steps ─────────────────────────────────────────────────────────────────

    fn buy_workers(&self, world: &mut dyn World, core: CoreInfo, news: &mut NewsLog) -> bool {
        let quota = self.quotas.workers(self.archetype) as usize;
        if count_workers(world, self.team, self.sector) >= quota {
            return false;
        }
        buy_worker(world, self.team, self.sector, core, news)
    }

    /// Buildings whose porch is walled in by another building get removed;
    /// a plant or rock on a porch gets cleared.
    fn clear_disconnected(&self, world: &mut dyn World) -> bool {
        for b in sector_buildings(world, self.sector) {
            if b.team != self.team {
                continue;
            }
            let Some(porch) = b.porch else { continue };
            let target = match world.occupant(porch) {
                Some(id) if is_plant(world, id) => porch,
                Some(_) => b.bounds.min,
                None if !world.is_buildable(porch) => porch,
                None => continue,
            };
            if world.has_task(target) {
                continue;
            }
            if world.add_action(target, StructureKind::Clear, 0, 0) {
                tracing::debug!(building = %b.id, ?porch, ?target, "porch blocked");
                return true;
            }
        }
        false
    }

    fn repave_roads(&self, world: &mut dyn World) -> bool {
        let mut cells = Vec::new();
        for (r, road) in self.roads.roads().iter().enumerate() {
            let upto = (self.build_distance[r] + 1 + REPAVE_MARGIN).min(road.len());
            cells.extend_from_slice(&road[..upto]);
        }
        for b in sector_buildings(world, self.sector) {
            if b.team == self.team {
                cells.extend(b.porch);
            }
        }
        pave_cells(world, self.sector, cells, MAX_TILE_ORDERS) > 0
    }

    fn build_plaza(&self, world: &mut dyn World, core: CoreInfo) -> bool {
        let cells: Vec<Vec2I> = self
            .roads
            .plazas()
            .iter()
            .flat_map(|p| p.cells())
            .filter(|&c| c != core.pos)
            .collect();
        pave_cells(world, self.sector, cells, MAX_TILE_ORDERS) > 0
    }

    fn build_structure(
        &mut self,
        world: &mut dyn World,
        reg: &ReservationRegistry,
        kind: StructureKind,
    ) -> bool {
        let quota = self.quotas.get(self.archetype, kind);
        let queued = world.jobs(self.sector).iter().filter(|j| j.structure == kind).count() as u32;
        let have = world.building_counts(self.sector).get(kind) + queued;
        if have >= quota {
            return false;
        }
        if kind == StructureKind::Distillery && have >= self.distillery_allowance(world) {
            return false;
        }
        if self.archetype.needs_stockpile(kind) && world.stockpile(self.team) < STOCKPILE_GATE {
            return false;
        }
        if !world.can_withdraw(WalletId::Team(self.team), kind.cost()) {
            return false;
        }

        let Some((road, it, zone)) = self.find_placement(world, reg, kind) else {
            tracing::trace!(team = %self.team, %kind, "no placement");
            return false;
        };
        if !world.add_action(zone.build.min, kind, zone.rotation, 0) {
            return false;
        }
        self.roads.mark_used(zone.full);
        self.build_distance[road] = self.build_distance[road].max(it);

        // Porch plus the road back to the core.
        let mut cells: Vec<Vec2I> = zone.porch.cells().collect();
        if let Some(path) = self.roads.road(road) {
            cells.extend_from_slice(&path[..=it.min(path.len() - 1)]);
        }
        pave_cells(world, self.sector, cells, usize::MAX);

        tracing::info!(team = %self.team, %kind, pos = ?zone.build.min, rotation = zone.rotation, "building ordered");
        true
    }

    // ── Placement ─────────────────────────────────────────────────────────────

    /// First valid zone walking outward from the core along every road.
    fn find_placement(
        &self,
        world: &dyn World,
        reg: &ReservationRegistry,
        kind: StructureKind,
    ) -> Option<(usize, usize, BuildZone)> {
        let buildings = sector_buildings(world, self.sector);
        let porch = i32::from(kind.has_porch());

        for it in 1..self.roads.max_len() {
            let zones = if kind == StructureKind::Farm {
                self.roads.farm_zones(it)
            } else {
                self.roads.build_zones(it, kind.size(), porch)
            };
            if let Some((road, zone)) = zones
                .into_iter()
                .find(|(_, z)| placement_ok(world, reg, kind, z, &buildings))
            {
                return Some((road, it, zone));
            }
        }
        None
    }

    /// Distilleries the farms can keep supplied.
    fn distillery_allowance(&self, world: &dyn World) -> u32 {
        let output: f32 = sector_buildings(world, self.sector)
            .iter()
            .filter(|b| b.team == self.team && b.kind == StructureKind::Farm)
            .map(|b| world.farm_efficiency(b.id))
            .sum();
        (output / FARM_OUTPUT_PER_DISTILLERY).floor() as u32
    }
}

pub(crate) fn placement_ok(
    world: &dyn World,
    reg: &ReservationRegistry,
    kind: StructureKind,
    zone: &BuildZone,
    buildings: &[BuildingInfo],
) -> bool {
    let free = |c: Vec2I| world.occupant(c).is_none() && reg.owner(c).is_none();
    if !zone.build.cells().all(|c| world.is_buildable(c) && free(c) && !world.has_task(c)) {
        return false;
    }
    if !zone.porch.cells().all(|c| world.is_buildable(c) && free(c)) {
        return false;
    }

    let near_farm = if kind == StructureKind::Farm {
        buildings.iter().any(|b| b.bounds.intersects(&zone.full))
    } else {
        buildings
            .iter()
            .filter(|b| b.kind == StructureKind::Farm)
            .any(|b| b.bounds.outset(FARM_GROW_RAD).intersects(&zone.build))
    };
    if near_farm {
        return false;
    }

    let zone_kind = kind.zone();
    !buildings.iter().any(|b| {
        b.kind.zone().conflicts_with(zone_kind)
            && b.bounds.outset(ZONE_CONFLICT_RANGE).intersects(&zone.build)
    })
}

// ── Shared helpers ────────────────────────────────────────────────────────────

fn sector_buildings(world: &dyn World, sector: Vec2I) -> Vec<BuildingInfo> {
    world
        .buildings_in_sector(sector)
        .into_iter()
        .filter_map(|id| world.building_info(id))
        .collect()
}

fn is_plant(world: &dyn World, id: EntityId) -> bool {
    world.entity(id).is_some_and(|e| matches!(e.kind, EntityKind::Plant { .. }))
}

/// The sector's core, if `team` holds it.
pub(crate) fn owned_core(world: &dyn World, team: TeamId, sector: Vec2I) -> Option<CoreInfo> {
    world.sector_info(sector)?.core.filter(|c| c.team == team)
}

pub(crate) fn count_workers(world: &dyn World, team: TeamId, sector: Vec2I) -> usize {
    let filter = |e: &EntityInfo| {
        e.team == team && e.species().is_some_and(|s| s.does_work()) && e.sector() == sector
    };
    world
        .query_near(sector_center(sector).center(), SECTOR_SIZE as f32, &filter)
        .len()
}

/// Pay the bank and spawn a worker at the core.
pub(crate) fn buy_worker(
    world: &mut dyn World,
    team: TeamId,
    sector: Vec2I,
    core: CoreInfo,
    news: &mut NewsLog,
) -> bool {
    if !world.deposit(WalletId::Bank, WalletId::Team(team), WORKER_COST) {
        return false;
    }
    let worker = world.spawn(SpawnSpec {
        kind: EntityKind::Mob(Species::Worker),
        team,
        pos:  core.pos.center(),
        home: Some(sector),
    });
    news.push(
        NewsEvent::new(NewsKind::Purchased, format!("{team} bought a worker"))
            .at(core.pos)
            .about(worker),
    );
    tracing::info!(team = %team, ?sector, worker = %worker, "worker bought");
    true
}

/// Queue pave orders (or clear orders for plants and rock) on up to `limit`
/// cells.  Returns the number queued.
fn pave_cells(
    world: &mut dyn World,
    sector: Vec2I,
    cells: impl IntoIterator<Item = Vec2I>,
    limit: usize,
) -> usize {
    let inner = inner_sector_bounds(sector);
    let mut queued = 0;
    for cell in cells {
        if queued >= limit {
            break;
        }
        if to_sector(cell) != sector || world.is_paved(cell) || world.has_task(cell) {
            continue;
        }
        let kind = match world.occupant(cell) {
            Some(id) if is_plant(world, id) => StructureKind::Clear,
            Some(_) => continue,
            None if inner.contains(cell) && !world.is_buildable(cell) => StructureKind::Clear,
            None => StructureKind::Pave,
        };
        if world.add_action(cell, kind, 0, 0) {
            queued += 1;
        }
    }
    queued
}
