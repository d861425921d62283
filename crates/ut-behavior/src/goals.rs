//! Normal-mode planning: an ordered chain of goal proposers.
//!
//! Each proposer looks at the agent and its surroundings and either queues
//! one or more tasks and claims the turn, or declines.  The first claim ends
//! the chain.  A proposer checks every precondition it relies on (inventory
//! space, distance, reservations) itself, so a declined proposer never
//! leaves half a plan behind for the next one.

use ut_agent::{fulfilled_by_building, AgentSlot, Focus, Mode, FOOD, NUM_NEEDS};
use ut_core::geo::sector_center;
use ut_core::{AgentRng, EntityId, Preference, StructureKind, Vec2F, Vec2I};
use ut_task::Task;
use ut_world::prelude::*;
use ut_world::{EntityInfo, EntityKind, FindMode, ItemKind, NewsEvent, NewsKind, Relation, WorkJob};

use crate::{BehaviorError, BehaviorResult, WorldContext};

/// Food restored by eating one carried ration.
const RATION: f64 = 0.5;
/// Pause after eating.
const EAT_TIME: u32 = 1_000;
/// Random spread around a herd's centre.
const HERD_SPREAD: i32 = 2;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Claim {
    Claimed,
    NotApplicable,
}

/// The proposers, highest priority first.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Goal {
    /// Travel ordered by the director's plot.
    Waypoint,
    Loot,
    Hunger,
    Fruit,
    Cargo,
    Flag,
    Needs,
    /// Take an order from the home domain's work queue.
    WorkerJob,
    Repair,
    Guard,
    Rampage,
    Wander,
}

impl Goal {
    pub const CHAIN: [Goal; 12] = [
        Goal::Waypoint,
        Goal::Loot,
        Goal::Hunger,
        Goal::Fruit,
        Goal::Cargo,
        Goal::Flag,
        Goal::Needs,
        Goal::WorkerJob,
        Goal::Repair,
        Goal::Guard,
        Goal::Rampage,
        Goal::Wander,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Goal::Waypoint => "waypoint",
            Goal::Loot => "loot",
            Goal::Hunger => "hunger",
            Goal::Fruit => "fruit",
            Goal::Cargo => "cargo",
            Goal::Flag => "flag",
            Goal::Needs => "needs",
            Goal::WorkerJob => "worker-job",
            Goal::Repair => "repair",
            Goal::Guard => "guard",
            Goal::Rampage => "rampage",
            Goal::Wander => "wander",
        }
    }
}

pub struct GoalProposers;

impl GoalProposers {
    /// Walk the chain and return the goal that claimed, if any.
    ///
    /// A proposer that errors is logged and treated as not applicable.
    pub fn run(
        slot: &mut AgentSlot<'_>,
        ctx:  &mut WorldContext<'_>,
        rng:  &mut AgentRng,
        me:   &EntityInfo,
    ) -> Option<Goal> {
        for goal in Goal::CHAIN {
            match Self::propose(goal, slot, ctx, rng, me) {
                Ok(Claim::Claimed) => {
                    tracing::debug!(agent = %slot.id, goal = goal.name(), tasks = slot.tasks.len(), "planned");
                    return Some(goal);
                }
                Ok(Claim::NotApplicable) => {}
                Err(e) => {
                    tracing::debug!(agent = %slot.id, goal = goal.name(), error = %e, "proposer failed");
                }
            }
        }
        None
    }

    pub fn propose(
        goal: Goal,
        slot: &mut AgentSlot<'_>,
        ctx:  &mut WorldContext<'_>,
        rng:  &mut AgentRng,
        me:   &EntityInfo,
    ) -> BehaviorResult<Claim> {
        match goal {
            Goal::Waypoint => waypoint(slot, ctx, me),
            Goal::Loot => loot(slot, ctx, me),
            Goal::Hunger => hunger(slot, ctx, me),
            Goal::Fruit => fruit(slot, ctx, me),
            Goal::Cargo => cargo(slot, ctx, me),
            Goal::Flag => flag(slot, ctx, me),
            Goal::Needs => needs(slot, ctx, me),
            Goal::WorkerJob => worker_job(slot, ctx, me),
            Goal::Repair => repair(slot, ctx, me),
            Goal::Guard => guard(slot, ctx, rng, me),
            Goal::Rampage => rampage(slot, ctx, rng, me),
            Goal::Wander => wander(slot, ctx, rng, me),
        }
    }
}

/// Sector the agent belongs to; unaffiliated agents belong where they are.
fn home_of(ctx: &WorldContext<'_>, me: &EntityInfo) -> Vec2I {
    ctx.world.home_sector(me.id).unwrap_or_else(|| me.sector())
}

/// Walk to the porch of `building` and use it.
fn visit(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, building: EntityId) -> BehaviorResult<Claim> {
    let info = ctx.world.building_info(building).ok_or(BehaviorError::EntityGone(building))?;
    let Some(porch) = info.porch else { return Ok(Claim::NotApplicable) };
    slot.tasks.push(Task::move_to(porch.center()), ctx.reservations);
    slot.tasks.push(Task::use_building(), ctx.reservations);
    Ok(Claim::Claimed)
}

fn fetch(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, item: EntityId) -> BehaviorResult<Claim> {
    let info = ctx.world.entity(item).ok_or(BehaviorError::EntityGone(item))?;
    slot.tasks.push(Task::move_to(info.pos), ctx.reservations);
    slot.tasks.push(Task::pickup(item), ctx.reservations);
    Ok(Claim::Claimed)
}

// ── Proposers ─────────────────────────────────────────────────────────────────

fn waypoint(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, me: &EntityInfo) -> BehaviorResult<Claim> {
    let priority = ctx.director.priority_send_herd(me);
    let Some(sector) = priority.or_else(|| ctx.director.should_send_herd(me, &*ctx.world)) else {
        return Ok(Claim::NotApplicable);
    };
    if me.sector() == sector {
        return Ok(Claim::NotApplicable);
    }
    slot.tasks.push(Task::move_to(sector_center(sector).center()), ctx.reservations);
    if priority.is_some() {
        slot.state.focus = Focus::Move;
    }
    Ok(Claim::Claimed)
}

fn loot(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, me: &EntityInfo) -> BehaviorResult<Claim> {
    if !slot.species.has_needs() {
        return Ok(Claim::NotApplicable);
    }
    let space = ctx.world.inventory(me.id).has_space();
    let hits = ctx.world.query_near(me.pos, ctx.config.loot_radius, &|e| {
        e.item().is_some_and(|k| k.is_loot() && (space || k != ItemKind::Weapon))
    });
    match hits.first() {
        Some(&item) => fetch(slot, ctx, item),
        None => Ok(Claim::NotApplicable),
    }
}

fn hunger(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, me: &EntityInfo) -> BehaviorResult<Claim> {
    if !slot.species.has_needs() || slot.needs.get(FOOD) >= ctx.config.critical_need {
        return Ok(Claim::NotApplicable);
    }
    if ctx.world.inventory(me.id).food == 0 || !ctx.world.eat(me.id) {
        return Ok(Claim::NotApplicable);
    }
    let mut ration = [0.0; NUM_NEEDS];
    ration[FOOD] = RATION;
    slot.needs.add(ration, 1.0);
    slot.tasks.push(Task::stand(EAT_TIME), ctx.reservations);
    Ok(Claim::Claimed)
}

fn fruit(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, me: &EntityInfo) -> BehaviorResult<Claim> {
    if !slot.species.collects_fruit() || !ctx.world.inventory(me.id).has_space() {
        return Ok(Claim::NotApplicable);
    }
    let hits = ctx
        .world
        .query_near(me.pos, ctx.config.fruit_radius, &|e| e.item() == Some(ItemKind::Fruit));
    match hits.first() {
        Some(&item) => fetch(slot, ctx, item),
        None => Ok(Claim::NotApplicable),
    }
}

/// Fruit goes to a distillery; a worker's gold and crystal go to a vault.
fn cargo(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, me: &EntityInfo) -> BehaviorResult<Claim> {
    let inv = ctx.world.inventory(me.id);
    let kind = if inv.fruit > 0 {
        StructureKind::Distillery
    } else if slot.species.does_work() && (inv.gold > 0 || inv.crystals > 0) {
        StructureKind::Vault
    } else {
        return Ok(Claim::NotApplicable);
    };
    let home = home_of(ctx, me);
    match ctx.world.find_building(kind, home, FindMode::Nearest, me.pos) {
        Some(b) => visit(slot, ctx, b),
        None => Ok(Claim::NotApplicable),
    }
}

/// Stand at one of the team's rally flags that nobody else is holding.
fn flag(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, me: &EntityInfo) -> BehaviorResult<Claim> {
    if !slot.species.guards() || slot.needs.is_critical(ctx.config.visit_threshold) {
        return Ok(Claim::NotApplicable);
    }
    let team = me.team;
    let flags = ctx
        .world
        .query_near(me.pos, ctx.config.herd_radius, &|e| e.kind == EntityKind::Flag && e.team == team);
    let free = flags
        .into_iter()
        .filter_map(|id| ctx.world.entity(id))
        .map(|e| e.cell())
        .find(|&cell| !ctx.reservations.is_claimed_by_other(cell, slot.id));
    let Some(cell) = free else { return Ok(Claim::NotApplicable) };

    slot.tasks.push(Task::move_to(cell.center()), ctx.reservations);
    slot.tasks.push(Task::flag(cell).with_timer(ctx.config.flag_stand), ctx.reservations);
    Ok(Claim::Claimed)
}

/// Visit the home building that best covers the agent's current deficits.
fn needs(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, me: &EntityInfo) -> BehaviorResult<Claim> {
    if !slot.species.has_needs() {
        return Ok(Claim::NotApplicable);
    }
    let Some(home) = ctx.world.home_sector(me.id) else { return Ok(Claim::NotApplicable) };
    if me.sector() != home {
        return Ok(Claim::NotApplicable);
    }

    let inventory = ctx.world.inventory(me.id);
    let personality = ctx.world.personality(me.id);
    let current = slot.needs.values();
    let mut best: Option<(EntityId, f64)> = None;
    for id in ctx.world.buildings_in_sector(home) {
        let Some(info) = ctx.world.building_info(id) else { continue };
        if info.porch.is_none() || ctx.world.relation(me.team, info.team) == Relation::Enemy {
            continue;
        }
        let gain = fulfilled_by_building(&info, &inventory, &personality, me.hp_fraction);
        let score: f64 = gain.iter().zip(current).map(|(g, n)| g * (1.0 - n)).sum();
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((id, score));
        }
    }
    match best {
        Some((id, score)) if score > ctx.config.visit_threshold => visit(slot, ctx, id),
        _ => Ok(Claim::NotApplicable),
    }
}

/// Take the nearest open order from the home work queue.
fn worker_job(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, me: &EntityInfo) -> BehaviorResult<Claim> {
    if !slot.species.does_work() {
        return Ok(Claim::NotApplicable);
    }
    let home = home_of(ctx, me);
    let mut best: Option<(WorkJob, Vec2F, f32)> = None;
    for job in ctx.world.jobs(home) {
        if ctx.reservations.is_claimed_by_other(job.pos, slot.id) {
            continue;
        }
        let Some((stand, cost)) = ctx.world.calc_work_path(me.pos, job.bounds()) else { continue };
        if best.is_none_or(|(_, _, c)| cost < c) {
            best = Some((job, stand, cost));
        }
    }
    let Some((job, stand, _)) = best else { return Ok(Claim::NotApplicable) };

    let work = match job.structure {
        StructureKind::Clear => Task::remove_structure(job.pos),
        kind => Task::build(job.pos, kind, job.rotation),
    };
    slot.tasks.push(Task::move_to(stand).with_payload(job.id), ctx.reservations);
    slot.tasks.push(work.with_timer(ctx.config.build_time).with_payload(job.id), ctx.reservations);
    Ok(Claim::Claimed)
}

fn repair(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, me: &EntityInfo) -> BehaviorResult<Claim> {
    if !slot.species.does_work() {
        return Ok(Claim::NotApplicable);
    }
    let home = home_of(ctx, me);
    let damaged = ctx
        .world
        .buildings_in_sector(home)
        .into_iter()
        .filter_map(|id| ctx.world.building_info(id))
        .filter(|b| b.team == me.team && b.hp_fraction < 1.0)
        .filter_map(|b| ctx.world.calc_work_path(me.pos, b.bounds).map(|(stand, cost)| (b.id, stand, cost)))
        .min_by(|a, b| a.2.total_cmp(&b.2));
    let Some((building, stand, _)) = damaged else { return Ok(Claim::NotApplicable) };

    slot.tasks.push(Task::move_to(stand), ctx.reservations);
    slot.tasks.push(Task::repair(building), ctx.reservations);
    Ok(Claim::Claimed)
}

fn guard(
    slot: &mut AgentSlot<'_>,
    ctx:  &mut WorldContext<'_>,
    rng:  &mut AgentRng,
    me:   &EntityInfo,
) -> BehaviorResult<Claim> {
    if !slot.species.guards() {
        return Ok(Claim::NotApplicable);
    }
    let chance = match ctx.world.personality(me.id).guarding {
        Preference::Likes => 0.5,
        Preference::Indifferent => 0.2,
        Preference::Dislikes => 0.05,
    };
    if !rng.gen_bool(chance) {
        return Ok(Claim::NotApplicable);
    }
    let home = home_of(ctx, me);
    let Some(post) = ctx.world.find_building(StructureKind::GuardPost, home, FindMode::Any, me.pos) else {
        return Ok(Claim::NotApplicable);
    };
    let info = ctx.world.building_info(post).ok_or(BehaviorError::EntityGone(post))?;
    let Some(porch) = info.porch else { return Ok(Claim::NotApplicable) };
    slot.tasks.push(Task::move_to(porch.center()), ctx.reservations);
    slot.tasks.push(Task::stand(ctx.config.guard_time), ctx.reservations);
    Ok(Claim::Claimed)
}

/// Greater monsters now and then head for a sector exit, smashing what is in
/// the way.  The walk itself is run by the scheduler in rampage mode.
fn rampage(
    slot: &mut AgentSlot<'_>,
    ctx:  &mut WorldContext<'_>,
    rng:  &mut AgentRng,
    me:   &EntityInfo,
) -> BehaviorResult<Claim> {
    if !slot.species.can_rampage() || !rng.gen_bool(ctx.config.rampage_chance) {
        return Ok(Claim::NotApplicable);
    }
    let Some(info) = ctx.world.sector_info(me.sector()) else { return Ok(Claim::NotApplicable) };
    let Some(port) = rng.choose(&info.ports) else { return Ok(Claim::NotApplicable) };

    slot.state.mode = Mode::Rampage;
    slot.state.rampage_target = Some(port.id);
    tracing::debug!(agent = %slot.id, port = port.id, "rampage");
    Ok(Claim::Claimed)
}

/// Always claims.  Answering the director's summons comes first, then the
/// species' own habits.
fn wander(
    slot: &mut AgentSlot<'_>,
    ctx:  &mut WorldContext<'_>,
    rng:  &mut AgentRng,
    me:   &EntityInfo,
) -> BehaviorResult<Claim> {
    if let Some(sector) = ctx.director.take_attraction(me, &*ctx.world) {
        slot.tasks.push(Task::move_to(sector_center(sector).center()), ctx.reservations);
        slot.state.focus = Focus::Move;
        ctx.news.push(
            NewsEvent::new(NewsKind::SectorHerd, format!("{} heads for the player", slot.species))
                .at(sector_center(sector))
                .about(me.id),
        );
        return Ok(Claim::Claimed);
    }

    let dest = herd_spot(slot, ctx, rng, me)
        .or_else(|| plant_spot(slot, ctx, rng, me))
        .unwrap_or_else(|| {
            let r = ctx.config.wander_radius.max(1);
            let offset = Vec2I::new(rng.gen_range(-r..=r), rng.gen_range(-r..=r));
            (me.cell() + offset).center()
        });
    slot.tasks.push(Task::move_to(dest), ctx.reservations);
    slot.tasks.push(Task::stand(ctx.config.wander_stand), ctx.reservations);
    Ok(Claim::Claimed)
}

/// Somewhere near the middle of nearby members of the same species.
fn herd_spot(slot: &AgentSlot<'_>, ctx: &WorldContext<'_>, rng: &mut AgentRng, me: &EntityInfo) -> Option<Vec2F> {
    if !slot.species.herds() {
        return None;
    }
    let species = slot.species;
    let herd = ctx
        .world
        .query_near(me.pos, ctx.config.herd_radius, &|e| e.id != me.id && e.species() == Some(species));
    let positions: Vec<Vec2F> = herd.into_iter().filter_map(|id| ctx.world.entity(id)).map(|e| e.pos).collect();
    if positions.is_empty() {
        return None;
    }
    let sum = positions.iter().fold(Vec2F::ZERO, |acc, &p| acc + p);
    let centre = (sum * (1.0 / positions.len() as f32)).to_cell();
    let jitter = Vec2I::new(rng.gen_range(-HERD_SPREAD..=HERD_SPREAD), rng.gen_range(-HERD_SPREAD..=HERD_SPREAD));
    Some((centre + jitter).center())
}

/// Next to a random nearby plant.
fn plant_spot(slot: &AgentSlot<'_>, ctx: &WorldContext<'_>, rng: &mut AgentRng, me: &EntityInfo) -> Option<Vec2F> {
    if !slot.species.likes_plants() {
        return None;
    }
    let plants = ctx
        .world
        .query_near(me.pos, ctx.config.herd_radius, &|e| matches!(e.kind, EntityKind::Plant { .. }));
    let &plant = rng.choose(&plants)?;
    let cell = ctx.world.entity(plant)?.cell();
    let side = *rng.choose(&cell.neighbors4())?;
    Some(side.center())
}
