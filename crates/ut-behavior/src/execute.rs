//! Running the head of an agent's task queue.
//!
//! Each task kind is a small state machine driven by repeated calls with the
//! time since the last one.  A step either keeps going, finishes (the task is
//! popped and the next one starts), or aborts.  An abort means the plan was
//! built on facts that no longer hold, so the whole queue is dropped and the
//! agent plans afresh; skipping just the failed step could leave later steps
//! pointing at the wrong place.

use ut_agent::{fulfilled_by_building, Action, AgentSlot, Focus, Mode};
use ut_core::geo::to_sector;
use ut_core::{EntityId, Millis, StructureKind, Vec2F, Vec2I};
use ut_task::{Task, TaskError, TaskKind, TaskResult};
use ut_world::prelude::*;
use ut_world::{EntityInfo, NewsEvent, NewsKind, Relation, WalletId};

use crate::WorldContext;

/// Distance at which a `Move` counts as arrived.
pub const ARRIVE_RADIUS: f32 = 0.5;

/// Time spent inside a building per visit.
pub const USE_TIME: Millis = 1_000;

/// Pause between repair strokes.
pub const REPAIR_PERIOD: Millis = 1_000;

/// Tasks that finish instantly may chain within one tick, up to this many.
const MAX_STEPS_PER_TICK: usize = 4;

/// Outcome of one call into the head task.
#[derive(Debug, PartialEq)]
pub enum Step {
    Continue,
    Done,
    Abort(TaskError),
}

/// Run the queue head, chaining through tasks that complete at once.
///
/// Returns the last step taken.  `Done` with an empty queue means the plan
/// ran out; an `Abort` has already cleared the queue.
pub fn run_queue(
    slot:  &mut AgentSlot<'_>,
    ctx:   &mut WorldContext<'_>,
    me:    &EntityInfo,
    delta: Millis,
) -> Step {
    let mut delta = delta;
    for _ in 0..MAX_STEPS_PER_TICK {
        let step = run_head(slot, ctx, me, delta);
        if step != Step::Done || slot.tasks.is_empty() {
            return step;
        }
        // Later tasks in the chain start fresh.
        delta = 0;
    }
    Step::Continue
}

/// Run the queue head once and apply the outcome to the queue.
pub fn run_head(
    slot:  &mut AgentSlot<'_>,
    ctx:   &mut WorldContext<'_>,
    me:    &EntityInfo,
    delta: Millis,
) -> Step {
    let Some(task) = slot.tasks.peek_front().copied() else {
        return Step::Done;
    };

    let step = match check_order(ctx, me, &task) {
        Err(e) => Step::Abort(e),
        Ok(()) => match task.kind {
            TaskKind::Move(dest) => step_move(slot, ctx, me, dest),
            TaskKind::Stand => step_stand(slot, ctx, me, delta),
            TaskKind::Build { pos, structure, rotation } => {
                step_build(slot, ctx, me, delta, pos, structure, rotation)
            }
            TaskKind::Repair(building) => step_repair(slot, ctx, me, delta, building),
            TaskKind::Pickup(item) => {
                if !ctx.world.pickup(me.id, item) {
                    tracing::trace!(agent = %slot.id, %item, "pickup missed");
                }
                Step::Done
            }
            TaskKind::UseBuilding => step_use_building(slot, ctx, me, delta),
            TaskKind::RemoveStructure(pos) => step_remove(slot, ctx, delta, pos),
            TaskKind::Flag(pos) => step_flag(slot, ctx, me, delta, pos),
        },
    };

    match &step {
        Step::Continue => {}
        Step::Done => {
            tracing::trace!(agent = %slot.id, task = task.name(), "task done");
            slot.tasks.pop_front(ctx.reservations);
        }
        Step::Abort(e) => {
            tracing::debug!(agent = %slot.id, task = task.name(), error = %e, "plan invalidated");
            abandon_plan(slot, ctx, me);
        }
    }
    step
}

/// Drop every queued task and whatever the agent was doing for it.
pub fn abandon_plan(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, me: &EntityInfo) {
    slot.tasks.clear(ctx.reservations);
    slot.state.using_building = None;
    if slot.state.mode == Mode::Normal {
        slot.state.reset_action();
        ctx.world.stop(me.id);
    }
}

/// A task produced from a work order is only good while the order exists.
fn check_order(ctx: &WorldContext<'_>, me: &EntityInfo, task: &Task) -> TaskResult<()> {
    if task.payload == 0 {
        return Ok(());
    }
    let sector = task
        .cell()
        .map(to_sector)
        .or_else(|| ctx.world.home_sector(me.id))
        .unwrap_or_else(|| me.sector());
    if ctx.world.jobs(sector).iter().any(|j| j.id == task.payload) {
        Ok(())
    } else {
        Err(TaskError::OrderGone(task.cell().unwrap_or_else(|| me.cell())))
    }
}

/// Count the head task's timer down.  `true` once it has run out.
fn count_down(slot: &mut AgentSlot<'_>, delta: Millis) -> bool {
    match slot.tasks.front_mut() {
        Some(t) => {
            t.timer = t.timer.saturating_sub(delta.min(i32::MAX as u32) as i32);
            t.timer <= 0
        }
        None => true,
    }
}

// ── Move ──────────────────────────────────────────────────────────────────────

fn step_move(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, me: &EntityInfo, dest: Vec2F) -> Step {
    if me.pos.distance(dest) <= ARRIVE_RADIUS {
        if slot.state.focus == Focus::Move {
            slot.state.focus = Focus::None;
        }
        slot.state.action = Action::None;
        slot.state.move_dest = None;
        return Step::Done;
    }
    if slot.state.move_dest != Some(dest) || !ctx.world.is_moving(me.id) {
        ctx.world.set_destination(me.id, dest);
        slot.state.move_dest = Some(dest);
    }
    slot.state.action = Action::Move;
    Step::Continue
}

// ── Stand ─────────────────────────────────────────────────────────────────────

fn step_stand(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, me: &EntityInfo, delta: Millis) -> Step {
    slot.state.action = Action::None;
    if slot.social_ticker.fired(delta) {
        social_pulse(slot, ctx, me);
    }
    if count_down(slot, delta) { Step::Done } else { Step::Continue }
}

/// Standing among idle companions is fun, unless someone in the group is an
/// enemy of someone else.
///
/// Each participant boosts only itself on its own pulse.
fn social_pulse(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, me: &EntityInfo) {
    if !slot.species.has_needs() {
        return;
    }
    let world = &*ctx.world;
    let near = world.query_near(me.pos, ctx.config.social_radius, &|e| {
        e.id != me.id && e.species().is_some_and(|s| s.has_needs())
    });
    let group: Vec<EntityInfo> = near
        .into_iter()
        .filter(|&id| !world.is_moving(id))
        .filter_map(|id| world.entity(id))
        .collect();
    if group.is_empty() {
        return;
    }

    let mut teams: Vec<_> = group.iter().map(|e| e.team).collect();
    teams.push(me.team);
    teams.sort_unstable();
    teams.dedup();
    for (i, &a) in teams.iter().enumerate() {
        for &b in &teams[i + 1..] {
            if world.relation(a, b) == Relation::Enemy {
                return;
            }
        }
    }

    let mut boost = [0.0; ut_agent::NUM_NEEDS];
    boost[ut_agent::FUN] = ctx.config.social_boost;
    slot.needs.add(boost, 1.0);
    tracing::trace!(agent = %slot.id, group = group.len(), "social pulse");
}

// ── Build ─────────────────────────────────────────────────────────────────────

fn step_build(
    slot:      &mut AgentSlot<'_>,
    ctx:       &mut WorldContext<'_>,
    me:        &EntityInfo,
    delta:     Millis,
    pos:       Vec2I,
    structure: StructureKind,
    rotation:  i32,
) -> Step {
    slot.state.action = Action::None;
    if !count_down(slot, delta) {
        return Step::Continue;
    }

    // Time has passed since the task was queued; check again before paying.
    let result = validate_build(slot, ctx, me, pos, structure).and_then(|()| {
        commit_build(ctx, me, pos, structure, rotation)
    });
    withdraw_order(ctx, pos, result.as_ref().err());
    match result {
        Ok(()) => Step::Done,
        Err(e) => Step::Abort(e),
    }
}

/// The world-side order at `pos` belongs to whoever owns the cell; an agent
/// that lost the reservation leaves it for the owner.
fn withdraw_order(ctx: &mut WorldContext<'_>, pos: Vec2I, err: Option<&TaskError>) {
    if let Some(TaskError::Reserved { .. }) = err {
        return;
    }
    ctx.world.remove_task(pos);
}

/// Reservation, funds and terrain, in that order.
pub fn validate_build(
    slot:      &AgentSlot<'_>,
    ctx:       &WorldContext<'_>,
    me:        &EntityInfo,
    pos:       Vec2I,
    structure: StructureKind,
) -> TaskResult<()> {
    ctx.reservations.check(pos, slot.id)?;

    let cost = structure.cost();
    if cost > 0 && !ctx.world.can_withdraw(WalletId::Team(me.team), cost) {
        return Err(TaskError::Unaffordable(structure));
    }

    let world = &*ctx.world;
    let legal = match structure {
        StructureKind::Clear => true,
        StructureKind::Pave | StructureKind::Ice => world.occupant(pos).is_none(),
        _ => {
            let size = structure.size();
            (0..size).all(|dx| {
                (0..size).all(|dy| {
                    let cell = pos + Vec2I::new(dx, dy);
                    world.is_buildable(cell) && world.occupant(cell).is_none()
                })
            })
        }
    };
    if legal { Ok(()) } else { Err(TaskError::Unbuildable(pos, structure)) }
}

fn commit_build(
    ctx:       &mut WorldContext<'_>,
    me:        &EntityInfo,
    pos:       Vec2I,
    structure: StructureKind,
    rotation:  i32,
) -> TaskResult<()> {
    let wallet = WalletId::Team(me.team);
    let cost = structure.cost();
    if cost > 0 && !ctx.world.deposit(WalletId::Bank, wallet, cost) {
        return Err(TaskError::Unaffordable(structure));
    }

    let built = if structure.is_building() {
        match ctx.world.construct(pos, structure, rotation, me.team) {
            Some(id) => {
                ctx.news.push(NewsEvent::new(NewsKind::Built, format!("{structure} built")).at(pos).about(id));
                true
            }
            None => false,
        }
    } else {
        ctx.world.edit_tile(pos, structure)
    };
    if built {
        return Ok(());
    }

    // Refund.
    if cost > 0 && !ctx.world.deposit(wallet, WalletId::Bank, cost) {
        tracing::warn!(team = %me.team, %structure, "refund failed");
    }
    Err(TaskError::Unbuildable(pos, structure))
}

// ── Repair ────────────────────────────────────────────────────────────────────

fn step_repair(
    slot:     &mut AgentSlot<'_>,
    ctx:      &mut WorldContext<'_>,
    me:       &EntityInfo,
    delta:    Millis,
    building: EntityId,
) -> Step {
    let Some(info) = ctx.world.building_info(building) else {
        return Step::Abort(TaskError::TargetGone(building));
    };
    if info.hp_fraction >= 1.0 {
        return Step::Done;
    }
    if !count_down(slot, delta) {
        return Step::Continue;
    }
    if !ctx.world.repair(me.id, building) {
        return Step::Abort(TaskError::Precondition(format!("{building} out of reach")));
    }
    slot.state.action = Action::None;
    if let Some(t) = slot.tasks.front_mut() {
        t.timer = REPAIR_PERIOD as i32;
    }
    Step::Continue
}

// ── UseBuilding ───────────────────────────────────────────────────────────────

fn step_use_building(
    slot:  &mut AgentSlot<'_>,
    ctx:   &mut WorldContext<'_>,
    me:    &EntityInfo,
    delta: Millis,
) -> Step {
    let Some(building) = ctx.world.query_porch(me.cell()) else {
        return Step::Abort(TaskError::Precondition("not on a porch".into()));
    };
    if slot.state.using_building != Some(building) {
        slot.state.using_building = Some(building);
        if let Some(t) = slot.tasks.front_mut() {
            t.timer = t.timer.max(USE_TIME as i32);
        }
    }
    slot.state.action = Action::None;
    if !count_down(slot, delta) {
        return Step::Continue;
    }

    slot.state.using_building = None;
    let Some(info) = ctx.world.building_info(building) else {
        return Step::Abort(TaskError::TargetGone(building));
    };
    let inventory = ctx.world.inventory(me.id);
    let personality = ctx.world.personality(me.id);
    let gain = fulfilled_by_building(&info, &inventory, &personality, me.hp_fraction);
    if !ctx.world.use_building(me.id, building) {
        tracing::trace!(agent = %slot.id, %building, "building refused");
        return Step::Done;
    }
    slot.needs.add(gain, 1.0);
    if info.kind == StructureKind::Kiosk && slot.state.mode == Mode::Visitor {
        slot.state.visitor.kiosks_seen += 1;
    }
    Step::Done
}

// ── RemoveStructure ───────────────────────────────────────────────────────────

fn step_remove(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, delta: Millis, pos: Vec2I) -> Step {
    slot.state.action = Action::None;
    if !count_down(slot, delta) {
        return Step::Continue;
    }
    if let Err(e) = ctx.reservations.check(pos, slot.id) {
        withdraw_order(ctx, pos, Some(&e));
        return Step::Abort(e);
    }
    let cleared = ctx.world.edit_tile(pos, StructureKind::Clear);
    withdraw_order(ctx, pos, None);
    if cleared {
        Step::Done
    } else {
        Step::Abort(TaskError::Unbuildable(pos, StructureKind::Clear))
    }
}

// ── Flag ──────────────────────────────────────────────────────────────────────

fn step_flag(
    slot:  &mut AgentSlot<'_>,
    ctx:   &mut WorldContext<'_>,
    me:    &EntityInfo,
    delta: Millis,
    pos:   Vec2I,
) -> Step {
    if !ctx.world.visit_flag(me.id, pos) {
        return Step::Abort(TaskError::Precondition(format!("no flag at {pos:?}")));
    }
    slot.state.action = Action::None;
    if count_down(slot, delta) { Step::Done } else { Step::Continue }
}
