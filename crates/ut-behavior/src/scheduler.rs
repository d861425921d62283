//! `AgentScheduler`: the per-agent tick.
//!
//! # Tick order
//!
//! ```text
//! 1. action-locked?            → return at once, nothing changes
//! 2. perception                → rebuild on its ticker, prune otherwise
//! 3. mode transition           → Normal/Rampage ⇄ Battle
//! 4. world entry               → once per cell: morale markers, loot
//! 5. needs                     → on its ticker; return home; crisis
//! 6. dispatch                  → run the queue, or plan for the mode
//! 7. act                       → Move / Melee / Shoot for this tick
//! ```
//!
//! The returned wake hint is short while the agent is doing something
//! (walking, fighting, working a task) and otherwise the time to its next
//! periodic check.

use ut_agent::{is_hostile, Action, AgentSlot, Focus, Mode, ENERGY, FOOD};
use ut_core::geo::{sector_center, NUM_SECTORS};
use ut_core::{
    AgentRng, AiConfig, EntityId, Millis, MobClass, StructureKind, TeamId, Vec2F, Vec2I, VERY_LONG_TICK,
};
use ut_task::{Task, TaskKind};
use ut_world::prelude::*;
use ut_world::{AgentMessage, EntityInfo, NewsEvent, NewsKind, Relation};

use crate::execute::{abandon_plan, run_queue};
use crate::goals::GoalProposers;
use crate::utility::{gather_targets, CombatOption, UtilityEvaluator};
use crate::{BehaviorModel, WorldContext};

/// Within this distance an enemy counts as adjacent for the blocked-path
/// fallback.
const ADJACENT_RADIUS: f32 = 1.5;

/// Rampage walks this many path cells ahead of the monster.
const RAMPAGE_STRIDE: usize = 4;

/// Damage a starving agent takes when its morale breaks.
const STARVE_DAMAGE: f32 = 0.25;

/// A battle move is re-issued once the target drifts this far from it.
const CHASE_SLACK: f32 = 1.0;

/// How a morale collapse plays out, chosen by the emptiest drive.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Crisis {
    /// Hunger turns on the body.
    Starve,
    /// Boredom turns to violence: the agent goes rogue.
    Bloodrage,
    /// Exhaustion sends the agent off on a long walk.
    VisionQuest,
}

impl Crisis {
    pub fn for_need(need: usize) -> Crisis {
        match need {
            FOOD => Crisis::Starve,
            ENERGY => Crisis::VisionQuest,
            _ => Crisis::Bloodrage,
        }
    }
}

/// Whether `me` fights when threatened.
///
/// Workers only fight while their team is small; visitors never do.
pub fn should_engage<W: World + ?Sized>(world: &W, me: &EntityInfo, config: &AiConfig) -> bool {
    match me.species().map(|s| s.mob_class()) {
        Some(MobClass::Worker) => world.team_population(me.team) < config.worker_engage_floor,
        Some(MobClass::Visitor) | None => false,
        Some(_) => true,
    }
}

/// The standard [`BehaviorModel`].
#[derive(Clone, Copy, Debug, Default)]
pub struct AgentScheduler;

impl BehaviorModel for AgentScheduler {
    fn tick(
        &self,
        slot:  &mut AgentSlot<'_>,
        ctx:   &mut WorldContext<'_>,
        rng:   &mut AgentRng,
        delta: Millis,
    ) -> Millis {
        let Some(me) = ctx.world.entity(slot.entity) else {
            return VERY_LONG_TICK;
        };
        if ctx.world.action_locked(me.id) {
            return ctx.config.locked_wake;
        }

        perceive(slot, ctx, &me, delta);
        update_mode(slot, ctx, &me);
        enter_cell(slot, ctx, &me);
        tick_needs(slot, ctx, &me, delta);

        // Needs may have changed team or health.
        let Some(me) = ctx.world.entity(slot.entity) else {
            return VERY_LONG_TICK;
        };
        let rethink = slot.state.rethink.fired(delta);
        match slot.state.mode {
            Mode::Normal => run_normal(slot, ctx, rng, &me, delta, rethink),
            Mode::Battle => run_battle(slot, ctx, &me, rethink),
            Mode::Rampage => run_rampage(slot, ctx, &me),
            Mode::Visitor => run_visitor(slot, ctx, &me, delta),
        }
        debug_assert!(slot.state.is_consistent());

        wake_hint(slot, ctx, &me)
    }

    fn on_message(
        &self,
        slot: &mut AgentSlot<'_>,
        msg:  &AgentMessage,
        ctx:  &mut WorldContext<'_>,
        _rng: &mut AgentRng,
    ) {
        let Some(me) = ctx.world.entity(slot.entity) else { return };
        match msg {
            AgentMessage::DestinationReached => slot.state.blocked_count = 0,
            AgentMessage::DestinationBlocked => on_blocked(slot, ctx, &me),
            AgentMessage::Damaged { source } => {
                // The attacker goes to the head of the list unless we are locked on.
                if is_hostile(&*ctx.world, &me, *source) {
                    if slot.state.locked_target().is_none() {
                        slot.state.perception.enemies.set_first(*source);
                    } else {
                        slot.state.perception.enemies.push(*source);
                    }
                }
            }
            AgentMessage::SectorHerd { dest, focus } => {
                abandon_plan(slot, ctx, &me);
                slot.tasks.push(Task::move_to(sector_center(*dest).center()), ctx.reservations);
                if *focus && slot.state.mode == Mode::Normal {
                    slot.state.focus = Focus::Move;
                }
                ctx.news.push(
                    NewsEvent::new(NewsKind::SectorHerd, format!("{} herded", slot.species))
                        .at(sector_center(*dest))
                        .about(me.id),
                );
            }
            AgentMessage::WorkQueueUpdated => {
                if slot.state.mode == Mode::Normal && slot.tasks.is_empty() {
                    slot.state.action = Action::None;
                }
            }
            AgentMessage::Awareness { threats } => {
                for &t in threats {
                    if is_hostile(&*ctx.world, &me, t) {
                        slot.state.perception.enemies.push(t);
                    }
                }
            }
        }
    }
}

// ── Steps 2–5 ─────────────────────────────────────────────────────────────────

fn perceive(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, me: &EntityInfo, delta: Millis) {
    let state = &mut *slot.state;
    let locked = state.locked_target();
    if state.perception.ticker.fired(delta) {
        state.perception.refresh(&*ctx.world, me, ctx.config, locked);
    }
    state.perception.prune(&*ctx.world, me, locked);

    if locked.is_some() && state.perception.enemies.first() != locked {
        tracing::debug!(agent = %slot.id, target = ?locked, "lost locked target");
        state.focus = Focus::None;
        state.action = Action::None;
    }
}

fn update_mode(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, me: &EntityInfo) {
    let threatened = !slot.state.perception.enemies.is_empty();
    match slot.state.mode {
        Mode::Normal if slot.species.mob_class() == MobClass::Visitor => {
            slot.state.mode = Mode::Visitor;
        }
        Mode::Normal | Mode::Rampage
            if threatened
                && slot.state.focus != Focus::Move
                && slot.state.using_building.is_none()
                && should_engage(&*ctx.world, me, ctx.config) =>
        {
            enter_battle(slot, ctx, me);
        }
        Mode::Battle if !threatened => {
            tracing::debug!(agent = %slot.id, "battle over");
            slot.state.mode = Mode::Normal;
            slot.state.reset_action();
            slot.state.rethink.set_period(ctx.config.normal_rethink);
            ctx.world.stop(me.id);
        }
        _ => {}
    }
}

fn enter_battle(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, me: &EntityInfo) {
    tracing::debug!(agent = %slot.id, from = ?slot.state.mode, enemies = slot.state.perception.enemies.len(), "battle");
    slot.tasks.clear(ctx.reservations);
    slot.state.mode = Mode::Battle;
    slot.state.rampage_target = None;
    slot.state.using_building = None;
    slot.state.action = Action::None;
    slot.state.move_dest = None;
    slot.state.rethink.set_period(ctx.config.battle_rethink);

    ctx.world.stop(me.id);

    let threats: Vec<EntityId> = slot.state.perception.enemies.iter().collect();
    for ally in slot.state.perception.friends.iter().take(ctx.config.ally_fanout) {
        ctx.world.send(ally, AgentMessage::Awareness { threats: threats.clone() });
    }
}

/// World-entry effects, applied once each time the agent reaches a new cell.
fn enter_cell(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, me: &EntityInfo) {
    let cell = me.cell();
    if slot.state.last_cell == Some(cell) {
        return;
    }
    slot.state.last_cell = Some(cell);

    let effects = ctx.world.enter_cell(me.id, cell);
    if effects.morale != 0.0 {
        slot.needs.add_morale(effects.morale);
    }

    if slot.species.has_needs() {
        let loot = ctx.world.query_near(me.pos, ctx.config.pickup_range, &|e| {
            e.item().is_some_and(|k| k.is_loot())
        });
        for item in loot {
            if ctx.world.pickup(me.id, item) {
                tracing::trace!(agent = %slot.id, %item, "picked up on the way");
            }
        }
    }
}

fn tick_needs(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, me: &EntityInfo, delta: Millis) {
    if !slot.species.has_needs() {
        return;
    }
    let fired = slot.needs_ticker.delta(delta);
    if fired == 0 {
        return;
    }
    let elapsed = fired.saturating_mul(ctx.config.needs_period);
    let home = ctx.world.home_sector(me.id);

    match home {
        Some(h) if h != me.sector() => {
            slot.needs.travel_tick(elapsed);
            if slot.needs.is_critical(ctx.config.critical_need) && slot.state.mode == Mode::Normal {
                return_home(slot, ctx, me, h);
            }
        }
        _ => {
            let personality = ctx.world.personality(me.id);
            slot.needs.tick(elapsed, slot.state.mode == Mode::Battle, &personality);
        }
    }

    if slot.needs.take_crisis() {
        resolve_crisis(slot, ctx, me);
    }
}

fn return_home(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, me: &EntityInfo, home: Vec2I) {
    let dest = sector_center(home).center();
    if slot.tasks.iter().any(|t| t.kind == TaskKind::Move(dest)) {
        return;
    }
    tracing::debug!(agent = %slot.id, ?home, "critical need, heading home");
    abandon_plan(slot, ctx, me);
    slot.tasks.push(Task::move_to(dest), ctx.reservations);
    slot.state.focus = Focus::Move;
}

fn resolve_crisis(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, me: &EntityInfo) {
    let crisis = Crisis::for_need(slot.needs.lowest());
    tracing::info!(agent = %slot.id, ?crisis, "morale crisis");
    let text = match crisis {
        Crisis::Starve => {
            ctx.world.damage(me.id, STARVE_DAMAGE, None);
            format!("a starving {} collapses", slot.species)
        }
        Crisis::Bloodrage => {
            ctx.world.set_team(me.id, TeamId::ROGUE);
            format!("a {} flies into a rage", slot.species)
        }
        Crisis::VisionQuest => {
            abandon_plan(slot, ctx, me);
            let middle = Vec2I::new(NUM_SECTORS / 2, NUM_SECTORS / 2);
            let mut away = me.sector().step_toward(middle);
            if away == me.sector() {
                away = away + Vec2I::new(1, 0);
            }
            slot.tasks.push(Task::move_to(sector_center(away).center()), ctx.reservations);
            slot.state.focus = Focus::Move;
            format!("a {} leaves on a vision quest", slot.species)
        }
    };
    ctx.news.push(NewsEvent::new(NewsKind::MoraleCrisis, text).at(me.cell()).about(me.id));
}

// ── Step 6–7: per-mode dispatch ───────────────────────────────────────────────

fn run_normal(
    slot:    &mut AgentSlot<'_>,
    ctx:     &mut WorldContext<'_>,
    rng:     &mut AgentRng,
    me:      &EntityInfo,
    delta:   Millis,
    rethink: bool,
) {
    if !slot.tasks.is_empty() {
        run_queue(slot, ctx, me, delta);
        return;
    }
    if !rethink && slot.state.action != Action::None {
        return;
    }
    if GoalProposers::run(slot, ctx, rng, me).is_some() && slot.state.mode == Mode::Normal {
        run_queue(slot, ctx, me, 0);
    }
}

fn run_battle(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, me: &EntityInfo, rethink: bool) {
    if rethink || slot.state.action == Action::None {
        choose_combat_action(slot, ctx, me);
    }
    act(slot, ctx, me);
}

fn choose_combat_action(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, me: &EntityInfo) {
    let state = &mut *slot.state;
    let targets = gather_targets(&*ctx.world, me, &state.perception.enemies);
    let loadout = ctx.world.loadout(me.id);
    let locked = state.locked_target();
    let evaluator = UtilityEvaluator::new(ctx.config);
    let choice = evaluator.evaluate(
        me,
        &loadout,
        &targets,
        state.last_target,
        locked,
        state.action == Action::Shoot,
    );

    let Some(choice) = choice else {
        state.action = Action::None;
        return;
    };
    if locked.is_some() && locked != Some(choice.target) {
        state.focus = Focus::None;
    }
    state.perception.enemies.set_first(choice.target);
    state.last_target = Some(choice.target);
    let action = match choice.option {
        CombatOption::Move => Action::Move,
        CombatOption::Melee => Action::Melee,
        CombatOption::Shoot => Action::Shoot,
    };
    if action != state.action {
        tracing::trace!(agent = %slot.id, ?action, target = %choice.target, utility = choice.utility, "combat choice");
    }
    state.action = action;
}

/// Carry out the battle action against `enemies[0]`.
fn act(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, me: &EntityInfo) {
    let Some(target) = slot.state.perception.enemies.first() else { return };
    let Some(info) = ctx.world.entity(target) else {
        slot.state.action = Action::None;
        return;
    };
    match slot.state.action {
        Action::None => {}
        Action::Move => chase(slot, ctx, me, info.pos),
        Action::Melee => {
            if ctx.world.melee(me.id, target) {
                ctx.world.stop(me.id);
                slot.state.move_dest = None;
            } else {
                chase(slot, ctx, me, info.pos);
            }
        }
        Action::Shoot => {
            ctx.world.stop(me.id);
            slot.state.move_dest = None;
            if !ctx.world.shoot(me.id, target) {
                slot.state.action = Action::None;
            }
        }
    }
}

fn chase(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, me: &EntityInfo, to: Vec2F) {
    let stale = slot.state.move_dest.is_none_or(|d| d.distance(to) > CHASE_SLACK);
    if stale || !ctx.world.is_moving(me.id) {
        ctx.world.set_destination(me.id, to);
        slot.state.move_dest = Some(to);
    }
}

/// Walk the path to the chosen sector exit, smashing structures in the way.
fn run_rampage(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, me: &EntityInfo) {
    let port = ctx
        .world
        .sector_info(me.sector())
        .and_then(|info| slot.state.rampage_target.and_then(|p| info.port(p).cloned()));
    let Some(port) = port else {
        end_rampage(slot, ctx, me);
        return;
    };
    if me.cell().chebyshev(port.pos) <= 1 || port.path.is_empty() {
        end_rampage(slot, ctx, me);
        return;
    }

    let here = me.cell();
    let nearest = port
        .path
        .iter()
        .enumerate()
        .min_by_key(|(_, c)| c.chebyshev(here))
        .map_or(0, |(i, _)| i);
    let ahead = &port.path[nearest..(nearest + RAMPAGE_STRIDE).min(port.path.len())];

    for &cell in ahead {
        let Some(occupant) = ctx.world.occupant(cell) else { continue };
        let is_structure = ctx.world.entity(occupant).is_some_and(|e| e.structure().is_some());
        if is_structure && ctx.world.melee(me.id, occupant) {
            ctx.world.stop(me.id);
            slot.state.action = Action::Melee;
            slot.state.move_dest = None;
            return;
        }
    }

    let next = port.path[(nearest + RAMPAGE_STRIDE).min(port.path.len() - 1)].center();
    chase(slot, ctx, me, next);
    slot.state.action = Action::Move;
}

fn end_rampage(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, me: &EntityInfo) {
    tracing::debug!(agent = %slot.id, "rampage over");
    slot.state.mode = Mode::Normal;
    slot.state.rampage_target = None;
    slot.state.reset_action();
    ctx.world.stop(me.id);
}

/// Tour the sector's kiosks, then walk off the map.
fn run_visitor(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, me: &EntityInfo, delta: Millis) {
    if !slot.tasks.is_empty() {
        run_queue(slot, ctx, me, delta);
        return;
    }

    if !slot.state.visitor.leaving && slot.state.visitor.kiosks_seen >= ctx.config.visitor_kiosks {
        tracing::debug!(agent = %slot.id, seen = slot.state.visitor.kiosks_seen, "visitor leaving");
        slot.state.visitor.leaving = true;
    }

    if !slot.state.visitor.leaving {
        let kiosks: Vec<_> = ctx
            .world
            .buildings_in_sector(me.sector())
            .into_iter()
            .filter_map(|id| ctx.world.building_info(id))
            .filter(|b| b.kind == StructureKind::Kiosk)
            .filter(|b| ctx.world.relation(me.team, b.team) != Relation::Enemy)
            .filter_map(|b| b.porch)
            .collect();
        if !kiosks.is_empty() {
            let porch = kiosks[slot.state.visitor.kiosks_seen as usize % kiosks.len()];
            slot.tasks.push(Task::move_to(porch.center()), ctx.reservations);
            slot.tasks.push(Task::use_building().with_timer(ctx.config.visitor_stand), ctx.reservations);
            run_queue(slot, ctx, me, 0);
            return;
        }
        slot.state.visitor.leaving = true;
    }

    let exit = ctx.world.sector_info(me.sector()).and_then(|info| {
        info.ports.iter().min_by_key(|p| p.pos.chebyshev(me.cell())).map(|p| p.pos)
    });
    match exit {
        Some(pos) if me.cell().chebyshev(pos) > 1 => {
            chase(slot, ctx, me, pos.center());
            slot.state.action = Action::Move;
        }
        _ => {
            tracing::debug!(agent = %slot.id, "visitor left the map");
            ctx.world.despawn(me.id);
        }
    }
}

// ── Failure handling ──────────────────────────────────────────────────────────

fn on_blocked(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, me: &EntityInfo) {
    slot.state.blocked_count += 1;
    if slot.state.blocked_count < ctx.config.blocked_retry_limit {
        return;
    }
    slot.state.blocked_count = 0;

    if slot.state.mode == Mode::Battle {
        attack_adjacent(slot, ctx, me);
    } else {
        tracing::debug!(agent = %slot.id, "path blocked, replanning");
        abandon_plan(slot, ctx, me);
        slot.state.reset_action();
    }
}

/// Hit whatever hostile thing is next to us, mobile or not.
fn attack_adjacent(slot: &mut AgentSlot<'_>, ctx: &mut WorldContext<'_>, me: &EntityInfo) {
    let world = &*ctx.world;
    let adjacent = world.query_near(me.pos, ADJACENT_RADIUS, &|e| {
        e.id != me.id
            && (e.is_mobile() || e.structure().is_some())
            && world.relation(me.team, e.team) == Relation::Enemy
    });
    ctx.world.stop(me.id);
    slot.state.move_dest = None;
    for victim in adjacent {
        if ctx.world.melee(me.id, victim) {
            tracing::debug!(agent = %slot.id, %victim, "blocked in battle, attacking adjacent");
            slot.state.lock_target(victim);
            slot.state.action = Action::Melee;
            return;
        }
        tracing::trace!(agent = %slot.id, %victim, "adjacent strike refused");
    }
    slot.state.action = Action::None;
}

// ── Wake hint ─────────────────────────────────────────────────────────────────

fn wake_hint(slot: &AgentSlot<'_>, ctx: &WorldContext<'_>, me: &EntityInfo) -> Millis {
    let cfg = ctx.config;
    let active = slot.state.mode != Mode::Normal
        || !slot.tasks.is_empty()
        || slot.state.action != Action::None
        || ctx.world.is_moving(me.id);
    if active {
        return cfg.battle_wake.max(1);
    }
    let mut hint = VERY_LONG_TICK
        .min(slot.state.rethink.next())
        .min(slot.state.perception.ticker.next());
    if slot.species.has_needs() {
        hint = hint.min(slot.needs_ticker.next());
    }
    hint.max(1)
}
