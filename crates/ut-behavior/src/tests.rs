//! Unit tests for ut-behavior.
//!
//! Everything runs against `GridWorld`; the harness owns one of each shared
//! collaborator and builds a fresh `WorldContext` per call.

#[cfg(test)]
mod harness {
    use ut_agent::{AgentRngs, AgentSlot, AgentStore};
    use ut_core::{AgentId, AgentRng, AiConfig, EntityId, Millis, Species, TeamId, Vec2I};
    use ut_director::Director;
    use ut_task::ReservationRegistry;
    use ut_world::prelude::*;
    use ut_world::{AgentMessage, GridWorld, NewsLog, WorldEvent};

    use crate::{AgentScheduler, BehaviorModel, WorldContext};

    pub const RED: TeamId = TeamId(1);
    pub const BLUE: TeamId = TeamId(2);

    pub struct Harness {
        pub world:    GridWorld,
        pub store:    AgentStore,
        pub rngs:     AgentRngs,
        pub reg:      ReservationRegistry,
        pub director: Director,
        pub config:   AiConfig,
        pub news:     NewsLog,
    }

    impl Harness {
        /// A `sectors × sectors` map with every sector's reservations open.
        pub fn new(sectors: i32) -> Self {
            let config = AiConfig::default();
            let mut reg = ReservationRegistry::new();
            for x in 0..sectors {
                for y in 0..sectors {
                    reg.open_sector(Vec2I::new(x, y));
                }
            }
            Self {
                world: GridWorld::new(sectors),
                store: AgentStore::new(config.clone()),
                rngs: AgentRngs::new(7),
                reg,
                director: Director::new(),
                config,
                news: NewsLog::new(),
            }
        }

        /// Place a mob at the centre of `cell` and give it an agent.
        pub fn mob(&mut self, species: Species, team: TeamId, cell: Vec2I) -> (EntityId, AgentId) {
            let entity = self.world.add_mob(species, team, cell.center());
            let id = self.store.spawn(&mut self.rngs, entity, species).unwrap();
            (entity, id)
        }

        pub fn with<R>(
            &mut self,
            id: AgentId,
            f: impl FnOnce(&mut AgentSlot<'_>, &mut WorldContext<'_>, &mut AgentRng) -> R,
        ) -> R {
            let mut slot = self.store.slot_mut(id).unwrap();
            let rng = self.rngs.get_mut(id).unwrap();
            let mut ctx = WorldContext::new(
                &mut self.world,
                &mut self.reg,
                &mut self.director,
                &self.config,
                &mut self.news,
                0,
            );
            f(&mut slot, &mut ctx, rng)
        }

        pub fn tick(&mut self, id: AgentId, delta: Millis) -> Millis {
            self.with(id, |slot, ctx, rng| AgentScheduler.tick(slot, ctx, rng, delta))
        }

        pub fn tell(&mut self, id: AgentId, msg: AgentMessage) {
            self.with(id, |slot, ctx, rng| AgentScheduler.on_message(slot, &msg, ctx, rng))
        }

        /// Drain world events, keeping the messages addressed to `to`.
        pub fn messages_to(&mut self, to: EntityId) -> Vec<AgentMessage> {
            self.world
                .drain_events()
                .into_iter()
                .filter_map(|ev| match ev {
                    WorldEvent::Message { to: t, msg } if t == to => Some(msg),
                    _ => None,
                })
                .collect()
        }
    }
}

// ── Utility ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod utility {
    use proptest::prelude::*;
    use ut_core::{AiConfig, EntityId, Species, TeamId, Vec2F};
    use ut_world::{EntityInfo, EntityKind, Loadout, MeleeWeapon, RangedWeapon};

    use crate::{CombatOption, Target, UtilityEvaluator};

    fn me() -> EntityInfo {
        EntityInfo {
            id:          EntityId(1),
            kind:        EntityKind::Mob(Species::Human),
            team:        TeamId(1),
            pos:         Vec2F::new(0.0, 0.0),
            heading:     Vec2F::new(0.0, 1.0),
            hp_fraction: 1.0,
        }
    }

    fn mob_at(id: u32, x: f32, y: f32) -> Target {
        Target { id: EntityId(id), pos: Vec2F::new(x, y), mobile: true, line_of_sight: true }
    }

    fn rifle() -> RangedWeapon {
        RangedWeapon { effective_range: 10.0, has_ammo: true, ready: true, explosive: false }
    }

    fn armed() -> Loadout {
        Loadout { melee: Some(MeleeWeapon { ready: true }), ranged: Some(rifle()) }
    }

    fn melee_only() -> Loadout {
        Loadout { melee: Some(MeleeWeapon { ready: true }), ranged: None }
    }

    fn eval() -> UtilityEvaluator {
        UtilityEvaluator::new(&AiConfig::default())
    }

    #[test]
    fn far_target_moves_into_range() {
        let choice = eval().evaluate(&me(), &armed(), &[mob_at(2, 30.0, 0.0)], None, None, false).unwrap();
        assert_eq!(choice.option, CombatOption::Move);
        assert!((choice.utility - 2.0).abs() < 1e-5);
    }

    #[test]
    fn target_inside_range_is_shot() {
        let choice = eval().evaluate(&me(), &armed(), &[mob_at(2, 5.0, 0.0)], None, None, false).unwrap();
        assert_eq!(choice.option, CombatOption::Shoot);
        assert!((choice.utility - 1.5).abs() < 1e-5);
    }

    #[test]
    fn shooting_again_is_discounted() {
        let choice = eval().evaluate(&me(), &armed(), &[mob_at(2, 5.0, 0.0)], None, None, true).unwrap();
        assert_eq!(choice.option, CombatOption::Shoot);
        assert!((choice.utility - 1.35).abs() < 1e-5);
    }

    #[test]
    fn no_line_of_sight_falls_back_to_melee() {
        let mut t = mob_at(2, 5.0, 0.0);
        t.line_of_sight = false;
        let choice = eval().evaluate(&me(), &armed(), &[t], None, None, false).unwrap();
        assert_eq!(choice.option, CombatOption::Melee);
    }

    #[test]
    fn unarmed_has_no_choice() {
        let choice = eval().evaluate(&me(), &Loadout::default(), &[mob_at(2, 1.0, 0.0)], None, None, false);
        assert!(choice.is_none());
        assert!(eval().evaluate(&me(), &armed(), &[], None, None, false).is_none());
    }

    #[test]
    fn explosive_is_not_fired_point_blank() {
        let grenade = RangedWeapon { explosive: true, ..rifle() };
        let loadout = Loadout { melee: None, ranged: Some(grenade) };
        let choice = eval().evaluate(&me(), &loadout, &[mob_at(2, 1.0, 0.0)], None, None, false).unwrap();
        assert_eq!(choice.option, CombatOption::Shoot);
        assert_eq!(choice.utility, 0.0);
    }

    #[test]
    fn locked_target_beats_a_nearer_one() {
        let targets = [mob_at(2, 2.0, 0.0), mob_at(3, 6.0, 0.0)];
        let choice = eval().evaluate(&me(), &melee_only(), &targets, None, Some(EntityId(3)), false).unwrap();
        assert_eq!(choice.target, EntityId(3));
        assert_eq!(choice.index, 1);
    }

    #[test]
    fn ties_keep_the_first_target() {
        let targets = [mob_at(2, 3.0, 0.0), mob_at(3, -3.0, 0.0)];
        let choice = eval().evaluate(&me(), &melee_only(), &targets, None, None, false).unwrap();
        assert_eq!(choice.target, EntityId(2));
    }

    #[test]
    fn buildings_wait_while_mobs_are_around() {
        let wall = Target { id: EntityId(9), pos: Vec2F::new(2.0, 0.0), mobile: false, line_of_sight: true };
        let targets = [wall, mob_at(2, 4.0, 0.0)];
        let choice = eval().evaluate(&me(), &melee_only(), &targets, None, None, false).unwrap();
        assert_eq!(choice.target, EntityId(2));

        let alone = eval().evaluate(&me(), &melee_only(), &[wall], None, None, false).unwrap();
        assert_eq!(alone.target, EntityId(9));
    }

    #[test]
    fn heading_favours_what_is_ahead() {
        let e = eval();
        let ahead = mob_at(2, 0.0, 3.0);
        let behind = mob_at(3, 0.0, -3.0);
        let a = e.targeting_bias(&me(), &ahead, None, None, true);
        let b = e.targeting_bias(&me(), &behind, None, None, true);
        assert!(a > b);
    }

    proptest! {
        #[test]
        fn evaluation_is_deterministic(
            xs in prop::collection::vec((-20.0f32..20.0, -20.0f32..20.0), 1..6),
            locked in 0usize..6,
        ) {
            let targets: Vec<Target> = xs
                .iter()
                .enumerate()
                .map(|(i, &(x, y))| mob_at(i as u32 + 2, x, y))
                .collect();
            let locked = targets.get(locked).map(|t| t.id);
            let a = eval().evaluate(&me(), &armed(), &targets, None, locked, false);
            let b = eval().evaluate(&me(), &armed(), &targets, None, locked, false);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn melee_only_never_picks_ranged_options(
            xs in prop::collection::vec((-20.0f32..20.0, -20.0f32..20.0), 1..6),
        ) {
            let targets: Vec<Target> = xs
                .iter()
                .enumerate()
                .map(|(i, &(x, y))| mob_at(i as u32 + 2, x, y))
                .collect();
            let choice = eval().evaluate(&me(), &melee_only(), &targets, None, None, false);
            prop_assert_eq!(choice.map(|c| c.option), Some(CombatOption::Melee));
        }
    }
}

// ── Task execution ────────────────────────────────────────────────────────────

#[cfg(test)]
mod execute {
    use ut_agent::{Mode, ENERGY, FUN};
    use ut_core::{Species, StructureKind, Vec2I};
    use ut_task::{Task, TaskError};
    use ut_world::prelude::*;
    use ut_world::{NewsKind, WalletId};

    use super::harness::{Harness, BLUE, RED};
    use crate::{run_queue, Step};

    fn run(h: &mut Harness, id: ut_core::AgentId, delta: u32) -> Step {
        h.with(id, |slot, ctx, _| {
            let me = ctx.world.entity(slot.entity).unwrap();
            run_queue(slot, ctx, &me, delta)
        })
    }

    fn push(h: &mut Harness, id: ut_core::AgentId, task: Task) {
        h.with(id, |slot, ctx, _| slot.tasks.push(task, ctx.reservations));
    }

    #[test]
    fn taken_over_build_aborts_the_whole_plan() {
        let mut h = Harness::new(1);
        let cell = Vec2I::new(5, 5);
        let (_, a) = h.mob(Species::Worker, RED, cell);
        let (_, b) = h.mob(Species::Worker, RED, Vec2I::new(9, 9));
        h.world.fund(WalletId::Team(RED), 100);

        push(&mut h, a, Task::move_to(cell.center()));
        push(&mut h, a, Task::build(cell, StructureKind::Farm, 0));
        assert_eq!(h.reg.owner(cell), Some(a));
        push(&mut h, b, Task::build(cell, StructureKind::Farm, 0));
        assert_eq!(h.reg.owner(cell), Some(b));

        let step = run(&mut h, a, 100);
        assert_eq!(step, Step::Abort(TaskError::Reserved { cell, owner: b }));
        assert!(h.store.slot_mut(a).unwrap().tasks.is_empty());
        assert_eq!(h.reg.owner(cell), Some(b));
        assert!(h.world.occupant(cell).is_none());
        assert_eq!(h.world.balance(WalletId::Team(RED)), 100);
    }

    #[test]
    fn losing_the_cell_leaves_the_order_to_the_owner() {
        let mut h = Harness::new(1);
        let (worker, a) = h.mob(Species::Worker, RED, Vec2I::new(19, 20));
        let (other, b) = h.mob(Species::Worker, RED, Vec2I::new(4, 5));
        h.world.set_home(worker, Some(Vec2I::ZERO)).unwrap();
        h.world.set_home(other, Some(Vec2I::ZERO)).unwrap();
        h.world.fund(WalletId::Team(RED), 100);
        let cell = Vec2I::new(20, 20);
        assert!(h.world.add_action(cell, StructureKind::Farm, 0, 0));
        let job = h.world.jobs(Vec2I::ZERO)[0];

        push(&mut h, a, Task::build(cell, StructureKind::Farm, 0).with_payload(job.id));
        push(&mut h, b, Task::move_to(Vec2I::new(20, 19).center()).with_payload(job.id));
        push(&mut h, b, Task::build(cell, StructureKind::Farm, 0).with_payload(job.id));

        assert_eq!(run(&mut h, a, 0), Step::Abort(TaskError::Reserved { cell, owner: b }));
        assert_eq!(h.world.jobs(Vec2I::ZERO).len(), 1);
        assert_eq!(h.reg.owner(cell), Some(b));

        // The owner's plan still finds its order.
        assert_eq!(run(&mut h, b, 100), Step::Continue);
        assert_eq!(h.store.slot_mut(b).unwrap().tasks.len(), 2);
    }

    #[test]
    fn refused_build_is_refunded() {
        let mut h = Harness::new(1);
        let (_, a) = h.mob(Species::Worker, RED, Vec2I::new(4, 5));
        let cell = Vec2I::new(6, 6);
        h.world.set_rock(cell, true);
        h.world.fund(WalletId::Team(RED), 10);
        push(&mut h, a, Task::build(cell, StructureKind::Pave, 0));

        assert_eq!(run(&mut h, a, 0), Step::Abort(TaskError::Unbuildable(cell, StructureKind::Pave)));
        assert!(!h.world.is_paved(cell));
        assert_eq!(h.world.balance(WalletId::Team(RED)), 10);
        assert_eq!(h.world.balance(WalletId::Bank), 0);
    }

    #[test]
    fn build_commits_and_pays() {
        let mut h = Harness::new(1);
        let (_, a) = h.mob(Species::Worker, RED, Vec2I::new(4, 5));
        let cell = Vec2I::new(6, 6);
        h.world.fund(WalletId::Team(RED), 100);
        push(&mut h, a, Task::build(cell, StructureKind::Farm, 0));

        assert_eq!(run(&mut h, a, 0), Step::Done);
        assert!(h.world.occupant(cell).is_some());
        assert_eq!(h.world.balance(WalletId::Team(RED)), 80);
        assert_eq!(h.world.balance(WalletId::Bank), 20);
        assert!(h.news.iter().any(|n| n.kind == NewsKind::Built));
        assert_eq!(h.reg.owner(cell), None);
    }

    #[test]
    fn unaffordable_build_drops_the_queue() {
        let mut h = Harness::new(1);
        let (_, a) = h.mob(Species::Worker, RED, Vec2I::new(4, 5));
        let cell = Vec2I::new(6, 6);
        push(&mut h, a, Task::build(cell, StructureKind::Farm, 0));
        push(&mut h, a, Task::stand(1_000));

        assert_eq!(run(&mut h, a, 0), Step::Abort(TaskError::Unaffordable(StructureKind::Farm)));
        assert!(h.store.slot_mut(a).unwrap().tasks.is_empty());
        assert!(h.world.occupant(cell).is_none());
    }

    #[test]
    fn order_withdrawn_mid_plan() {
        let mut h = Harness::new(1);
        let (worker, a) = h.mob(Species::Worker, RED, Vec2I::new(4, 5));
        h.world.set_home(worker, Some(Vec2I::ZERO)).unwrap();
        let cell = Vec2I::new(20, 20);
        assert!(h.world.add_action(cell, StructureKind::Farm, 0, 0));
        let job = h.world.jobs(Vec2I::ZERO)[0];

        push(&mut h, a, Task::move_to(Vec2I::new(20, 19).center()).with_payload(job.id));
        push(&mut h, a, Task::build(cell, StructureKind::Farm, 0).with_payload(job.id));
        assert_eq!(run(&mut h, a, 100), Step::Continue);

        h.world.remove_task(cell);
        assert!(matches!(run(&mut h, a, 100), Step::Abort(TaskError::OrderGone(_))));
        assert!(h.store.slot_mut(a).unwrap().tasks.is_empty());
        assert_eq!(h.reg.owner(cell), None);
        assert!(!h.world.is_moving(worker));
    }

    #[test]
    fn stand_counts_down() {
        let mut h = Harness::new(1);
        let (_, a) = h.mob(Species::Mantis, BLUE, Vec2I::new(4, 5));
        push(&mut h, a, Task::stand(1_000));
        assert_eq!(run(&mut h, a, 600), Step::Continue);
        assert_eq!(run(&mut h, a, 600), Step::Done);
        assert!(h.store.slot_mut(a).unwrap().tasks.is_empty());
    }

    #[test]
    fn standing_together_is_fun() {
        let mut h = Harness::new(1);
        let (_, a) = h.mob(Species::Human, RED, Vec2I::new(5, 5));
        h.world.add_mob(Species::Human, RED, Vec2I::new(6, 5).center());
        h.store.slot_mut(a).unwrap().needs.set(FUN, 0.5);
        push(&mut h, a, Task::stand(5_000));

        run(&mut h, a, 1_000);
        let fun = h.store.slot_mut(a).unwrap().needs.get(FUN);
        assert!((fun - 0.52).abs() < 1e-9, "fun = {fun}");
    }

    #[test]
    fn an_enemy_in_the_group_spoils_the_fun() {
        let mut h = Harness::new(1);
        let (_, a) = h.mob(Species::Human, RED, Vec2I::new(5, 5));
        h.world.add_mob(Species::Human, RED, Vec2I::new(6, 5).center());
        h.world.add_mob(Species::Gob, BLUE, Vec2I::new(5, 6).center());
        h.store.slot_mut(a).unwrap().needs.set(FUN, 0.5);
        push(&mut h, a, Task::stand(5_000));

        run(&mut h, a, 1_000);
        assert_eq!(h.store.slot_mut(a).unwrap().needs.get(FUN), 0.5);
    }

    #[test]
    fn resting_at_a_sleep_tube_restores_energy() {
        let mut h = Harness::new(1);
        h.world.add_building(StructureKind::SleepTube, RED, Vec2I::new(10, 10), 0).unwrap();
        let (human, a) = h.mob(Species::Human, RED, Vec2I::new(10, 11));
        h.world.set_hp(human, 0.5).unwrap();
        h.store.slot_mut(a).unwrap().needs.set(ENERGY, 0.2);
        push(&mut h, a, Task::use_building());

        assert_eq!(run(&mut h, a, 1_000), Step::Done);
        let slot = h.store.slot_mut(a).unwrap();
        assert!(slot.needs.get(ENERGY) >= 0.7, "energy = {}", slot.needs.get(ENERGY));
        assert_eq!(slot.state.using_building, None);
    }

    #[test]
    fn visitors_count_kiosks() {
        let mut h = Harness::new(1);
        h.world.add_building(StructureKind::Kiosk, RED, Vec2I::new(20, 20), 0).unwrap();
        let (_, a) = h.mob(Species::Visitor, RED, Vec2I::new(20, 21));
        h.store.slot_mut(a).unwrap().state.mode = Mode::Visitor;
        push(&mut h, a, Task::use_building());

        assert_eq!(run(&mut h, a, 400), Step::Continue);
        assert_eq!(run(&mut h, a, 600), Step::Done);
        assert_eq!(h.store.slot_mut(a).unwrap().state.visitor.kiosks_seen, 1);
    }

    #[test]
    fn use_building_off_porch_aborts() {
        let mut h = Harness::new(1);
        let (_, a) = h.mob(Species::Human, RED, Vec2I::new(30, 30));
        push(&mut h, a, Task::use_building());
        assert!(matches!(run(&mut h, a, 1_000), Step::Abort(TaskError::Precondition(_))));
    }

    #[test]
    fn repair_stops_when_whole() {
        let mut h = Harness::new(1);
        let farm = h.world.add_building(StructureKind::Farm, RED, Vec2I::new(10, 10), 0).unwrap();
        h.world.set_hp(farm, 0.7).unwrap();
        let (_, a) = h.mob(Species::Worker, RED, Vec2I::new(10, 11));
        push(&mut h, a, Task::repair(farm));

        assert_eq!(run(&mut h, a, 0), Step::Continue);
        assert_eq!(run(&mut h, a, 1_000), Step::Continue);
        assert_eq!(run(&mut h, a, 1_000), Step::Done);
        assert!(h.world.entity(farm).unwrap().hp_fraction >= 1.0);
    }

    #[test]
    fn flag_without_a_flag_aborts() {
        let mut h = Harness::new(1);
        let cell = Vec2I::new(12, 12);
        let (_, a) = h.mob(Species::Human, RED, cell);
        push(&mut h, a, Task::flag(cell).with_timer(1_000));
        assert!(matches!(run(&mut h, a, 100), Step::Abort(TaskError::Precondition(_))));

        h.world.add_flag(cell, RED);
        push(&mut h, a, Task::flag(cell).with_timer(1_000));
        assert_eq!(run(&mut h, a, 100), Step::Continue);
        assert_eq!(run(&mut h, a, 900), Step::Done);
    }
}

// ── Goal chain ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod goals {
    use ut_agent::{Focus, ENERGY, FOOD};
    use ut_core::geo::sector_center;
    use ut_core::{AgentId, StructureKind, Species, Vec2I};
    use ut_task::TaskKind;
    use ut_world::prelude::*;
    use ut_world::{Inventory, ItemKind, NewsKind};

    use super::harness::{Harness, BLUE, RED};
    use crate::{Goal, GoalProposers};

    fn plan(h: &mut Harness, id: AgentId) -> Option<Goal> {
        h.with(id, |slot, ctx, rng| {
            let me = ctx.world.entity(slot.entity).unwrap();
            GoalProposers::run(slot, ctx, rng, &me)
        })
    }

    fn queued(h: &mut Harness, id: AgentId) -> Vec<TaskKind> {
        h.store.slot_mut(id).unwrap().tasks.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn loot_comes_before_wandering() {
        let mut h = Harness::new(1);
        let (_, a) = h.mob(Species::Human, RED, Vec2I::new(5, 5));
        let gold = h.world.add_item(ItemKind::Gold, Vec2I::new(8, 5).center());

        assert_eq!(plan(&mut h, a), Some(Goal::Loot));
        assert_eq!(
            queued(&mut h, a),
            vec![TaskKind::Move(Vec2I::new(8, 5).center()), TaskKind::Pickup(gold)]
        );
    }

    #[test]
    fn the_hungry_eat_what_they_carry() {
        let mut h = Harness::new(1);
        let (human, a) = h.mob(Species::Human, RED, Vec2I::new(5, 5));
        h.world
            .set_inventory(human, Inventory { free_slots: 3, food: 1, ..Inventory::default() })
            .unwrap();
        h.store.slot_mut(a).unwrap().needs.set(FOOD, 0.05);

        assert_eq!(plan(&mut h, a), Some(Goal::Hunger));
        assert_eq!(h.world.inventory(human).food, 0);
        assert!(h.store.slot_mut(a).unwrap().needs.get(FOOD) > 0.5);
    }

    #[test]
    fn fruit_goes_to_the_distillery() {
        let mut h = Harness::new(1);
        let still = h.world.add_building(StructureKind::Distillery, RED, Vec2I::new(10, 10), 0).unwrap();
        let (human, a) = h.mob(Species::Human, RED, Vec2I::new(5, 5));
        h.world.set_home(human, Some(Vec2I::ZERO)).unwrap();
        h.world
            .set_inventory(human, Inventory { free_slots: 3, fruit: 1, ..Inventory::default() })
            .unwrap();

        assert_eq!(plan(&mut h, a), Some(Goal::Cargo));
        let porch = h.world.building_info(still).unwrap().porch.unwrap();
        assert_eq!(queued(&mut h, a), vec![TaskKind::Move(porch.center()), TaskKind::UseBuilding]);
    }

    #[test]
    fn tired_denizens_visit_a_sleep_tube() {
        let mut h = Harness::new(1);
        let tube = h.world.add_building(StructureKind::SleepTube, RED, Vec2I::new(10, 10), 0).unwrap();
        let (human, a) = h.mob(Species::Human, RED, Vec2I::new(5, 5));
        h.world.set_home(human, Some(Vec2I::ZERO)).unwrap();
        h.store.slot_mut(a).unwrap().needs.set(ENERGY, 0.0);

        assert_eq!(plan(&mut h, a), Some(Goal::Needs));
        let porch = h.world.building_info(tube).unwrap().porch.unwrap();
        assert_eq!(queued(&mut h, a)[0], TaskKind::Move(porch.center()));
    }

    #[test]
    fn workers_claim_the_nearest_open_job() {
        let mut h = Harness::new(1);
        let (worker, a) = h.mob(Species::Worker, RED, Vec2I::new(5, 5));
        h.world.set_home(worker, Some(Vec2I::ZERO)).unwrap();
        let near = Vec2I::new(8, 8);
        let far = Vec2I::new(40, 40);
        h.world.add_action(far, StructureKind::Farm, 0, 0);
        h.world.add_action(near, StructureKind::Kiosk, 90, 0);

        assert_eq!(plan(&mut h, a), Some(Goal::WorkerJob));
        let slot = h.store.slot_mut(a).unwrap();
        let tasks: Vec<_> = slot.tasks.iter().copied().collect();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].kind, TaskKind::Build { pos: near, structure: StructureKind::Kiosk, rotation: 90 });
        assert_ne!(tasks[1].payload, 0);
        assert_eq!(tasks[0].payload, tasks[1].payload);
        assert_eq!(h.reg.owner(near), Some(a));
        assert_eq!(h.reg.owner(far), None);
    }

    #[test]
    fn clear_orders_become_removals() {
        let mut h = Harness::new(1);
        let (worker, a) = h.mob(Species::Worker, RED, Vec2I::new(5, 5));
        h.world.set_home(worker, Some(Vec2I::ZERO)).unwrap();
        let cell = Vec2I::new(9, 5);
        h.world.add_action(cell, StructureKind::Clear, 0, 0);

        assert_eq!(plan(&mut h, a), Some(Goal::WorkerJob));
        assert_eq!(queued(&mut h, a)[1], TaskKind::RemoveStructure(cell));
    }

    #[test]
    fn jobs_claimed_by_others_are_skipped() {
        let mut h = Harness::new(1);
        let (worker, a) = h.mob(Species::Worker, RED, Vec2I::new(5, 5));
        h.world.set_home(worker, Some(Vec2I::ZERO)).unwrap();
        let cell = Vec2I::new(8, 8);
        h.world.add_action(cell, StructureKind::Farm, 0, 0);
        h.reg.register(cell, AgentId(99));

        assert_eq!(plan(&mut h, a), Some(Goal::Wander));
        assert_eq!(h.reg.owner(cell), Some(AgentId(99)));
    }

    #[test]
    fn workers_repair_damaged_buildings() {
        let mut h = Harness::new(1);
        let farm = h.world.add_building(StructureKind::Farm, RED, Vec2I::new(10, 10), 0).unwrap();
        h.world.set_hp(farm, 0.4).unwrap();
        let (worker, a) = h.mob(Species::Worker, RED, Vec2I::new(5, 5));
        h.world.set_home(worker, Some(Vec2I::ZERO)).unwrap();

        assert_eq!(plan(&mut h, a), Some(Goal::Repair));
        assert_eq!(queued(&mut h, a)[1], TaskKind::Repair(farm));
    }

    #[test]
    fn denizens_hold_a_free_flag() {
        let mut h = Harness::new(1);
        let cell = Vec2I::new(9, 9);
        h.world.add_flag(cell, RED);
        let (_, a) = h.mob(Species::Human, RED, Vec2I::new(5, 5));

        assert_eq!(plan(&mut h, a), Some(Goal::Flag));
        assert_eq!(queued(&mut h, a), vec![TaskKind::Move(cell.center()), TaskKind::Flag(cell)]);
    }

    #[test]
    fn attraction_summons_monsters_to_the_player() {
        let mut h = Harness::new(2);
        let home = Vec2I::new(1, 1);
        h.world.set_player_home(home, RED, 0);
        h.director.attract_team(BLUE);
        let (_, a) = h.mob(Species::Mantis, BLUE, Vec2I::new(5, 5));
        let (_, b) = h.mob(Species::Mantis, BLUE, Vec2I::new(6, 5));

        assert_eq!(plan(&mut h, a), Some(Goal::Wander));
        assert_eq!(queued(&mut h, a), vec![TaskKind::Move(sector_center(home).center())]);
        assert_eq!(h.store.slot_mut(a).unwrap().state.focus, Focus::Move);
        assert!(h.news.iter().any(|n| n.kind == NewsKind::SectorHerd));

        // Consumed by the first taker.
        assert_eq!(plan(&mut h, b), Some(Goal::Wander));
        assert_ne!(queued(&mut h, b)[0], TaskKind::Move(sector_center(home).center()));
    }

    #[test]
    fn wandering_always_claims() {
        let mut h = Harness::new(1);
        let (_, a) = h.mob(Species::Trilobyte, BLUE, Vec2I::new(30, 30));
        assert_eq!(plan(&mut h, a), Some(Goal::Wander));
        let tasks = queued(&mut h, a);
        assert_eq!(tasks.len(), 2);
        assert!(matches!(tasks[0], TaskKind::Move(_)));
        assert_eq!(tasks[1], TaskKind::Stand);
    }
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scheduler {
    use ut_agent::{Action, Focus, Mode, FOOD};
    use ut_core::geo::sector_center;
    use ut_core::{AiConfig, Species, Vec2I};
    use ut_task::{Task, TaskKind};
    use ut_world::prelude::*;
    use ut_world::{AgentMessage, Loadout, NewsKind};

    use super::harness::{Harness, BLUE, RED};
    use crate::{should_engage, Crisis};

    #[test]
    fn action_lock_freezes_the_agent() {
        let mut h = Harness::new(1);
        let (human, a) = h.mob(Species::Human, RED, Vec2I::new(5, 5));
        h.world.add_mob(Species::Gob, BLUE, Vec2I::new(7, 5).center());
        h.world.set_locked(human, true).unwrap();

        assert_eq!(h.tick(a, 2_000), h.config.locked_wake);
        let slot = h.store.slot_mut(a).unwrap();
        assert_eq!(slot.state.mode, Mode::Normal);
        assert!(slot.state.perception.enemies.is_empty());
        assert!(slot.tasks.is_empty());
    }

    #[test]
    fn threats_start_a_battle_and_warn_allies() {
        let mut h = Harness::new(1);
        let (_, a) = h.mob(Species::Human, RED, Vec2I::new(5, 5));
        let friend = h.world.add_mob(Species::Human, RED, Vec2I::new(6, 6).center());
        let gob = h.world.add_mob(Species::Gob, BLUE, Vec2I::new(8, 5).center());
        h.with(a, |slot, ctx, _| slot.tasks.push(Task::stand(5_000), ctx.reservations));

        let wake = h.tick(a, 1_000);
        assert_eq!(wake, h.config.battle_wake);
        let slot = h.store.slot_mut(a).unwrap();
        assert_eq!(slot.state.mode, Mode::Battle);
        assert!(slot.tasks.is_empty());
        assert_eq!(slot.state.perception.enemies.first(), Some(gob));
        assert_eq!(slot.state.action, Action::Melee);
        assert!(slot.state.is_consistent());

        let msgs = h.messages_to(friend);
        assert_eq!(msgs, vec![AgentMessage::Awareness { threats: vec![gob] }]);
    }

    #[test]
    fn battle_ends_when_the_enemy_is_gone() {
        let mut h = Harness::new(1);
        let (_, a) = h.mob(Species::Human, RED, Vec2I::new(5, 5));
        let gob = h.world.add_mob(Species::Gob, BLUE, Vec2I::new(8, 5).center());
        h.tick(a, 1_000);
        assert_eq!(h.store.slot_mut(a).unwrap().state.mode, Mode::Battle);

        h.world.despawn(gob);
        h.tick(a, 100);
        let slot = h.store.slot_mut(a).unwrap();
        assert_eq!(slot.state.mode, Mode::Normal);
        assert_eq!(slot.state.focus, Focus::None);
    }

    #[test]
    fn battle_preempts_a_rampage() {
        let mut h = Harness::new(1);
        let (_, a) = h.mob(Species::Troll, BLUE, Vec2I::new(30, 30));
        h.world.add_mob(Species::Human, RED, Vec2I::new(32, 30).center());
        {
            let slot = h.store.slot_mut(a).unwrap();
            slot.state.mode = Mode::Rampage;
            slot.state.rampage_target = Some(0);
        }

        h.tick(a, 1_000);
        let slot = h.store.slot_mut(a).unwrap();
        assert_eq!(slot.state.mode, Mode::Battle);
        assert_eq!(slot.state.rampage_target, None);
    }

    #[test]
    fn focused_moves_ignore_threats() {
        let mut h = Harness::new(1);
        let (_, a) = h.mob(Species::Human, RED, Vec2I::new(5, 5));
        h.world.add_mob(Species::Gob, BLUE, Vec2I::new(8, 5).center());
        h.with(a, |slot, ctx, _| {
            slot.tasks.push(Task::move_to(Vec2I::new(40, 5).center()), ctx.reservations);
            slot.state.focus = Focus::Move;
        });

        h.tick(a, 1_000);
        let slot = h.store.slot_mut(a).unwrap();
        assert_eq!(slot.state.mode, Mode::Normal);
        assert_eq!(slot.state.action, Action::Move);
    }

    #[test]
    fn workers_only_fight_when_few() {
        let mut h = Harness::new(1);
        let (worker, a) = h.mob(Species::Worker, RED, Vec2I::new(5, 5));
        h.world.add_mob(Species::Gob, BLUE, Vec2I::new(8, 5).center());
        let me = h.world.entity(worker).unwrap();
        let cfg = AiConfig::default();
        assert!(should_engage(&h.world, &me, &cfg));

        for x in 0..cfg.worker_engage_floor {
            h.world.add_mob(Species::Worker, RED, Vec2I::new(20 + x as i32, 20).center());
        }
        assert!(!should_engage(&h.world, &me, &cfg));
        h.tick(a, 1_000);
        assert_eq!(h.store.slot_mut(a).unwrap().state.mode, Mode::Normal);
    }

    #[test]
    fn repeated_blocks_drop_the_plan() {
        let mut h = Harness::new(1);
        let (_, a) = h.mob(Species::Human, RED, Vec2I::new(5, 5));
        h.with(a, |slot, ctx, _| {
            slot.tasks.push(Task::move_to(Vec2I::new(40, 5).center()), ctx.reservations);
            slot.tasks.push(Task::stand(1_000), ctx.reservations);
        });

        h.tell(a, AgentMessage::DestinationBlocked);
        h.tell(a, AgentMessage::DestinationBlocked);
        assert_eq!(h.store.slot_mut(a).unwrap().tasks.len(), 2);
        h.tell(a, AgentMessage::DestinationBlocked);
        let slot = h.store.slot_mut(a).unwrap();
        assert!(slot.tasks.is_empty());
        assert_eq!(slot.state.blocked_count, 0);
    }

    #[test]
    fn arrival_resets_the_block_count() {
        let mut h = Harness::new(1);
        let (_, a) = h.mob(Species::Human, RED, Vec2I::new(5, 5));
        h.tell(a, AgentMessage::DestinationBlocked);
        h.tell(a, AgentMessage::DestinationBlocked);
        h.tell(a, AgentMessage::DestinationReached);
        assert_eq!(h.store.slot_mut(a).unwrap().state.blocked_count, 0);
    }

    #[test]
    fn blocked_in_battle_hits_what_is_adjacent() {
        let mut h = Harness::new(1);
        let (_, a) = h.mob(Species::Human, RED, Vec2I::new(5, 5));
        let gob = h.world.add_mob(Species::Gob, BLUE, Vec2I::new(6, 5).center());
        {
            let slot = h.store.slot_mut(a).unwrap();
            slot.state.mode = Mode::Battle;
            slot.state.perception.enemies.push(gob);
        }

        for _ in 0..h.config.blocked_retry_limit {
            h.tell(a, AgentMessage::DestinationBlocked);
        }
        let slot = h.store.slot_mut(a).unwrap();
        assert_eq!(slot.state.action, Action::Melee);
        assert_eq!(slot.state.locked_target(), Some(gob));
        assert!(h.world.entity(gob).unwrap().hp_fraction < 1.0);
    }

    #[test]
    fn unarmed_and_blocked_in_battle_does_not_pretend_to_fight() {
        let mut h = Harness::new(1);
        let (human, a) = h.mob(Species::Human, RED, Vec2I::new(5, 5));
        h.world.set_loadout(human, Loadout::default()).unwrap();
        let gob = h.world.add_mob(Species::Gob, BLUE, Vec2I::new(6, 5).center());
        {
            let slot = h.store.slot_mut(a).unwrap();
            slot.state.mode = Mode::Battle;
            slot.state.perception.enemies.push(gob);
        }

        for _ in 0..h.config.blocked_retry_limit {
            h.tell(a, AgentMessage::DestinationBlocked);
        }
        let slot = h.store.slot_mut(a).unwrap();
        assert_eq!(slot.state.action, Action::None);
        assert_eq!(slot.state.locked_target(), None);
        assert_eq!(h.world.entity(gob).unwrap().hp_fraction, 1.0);
    }

    #[test]
    fn losing_the_locked_target_clears_focus() {
        let mut h = Harness::new(1);
        let (_, a) = h.mob(Species::Human, RED, Vec2I::new(5, 5));
        let gob = h.world.add_mob(Species::Gob, BLUE, Vec2I::new(6, 5).center());
        h.world.add_mob(Species::Gob, BLUE, Vec2I::new(9, 5).center());
        h.tick(a, 1_000);
        h.store.slot_mut(a).unwrap().state.lock_target(gob);

        h.world.despawn(gob);
        h.tick(a, 10);
        let slot = h.store.slot_mut(a).unwrap();
        assert_ne!(slot.state.focus, Focus::Target);
        assert_eq!(slot.state.mode, Mode::Battle);
        assert!(slot.state.is_consistent());
    }

    #[test]
    fn damage_and_awareness_feed_the_enemy_list() {
        let mut h = Harness::new(1);
        let (_, a) = h.mob(Species::Human, RED, Vec2I::new(5, 5));
        let friend = h.world.add_mob(Species::Human, RED, Vec2I::new(6, 6).center());
        let gob = h.world.add_mob(Species::Gob, BLUE, Vec2I::new(30, 30).center());
        let troll = h.world.add_mob(Species::Troll, BLUE, Vec2I::new(40, 40).center());

        h.tell(a, AgentMessage::Damaged { source: gob });
        h.tell(a, AgentMessage::Awareness { threats: vec![friend, troll] });
        let slot = h.store.slot_mut(a).unwrap();
        let enemies = slot.state.perception.enemies.as_slice();
        assert_eq!(enemies, &[gob, troll]);
    }

    #[test]
    fn a_known_attacker_moves_to_the_front() {
        let mut h = Harness::new(1);
        let (_, a) = h.mob(Species::Human, RED, Vec2I::new(5, 5));
        let troll = h.world.add_mob(Species::Troll, BLUE, Vec2I::new(40, 40).center());
        let gob = h.world.add_mob(Species::Gob, BLUE, Vec2I::new(30, 30).center());

        h.tell(a, AgentMessage::Awareness { threats: vec![troll, gob] });
        h.tell(a, AgentMessage::Damaged { source: gob });
        assert_eq!(h.store.slot_mut(a).unwrap().state.perception.enemies.first(), Some(gob));

        // A locked target keeps its place.
        h.store.slot_mut(a).unwrap().state.lock_target(troll);
        h.tell(a, AgentMessage::Damaged { source: gob });
        let slot = h.store.slot_mut(a).unwrap();
        assert_eq!(slot.state.locked_target(), Some(troll));
        assert!(slot.state.perception.enemies.as_slice().contains(&gob));
    }

    #[test]
    fn battle_tracks_the_enemy_list_across_ticks() {
        for species in [Species::Human, Species::Troll] {
            let mut h = Harness::new(1);
            let (_, a) = h.mob(species, RED, Vec2I::new(5, 5));
            let mut gobs = Vec::new();

            for round in 0..6 {
                if round % 2 == 0 {
                    gobs.push(h.world.add_mob(Species::Gob, BLUE, Vec2I::new(8, 5).center()));
                } else {
                    for gob in gobs.drain(..) {
                        h.world.despawn(gob);
                    }
                }
                for _ in 0..3 {
                    h.tick(a, 1_000);
                    let slot = h.store.slot_mut(a).unwrap();
                    let threatened = !slot.state.perception.enemies.is_empty();
                    assert_eq!(slot.state.mode == Mode::Battle, threatened, "{species} round {round}");
                    assert!(!(threatened && slot.state.mode == Mode::Rampage));
                    assert!(slot.state.is_consistent());
                }
            }
        }
    }

    #[test]
    fn herding_replaces_the_plan() {
        let mut h = Harness::new(2);
        let (_, a) = h.mob(Species::Mantis, BLUE, Vec2I::new(5, 5));
        h.with(a, |slot, ctx, _| slot.tasks.push(Task::stand(1_000), ctx.reservations));
        let dest = Vec2I::new(1, 1);

        h.tell(a, AgentMessage::SectorHerd { dest, focus: true });
        let slot = h.store.slot_mut(a).unwrap();
        let tasks: Vec<_> = slot.tasks.iter().map(|t| t.kind).collect();
        assert_eq!(tasks, vec![TaskKind::Move(sector_center(dest).center())]);
        assert_eq!(slot.state.focus, Focus::Move);
        assert!(h.news.iter().any(|n| n.kind == NewsKind::SectorHerd));
    }

    #[test]
    fn work_updates_wake_idle_workers() {
        let mut h = Harness::new(1);
        let (_, a) = h.mob(Species::Worker, RED, Vec2I::new(5, 5));
        h.store.slot_mut(a).unwrap().state.action = Action::Move;
        h.tell(a, AgentMessage::WorkQueueUpdated);
        assert_eq!(h.store.slot_mut(a).unwrap().state.action, Action::None);
    }

    #[test]
    fn critical_need_away_from_home_heads_back() {
        let mut h = Harness::new(2);
        let (human, a) = h.mob(Species::Human, RED, Vec2I::new(5, 5));
        let home = Vec2I::new(1, 1);
        h.world.set_home(human, Some(home)).unwrap();
        h.store.slot_mut(a).unwrap().needs.set(FOOD, 0.05);

        h.tick(a, 1_000);
        let slot = h.store.slot_mut(a).unwrap();
        assert_eq!(
            slot.tasks.peek_front().map(|t| t.kind),
            Some(TaskKind::Move(sector_center(home).center()))
        );
        assert_eq!(slot.state.focus, Focus::Move);
        assert!(h.world.is_moving(human));
    }

    #[test]
    fn starving_breaks_morale() {
        let mut h = Harness::new(1);
        let (human, a) = h.mob(Species::Human, RED, Vec2I::new(5, 5));
        {
            let slot = h.store.slot_mut(a).unwrap();
            slot.needs.set(FOOD, 0.0);
            slot.needs.set_morale(0.0);
        }

        h.tick(a, 1_000);
        assert!((h.world.entity(human).unwrap().hp_fraction - 0.75).abs() < 1e-6);
        assert_eq!(h.store.slot_mut(a).unwrap().needs.morale(), 1.0);
        assert!(h.news.iter().any(|n| n.kind == NewsKind::MoraleCrisis));
    }

    #[test]
    fn crisis_follows_the_emptiest_drive() {
        assert_eq!(Crisis::for_need(ut_agent::FOOD), Crisis::Starve);
        assert_eq!(Crisis::for_need(ut_agent::ENERGY), Crisis::VisionQuest);
        assert_eq!(Crisis::for_need(ut_agent::FUN), Crisis::Bloodrage);
    }

    #[test]
    fn visitors_with_nothing_to_see_leave() {
        let mut h = Harness::new(1);
        h.world.add_core(Vec2I::ZERO, ut_core::TeamId::ROGUE).unwrap();
        let centre = sector_center(Vec2I::ZERO);
        let (visitor, a) = h.mob(Species::Visitor, RED, Vec2I::new(centre.x, 1));

        h.tick(a, 1_000);
        assert!(h.world.entity(visitor).is_none());
        let slot = h.store.slot_mut(a).unwrap();
        assert_eq!(slot.state.mode, Mode::Visitor);
        assert!(slot.state.visitor.leaving);
    }

    #[test]
    fn planned_agents_wake_soon() {
        let mut h = Harness::new(1);
        let (_, a) = h.mob(Species::Mantis, BLUE, Vec2I::new(5, 5));
        h.tick(a, 1_000);
        // Wandering keeps the agent busy.
        assert!(!h.store.slot_mut(a).unwrap().tasks.is_empty());
        assert_eq!(h.tick(a, 0), h.config.battle_wake);
    }
}
