//! Unit and property tests for ut-task.

#[cfg(test)]
mod helpers {
    use ut_core::{AgentId, StructureKind, Vec2I};

    use crate::{ReservationRegistry, Task};

    pub fn registry() -> ReservationRegistry {
        let mut reg = ReservationRegistry::new();
        reg.open_sector(Vec2I::ZERO);
        reg
    }

    pub fn farm_at(x: i32, y: i32) -> Task {
        Task::build(Vec2I::new(x, y), StructureKind::Farm, 0)
    }

    pub const A: AgentId = AgentId(0);
    pub const B: AgentId = AgentId(1);
}

// ── Task ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod task {
    use ut_core::{EntityId, Vec2F, Vec2I};

    use super::helpers::*;
    use crate::Task;

    #[test]
    fn only_site_tasks_name_a_cell() {
        let p = Vec2I::new(5, 5);
        assert_eq!(farm_at(5, 5).cell(), Some(p));
        assert_eq!(Task::remove_structure(p).cell(), Some(p));
        assert_eq!(Task::flag(p).cell(), Some(p));
        assert_eq!(Task::move_to(Vec2F::new(5.5, 5.5)).cell(), None);
        assert_eq!(Task::repair(EntityId(3)).cell(), None);
        assert_eq!(Task::stand(1_000).cell(), None);
    }

    #[test]
    fn builders_set_timer_and_payload() {
        let t = Task::stand(2_500).with_payload(7);
        assert_eq!(t.timer, 2_500);
        assert_eq!(t.payload, 7);
        assert_eq!(t.name(), "stand");
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod registry {
    use ut_core::Vec2I;

    use super::helpers::*;
    use crate::{ReservationRegistry, TaskError};

    #[test]
    fn closed_sector_ignores_claims() {
        let mut reg = ReservationRegistry::new();
        reg.register(Vec2I::new(3, 3), A);
        assert!(reg.is_empty());
        assert!(reg.check(Vec2I::new(3, 3), A).is_ok());
    }

    #[test]
    fn last_writer_wins_and_loser_release_is_noop() {
        let mut reg = registry();
        let c = Vec2I::new(3, 3);
        reg.register(c, A);
        reg.register(c, B);
        assert_eq!(reg.owner(c), Some(B));
        assert!(reg.is_claimed_by_other(c, A));
        reg.release(c, A);
        assert_eq!(reg.owner(c), Some(B));
        assert_eq!(reg.check(c, A), Err(TaskError::Reserved { cell: c, owner: B }));
        assert!(reg.check(c, B).is_ok());
    }

    #[test]
    fn owner_release_hands_cell_back_to_displaced_claimant() {
        let mut reg = registry();
        let c = Vec2I::new(3, 3);
        reg.register(c, A);
        reg.register(c, B);
        assert_eq!(reg.claimants(c), &[A, B]);

        reg.release(c, B);
        assert_eq!(reg.owner(c), Some(A));
        assert!(reg.check(c, A).is_ok());

        reg.release(c, A);
        assert_eq!(reg.owner(c), None);
        assert!(reg.claimants(c).is_empty());
        assert!(reg.is_empty());
    }

    #[test]
    fn reclaiming_moves_agent_to_the_top() {
        let mut reg = registry();
        let c = Vec2I::new(3, 3);
        reg.register(c, A);
        reg.register(c, B);
        reg.register(c, A);
        assert_eq!(reg.claimants(c), &[B, A]);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn close_sector_drops_claims() {
        let mut reg = registry();
        reg.register(Vec2I::new(3, 3), A);
        reg.register(Vec2I::new(4, 3), B);
        assert_eq!(reg.len(), 2);
        reg.close_sector(Vec2I::ZERO);
        assert!(reg.is_empty());
        assert!(!reg.is_open(Vec2I::ZERO));
    }

    #[test]
    fn release_all_only_touches_owner() {
        let mut reg = registry();
        reg.register(Vec2I::new(3, 3), A);
        reg.register(Vec2I::new(4, 3), A);
        reg.register(Vec2I::new(5, 3), B);
        reg.release_all(A);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.owner(Vec2I::new(5, 3)), Some(B));
    }
}

// ── Queue ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod queue {
    use ut_core::{Vec2F, Vec2I};

    use super::helpers::*;
    use crate::{Task, TaskKind, TaskQueue};

    #[test]
    fn push_registers_pop_releases() {
        let mut reg = registry();
        let mut q = TaskQueue::new(A);
        q.push(Task::move_to(Vec2F::new(5.5, 5.5)), &mut reg);
        q.push(farm_at(5, 5), &mut reg);
        assert_eq!(reg.owner(Vec2I::new(5, 5)), Some(A));
        assert_eq!(reg.len(), 1);

        assert!(matches!(q.pop_front(&mut reg).unwrap().kind, TaskKind::Move(_)));
        assert_eq!(reg.len(), 1);
        assert!(matches!(q.pop_front(&mut reg).unwrap().kind, TaskKind::Build { .. }));
        assert!(reg.is_empty());
        assert!(q.pop_front(&mut reg).is_none());
    }

    #[test]
    fn duplicate_cell_stays_reserved_until_last_task() {
        let mut reg = registry();
        let mut q = TaskQueue::new(A);
        q.push(Task::remove_structure(Vec2I::new(5, 5)), &mut reg);
        q.push(farm_at(5, 5), &mut reg);
        q.pop_front(&mut reg);
        assert_eq!(reg.owner(Vec2I::new(5, 5)), Some(A));
        q.pop_front(&mut reg);
        assert!(reg.is_empty());
    }

    #[test]
    fn clear_releases_everything_it_owns() {
        let mut reg = registry();
        let mut a = TaskQueue::new(A);
        let mut b = TaskQueue::new(B);
        a.push(farm_at(1, 1), &mut reg);
        a.push(farm_at(2, 2), &mut reg);
        b.push(farm_at(2, 2), &mut reg);
        a.clear(&mut reg);
        assert!(a.is_empty());
        assert_eq!(reg.owner(Vec2I::new(1, 1)), None);
        assert_eq!(reg.owner(Vec2I::new(2, 2)), Some(B));
    }

    #[test]
    fn displaced_task_regains_its_cell_when_winner_pops() {
        let mut reg = registry();
        let mut a = TaskQueue::new(A);
        let mut b = TaskQueue::new(B);
        a.push(farm_at(6, 6), &mut reg);
        b.push(farm_at(6, 6), &mut reg);
        assert_eq!(reg.owner(Vec2I::new(6, 6)), Some(B));

        b.pop_front(&mut reg);
        assert_eq!(a.len(), 1);
        assert_eq!(reg.owner(Vec2I::new(6, 6)), Some(A));

        a.pop_front(&mut reg);
        assert!(reg.is_empty());
    }

    #[test]
    fn front_mut_updates_timer() {
        let mut reg = registry();
        let mut q = TaskQueue::new(A);
        q.push(Task::stand(1_000), &mut reg);
        q.front_mut().unwrap().timer -= 400;
        assert_eq!(q.peek_front().unwrap().timer, 600);
    }
}

// ── Reservation invariant ─────────────────────────────────────────────────────

#[cfg(test)]
mod invariant {
    use proptest::prelude::*;
    use ut_core::{AgentId, Vec2F, Vec2I};

    use super::helpers::*;
    use crate::{ReservationRegistry, Task, TaskQueue};

    /// Cell 3 lies in a sector no domain owns.
    fn cell(i: i32) -> Vec2I {
        if i == 3 { Vec2I::new(70, 10) } else { Vec2I::new(10 + i, 10) }
    }

    /// Every claim is backed by a task in its owner's queue.
    fn no_ghost_claims(reg: &ReservationRegistry, queues: &[TaskQueue]) -> bool {
        reg.claims().all(|(c, owner)| queues[owner.index()].names_cell(c))
            && reg.claims().all(|(c, _)| {
                reg.claimants(c).iter().all(|a| queues[a.index()].names_cell(c))
            })
    }

    /// Every cell a queue names in a tracked sector is reserved.
    fn no_unreserved_tasks(reg: &ReservationRegistry, queues: &[TaskQueue]) -> bool {
        queues.iter().all(|q| {
            q.iter()
                .filter_map(|t| t.cell())
                .filter(|&c| c != cell(3))
                .all(|c| reg.owner(c).is_some())
        })
    }

    proptest! {
        #[test]
        fn reservations_track_queues(
            ops in prop::collection::vec((0usize..3, 0u8..4, 0i32..4), 1..80)
        ) {
            let mut reg = registry();
            let mut queues: Vec<TaskQueue> =
                (0..3).map(|i| TaskQueue::new(AgentId(i))).collect();

            for (agent, op, c) in ops {
                let q = &mut queues[agent];
                match op {
                    0 => {
                        q.push(farm_at(cell(c).x, cell(c).y), &mut reg);
                        if c != 3 {
                            prop_assert_eq!(reg.owner(cell(c)), Some(q.owner()));
                        }
                    }
                    1 => q.push(Task::move_to(Vec2F::new(1.5, 1.5)), &mut reg),
                    2 => { q.pop_front(&mut reg); }
                    _ => q.clear(&mut reg),
                }
                prop_assert!(no_ghost_claims(&reg, &queues));
                prop_assert!(no_unreserved_tasks(&reg, &queues));
                prop_assert!(reg.owner(cell(3)).is_none());
            }

            for q in &mut queues {
                q.clear(&mut reg);
            }
            prop_assert!(reg.is_empty());
        }
    }
}
