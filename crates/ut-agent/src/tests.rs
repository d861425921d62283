//! Unit tests for ut-agent.

#[cfg(test)]
mod track_list {
    use ut_core::EntityId;

    use crate::TrackList;

    #[test]
    fn rejects_duplicates_and_overflow() {
        let mut t = TrackList::new(2);
        assert!(t.push(EntityId(1)));
        assert!(!t.push(EntityId(1)));
        assert!(t.push(EntityId(2)));
        assert!(!t.push(EntityId(3)));
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn set_first_moves_or_evicts() {
        let mut t = TrackList::new(3);
        t.push(EntityId(1));
        t.push(EntityId(2));
        t.push(EntityId(3));
        t.set_first(EntityId(3));
        assert_eq!(t.first(), Some(EntityId(3)));
        assert_eq!(t.len(), 3);

        t.set_first(EntityId(9));
        assert_eq!(t.first(), Some(EntityId(9)));
        assert_eq!(t.len(), 3);
        assert!(t.contains(EntityId(3)));
    }
}

// ── Needs ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod needs {
    use ut_core::{EntityId, Personality, Preference, Rect2I, StructureKind, TeamId, Vec2I};
    use ut_world::{BuildingInfo, Inventory};

    use crate::{fulfilled_by_building, Needs, DECAY_TIME, ENERGY, FOOD, FUN};

    fn building(kind: StructureKind, stock: u32) -> BuildingInfo {
        BuildingInfo {
            id: EntityId(1),
            kind,
            team: TeamId(1),
            bounds: Rect2I::from_cell(Vec2I::new(5, 5)),
            porch: Some(Vec2I::new(5, 6)),
            rotation: 0,
            hp_fraction: 1.0,
            stock,
            zone_fit: 1.0,
        }
    }

    #[test]
    fn home_ticks_decay_every_drive_to_zero() {
        let mut n = Needs::new();
        let calm = Personality::default();
        let mut last = n.values();
        for _ in 0..DECAY_TIME as usize + 1 {
            n.tick(1_000, false, &calm);
            for (i, v) in n.values().into_iter().enumerate() {
                assert!(v <= last[i] && v >= 0.0);
            }
            last = n.values();
        }
        assert_eq!(n.values(), [0.0; 3]);
    }

    #[test]
    fn starving_at_home_ends_in_one_crisis_then_refills() {
        let mut n = Needs::new();
        let calm = Personality::default();
        let mut crises = 0;
        for _ in 0..500 {
            n.tick(1_000, false, &calm);
            if n.take_crisis() {
                crises += 1;
            }
        }
        assert_eq!(crises, 1);

        // Visits bring the drives back up to full.
        for _ in 0..20 {
            n.add([0.1; 3], 1.0);
        }
        assert_eq!(n.values(), [1.0; 3]);
    }

    #[test]
    fn one_second_costs_one_over_decay_time() {
        let mut n = Needs::new();
        n.tick(1_000, false, &Personality::default());
        assert!((n.get(ENERGY) - (1.0 - 1.0 / DECAY_TIME)).abs() < 1e-12);
    }

    #[test]
    fn battle_is_fun_for_fighters() {
        let likes = Personality { fighting: Preference::Likes, ..Personality::default() };
        let dislikes = Personality { fighting: Preference::Dislikes, ..Personality::default() };
        let mut a = Needs::new();
        let mut b = Needs::new();
        a.set(FUN, 0.5);
        b.set(FUN, 0.5);
        a.tick(10_000, true, &likes);
        b.tick(10_000, true, &dislikes);
        assert!(a.get(FUN) > 0.5);
        assert!(b.get(FUN) < 0.5);
    }

    #[test]
    fn refill_approaches_one_without_overshoot() {
        let mut n = Needs::new();
        for i in 0..3 {
            n.set(i, 0.0);
        }
        let mut last = 0.0;
        for _ in 0..20 {
            n.add([0.1, 0.1, 0.1], 1.0);
            assert!(n.get(FOOD) >= last && n.get(FOOD) <= 1.0);
            last = n.get(FOOD);
        }
        assert_eq!(n.get(FOOD), 1.0);
    }

    #[test]
    fn crisis_fires_once_and_restores_morale() {
        let mut n = Needs::new();
        n.set_morale(0.0);
        assert!(n.take_crisis());
        assert_eq!(n.morale(), 1.0);
        assert!(!n.take_crisis());
    }

    #[test]
    fn travel_drains_only_morale() {
        let mut n = Needs::new();
        n.travel_tick(200_000);
        assert_eq!(n.get(FOOD), 1.0);
        assert!((n.morale() - 0.95).abs() < 1e-9);
    }

    #[test]
    fn bar_without_stock_is_useless() {
        let inv = Inventory::default();
        let p = Personality::default();
        assert_eq!(fulfilled_by_building(&building(StructureKind::Bar, 0), &inv, &p, 1.0), [0.0; 3]);
        let full = fulfilled_by_building(&building(StructureKind::Bar, 3), &inv, &p, 1.0);
        assert!(full[FOOD] > 0.0);
    }

    #[test]
    fn sleep_tube_rises_with_wounds_and_zone_fit_scales() {
        let inv = Inventory::default();
        let p = Personality::default();
        let mut tube = building(StructureKind::SleepTube, 0);
        tube.zone_fit = -1.0;
        let v = fulfilled_by_building(&tube, &inv, &p, 0.2);
        assert!((v[ENERGY] - 0.8).abs() < 1e-6);

        let healthy = fulfilled_by_building(&tube, &inv, &p, 1.0);
        assert!((healthy[ENERGY] - 0.1).abs() < 1e-6);
    }

    #[test]
    fn factory_needs_crystal() {
        let p = Personality { crafting: Preference::Likes, ..Personality::default() };
        let broke = Inventory::default();
        let rich = Inventory { crystals: 1, ..Inventory::default() };
        let f = building(StructureKind::Factory, 0);
        assert_eq!(fulfilled_by_building(&f, &broke, &p, 1.0), [0.0; 3]);
        let v = fulfilled_by_building(&f, &rich, &p, 1.0);
        assert!((v[FUN] - 0.55).abs() < 1e-9);
    }
}

// ── Perception ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod perception {
    use ut_core::{AiConfig, EntityId, Species, StructureKind, TeamId, Vec2I};
    use ut_world::prelude::*;
    use ut_world::GridWorld;

    use crate::PerceptionCache;

    const RED: TeamId = TeamId(1);
    const BLUE: TeamId = TeamId(2);

    fn world() -> (GridWorld, EntityId, EntityId, EntityId) {
        let mut w = GridWorld::new(1);
        let me = w.add_mob(Species::Human, RED, Vec2I::new(5, 5).center());
        let near = w.add_mob(Species::Gob, BLUE, Vec2I::new(8, 5).center());
        let far = w.add_mob(Species::Gob, BLUE, Vec2I::new(30, 5).center());
        w.add_mob(Species::Human, RED, Vec2I::new(6, 6).center());
        (w, me, near, far)
    }

    #[test]
    fn refresh_splits_friends_and_enemies() {
        let (w, me, near, _) = world();
        let cfg = AiConfig::default();
        let mut p = PerceptionCache::new(&cfg);
        p.refresh(&w, &w.entity(me).unwrap(), &cfg, None);
        assert_eq!(p.enemies.as_slice(), &[near]);
        assert_eq!(p.friends.len(), 1);
    }

    #[test]
    fn refresh_is_idempotent_and_keeps_lock() {
        let (w, me, near, far) = world();
        let cfg = AiConfig::default();
        let info = w.entity(me).unwrap();
        let mut p = PerceptionCache::new(&cfg);
        p.refresh(&w, &info, &cfg, Some(far));
        let first = p.enemies.clone();
        p.refresh(&w, &info, &cfg, Some(far));
        assert_eq!(p.enemies, first);
        assert_eq!(p.enemies.first(), Some(far));
        assert!(p.enemies.contains(near));
    }

    #[test]
    fn buildings_only_when_no_mobile_threat() {
        let (mut w, me, near, _) = world();
        let hut = w.add_building(StructureKind::Farm, BLUE, Vec2I::new(5, 9), 0).unwrap();
        let cfg = AiConfig::default();
        let mut p = PerceptionCache::new(&cfg);
        p.refresh(&w, &w.entity(me).unwrap(), &cfg, None);
        assert!(!p.enemies.contains(hut));

        w.despawn(near);
        p.refresh(&w, &w.entity(me).unwrap(), &cfg, None);
        assert_eq!(p.enemies.as_slice(), &[hut]);
    }

    #[test]
    fn prune_drops_dead_and_reports_lost_lock() {
        let (mut w, me, near, _) = world();
        let cfg = AiConfig::default();
        let mut p = PerceptionCache::new(&cfg);
        p.refresh(&w, &w.entity(me).unwrap(), &cfg, None);
        w.despawn(near);
        assert!(p.prune(&w, &w.entity(me).unwrap(), Some(near)));
        assert!(p.enemies.is_empty());
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod store {
    use ut_core::{AgentId, EntityId, Species, StructureKind, Vec2I};
    use ut_task::{ReservationRegistry, Task};

    use crate::{AgentError, AgentStoreBuilder, Mode};

    #[test]
    fn builder_allocates_slots_and_rngs() {
        let (store, rngs) = AgentStoreBuilder::new(7)
            .agent(EntityId(10), Species::Human)
            .agent(EntityId(11), Species::Troll)
            .agent(EntityId(10), Species::Gob)
            .build();
        assert_eq!(store.count, 2);
        assert_eq!(rngs.len(), 2);
        assert_eq!(store.by_entity(EntityId(11)), Some(AgentId(1)));
        assert_eq!(store.species[1], Species::Troll);
        assert_eq!(store.state[0].mode, Mode::Normal);
    }

    #[test]
    fn duplicate_spawn_is_an_error() {
        let (mut store, mut rngs) = AgentStoreBuilder::new(7).agent(EntityId(10), Species::Human).build();
        assert_eq!(
            store.spawn(&mut rngs, EntityId(10), Species::Human),
            Err(AgentError::Duplicate(EntityId(10), AgentId(0)))
        );
    }

    #[test]
    fn retire_releases_reservations_and_blocks_access() {
        let (mut store, _) = AgentStoreBuilder::new(7).agent(EntityId(10), Species::Worker).build();
        let mut reg = ReservationRegistry::new();
        reg.open_sector(Vec2I::ZERO);
        let id = AgentId(0);
        {
            let slot = store.slot_mut(id).unwrap();
            slot.tasks.push(Task::build(Vec2I::new(4, 4), StructureKind::Farm, 0), &mut reg);
        }
        assert_eq!(reg.len(), 1);

        assert_eq!(store.retire(id, &mut reg), Ok(EntityId(10)));
        assert!(reg.is_empty());
        assert!(store.by_entity(EntityId(10)).is_none());
        assert!(matches!(store.slot_mut(id), Err(AgentError::Retired(_))));
        assert!(matches!(store.slot_mut(AgentId(5)), Err(AgentError::UnknownAgent(_))));
        assert_eq!(store.live_ids().count(), 0);
    }
}
