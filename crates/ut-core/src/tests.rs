//! Unit tests for ut-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, EntityId, TeamId};

    #[test]
    fn index_roundtrip() {
        let id = AgentId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(AgentId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(EntityId::INVALID.0, u32::MAX);
        assert_eq!(TeamId::INVALID.0, u16::MAX);
        assert!(!EntityId::default().is_valid());
        assert!(EntityId(3).is_valid());
    }

    #[test]
    fn team_id_rejects_oversized_index() {
        assert!(TeamId::try_from(70_000usize).is_err());
    }

    #[test]
    fn display() {
        assert_eq!(EntityId(7).to_string(), "EntityId(7)");
    }
}

#[cfg(test)]
mod geo {
    use crate::geo::{
        inner_sector_bounds, is_interior_sector, sector_bounds, to_sector, world_rotation,
        SECTOR_SIZE,
    };
    use crate::{Rect2I, Vec2F, Vec2I};

    #[test]
    fn step_toward_prefers_longer_axis() {
        let p = Vec2I::new(2, 2);
        assert_eq!(p.step_toward(Vec2I::new(2, 5)), Vec2I::new(2, 3));
        assert_eq!(p.step_toward(Vec2I::new(6, 3)), Vec2I::new(3, 2));
        // Ties step along y.
        assert_eq!(p.step_toward(Vec2I::new(4, 4)), Vec2I::new(2, 3));
        assert_eq!(p.step_toward(p), p);
    }

    #[test]
    fn sector_of_negative_cell_floors() {
        assert_eq!(to_sector(Vec2I::new(-1, 0)), Vec2I::new(-1, 0));
        assert_eq!(to_sector(Vec2I::new(SECTOR_SIZE, 5)), Vec2I::new(1, 0));
    }

    #[test]
    fn inner_bounds_drop_border() {
        let s = Vec2I::new(1, 1);
        let outer = sector_bounds(s);
        let inner = inner_sector_bounds(s);
        assert_eq!(outer.width(), SECTOR_SIZE);
        assert_eq!(inner.width(), SECTOR_SIZE - 2);
        assert!(outer.contains_rect(&inner));
        assert!(!inner.contains(outer.min));
    }

    #[test]
    fn interior_sector_excludes_map_ring() {
        assert!(!is_interior_sector(Vec2I::new(0, 3)));
        assert!(is_interior_sector(Vec2I::new(1, 1)));
    }

    #[test]
    fn rect_cells_are_row_major() {
        let r = Rect2I::from_pair(Vec2I::new(1, 1), Vec2I::new(0, 0));
        let cells: Vec<Vec2I> = r.cells().collect();
        assert_eq!(
            cells,
            vec![Vec2I::new(0, 0), Vec2I::new(1, 0), Vec2I::new(0, 1), Vec2I::new(1, 1)]
        );
        assert_eq!(r.area(), 4);
    }

    #[test]
    fn rotation_and_facing() {
        let up = Vec2I::new(0, 1);
        assert_eq!(up.rotate_ccw(), Vec2I::new(-1, 0));
        assert_eq!(world_rotation(up), 0);
        assert_eq!(world_rotation(Vec2I::new(1, 0)), 90);
        assert_eq!(world_rotation(Vec2I::new(0, -1)), 180);
        assert_eq!(world_rotation(Vec2I::new(-1, 0)), 270);
    }

    #[test]
    fn normalized_zero_is_zero() {
        assert_eq!(Vec2F::ZERO.normalized(), Vec2F::ZERO);
        let n = Vec2F::new(3.0, 4.0).normalized();
        assert!((n.length() - 1.0).abs() < 1e-6);
    }
}

#[cfg(test)]
mod ticker {
    use crate::{AgentId, AgentRng, Millis, Ticker};

    #[test]
    fn fresh_ticker_fires_immediately() {
        let mut t = Ticker::new(1_000);
        assert_eq!(t.delta(1), 1);
        assert_eq!(t.next(), 999);
    }

    #[test]
    fn delayed_ticker_waits_a_period() {
        let mut t = Ticker::delayed(1_000);
        assert_eq!(t.delta(999), 0);
        assert_eq!(t.delta(1), 1);
    }

    #[test]
    fn catch_up_counts_missed_periods() {
        let mut t = Ticker::delayed(100);
        assert_eq!(t.delta(350), 3);
        assert_eq!(t.next(), 50);
    }

    #[test]
    fn long_sleep_on_a_short_period_catches_up_at_once() {
        let mut t = Ticker::delayed(1);
        assert_eq!(t.delta(Millis::MAX), i32::MAX as u32);
        assert_eq!(t.next(), 1);
        assert_eq!(t.delta(1), 1);
    }

    #[test]
    fn within_only_shortens() {
        let mut t = Ticker::delayed(1_000);
        t.within(200);
        assert_eq!(t.next(), 200);
        t.within(500);
        assert_eq!(t.next(), 200);
    }

    #[test]
    fn randomize_stays_inside_period() {
        let mut rng = AgentRng::new(7, AgentId(3));
        for _ in 0..50 {
            let mut t = Ticker::new(400);
            t.randomize(rng.inner());
            assert!(t.next() < 400);
        }
    }

    #[test]
    fn zero_period_is_clamped() {
        let mut t = Ticker::new(0);
        assert_eq!(t.period(), 1);
        // Fires once for the initial zero phase plus once per elapsed ms.
        assert_eq!(t.delta(5), 6);
    }

    #[test]
    fn fraction_remaining_tracks_countdown() {
        let mut t = Ticker::delayed(1_000);
        t.delta(750);
        assert!((t.fraction_remaining() - 0.25).abs() < 1e-6);
    }
}

#[cfg(test)]
mod clock {
    use crate::{SimClock, SimConfig, Tick};

    #[test]
    fn ticks_for_ms_rounds_up_and_never_zero() {
        let clock = SimClock::new(100);
        assert_eq!(clock.ticks_for_ms(0), 1);
        assert_eq!(clock.ticks_for_ms(101), 2);
        assert_eq!(clock.ms_for_ticks(3), 300);
    }

    #[test]
    fn config_end_tick() {
        let cfg = SimConfig { tick_ms: 50, total_ticks: 20, seed: 1 };
        assert_eq!(cfg.end_tick(), Tick(20));
        assert_eq!(cfg.make_clock().tick_ms, 50);
    }
}

#[cfg(test)]
mod rng {
    use crate::rng::select_weighted;
    use crate::{AgentId, AgentRng, SimRng};

    #[test]
    fn agent_streams_are_reproducible() {
        let mut a = AgentRng::new(99, AgentId(5));
        let mut b = AgentRng::new(99, AgentId(5));
        for _ in 0..20 {
            assert_eq!(a.random::<u64>(), b.random::<u64>());
        }
    }

    #[test]
    fn weighted_never_picks_zero_weight() {
        let mut rng = SimRng::new(3);
        for _ in 0..200 {
            let pick = rng.select_weighted(&[0.0, 2.0, -1.0, 1.0]).unwrap();
            assert!(pick == 1 || pick == 3);
        }
    }

    #[test]
    fn weighted_empty_is_none() {
        let mut rng = SimRng::new(3);
        assert_eq!(select_weighted(rng.inner(), &[]), None);
        assert_eq!(rng.select_weighted(&[0.0, 0.0]), None);
    }
}

#[cfg(test)]
mod catalog {
    use crate::{MobClass, Species, StructureKind, Zone};

    #[test]
    fn species_names_roundtrip() {
        for sp in Species::ALL {
            assert_eq!(sp.as_str().parse::<Species>().unwrap(), sp);
        }
        assert!("dragon".parse::<Species>().is_err());
    }

    #[test]
    fn classes() {
        assert_eq!(Species::Troll.mob_class(), MobClass::Greater);
        assert!(Species::Human.has_needs());
        assert!(!Species::Mantis.has_needs());
        assert!(Species::Worker.does_work());
    }

    #[test]
    fn structure_properties() {
        assert!(!StructureKind::Pave.is_building());
        assert!(StructureKind::Farm.has_porch());
        assert_eq!(StructureKind::Market.size(), 2);
        assert!(StructureKind::Factory.zone().conflicts_with(StructureKind::Farm.zone()));
        assert!(!Zone::Neutral.conflicts_with(Zone::Industrial));
        assert_eq!("SleepTube".parse::<StructureKind>().unwrap(), StructureKind::SleepTube);
    }
}
