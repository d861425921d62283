//! skirmish: two domains, a handful of residents, and a gob swarm.
//!
//! Red runs an economic sector, blue an industrial one next door.  Both
//! start with a few residents and gold for workers; the director sends a
//! swarm of gobs across the map a little after the start.  News headlines
//! are printed as they happen, then a summary of each sector.
//!
//! Set `RUST_LOG=ut_domain=debug` (or `trace`) to watch the planners work.

use std::io::Cursor;
use std::time::Instant;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use ut_behavior::AgentScheduler;
use ut_core::{SimConfig, Species, StructureKind, TeamId, Tick, Vec2F, Vec2I};
use ut_director::{Plot, SwarmPlot};
use ut_domain::{load_quotas_reader, Archetype};
use ut_sim::{SimBuilder, SimObserver};
use ut_world::prelude::*;
use ut_world::{GridWorld, NewsEvent, Relation, WalletId};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:        u64 = 42;
const TICK_MS:     u32 = 100;
const SIM_SECS:    u64 = 600;
const SECTORS:     i32 = 4;
const START_GOLD:  u32 = 400;
const SWARM_AFTER: u64 = 600; // frames before the swarm starts

const RED:  TeamId = TeamId(1);
const BLUE: TeamId = TeamId(2);
const GOBS: TeamId = TeamId(3);

const RED_HOME:  Vec2I = Vec2I::new(1, 1);
const BLUE_HOME: Vec2I = Vec2I::new(2, 1);

// Red builds more kiosks than the defaults, blue fewer guard posts.
const QUOTAS_CSV: &str = "\
archetype,structure,quota\n\
economic,kiosk,4\n\
economic,worker,3\n\
industrial,guardpost,1\n\
";

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Headlines {
    printed: usize,
    woken:   usize,
}

impl SimObserver for Headlines {
    fn on_tick_end(&mut self, _tick: Tick, woken: usize) {
        self.woken += woken;
    }

    fn on_news(&mut self, tick: Tick, event: &NewsEvent) {
        self.printed += 1;
        let kind = format!("{:?}", event.kind);
        match event.pos {
            Some(pos) => println!("{tick:>7}  {kind:<12} {} @ ({}, {})", event.text, pos.x, pos.y),
            None => println!("{tick:>7}  {kind:<12} {}", event.text),
        }
    }
}

// ── World setup ───────────────────────────────────────────────────────────────

fn build_world() -> Result<GridWorld> {
    let mut world = GridWorld::new(SECTORS);

    for (team, home) in [(RED, RED_HOME), (BLUE, BLUE_HOME)] {
        world.add_core(home, team)?;
        world.fund(WalletId::Team(team), START_GOLD);
        let origin = ut_core::geo::sector_center(home);
        for i in 0..4 {
            let pos = Vec2F::new(origin.x as f32 - 6.5 + i as f32, origin.y as f32 + 6.5);
            let mob = world.add_mob(Species::Human, team, pos);
            world.set_home(mob, Some(home))?;
        }
    }
    world.add_building(StructureKind::Farm, RED, Vec2I::new(72, 108), 0)?;

    for (a, b) in [(RED, GOBS), (BLUE, GOBS)] {
        world.set_relation(a, b, Relation::Enemy);
        world.set_relation(b, a, Relation::Enemy);
    }
    world.set_relation(RED, BLUE, Relation::Neutral);

    // A little scrub and rock for the planners to clear.
    for (i, cell) in [(70, 84), (88, 70), (150, 90), (170, 110)].into_iter().enumerate() {
        world.add_plant(Vec2I::new(cell.0, cell.1), (i % 4) as u8, false)?;
    }
    for x in 100..104 {
        world.set_rock(Vec2I::new(x, 120), true);
    }
    Ok(world)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(true)
        .init();

    println!("=== skirmish: rust_ut behavior scheduler ===");
    println!("Sectors: {SECTORS}x{SECTORS}  |  Seconds: {SIM_SECS}  |  Seed: {SEED}");
    println!();

    let quotas = load_quotas_reader(Cursor::new(QUOTAS_CSV))?;
    let world = build_world()?;

    let config = SimConfig {
        tick_ms:     TICK_MS,
        total_ticks: SIM_SECS * 1000 / TICK_MS as u64,
        seed:        SEED,
    };

    let mut sim = SimBuilder::new(config, world, AgentScheduler)
        .quotas(quotas)
        .domain(RED, RED_HOME, Archetype::Economic)
        .domain(BLUE, BLUE_HOME, Archetype::Industrial)
        .build()?;
    tracing::info!(agents = sim.agents.live_count(), "skirmish ready");

    let mut obs = Headlines::default();
    let t0 = Instant::now();

    sim.run_ticks(SWARM_AFTER, &mut obs)?;
    sim.start_plot(Plot::Swarm(SwarmPlot::new(Species::Gob, Vec2I::new(0, 3), RED_HOME)));
    sim.run(&mut obs)?;

    let elapsed = t0.elapsed();
    println!();
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  headlines     : {}", obs.printed);
    println!("  agent ticks   : {}", obs.woken);
    println!("  agents alive  : {}", sim.agents.live_count());
    println!();

    println!("{:<6} {:<12} {:>6} {:>6} {:>9} {:>6}", "Team", "Archetype", "Pop", "Gold", "Buildings", "Jobs");
    println!("{}", "-".repeat(50));
    for planner in &sim.planners {
        let team = planner.team();
        let buildings: u32 = sim.world.building_counts(planner.sector()).0.values().sum();
        println!(
            "{:<6} {:<12} {:>6} {:>6} {:>9} {:>6}",
            team.0,
            planner.archetype(),
            sim.world.team_population(team),
            sim.world.balance(WalletId::Team(team)),
            buildings,
            sim.world.jobs(planner.sector()).len(),
        );
    }

    Ok(())
}
