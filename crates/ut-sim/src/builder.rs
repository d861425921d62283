//! Fluent builder for constructing a [`Sim`].

use ut_agent::{AgentRngs, AgentStore};
use ut_behavior::BehaviorModel;
use ut_core::{AiConfig, SimConfig, SimRng, TeamId, Vec2I};
use ut_director::Director;
use ut_domain::{Archetype, QuotaTable};
use ut_task::ReservationRegistry;
use ut_world::prelude::*;
use ut_world::NewsLog;

use crate::{Sim, SimError, SimResult, WakeQueue};

/// Fluent builder for [`Sim<W, B>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: frame length, run length, seed
/// - `W: World`: the world to drive
/// - `B: BehaviorModel`: usually [`ut_behavior::AgentScheduler`]
///
/// # Optional inputs (have defaults)
///
/// | Method                  | Default                      |
/// |-------------------------|------------------------------|
/// | `.ai_config(c)`         | `AiConfig::default()`        |
/// | `.director(d)`          | `Director::new()`            |
/// | `.quotas(q)`            | `QuotaTable::defaults()`     |
/// | `.domain(t, s, a)`      | no domain planners           |
///
/// Every mob already in the world gets an agent, due on frame 0.
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, world, AgentScheduler)
///     .domain(TeamId(1), Vec2I::new(2, 2), Archetype::Economic)
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<W: World, B: BehaviorModel> {
    config:    SimConfig,
    ai_config: AiConfig,
    world:     W,
    behavior:  B,
    director:  Option<Director>,
    quotas:    QuotaTable,
    domains:   Vec<(TeamId, Vec2I, Archetype)>,
}

impl<W: World, B: BehaviorModel> SimBuilder<W, B> {
    pub fn new(config: SimConfig, world: W, behavior: B) -> Self {
        Self {
            config,
            ai_config: AiConfig::default(),
            world,
            behavior,
            director: None,
            quotas: QuotaTable::defaults(),
            domains: Vec::new(),
        }
    }

    pub fn ai_config(mut self, ai_config: AiConfig) -> Self {
        self.ai_config = ai_config;
        self
    }

    pub fn director(mut self, director: Director) -> Self {
        self.director = Some(director);
        self
    }

    /// Quotas every domain planner added by [`domain`][Self::domain] uses.
    pub fn quotas(mut self, quotas: QuotaTable) -> Self {
        self.quotas = quotas;
        self
    }

    /// Run a domain planner for `team` in `sector`.
    pub fn domain(mut self, team: TeamId, sector: Vec2I, archetype: Archetype) -> Self {
        self.domains.push((team, sector, archetype));
        self
    }

    /// Validate inputs, register agents for the world's mobs, create the
    /// planners, and return a ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim<W, B>> {
        if self.config.tick_ms == 0 {
            return Err(SimError::Config("tick_ms must be positive".into()));
        }
        if self.ai_config.max_track == 0 {
            return Err(SimError::Config("max_track must be positive".into()));
        }

        let mut sim = Sim {
            clock:         self.config.make_clock(),
            agents:        AgentStore::new(self.ai_config.clone()),
            rngs:          AgentRngs::new(self.config.seed),
            rng:           SimRng::new(self.config.seed),
            config:        self.config,
            ai_config:     self.ai_config,
            world:         self.world,
            reservations:  ReservationRegistry::new(),
            director:      self.director.unwrap_or_default(),
            planners:      Vec::new(),
            wake_queue:    WakeQueue::new(),
            news:          NewsLog::new(),
            behavior:      self.behavior,
            due:           Vec::new(),
            last_ms:       Vec::new(),
            director_due:  0,
            director_last: 0,
        };

        for (team, sector, archetype) in self.domains {
            sim.add_domain(team, sector, archetype, self.quotas.clone())?;
        }
        for entity in sim.world.mobs() {
            sim.register(entity)?;
        }

        tracing::info!(
            agents = sim.agents.live_count(),
            domains = sim.planners.len(),
            tick_ms = sim.config.tick_ms,
            "simulation built"
        );
        Ok(sim)
    }
}
