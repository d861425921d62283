//! The `Sim` struct and its frame loop.

use ut_agent::{AgentResult, AgentRngs, AgentStore};
use ut_behavior::{BehaviorModel, WorldContext};
use ut_core::geo::to_sector;
use ut_core::{AgentId, AiConfig, EntityId, Millis, SimClock, SimConfig, SimRng, TeamId, Tick, Vec2I};
use ut_director::{Director, Plot};
use ut_domain::{Archetype, DomainPlanner, QuotaTable};
use ut_task::ReservationRegistry;
use ut_world::prelude::*;
use ut_world::{AgentMessage, NewsLog, WorldEvent};

use crate::{SimObserver, SimResult, WakeQueue};

/// Event routing rounds per frame.  Messages answered with messages within
/// the same frame stop here and carry over.
const MAX_EVENT_ROUNDS: usize = 8;

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim<W, B>` owns the world and every piece of scheduler state and drives
/// the frame loop:
///
/// 1. **Events**: drain world events.  Spawned mobs get an agent and wake
///    now; despawned ones are retired and their reservations released;
///    messages go to [`BehaviorModel::on_message`] and wake the recipient
///    now; lost buildings reach the rebuild queues and the director.
/// 2. **Director**: ticked when its own wake hint comes due.
/// 3. **Planners**: every domain planner ticks; each keeps its own cadence.
/// 4. **Agents**: drain the agents due this frame and tick each, filing it
///    again `hint` milliseconds ahead.
/// 5. **World**: advance movement and cooldowns by one frame.
/// 6. **News**: flushed to the observer.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<W: World, B: BehaviorModel> {
    pub config:       SimConfig,
    pub ai_config:    AiConfig,
    pub clock:        SimClock,
    pub world:        W,
    pub agents:       AgentStore,
    pub rngs:         AgentRngs,
    pub reservations: ReservationRegistry,
    pub director:     Director,
    pub planners:     Vec<DomainPlanner>,
    pub wake_queue:   WakeQueue,
    /// News produced this frame, flushed to the observer at its end.
    pub news:         NewsLog,
    pub behavior:     B,

    pub(crate) rng:           SimRng,
    /// Frame each agent is really due; `None` once retired.
    pub(crate) due:           Vec<Option<Tick>>,
    /// Simulated ms at each agent's previous tick.
    pub(crate) last_ms:       Vec<u64>,
    pub(crate) director_due:  u64,
    pub(crate) director_last: u64,
}

impl<W: World, B: BehaviorModel> Sim<W, B> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run from the current frame to `config.end_tick()`.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.clock.current_tick < self.config.end_tick() {
            self.step(observer)?;
        }
        observer.on_sim_end(self.clock.current_tick);
        Ok(())
    }

    /// Run exactly `n` frames from the current position (ignores `end_tick`).
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer)?;
        }
        Ok(())
    }

    /// Hand a domain planner the sector `team` holds.  Opens the sector's
    /// reservations.
    pub fn add_domain(
        &mut self,
        team: TeamId,
        sector: Vec2I,
        archetype: Archetype,
        quotas: QuotaTable,
    ) -> SimResult<()> {
        let mut rng = self.rng.child(self.planners.len() as u64);
        let planner = DomainPlanner::new(team, sector, archetype, &self.world, quotas, &mut rng)?;
        self.reservations.open_sector(sector);
        self.planners.push(planner);
        Ok(())
    }

    /// Start a world event now, replacing any running one.
    pub fn start_plot(&mut self, plot: Plot) {
        self.director.start_plot(plot, &mut self.news);
        self.director_due = self.clock.elapsed_ms();
    }

    /// The agent driving `entity`, if any.
    pub fn agent_for(&self, entity: EntityId) -> Option<AgentId> {
        self.agents.by_entity(entity)
    }

    /// Frame `agent` is next due, `None` if retired or unknown.
    pub fn next_wake(&self, agent: AgentId) -> Option<Tick> {
        self.due.get(agent.index()).copied().flatten()
    }

    /// Give `entity` an agent and wake it this frame.  Non-mobs are ignored.
    pub fn register(&mut self, entity: EntityId) -> AgentResult<Option<AgentId>> {
        let Some(species) = self.world.entity(entity).and_then(|e| e.species()) else {
            return Ok(None);
        };
        let id = self.agents.spawn(&mut self.rngs, entity, species)?;
        let i = id.index();
        if self.due.len() <= i {
            self.due.resize(i + 1, None);
            self.last_ms.resize(i + 1, 0);
        }
        self.last_ms[i] = self.clock.elapsed_ms();
        self.wake(id, self.clock.current_tick);
        Ok(Some(id))
    }

    /// File `agent` at `tick`, unless it is already due sooner.
    pub fn wake(&mut self, agent: AgentId, tick: Tick) {
        let Some(slot) = self.due.get_mut(agent.index()) else { return };
        if !self.agents.is_alive(agent) {
            return;
        }
        if slot.is_some_and(|d| d <= tick) {
            return;
        }
        *slot = Some(tick);
        self.wake_queue.push(tick, agent);
    }

    // ── Frame processing ──────────────────────────────────────────────────

    fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);
        let woken = self.process_tick(now)?;
        for event in self.news.drain() {
            observer.on_news(now, &event);
        }
        observer.on_tick_end(now, woken);
        self.clock.advance();
        Ok(())
    }

    fn process_tick(&mut self, now: Tick) -> SimResult<usize> {
        let now_ms = self.clock.elapsed_ms();
        let tick_ms = self.clock.tick_ms;

        // ── Phase 1: world events ─────────────────────────────────────────
        self.route_events(now);

        // ── Phase 2: director ─────────────────────────────────────────────
        if now_ms >= self.director_due {
            let delta = (now_ms - self.director_last).min(Millis::MAX as u64) as Millis;
            let hint = self.director.tick(delta, &mut self.world, &mut self.rng, &mut self.news);
            self.director_last = now_ms;
            self.director_due = now_ms + hint.max(tick_ms) as u64;
        }

        // ── Phase 3: domain planners ──────────────────────────────────────
        for planner in &mut self.planners {
            planner.tick(tick_ms, &mut self.world, &self.reservations, &mut self.news);
        }

        // ── Phase 4: agents due this frame ────────────────────────────────
        let mut woken = 0;
        for agent in self.wake_queue.drain_due(now) {
            let i = agent.index();
            if !self.due.get(i).copied().flatten().is_some_and(|d| d <= now) {
                continue;
            }
            self.due[i] = None;

            let delta = (now_ms - self.last_ms[i]).min(Millis::MAX as u64) as Millis;
            let Ok(mut slot) = self.agents.slot_mut(agent) else { continue };
            let Some(rng) = self.rngs.get_mut(agent) else { continue };
            let mut ctx = WorldContext::new(
                &mut self.world,
                &mut self.reservations,
                &mut self.director,
                &self.ai_config,
                &mut self.news,
                now_ms,
            );
            let hint = self.behavior.tick(&mut slot, &mut ctx, rng, delta);

            self.last_ms[i] = now_ms;
            let next = now.offset(self.clock.ticks_for_ms(hint));
            self.wake(agent, next);
            woken += 1;
        }

        // ── Phase 5: the world's own frame ────────────────────────────────
        self.world.advance(tick_ms);

        tracing::trace!(tick = %now, woken, queued = self.wake_queue.len(), "frame done");
        Ok(woken)
    }

    fn route_events(&mut self, now: Tick) {
        for _ in 0..MAX_EVENT_ROUNDS {
            let events = self.world.drain_events();
            if events.is_empty() {
                return;
            }
            for event in events {
                match event {
                    WorldEvent::Spawned(entity) => {
                        if let Err(e) = self.register(entity) {
                            tracing::debug!(error = %e, %entity, "spawn not registered");
                        }
                    }
                    WorldEvent::Despawned(entity) => {
                        let Some(agent) = self.agents.by_entity(entity) else { continue };
                        if let Err(e) = self.agents.retire(agent, &mut self.reservations) {
                            tracing::warn!(error = %e, %agent, "retire failed");
                        }
                        if let Some(d) = self.due.get_mut(agent.index()) {
                            *d = None;
                        }
                    }
                    WorldEvent::Message { to, msg } => self.deliver(to, &msg, now),
                    WorldEvent::BuildingLost { kind, pos, rotation, team, .. } => {
                        for planner in &mut self.planners {
                            planner.on_building_lost(kind, pos, rotation, team);
                        }
                        self.director.on_building_lost(to_sector(pos), &self.world);
                    }
                }
            }
        }
        tracing::debug!(tick = %now, "event routing capped; remainder carries over");
    }

    fn deliver(&mut self, to: EntityId, msg: &AgentMessage, now: Tick) {
        let Some(agent) = self.agents.by_entity(to) else { return };
        let Ok(mut slot) = self.agents.slot_mut(agent) else { return };
        let Some(rng) = self.rngs.get_mut(agent) else { return };
        let mut ctx = WorldContext::new(
            &mut self.world,
            &mut self.reservations,
            &mut self.director,
            &self.ai_config,
            &mut self.news,
            self.clock.elapsed_ms(),
        );
        self.behavior.on_message(&mut slot, msg, &mut ctx, rng);
        self.wake(agent, now);
    }
}
