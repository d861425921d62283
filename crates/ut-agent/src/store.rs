//! Agent storage: `AgentStore` (SoA data) and `AgentRngs` (per-agent RNG).
//!
//! An agent is a slot index.  Every per-agent array is indexed by
//! `AgentId::index()`, so sub-state never points back at its owner and the
//! world refers to agents only through their `EntityId`.
//!
//! Slots are append-only.  A retired slot stays allocated (marked dead), so
//! an id still sitting in the wake queue can never alias a newer agent.
//!
//! RNGs live in a separate struct so the driver can hold `&mut AgentRngs`
//! alongside an `AgentSlot` borrowed from the store.

use rustc_hash::FxHashMap;

use ut_core::{AgentId, AgentRng, AiConfig, EntityId, Species, Ticker};
use ut_task::{ReservationRegistry, TaskQueue};

use crate::error::{AgentError, AgentResult};
use crate::needs::Needs;
use crate::perception::PerceptionCache;
use crate::state::AgentState;

// ── AgentRngs ─────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG state, separated from [`AgentStore`].
pub struct AgentRngs {
    pub inner: Vec<AgentRng>,
    seed:      u64,
}

impl AgentRngs {
    pub fn new(global_seed: u64) -> Self {
        Self { inner: Vec::new(), seed: global_seed }
    }

    /// Seed RNGs for every slot below `count`.
    pub(crate) fn grow_to(&mut self, count: usize) {
        while self.inner.len() < count {
            let id = AgentId(self.inner.len() as u32);
            self.inner.push(AgentRng::new(self.seed, id));
        }
    }

    #[inline]
    pub fn get_mut(&mut self, agent: AgentId) -> Option<&mut AgentRng> {
        self.inner.get_mut(agent.index())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

// ── AgentSlot ─────────────────────────────────────────────────────────────────

/// Mutable view of one agent's columns, borrowed together.
pub struct AgentSlot<'a> {
    pub id:            AgentId,
    pub entity:        EntityId,
    pub species:       Species,
    pub state:         &'a mut AgentState,
    pub tasks:         &'a mut TaskQueue,
    pub needs:         &'a mut Needs,
    pub needs_ticker:  &'a mut Ticker,
    pub social_ticker: &'a mut Ticker,
}

// ── AgentStore ────────────────────────────────────────────────────────────────

/// Structure-of-Arrays storage for all agent state.
pub struct AgentStore {
    /// Slots ever allocated, live or retired.  Equals the length of every
    /// SoA `Vec`.
    pub count: usize,

    pub entity:        Vec<EntityId>,
    pub species:       Vec<Species>,
    pub alive:         Vec<bool>,
    pub state:         Vec<AgentState>,
    pub tasks:         Vec<TaskQueue>,
    pub needs:         Vec<Needs>,
    pub needs_ticker:  Vec<Ticker>,
    pub social_ticker: Vec<Ticker>,

    by_entity: FxHashMap<EntityId, AgentId>,
    config:    AiConfig,
}

impl AgentStore {
    pub fn new(config: AiConfig) -> Self {
        Self {
            count: 0,
            entity: Vec::new(),
            species: Vec::new(),
            alive: Vec::new(),
            state: Vec::new(),
            tasks: Vec::new(),
            needs: Vec::new(),
            needs_ticker: Vec::new(),
            social_ticker: Vec::new(),
            by_entity: FxHashMap::default(),
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Allocate a slot driving `entity`.
    ///
    /// Every ticker starts at a random phase from the agent's own RNG so a
    /// crowd spawned together does not think in lockstep.
    pub fn spawn(
        &mut self,
        rngs: &mut AgentRngs,
        entity: EntityId,
        species: Species,
    ) -> AgentResult<AgentId> {
        if let Some(&existing) = self.by_entity.get(&entity) {
            return Err(AgentError::Duplicate(entity, existing));
        }
        let id = AgentId(self.count as u32);
        rngs.grow_to(self.count + 1);
        let rng = rngs.get_mut(id).ok_or(AgentError::UnknownAgent(id))?;

        let cfg = &self.config;
        let mut perception = PerceptionCache::new(cfg);
        perception.ticker.randomize(rng.inner());
        let mut rethink = Ticker::new(cfg.normal_rethink);
        rethink.randomize(rng.inner());
        let mut needs_ticker = Ticker::new(cfg.needs_period);
        needs_ticker.randomize(rng.inner());
        let mut social_ticker = Ticker::new(cfg.social_pulse);
        social_ticker.randomize(rng.inner());

        self.entity.push(entity);
        self.species.push(species);
        self.alive.push(true);
        self.state.push(AgentState::new(perception, rethink));
        self.tasks.push(TaskQueue::new(id));
        self.needs.push(Needs::new());
        self.needs_ticker.push(needs_ticker);
        self.social_ticker.push(social_ticker);
        self.by_entity.insert(entity, id);
        self.count += 1;

        tracing::debug!(agent = %id, %entity, %species, "agent spawned");
        Ok(id)
    }

    /// Mark `id` dead and release everything its queue reserved.
    pub fn retire(&mut self, id: AgentId, reg: &mut ReservationRegistry) -> AgentResult<EntityId> {
        let i = self.live_index(id)?;
        self.alive[i] = false;
        self.tasks[i].clear(reg);
        reg.release_all(id);
        let entity = self.entity[i];
        self.by_entity.remove(&entity);
        tracing::debug!(agent = %id, %entity, "agent retired");
        Ok(entity)
    }

    #[inline]
    pub fn by_entity(&self, entity: EntityId) -> Option<AgentId> {
        self.by_entity.get(&entity).copied()
    }

    #[inline]
    pub fn is_alive(&self, id: AgentId) -> bool {
        self.alive.get(id.index()).copied().unwrap_or(false)
    }

    /// Live agents in slot order.
    pub fn live_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        (0..self.count as u32).map(AgentId).filter(|&id| self.is_alive(id))
    }

    pub fn live_count(&self) -> usize {
        self.by_entity.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live_count() == 0
    }

    /// Borrow every column of one live agent at once.
    pub fn slot_mut(&mut self, id: AgentId) -> AgentResult<AgentSlot<'_>> {
        let i = self.live_index(id)?;
        Ok(AgentSlot {
            id,
            entity:        self.entity[i],
            species:       self.species[i],
            state:         &mut self.state[i],
            tasks:         &mut self.tasks[i],
            needs:         &mut self.needs[i],
            needs_ticker:  &mut self.needs_ticker[i],
            social_ticker: &mut self.social_ticker[i],
        })
    }

    fn live_index(&self, id: AgentId) -> AgentResult<usize> {
        let i = id.index();
        if i >= self.count {
            return Err(AgentError::UnknownAgent(id));
        }
        if !self.alive[i] {
            return Err(AgentError::Retired(id));
        }
        Ok(i)
    }
}
