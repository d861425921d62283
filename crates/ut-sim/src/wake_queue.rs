//! `WakeQueue`: sparse per-frame agent activation.
//!
//! Agents return a wake hint from every tick.  Rather than polling every
//! agent each frame, the driver files the agent under the frame it asked
//! for and each frame drains only that bucket.
//!
//! An agent may sit in the queue more than once, e.g. when a message wakes
//! it early.  The driver keeps the frame each agent is really due and skips
//! stale entries as it drains them.

use std::collections::BTreeMap;

use ut_core::{AgentId, Tick};

#[derive(Default)]
pub struct WakeQueue {
    inner: BTreeMap<Tick, Vec<AgentId>>,
    total: usize,
}

impl WakeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `agent` to wake at `tick`.
    pub fn push(&mut self, tick: Tick, agent: AgentId) {
        self.inner.entry(tick).or_default().push(agent);
        self.total += 1;
    }

    /// Remove and return all agents scheduled for exactly `tick`.
    pub fn drain_tick(&mut self, tick: Tick) -> Option<Vec<AgentId>> {
        let agents = self.inner.remove(&tick)?;
        self.total -= agents.len();
        Some(agents)
    }

    /// Remove and return every agent scheduled at or before `tick`, earliest
    /// first.
    pub fn drain_due(&mut self, tick: Tick) -> Vec<AgentId> {
        let later = self.inner.split_off(&Tick(tick.0 + 1));
        let due = std::mem::replace(&mut self.inner, later);
        let agents: Vec<AgentId> = due.into_values().flatten().collect();
        self.total -= agents.len();
        agents
    }

    /// The earliest tick with at least one queued agent.
    pub fn next_tick(&self) -> Option<Tick> {
        self.inner.keys().next().copied()
    }

    /// Total `(tick, agent)` entries, stale ones included.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Distinct future ticks with at least one queued agent.
    pub fn tick_count(&self) -> usize {
        self.inner.len()
    }
}
