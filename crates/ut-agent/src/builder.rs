//! Fluent builder for constructing `AgentStore` + `AgentRngs` in one step.
//!
//! ```rust
//! use ut_agent::AgentStoreBuilder;
//! use ut_core::{EntityId, Species};
//!
//! let (store, rngs) = AgentStoreBuilder::new(42)
//!     .agent(EntityId(1), Species::Human)
//!     .agent(EntityId(2), Species::Worker)
//!     .build();
//!
//! assert_eq!(store.live_count(), 2);
//! assert_eq!(rngs.len(), 2);
//! ```

use ut_core::{AiConfig, EntityId, Species};

use crate::{AgentRngs, AgentStore};

pub struct AgentStoreBuilder {
    seed:   u64,
    config: AiConfig,
    agents: Vec<(EntityId, Species)>,
}

impl AgentStoreBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed, config: AiConfig::default(), agents: Vec::new() }
    }

    pub fn config(mut self, config: AiConfig) -> Self {
        self.config = config;
        self
    }

    /// Queue one agent.  Duplicate entities are skipped at build time.
    pub fn agent(mut self, entity: EntityId, species: Species) -> Self {
        self.agents.push((entity, species));
        self
    }

    pub fn agents(mut self, agents: impl IntoIterator<Item = (EntityId, Species)>) -> Self {
        self.agents.extend(agents);
        self
    }

    pub fn build(self) -> (AgentStore, AgentRngs) {
        let mut store = AgentStore::new(self.config);
        let mut rngs = AgentRngs::new(self.seed);
        for (entity, species) in self.agents {
            if let Err(e) = store.spawn(&mut rngs, entity, species) {
                tracing::warn!(error = %e, "skipping agent");
            }
        }
        (store, rngs)
    }
}
