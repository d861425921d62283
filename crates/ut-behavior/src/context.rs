//! Mutable world state passed to every behavior callback.

use ut_core::AiConfig;
use ut_director::Director;
use ut_task::ReservationRegistry;
use ut_world::{NewsLog, World};

/// Everything outside the agent's own slot that a behavior may touch.
///
/// Built by the driver once per agent tick.  Agents are ticked one at a
/// time, so the context hands out exclusive borrows; the only shared
/// mutable state between agents is the reservation registry and the
/// director, and both are reached through here.
pub struct WorldContext<'a> {
    pub world:        &'a mut dyn World,
    pub reservations: &'a mut ReservationRegistry,
    pub director:     &'a mut Director,
    pub config:       &'a AiConfig,
    pub news:         &'a mut NewsLog,
    /// Milliseconds since the run started.
    pub now:          u64,
}

impl<'a> WorldContext<'a> {
    #[inline]
    pub fn new(
        world:        &'a mut dyn World,
        reservations: &'a mut ReservationRegistry,
        director:     &'a mut Director,
        config:       &'a AiConfig,
        news:         &'a mut NewsLog,
        now:          u64,
    ) -> Self {
        Self { world, reservations, director, config, news, now }
    }
}
