//! A behavior model that never acts.

use ut_agent::AgentSlot;
use ut_core::{AgentRng, Millis, VERY_LONG_TICK};

use crate::{BehaviorModel, WorldContext};

/// A [`BehaviorModel`] that does nothing and sleeps as long as allowed.
///
/// Useful in driver tests, or for populations that only occupy space.
pub struct NoopBehavior;

impl BehaviorModel for NoopBehavior {
    fn tick(
        &self,
        _slot:  &mut AgentSlot<'_>,
        _ctx:   &mut WorldContext<'_>,
        _rng:   &mut AgentRng,
        _delta: Millis,
    ) -> Millis {
        VERY_LONG_TICK
    }
}
