//! The `BehaviorModel` trait, the seam between the driver and agent logic.

use ut_agent::AgentSlot;
use ut_core::{AgentRng, Millis};
use ut_world::AgentMessage;

use crate::WorldContext;

/// Pluggable agent behavior.
///
/// The driver wakes an agent, borrows its columns as an [`AgentSlot`] and
/// calls [`tick`][Self::tick] with the time since the agent's previous tick.
/// The returned value is a wake hint: the driver will not tick the agent
/// again sooner than that unless a message arrives for it.
///
/// # Required methods
///
/// Only [`tick`][Self::tick] is required.  [`on_message`][Self::on_message]
/// has a no-op default so passive models don't need to implement it.
///
/// # Determinism
///
/// Randomness must come from the supplied [`AgentRng`] so a run depends only
/// on the seed and the order the driver ticks agents in.  State that varies
/// per agent lives in the slot, not in the model.
pub trait BehaviorModel: Send + Sync + 'static {
    /// Run one decision step for the agent in `slot`.  Returns the number
    /// of milliseconds until it next needs a tick.
    fn tick(
        &self,
        slot:  &mut AgentSlot<'_>,
        ctx:   &mut WorldContext<'_>,
        rng:   &mut AgentRng,
        delta: Millis,
    ) -> Millis;

    /// Called for each message the world delivered to the agent.
    ///
    /// Default: messages are ignored.
    fn on_message(
        &self,
        _slot: &mut AgentSlot<'_>,
        _msg:  &AgentMessage,
        _ctx:  &mut WorldContext<'_>,
        _rng:  &mut AgentRng,
    ) {
    }
}
