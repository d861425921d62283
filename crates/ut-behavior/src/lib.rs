//! `ut-behavior`: what an agent decides to do each time it wakes.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                      |
//! |---------------|---------------------------------------------------------------|
//! | [`model`]     | `BehaviorModel` trait                                         |
//! | [`context`]   | `WorldContext<'a>`: world, reservations, director, config, news |
//! | [`scheduler`] | `AgentScheduler`, the standard model                          |
//! | [`utility`]   | `UtilityEvaluator`: battle option scoring                     |
//! | [`goals`]     | `GoalProposers`: the normal-mode goal chain                   |
//! | [`execute`]   | Task queue execution                                          |
//! | [`noop`]      | `NoopBehavior`, a placeholder that never acts                 |
//! | [`error`]     | `BehaviorError`, `BehaviorResult<T>`                          |
//!
//! # Design notes
//!
//! Agents are ticked one at a time against `&mut dyn World`.  Each tick
//! borrows exactly one agent's columns (an [`ut_agent::AgentSlot`]) plus the
//! shared [`WorldContext`], so an agent can change the world and the
//! reservation registry but never another agent's queue.  Everything an
//! agent learns about others comes through the world or through messages.

pub mod context;
pub mod error;
pub mod execute;
pub mod goals;
pub mod model;
pub mod noop;
pub mod scheduler;
pub mod utility;

#[cfg(test)]
mod tests;

pub use context::WorldContext;
pub use error::{BehaviorError, BehaviorResult};
pub use execute::{run_queue, Step};
pub use goals::{Claim, Goal, GoalProposers};
pub use model::BehaviorModel;
pub use noop::NoopBehavior;
pub use scheduler::{should_engage, AgentScheduler, Crisis};
pub use utility::{gather_targets, CombatChoice, CombatOption, Target, UtilityEvaluator};
