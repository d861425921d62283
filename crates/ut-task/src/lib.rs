//! `ut-task`: agent plans and double-claim prevention.
//!
//! # Crate layout
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`task`]        | `Task`, `TaskKind`                                    |
//! | [`queue`]       | `TaskQueue`                                           |
//! | [`reservation`] | `ReservationRegistry` (sector-sharded cell claims)    |
//! | [`error`]       | `TaskError`, `TaskResult<T>`                          |
//!
//! The registry is the only state shared between agents.  It is mutated
//! only from the owning agent's tick, one agent at a time; the per-sector
//! shards let a future parallel driver partition work by sector and merge
//! at tick boundaries.

pub mod error;
pub mod queue;
pub mod reservation;
pub mod task;

#[cfg(test)]
mod tests;

pub use error::{TaskError, TaskResult};
pub use queue::TaskQueue;
pub use reservation::ReservationRegistry;
pub use task::{Task, TaskKind};
