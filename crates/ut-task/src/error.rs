//! Errors raised when a queued task no longer holds.
//!
//! None of these escape the scheduler.  A failed precondition clears the
//! agent's queue and the agent plans again on a later tick.

use thiserror::Error;

use ut_core::{AgentId, EntityId, StructureKind, Vec2I};

#[derive(Debug, Error, PartialEq)]
pub enum TaskError {
    #[error("cell {cell:?} is reserved by {owner}")]
    Reserved { cell: Vec2I, owner: AgentId },

    #[error("work order at {0:?} no longer exists")]
    OrderGone(Vec2I),

    #[error("cannot afford {0}")]
    Unaffordable(StructureKind),

    #[error("cell {0:?} cannot take {1}")]
    Unbuildable(Vec2I, StructureKind),

    #[error("target {0} is gone")]
    TargetGone(EntityId),

    #[error("precondition failed: {0}")]
    Precondition(String),
}

pub type TaskResult<T> = Result<T, TaskError>;
