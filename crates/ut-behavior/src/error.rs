//! Error types for ut-behavior.

use thiserror::Error;

use ut_core::EntityId;
use ut_task::TaskError;

/// Why a plan step could not go ahead.
///
/// None of these escape [`BehaviorModel::tick`][crate::BehaviorModel::tick]:
/// the scheduler logs them and treats the step as not applicable.
#[derive(Debug, Error, PartialEq)]
pub enum BehaviorError {
    #[error("task failed: {0}")]
    Task(#[from] TaskError),

    #[error("entity {0} is gone")]
    EntityGone(EntityId),
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;
