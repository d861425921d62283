use thiserror::Error;

use ut_core::{EntityId, Vec2I};

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("entity {0} not found")]
    UnknownEntity(EntityId),

    #[error("cell {0:?} is outside the map")]
    OutOfBounds(Vec2I),

    #[error("cell {0:?} is blocked")]
    Blocked(Vec2I),

    #[error("sector {0:?} has no core")]
    NoCore(Vec2I),
}

pub type WorldResult<T> = Result<T, WorldError>;
