use thiserror::Error;

use ut_core::Vec2I;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("quota parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sector {0:?} has no core")]
    NoCore(Vec2I),
}

pub type DomainResult<T> = Result<T, DomainError>;
