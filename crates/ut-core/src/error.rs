//! Core error type.
//!
//! Sub-crates define their own enums and wrap `CoreError` as one variant
//! where a core lookup can fail underneath them.

use thiserror::Error;

use crate::{AgentId, EntityId};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("entity {0} not found")]
    EntityNotFound(EntityId),

    #[error("unknown species {0:?}")]
    UnknownSpecies(String),

    #[error("unknown structure {0:?}")]
    UnknownStructure(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
