use thiserror::Error;

use ut_core::{AgentId, EntityId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AgentError {
    #[error("agent {0} not found")]
    UnknownAgent(AgentId),

    #[error("agent {0} has been retired")]
    Retired(AgentId),

    #[error("entity {0} is already driven by agent {1}")]
    Duplicate(EntityId, AgentId),
}

pub type AgentResult<T> = Result<T, AgentError>;
