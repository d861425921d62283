use thiserror::Error;

use ut_agent::AgentError;
use ut_domain::DomainError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
}

pub type SimResult<T> = Result<T, SimError>;
