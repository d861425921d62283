use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlotError {
    #[error("unknown plot tag {0:?}")]
    UnknownTag(String),
}

pub type PlotResult<T> = Result<T, PlotError>;
