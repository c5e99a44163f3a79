use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DaybookError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}
