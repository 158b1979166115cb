use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Invalid SQL identifier: {0:?}")]
    InvalidIdentifier(String),
    #[error("Statement head has a top-level {0}; add filters through the builder")]
    ClauseInHead(&'static str),
    #[error("Nothing to write: no columns given")]
    EmptyWrite,
    #[error("Failed to bind parameter ${index}: {message}")]
    Bind { index: usize, message: String },
}
