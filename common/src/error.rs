//! Error type definitions

use thiserror::Error;

/// Shared error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

/// Result alias
pub type Result<T> = std::result::Result<T, Error>;
