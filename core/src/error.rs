//! Error types for quarry-core.

use thiserror::Error;

/// Errors surfaced by indexing and query evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// A document with this id is already in the index
    #[error("document with id '{0}' is already indexed")]
    DuplicateDocument(String),
    /// The query tree contains a node kind the engine cannot evaluate
    #[error("unsupported query node: {0}")]
    UnsupportedQuery(String),
    /// Query text could not be parsed
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    /// Query weighting is not a valid SMART triple
    #[error("weighting '{0}' is not in SMART 'xyz' format")]
    InvalidWeighting(String),
    /// Index bytes could not be encoded or decoded
    #[error("serialization failed: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, SearchError>;
