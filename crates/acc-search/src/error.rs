//! Search error type.

use thiserror::Error;

use acc_core::{CategoryId, CoreError};

/// Errors raised while validating search settings.
///
/// A search itself never fails: unreachable destinations are simply absent
/// from the results.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SearchError {
    #[error("invalid weight function parameters: {0}")]
    InvalidWeight(String),

    #[error("invalid bound '{name}': {reason}")]
    InvalidBound { name: &'static str, reason: String },

    #[error("mode set {0:#b} contains no mode a search can start with")]
    NoStartMode(u64),

    #[error("mode bit {0} is not registered")]
    UnregisteredMode(u8),

    #[error("category {0} is declared twice")]
    DuplicateCategory(CategoryId),

    #[error("category {0} is not declared")]
    UnknownCategory(CategoryId),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type SearchResult<T> = Result<T, SearchError>;
