//! Base error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

/// Errors raised while resolving modes or parsing core values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("unknown mode '{0}'")]
    UnknownMode(String),

    #[error("mode '{0}' is registered twice")]
    DuplicateMode(String),

    #[error("too many modes: at most {max} fit in a mode set")]
    TooManyModes { max: usize },

    #[error("no usable mode was requested")]
    NoModes,

    #[error("invalid clock value '{0}' (expected HH:MM or HH:MM:SS)")]
    InvalidClock(String),
}

/// Shorthand result type for `acc-core`.
pub type CoreResult<T> = Result<T, CoreError>;
