//! Network error type.

use thiserror::Error;

use acc_core::{EdgeId, NodeId};

/// Errors produced while building a network or attaching objects to it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NetworkError {
    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("edge {0} not found in network")]
    EdgeNotFound(EdgeId),

    #[error("edge {edge} names {opposite} as opposite, but the relation is not mutual")]
    OppositeMismatch { edge: EdgeId, opposite: EdgeId },

    #[error("invalid edge {edge}: {reason}")]
    InvalidEdge { edge: EdgeId, reason: String },

    #[error("invalid timetable on edge {edge}: {reason}")]
    InvalidTimetable { edge: EdgeId, reason: String },
}

pub type NetworkResult<T> = Result<T, NetworkError>;
