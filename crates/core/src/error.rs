//! Error types for the alignment core

use thiserror::Error;

use crate::graph::Graph;

/// Errors produced by the alignment core.
///
/// Every operation is pure and deterministic, so an error is never worth
/// retrying: identical input fails identically.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// The invariant checker found a malformed graph. Carries the offending
    /// graph so the caller can inspect or discard it.
    #[error("invariant violation: {message}")]
    InvariantViolation { message: String, graph: Box<Graph> },

    /// An offset or index lookup fell outside the sequence bounds.
    #[error("out of bounds: {0}")]
    OutOfBounds(String),

    /// A pipe-escaped label string could not be decoded.
    #[error("malformed label encoding: {0}")]
    MalformedEncoding(String),
}

impl CoreError {
    pub(crate) fn out_of_bounds(what: impl Into<String>) -> Self {
        CoreError::OutOfBounds(what.into())
    }
}
