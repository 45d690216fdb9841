//! Crate-wide error type.

use thiserror::Error;

/// Errors reported by the graph builder, the lifecycle transitions and
/// the k-mer walker.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Rejected configuration or argument.
    #[error("bad parameter: {0}")]
    BadParam(&'static str),
    /// Operation applied to a handle in the wrong lifecycle state.
    #[error("operation requires the {expected} state")]
    InvalidState {
        /// State the operation is defined on.
        expected: &'static str,
    },
    /// Allocator failure: buffer growth, bucket array or expansion
    /// frontier.
    #[error("out of memory")]
    OutOfMemory,
    /// The sorter could not be run.
    #[error("sort failure")]
    SortFailure,
}
