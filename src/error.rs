//! Error types for the outline core
//!
//! Only conditions a caller can actually hit are represented here. Empty
//! forests, disabled guides and missing viewports are not errors; they
//! produce an empty connector set.

use thiserror::Error;

/// A specialized `Result` type for outline operations.
pub type Result<T> = std::result::Result<T, OutlineError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OutlineError {
    /// A line range that does not fit inside the document was requested
    #[error("line range {from}..={to} is outside the document ({line_count} lines)")]
    RangeOutOfBounds {
        from: usize,
        to: usize,
        line_count: usize,
    },

    /// A connector index that does not exist in the current frame
    #[error("no connector at index {index} (frame has {len})")]
    UnknownConnector { index: usize, len: usize },
}
