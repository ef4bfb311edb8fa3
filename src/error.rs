//! Error types shared by the tree implementations.

use thiserror::Error;

/// Contract violations raised by tree operations.
///
/// Absence is never an error: lookups and navigation return `Option`, and
/// value deletion reports `false` for a missing value. The variants here are
/// caller programming errors that the tree cannot recover from on its own.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The operation is not legal for the node it was invoked on: inserting
    /// anywhere but the root, or deleting the last node of a tree.
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),

    /// A rank lookup was outside the subtree it was resolved against.
    #[error("index {index} is out of bounds [0, {size})")]
    IndexOutOfRange {
        /// The requested 0-based rank.
        index: usize,
        /// The size of the subtree the rank was resolved against.
        size: usize,
    },
}
