//! Error types for trajectory construction and conversion.

use thiserror::Error;

use crate::trajectory::Block;

/// Errors raised while building or converting trajectories.
///
/// Conversion fails fast: no partially converted trajectory is ever
/// returned alongside one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrajectoryError {
    /// Derived counts are inconsistent with the name lists they came from.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// A block's dimensions disagree with its name list or the time length.
    #[error("Shape mismatch in {block}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        block: Block,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// A name appears more than once within one block.
    #[error("Duplicate name '{name}' in {block}")]
    DuplicateName { block: Block, name: String },

    /// Time samples must be strictly increasing.
    #[error("Time is not strictly increasing at index {index}")]
    NonIncreasingTime { index: usize },

    /// Lookup of a variable that the trajectory does not carry.
    #[error("No {block} variable named '{name}'")]
    UnknownVariable { block: Block, name: String },
}

/// Result type for trajectory operations.
pub type TrajectoryResult<T> = std::result::Result<T, TrajectoryError>;
