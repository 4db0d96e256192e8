//! # MyoColl Core
//!
//! Trajectory data model for direct-collocation optimal control of
//! musculoskeletal models.
//!
//! The toolkit stores trajectories time-major: one row per time sample and
//! one named column per variable. The collocation solver consumes the
//! transpose, one row per variable and one column per node, with multipliers
//! and auxiliary derivatives stacked into a single adjunct block. This crate
//! owns both layouts and the conversion between them.
//!
//! ## Modules
//!
//! - [`trajectory`]: named trajectories, solutions, solver-native iterates
//! - [`convert`]: conversion between the toolkit and solver layouts
//! - [`error`]: error types shared by construction and conversion

pub mod error;
pub mod trajectory;
pub mod convert;

pub use error::{TrajectoryError, TrajectoryResult};
pub use trajectory::*;
pub use convert::{
    named_to_native, named_to_native_solution, native_to_iterate, native_to_named,
    native_to_solution, NamedResult,
};

