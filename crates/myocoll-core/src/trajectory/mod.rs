//! Trajectory representations
//!
//! - [`NamedTrajectory`]: toolkit-side, time-major, named blocks
//! - [`Solution`]: a named trajectory plus solver termination metadata
//! - [`NativeIterate`] / [`NativeSolution`]: solver-side, variable-major

pub mod names;
pub mod named;
pub mod solution;
pub mod native;
pub mod interpolate;

pub use names::*;
pub use named::*;
pub use solution::*;
pub use native::*;
pub use interpolate::linspace;
