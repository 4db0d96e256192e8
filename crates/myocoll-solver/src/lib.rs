//! # MyoColl Solver
//!
//! Direct-collocation problem adapter for musculoskeletal models.
//!
//! A [`MultibodyModel`] supplies the dynamics, a [`ProblemDefinition`]
//! supplies bounds, costs and path constraints, and a
//! [`CollocationAdapter`] presents both to an NLP back end through the
//! [`CollocationProblem`] contract. [`TrajectorySolver`] drives a
//! [`CollocationBackend`] and handles guesses, warm starts, and
//! conversion of the result into a toolkit [`Solution`].
//!
//! ## Modules
//!
//! - [`model`]: external model interface
//! - [`problem`]: bounds, cost terms, path constraints
//! - [`collocation`]: the per-node contract queried by the back end
//! - [`adapter`]: model + problem bound into that contract
//! - [`constraints`]: packing of model residuals and path constraints
//! - [`transcription`]: trapezoidal objective and defect evaluation
//! - [`solver`]: back-end seam and solve driver
//! - [`config`]: solver configuration

pub mod config;
pub mod model;
pub mod problem;
pub mod collocation;
pub mod constraints;
pub mod adapter;
pub mod transcription;
pub mod solver;

pub use adapter::CollocationAdapter;
pub use collocation::{
    CollocationProblem, DaeInput, DaeOutput, DynamicsEvaluationError, EndpointInput,
};
pub use config::{GuessStrategy, SolverConfig};
pub use constraints::{ConstraintEvaluation, PathConstraintSet};
pub use model::{ModelError, ModelOutput, MultibodyModel, NodeInput};
pub use problem::{
    Bounds, ControlEffortCost, Cost, FinalTimeCost, PathConstraint, ProblemDefinition,
    VariableInfo,
};
pub use solver::{CollocationBackend, SolverError, TrajectorySolver};
pub use transcription::{TranscriptionEvaluation, TrapezoidalTranscription};

pub use myocoll_core::{NamedTrajectory, NativeIterate, NativeSolution, Solution};
