//! Solver configuration
//!
//! Settings for guess generation, warm starting, and the values passed
//! through to the NLP back end.

use serde::{Deserialize, Serialize};

use crate::problem::Bounds;
use crate::solver::SolverError;

/// How to fill variables when no guess trajectory is available
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuessStrategy {
    /// Midpoint of finite bounds, the single finite bound, or zero
    #[default]
    Bounds,
    /// Every variable zero
    Zeros,
}

/// Main solver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Collocation nodes used for generated and resampled guesses
    pub num_mesh_points: usize,
    /// Back-end iteration cap (None: back-end default)
    pub max_iterations: Option<usize>,
    /// Optimality tolerance
    pub convergence_tolerance: f64,
    /// Constraint violation tolerance
    pub constraint_tolerance: f64,
    /// Reuse the previous solution when the caller supplies no guess
    pub warm_start: bool,
    pub guess: GuessStrategy,
    /// Applied to every multiplier
    pub multiplier_bounds: Bounds,
    /// Applied to every auxiliary derivative
    pub derivative_bounds: Bounds,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            num_mesh_points: 100,
            max_iterations: None,
            convergence_tolerance: 1e-8,
            constraint_tolerance: 1e-8,
            warm_start: true,
            guess: GuessStrategy::Bounds,
            multiplier_bounds: Bounds::new(-1000.0, 1000.0),
            derivative_bounds: Bounds::new(-1000.0, 1000.0),
        }
    }
}

impl SolverConfig {
    /// Reject settings no back end can honor
    pub fn validate(&self) -> Result<(), SolverError> {
        if self.num_mesh_points < 2 {
            return Err(SolverError::InvalidProblem(format!(
                "num_mesh_points must be at least 2, got {}",
                self.num_mesh_points
            )));
        }
        if !(self.convergence_tolerance > 0.0) || !(self.constraint_tolerance > 0.0) {
            return Err(SolverError::InvalidProblem(
                "tolerances must be positive".to_string(),
            ));
        }
        if self.multiplier_bounds.lower > self.multiplier_bounds.upper
            || self.derivative_bounds.lower > self.derivative_bounds.upper
        {
            return Err(SolverError::InvalidProblem(
                "adjunct bounds have lower > upper".to_string(),
            ));
        }
        Ok(())
    }
}
