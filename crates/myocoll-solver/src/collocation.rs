//! Collocation problem contract
//!
//! What a direct-collocation back end needs from a problem: variable
//! counts and names, bounds, and per-node evaluation of the dynamics,
//! path constraints, and cost. Node data is passed in the solver's
//! layout, with multipliers and derivatives stacked as adjuncts.

use nalgebra::DVector;
use thiserror::Error;

use crate::model::ModelError;
pub use crate::problem::EndpointInput;
use crate::problem::{Bounds, VariableInfo};

/// Model evaluation failed at a collocation node
///
/// Returned to the back end untouched; retry or abort is its decision.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Dynamics evaluation failed at node {node} (t = {time}): {source}")]
pub struct DynamicsEvaluationError {
    pub node: usize,
    pub time: f64,
    #[source]
    pub source: ModelError,
}

/// One node of a solver iterate
#[derive(Debug, Clone, Copy)]
pub struct DaeInput<'a> {
    /// Node index within the mesh
    pub node: usize,
    pub time: f64,
    pub states: &'a [f64],
    pub controls: &'a [f64],
    /// Multipliers followed by derivatives
    pub adjuncts: &'a [f64],
    pub parameters: &'a [f64],
}

/// Dynamics and path-constraint values at one node
#[derive(Debug, Clone, PartialEq)]
pub struct DaeOutput {
    /// State derivatives, one per state
    pub dynamics: DVector<f64>,
    /// Packed path constraints
    pub path: DVector<f64>,
}

impl DaeOutput {
    pub fn zeros(num_states: usize, num_path_constraints: usize) -> Self {
        Self {
            dynamics: DVector::zeros(num_states),
            path: DVector::zeros(num_path_constraints),
        }
    }
}

/// Problem interface queried by a collocation back end
pub trait CollocationProblem {
    fn state_names(&self) -> &[String];
    fn control_names(&self) -> &[String];
    fn multiplier_names(&self) -> &[String];
    fn derivative_names(&self) -> &[String];
    fn parameter_names(&self) -> &[String];
    fn path_constraint_names(&self) -> &[String];

    fn num_states(&self) -> usize {
        self.state_names().len()
    }

    fn num_controls(&self) -> usize {
        self.control_names().len()
    }

    /// Fixed for the lifetime of the problem
    fn num_multipliers(&self) -> usize {
        self.multiplier_names().len()
    }

    fn num_derivatives(&self) -> usize {
        self.derivative_names().len()
    }

    fn num_adjuncts(&self) -> usize {
        self.num_multipliers() + self.num_derivatives()
    }

    fn num_parameters(&self) -> usize {
        self.parameter_names().len()
    }

    fn num_path_constraints(&self) -> usize {
        self.path_constraint_names().len()
    }

    fn initial_time_bounds(&self) -> Bounds;
    fn final_time_bounds(&self) -> Bounds;

    /// One entry per state, in state order
    fn state_infos(&self) -> &[VariableInfo];
    /// One entry per control, in control order
    fn control_infos(&self) -> &[VariableInfo];
    fn adjunct_bounds(&self) -> &[Bounds];
    fn parameter_bounds(&self) -> &[Bounds];
    fn path_constraint_bounds(&self) -> &[Bounds];

    /// State derivatives and path constraints at one node
    fn calc_differential_algebraic_equations(
        &self,
        input: &DaeInput<'_>,
        output: &mut DaeOutput,
    ) -> Result<(), DynamicsEvaluationError>;

    /// Cost integrand at one node
    fn calc_integral_cost(&self, input: &DaeInput<'_>) -> Result<f64, DynamicsEvaluationError>;

    /// Endpoint contribution to the objective
    fn calc_endpoint_cost(&self, input: &EndpointInput<'_>)
        -> Result<f64, DynamicsEvaluationError>;
}
