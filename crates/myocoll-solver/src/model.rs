//! Multibody model interface
//!
//! The dynamics engine lives outside this crate. The adapter only needs
//! the model's variable names and a way to evaluate the differential
//! algebraic equations at one node.

use nalgebra::DVector;
use thiserror::Error;

/// Failure reported by the model while evaluating one node
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Singular configuration: {0}")]
    SingularConfiguration(String),
    #[error("Constraint projection failed (residual {residual:e})")]
    ConstraintProjection { residual: f64 },
    #[error("Invalid {what} dimension: expected {expected}, got {actual}")]
    Dimension {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{0}")]
    Other(String),
}

/// Everything the model sees at one collocation node
///
/// Slices follow the order of the corresponding name lists.
#[derive(Debug, Clone, Copy)]
pub struct NodeInput<'a> {
    pub time: f64,
    pub states: &'a [f64],
    pub controls: &'a [f64],
    pub multipliers: &'a [f64],
    pub derivatives: &'a [f64],
    pub parameters: &'a [f64],
}

/// Model response at one node
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutput {
    /// One entry per state
    pub state_derivatives: DVector<f64>,
    /// Algebraic residuals: kinematic constraint errors, then implicit
    /// dynamics residuals for auxiliary derivatives
    pub residuals: DVector<f64>,
}

/// Multibody model bound to a collocation problem
///
/// Name lists must be stable for the lifetime of the model; the adapter
/// reads them once at construction.
pub trait MultibodyModel {
    fn state_names(&self) -> Vec<String>;

    fn control_names(&self) -> Vec<String>;

    /// One multiplier per kinematic constraint equation
    fn multiplier_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Auxiliary derivative variables (e.g. generalized accelerations in
    /// implicit formulations)
    fn derivative_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Length of [`ModelOutput::residuals`]
    fn num_residuals(&self) -> usize {
        self.multiplier_names().len() + self.derivative_names().len()
    }

    /// Realize the model at `input` and compute its dynamics
    fn evaluate(&self, input: &NodeInput<'_>) -> Result<ModelOutput, ModelError>;
}

impl<M: MultibodyModel + ?Sized> MultibodyModel for Box<M> {
    fn state_names(&self) -> Vec<String> {
        (**self).state_names()
    }

    fn control_names(&self) -> Vec<String> {
        (**self).control_names()
    }

    fn multiplier_names(&self) -> Vec<String> {
        (**self).multiplier_names()
    }

    fn derivative_names(&self) -> Vec<String> {
        (**self).derivative_names()
    }

    fn num_residuals(&self) -> usize {
        (**self).num_residuals()
    }

    fn evaluate(&self, input: &NodeInput<'_>) -> Result<ModelOutput, ModelError> {
        (**self).evaluate(input)
    }
}
