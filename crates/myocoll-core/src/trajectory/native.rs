//! Solver-native iterate layout
//!
//! The collocation engine reads these fields directly, so the layout is
//! fixed: time is a row vector, every block has one row per variable and
//! one column per node, and `adjuncts` stacks multipliers (top rows) over
//! derivatives (bottom rows).

use nalgebra::{DMatrix, DVector, RowDVector};

use super::names::Block;
use super::named::check_shape;
use crate::error::{TrajectoryError, TrajectoryResult};

/// Iterate in the collocation solver's variable-major layout
#[derive(Debug, Clone, PartialEq)]
pub struct NativeIterate {
    /// 1 x num_times
    pub time: RowDVector<f64>,
    /// num_states x num_times
    pub states: DMatrix<f64>,
    /// num_controls x num_times
    pub controls: DMatrix<f64>,
    /// (num_multipliers + num_derivatives) x num_times
    pub adjuncts: DMatrix<f64>,
    /// num_parameters
    pub parameters: DVector<f64>,
    pub state_names: Vec<String>,
    pub control_names: Vec<String>,
    /// Multiplier names followed by derivative names
    pub adjunct_names: Vec<String>,
    pub parameter_names: Vec<String>,
}

impl NativeIterate {
    /// Iterate with no nodes and no variables
    pub fn empty() -> Self {
        Self {
            time: RowDVector::zeros(0),
            states: DMatrix::zeros(0, 0),
            controls: DMatrix::zeros(0, 0),
            adjuncts: DMatrix::zeros(0, 0),
            parameters: DVector::zeros(0),
            state_names: Vec::new(),
            control_names: Vec::new(),
            adjunct_names: Vec::new(),
            parameter_names: Vec::new(),
        }
    }

    pub fn num_times(&self) -> usize {
        self.time.len()
    }

    /// True when there are no nodes and every name list is empty
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
            && self.state_names.is_empty()
            && self.control_names.is_empty()
            && self.adjunct_names.is_empty()
            && self.parameter_names.is_empty()
    }

    /// Check every block against its name list and the node count
    pub fn validate(&self) -> TrajectoryResult<()> {
        let n = self.num_times();
        check_shape(Block::States, &self.states, self.state_names.len(), n)?;
        check_shape(Block::Controls, &self.controls, self.control_names.len(), n)?;
        check_shape(Block::Adjuncts, &self.adjuncts, self.adjunct_names.len(), n)?;
        if self.parameters.len() != self.parameter_names.len() {
            return Err(TrajectoryError::ShapeMismatch {
                block: Block::Parameters,
                expected: (self.parameter_names.len(), 1),
                actual: (self.parameters.len(), 1),
            });
        }
        Ok(())
    }
}

impl Default for NativeIterate {
    fn default() -> Self {
        Self::empty()
    }
}

impl AsRef<NativeIterate> for NativeIterate {
    fn as_ref(&self) -> &NativeIterate {
        self
    }
}

/// Solver result: the final iterate plus the back end's termination report
#[derive(Debug, Clone, PartialEq)]
pub struct NativeSolution {
    pub iterate: NativeIterate,
    pub success: bool,
    pub status: String,
    pub objective: f64,
    pub num_iterations: usize,
    pub solve_time_ms: f64,
}

impl NativeSolution {
    /// Wrap an iterate with a neutral, unsuccessful report
    pub fn new(iterate: NativeIterate) -> Self {
        Self {
            iterate,
            success: false,
            status: String::new(),
            objective: 0.0,
            num_iterations: 0,
            solve_time_ms: 0.0,
        }
    }
}

impl AsRef<NativeIterate> for NativeSolution {
    fn as_ref(&self) -> &NativeIterate {
        &self.iterate
    }
}
