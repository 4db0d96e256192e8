//! Path constraint packing
//!
//! The solver sees one contiguous path-constraint vector per node:
//! - model residuals first, each bounded to `[0, 0]`
//! - then every user path constraint, in the order they were added

use crate::problem::{Bounds, PathConstraint};
use crate::model::NodeInput;
use crate::solver::SolverError;

/// Result of checking packed path-constraint values against their bounds
#[derive(Debug, Clone)]
pub struct ConstraintEvaluation {
    /// Constraint values
    pub values: Vec<f64>,
    /// Names for debugging
    pub names: Vec<String>,
    /// Whether all constraints are within tolerance of their bounds
    pub all_satisfied: bool,
    /// Largest distance outside bounds (0 if all satisfied)
    pub max_violation: f64,
}

impl ConstraintEvaluation {
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            names: Vec::new(),
            all_satisfied: true,
            max_violation: 0.0,
        }
    }

    pub fn add(&mut self, name: &str, value: f64, bounds: Bounds, tolerance: f64) {
        self.names.push(name.to_string());
        self.values.push(value);
        let violation = bounds.violation(value);
        if violation > tolerance {
            self.all_satisfied = false;
        }
        self.max_violation = self.max_violation.max(violation);
    }
}

impl Default for ConstraintEvaluation {
    fn default() -> Self {
        Self::new()
    }
}

/// Layout of the packed path-constraint vector
#[derive(Debug, Clone, PartialEq)]
pub struct PathConstraintSet {
    num_residuals: usize,
    names: Vec<String>,
    bounds: Vec<Bounds>,
    /// Start of each user constraint within the packed vector
    offsets: Vec<usize>,
}

impl PathConstraintSet {
    pub fn new(
        num_residuals: usize,
        constraints: &[Box<dyn PathConstraint>],
    ) -> Result<Self, SolverError> {
        let mut names: Vec<String> = (0..num_residuals)
            .map(|i| format!("model_residual_{}", i))
            .collect();
        let mut bounds = vec![Bounds::fixed(0.0); num_residuals];
        let mut offsets = Vec::with_capacity(constraints.len());

        for constraint in constraints {
            let constraint_bounds = constraint.bounds();
            if constraint_bounds.len() != constraint.num_outputs() {
                return Err(SolverError::InvalidProblem(format!(
                    "path constraint '{}' declares {} outputs but {} bounds",
                    constraint.name(),
                    constraint.num_outputs(),
                    constraint_bounds.len()
                )));
            }
            offsets.push(names.len());
            for i in 0..constraint.num_outputs() {
                names.push(format!("{}_{}", constraint.name(), i));
            }
            bounds.extend(constraint_bounds);
        }

        Ok(Self {
            num_residuals,
            names,
            bounds,
            offsets,
        })
    }

    /// Total packed length
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn num_residuals(&self) -> usize {
        self.num_residuals
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn bounds(&self) -> &[Bounds] {
        &self.bounds
    }

    /// Fill `out` with the model residuals followed by each user constraint
    ///
    /// `constraints` must be the list this layout was built from.
    pub fn evaluate(
        &self,
        constraints: &[Box<dyn PathConstraint>],
        residuals: &[f64],
        input: &NodeInput<'_>,
        out: &mut [f64],
    ) {
        out[..self.num_residuals].copy_from_slice(residuals);
        for (constraint, &offset) in constraints.iter().zip(&self.offsets) {
            let end = offset + constraint.num_outputs();
            constraint.evaluate(input, &mut out[offset..end]);
        }
    }

    /// Compare packed values against the bounds
    pub fn check(&self, values: &[f64], tolerance: f64) -> ConstraintEvaluation {
        let mut eval = ConstraintEvaluation::new();
        for ((name, &bounds), &value) in self.names.iter().zip(&self.bounds).zip(values) {
            eval.add(name, value, bounds, tolerance);
        }
        eval
    }
}
