//! Trapezoidal transcription
//!
//! Evaluates a [`CollocationProblem`] on a solver iterate the way a
//! trapezoidal direct-collocation NLP sees it:
//!
//! ```text
//! J      = sum_i h_i/2 (L_i + L_{i+1}) + E(t_0, t_f, x_0, x_f, p)
//! defect = x_{i+1} - x_i - h_i/2 (f_i + f_{i+1})
//! ```
//!
//! Back ends use this for objective and constraint values; it is also
//! handy for checking how far a guess is from feasibility.

use nalgebra::DMatrix;

use myocoll_core::NativeIterate;

use crate::collocation::{CollocationProblem, DaeInput, DaeOutput, EndpointInput};
use crate::problem::Bounds;
use crate::solver::SolverError;

/// Objective and constraint values of one iterate
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionEvaluation {
    /// Integral plus endpoint cost
    pub objective: f64,
    pub integral_cost: f64,
    pub endpoint_cost: f64,
    /// num_states x (num_times - 1)
    pub defects: DMatrix<f64>,
    /// num_path_constraints x num_times
    pub path: DMatrix<f64>,
}

impl TranscriptionEvaluation {
    /// Largest absolute dynamics defect (0 with no states)
    pub fn max_defect(&self) -> f64 {
        self.defects.iter().fold(0.0, |acc, d| acc.max(d.abs()))
    }

    /// Largest distance of any path value outside its bounds
    pub fn max_path_violation(&self, bounds: &[Bounds]) -> f64 {
        let mut worst: f64 = 0.0;
        for (row, b) in bounds.iter().enumerate().take(self.path.nrows()) {
            for value in self.path.row(row).iter() {
                worst = worst.max(b.violation(*value));
            }
        }
        worst
    }
}

/// Trapezoidal-rule evaluator
#[derive(Debug, Clone, Copy, Default)]
pub struct TrapezoidalTranscription;

impl TrapezoidalTranscription {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate `problem` on `iterate`
    ///
    /// The iterate must have at least two nodes and match the problem's
    /// variable counts.
    pub fn evaluate(
        &self,
        problem: &dyn CollocationProblem,
        iterate: &NativeIterate,
    ) -> Result<TranscriptionEvaluation, SolverError> {
        iterate.validate()?;
        check_counts(problem, iterate)?;

        let num_times = iterate.num_times();
        if num_times < 2 {
            return Err(SolverError::InvalidProblem(format!(
                "transcription needs at least 2 nodes, got {}",
                num_times
            )));
        }

        let num_states = problem.num_states();
        let num_path = problem.num_path_constraints();
        let mut dynamics = DMatrix::zeros(num_states, num_times);
        let mut path = DMatrix::zeros(num_path, num_times);
        let mut integrand = vec![0.0; num_times];
        let mut output = DaeOutput::zeros(num_states, num_path);

        for i in 0..num_times {
            let input = DaeInput {
                node: i,
                time: iterate.time[i],
                states: column(&iterate.states, i),
                controls: column(&iterate.controls, i),
                adjuncts: column(&iterate.adjuncts, i),
                parameters: iterate.parameters.as_slice(),
            };
            problem.calc_differential_algebraic_equations(&input, &mut output)?;
            integrand[i] = problem.calc_integral_cost(&input)?;

            dynamics.column_mut(i).copy_from(&output.dynamics);
            path.column_mut(i).copy_from(&output.path);
        }

        let mut integral_cost = 0.0;
        let mut defects = DMatrix::zeros(num_states, num_times - 1);
        for i in 0..num_times - 1 {
            let h = iterate.time[i + 1] - iterate.time[i];
            integral_cost += 0.5 * h * (integrand[i] + integrand[i + 1]);
            for s in 0..num_states {
                defects[(s, i)] = iterate.states[(s, i + 1)]
                    - iterate.states[(s, i)]
                    - 0.5 * h * (dynamics[(s, i)] + dynamics[(s, i + 1)]);
            }
        }

        let last = num_times - 1;
        let endpoint_cost = problem.calc_endpoint_cost(&EndpointInput {
            initial_time: iterate.time[0],
            final_time: iterate.time[last],
            initial_states: column(&iterate.states, 0),
            final_states: column(&iterate.states, last),
            parameters: iterate.parameters.as_slice(),
        })?;

        Ok(TranscriptionEvaluation {
            objective: integral_cost + endpoint_cost,
            integral_cost,
            endpoint_cost,
            defects,
            path,
        })
    }
}

/// Column `j` as a contiguous slice (nalgebra storage is column-major)
fn column(matrix: &DMatrix<f64>, j: usize) -> &[f64] {
    let rows = matrix.nrows();
    &matrix.as_slice()[j * rows..(j + 1) * rows]
}

fn check_counts(
    problem: &dyn CollocationProblem,
    iterate: &NativeIterate,
) -> Result<(), SolverError> {
    let counts = [
        ("states", problem.num_states(), iterate.states.nrows()),
        ("controls", problem.num_controls(), iterate.controls.nrows()),
        ("adjuncts", problem.num_adjuncts(), iterate.adjuncts.nrows()),
        ("parameters", problem.num_parameters(), iterate.parameters.len()),
    ];
    for (what, expected, actual) in counts {
        if expected != actual {
            return Err(SolverError::InvalidProblem(format!(
                "iterate has {} {}, problem expects {}",
                actual, what, expected
            )));
        }
    }
    Ok(())
}
