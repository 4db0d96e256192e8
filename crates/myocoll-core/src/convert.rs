//! Conversion between named trajectories and solver-native iterates
//!
//! ```text
//! toolkit (time-major)                solver (variable-major)
//! time         n                      time      1 x n
//! states       n x ns        <->      states    ns x n
//! controls     n x nc        <->      controls  nc x n
//! multipliers  n x nm        \        adjuncts  (nm + nd) x n
//! derivatives  n x nd        /          rows [0, nm): multipliers
//!                                       rows [nm, nm + nd): derivatives
//! parameters   1 x np        <->      parameters np
//! ```
//!
//! Values are only copied, never combined, so a round trip reproduces every
//! entry bit for bit. Each block with zero variables takes an explicit
//! branch that builds the `n x 0` / `0 x n` shape directly.

use nalgebra::DMatrix;
use tracing::debug;

use crate::error::TrajectoryResult;
use crate::trajectory::named::check_shape;
use crate::trajectory::{
    split_adjunct_names, Block, NamedTrajectory, NativeIterate, NativeSolution, SolveStatistics,
    Solution, TrajectoryNames, TrajectoryParts,
};

/// Toolkit-side result type produced from a solver-native value
///
/// Lets a single conversion routine serve both iterates and solutions.
pub trait NamedResult: Sized {
    /// Solver-side counterpart
    type Native: AsRef<NativeIterate>;

    /// Attach whatever `native` carries beyond the iterate itself
    fn assemble(trajectory: NamedTrajectory, native: &Self::Native) -> Self;
}

impl NamedResult for NamedTrajectory {
    type Native = NativeIterate;

    fn assemble(trajectory: NamedTrajectory, _native: &NativeIterate) -> Self {
        trajectory
    }
}

impl NamedResult for Solution {
    type Native = NativeSolution;

    fn assemble(trajectory: NamedTrajectory, native: &NativeSolution) -> Self {
        Solution::new(
            trajectory,
            native.success,
            native.status.clone(),
            SolveStatistics {
                objective: native.objective,
                num_iterations: native.num_iterations,
                solve_time_ms: native.solve_time_ms,
            },
        )
    }
}

/// Convert a toolkit trajectory into the solver's layout
///
/// An empty trajectory converts to [`NativeIterate::empty`].
pub fn named_to_native(named: &NamedTrajectory) -> TrajectoryResult<NativeIterate> {
    if named.is_empty() {
        return Ok(NativeIterate::empty());
    }

    let num_times = named.num_times();
    let names = named.names();
    let num_multipliers = names.multipliers.len();
    let num_derivatives = names.derivatives.len();

    let states = to_variable_major(Block::States, named.states(), names.states.len(), num_times)?;
    let controls =
        to_variable_major(Block::Controls, named.controls(), names.controls.len(), num_times)?;
    let multipliers =
        to_variable_major(Block::Multipliers, named.multipliers(), num_multipliers, num_times)?;
    let derivatives =
        to_variable_major(Block::Derivatives, named.derivatives(), num_derivatives, num_times)?;

    let mut adjuncts = DMatrix::zeros(num_multipliers + num_derivatives, num_times);
    if num_multipliers > 0 {
        adjuncts.rows_mut(0, num_multipliers).copy_from(&multipliers);
    }
    if num_derivatives > 0 {
        adjuncts
            .rows_mut(num_multipliers, num_derivatives)
            .copy_from(&derivatives);
    }

    debug!(
        num_times,
        num_states = names.states.len(),
        num_controls = names.controls.len(),
        num_multipliers,
        num_derivatives,
        "converted named trajectory to solver layout"
    );

    Ok(NativeIterate {
        time: named.time().transpose(),
        states,
        controls,
        adjuncts,
        parameters: named.parameters().transpose(),
        state_names: names.states.clone(),
        control_names: names.controls.clone(),
        adjunct_names: names.adjunct_names(),
        parameter_names: names.parameters.clone(),
    })
}

/// Convert a toolkit solution into the solver's layout, keeping its report
pub fn named_to_native_solution(solution: &Solution) -> TrajectoryResult<NativeSolution> {
    let stats = solution.statistics();
    Ok(NativeSolution {
        iterate: named_to_native(solution.trajectory())?,
        success: solution.success(),
        status: solution.status().to_string(),
        objective: stats.objective,
        num_iterations: stats.num_iterations,
        solve_time_ms: stats.solve_time_ms,
    })
}

/// Convert a solver-native value back into toolkit form
///
/// `num_multipliers` is the bound model's multiplier count; the first that
/// many adjunct rows (and names) become multipliers, the rest derivatives.
/// An empty iterate returns an empty trajectory without further checks.
pub fn native_to_named<R: NamedResult>(
    native: &R::Native,
    num_multipliers: usize,
) -> TrajectoryResult<R> {
    let iterate = native.as_ref();
    if iterate.is_empty() {
        return Ok(R::assemble(NamedTrajectory::empty(), native));
    }

    let (multiplier_names, derivative_names) =
        split_adjunct_names(&iterate.adjunct_names, num_multipliers)?;
    iterate.validate()?;

    let num_times = iterate.num_times();
    let num_derivatives = derivative_names.len();

    let parts = TrajectoryParts {
        time: iterate.time.transpose(),
        states: to_time_major(&iterate.states, 0, iterate.state_names.len(), num_times),
        controls: to_time_major(&iterate.controls, 0, iterate.control_names.len(), num_times),
        multipliers: to_time_major(&iterate.adjuncts, 0, num_multipliers, num_times),
        derivatives: to_time_major(&iterate.adjuncts, num_multipliers, num_derivatives, num_times),
        parameters: iterate.parameters.transpose(),
        names: TrajectoryNames {
            states: iterate.state_names.clone(),
            controls: iterate.control_names.clone(),
            multipliers: multiplier_names,
            derivatives: derivative_names,
            parameters: iterate.parameter_names.clone(),
        },
    };

    debug!(
        num_times,
        num_multipliers, num_derivatives, "converted solver iterate to named trajectory"
    );

    Ok(R::assemble(NamedTrajectory::from_parts(parts)?, native))
}

/// Solver iterate to toolkit trajectory
pub fn native_to_iterate(
    native: &NativeIterate,
    num_multipliers: usize,
) -> TrajectoryResult<NamedTrajectory> {
    native_to_named::<NamedTrajectory>(native, num_multipliers)
}

/// Solver solution to toolkit solution, carrying the termination report
pub fn native_to_solution(
    native: &NativeSolution,
    num_multipliers: usize,
) -> TrajectoryResult<Solution> {
    native_to_named::<Solution>(native, num_multipliers)
}

/// `num_times x num_vars` to `num_vars x num_times`
fn to_variable_major(
    block: Block,
    data: &DMatrix<f64>,
    num_vars: usize,
    num_times: usize,
) -> TrajectoryResult<DMatrix<f64>> {
    check_shape(block, data, num_times, num_vars)?;
    if num_vars == 0 {
        return Ok(DMatrix::zeros(0, num_times));
    }
    Ok(DMatrix::from_fn(num_vars, num_times, |ivar, itime| {
        data[(itime, ivar)]
    }))
}

/// Rows `[first_row, first_row + num_vars)` of a variable-major block,
/// as `num_times x num_vars`. Shapes are validated by the caller.
fn to_time_major(
    data: &DMatrix<f64>,
    first_row: usize,
    num_vars: usize,
    num_times: usize,
) -> DMatrix<f64> {
    if num_vars == 0 {
        return DMatrix::zeros(num_times, 0);
    }
    DMatrix::from_fn(num_times, num_vars, |itime, ivar| {
        data[(first_row + ivar, itime)]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrajectoryError;
    use nalgebra::{DVector, RowDVector};

    fn two_state_trajectory() -> NamedTrajectory {
        let names = TrajectoryNames::new().with_states(["q", "u"]);
        let mut parts = TrajectoryParts::zeros(DVector::from_vec(vec![0.0, 0.5, 1.0]), names);
        parts.states = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        NamedTrajectory::from_parts(parts).unwrap()
    }

    #[test]
    fn test_orientation() {
        let named = two_state_trajectory();
        let native = named_to_native(&named).unwrap();

        let expected = DMatrix::from_row_slice(2, 3, &[1.0, 3.0, 5.0, 2.0, 4.0, 6.0]);
        assert_eq!(native.states, expected);
        assert_eq!(native.time, RowDVector::from_vec(vec![0.0, 0.5, 1.0]));

        let back = native_to_iterate(&native, 0).unwrap();
        assert_eq!(back, named);
    }

    #[test]
    fn test_zero_controls_shape() {
        let named = two_state_trajectory();
        assert_eq!(named.controls().shape(), (3, 0));

        let native = named_to_native(&named).unwrap();
        // No control rows, one column per node
        assert_eq!(native.controls.shape(), (0, 3));
        assert_eq!(native.adjuncts.shape(), (0, 3));
        assert_eq!(native.parameters.len(), 0);

        let back = native_to_iterate(&native, 0).unwrap();
        assert_eq!(back.controls().shape(), (3, 0));
        assert_eq!(back.multipliers().shape(), (3, 0));
        assert_eq!(back.derivatives().shape(), (3, 0));
    }

    #[test]
    fn test_adjunct_stacking() {
        let names = TrajectoryNames::new()
            .with_states(["q"])
            .with_multipliers(["lambda0", "lambda1"])
            .with_derivatives(["qdotdot"]);
        let mut parts = TrajectoryParts::zeros(DVector::from_vec(vec![0.0, 1.0]), names);
        parts.multipliers = DMatrix::from_row_slice(2, 2, &[10.0, 20.0, 11.0, 21.0]);
        parts.derivatives = DMatrix::from_row_slice(2, 1, &[-1.0, -2.0]);
        let named = NamedTrajectory::from_parts(parts).unwrap();

        let native = named_to_native(&named).unwrap();
        assert_eq!(native.adjunct_names, vec!["lambda0", "lambda1", "qdotdot"]);
        let expected =
            DMatrix::from_row_slice(3, 2, &[10.0, 11.0, 20.0, 21.0, -1.0, -2.0]);
        assert_eq!(native.adjuncts, expected);

        let back = native_to_iterate(&native, 2).unwrap();
        assert_eq!(back, named);
    }

    #[test]
    fn test_empty_fast_path() {
        let native = named_to_native(&NamedTrajectory::empty()).unwrap();
        assert!(native.is_empty());
        assert_eq!(native, NativeIterate::empty());

        // The multiplier count is irrelevant when there is nothing to split
        let back = native_to_iterate(&native, 3).unwrap();
        assert!(back.is_empty());
        assert_eq!(back, NamedTrajectory::empty());
    }

    #[test]
    fn test_excess_multipliers_rejected() {
        let mut native = NativeIterate::empty();
        native.time = RowDVector::from_vec(vec![0.0, 1.0]);
        native.states = DMatrix::zeros(0, 2);
        native.controls = DMatrix::zeros(0, 2);
        native.adjunct_names = vec!["lambda".to_string()];
        native.adjuncts = DMatrix::zeros(1, 2);

        let err = native_to_iterate(&native, 2).unwrap_err();
        assert!(matches!(err, TrajectoryError::InvariantViolation(_)));
    }

    #[test]
    fn test_native_shape_mismatch_rejected() {
        let mut native = named_to_native(&two_state_trajectory()).unwrap();
        native.states = DMatrix::zeros(3, 2);

        assert!(matches!(
            native_to_iterate(&native, 0),
            Err(TrajectoryError::ShapeMismatch { block: Block::States, .. })
        ));
    }

    #[test]
    fn test_solution_report_passes_through() {
        let native = NativeSolution {
            iterate: named_to_native(&two_state_trajectory()).unwrap(),
            success: false,
            status: "Maximum_Iterations_Exceeded".to_string(),
            objective: 3.25,
            num_iterations: 500,
            solve_time_ms: 12.0,
        };

        let solution = native_to_solution(&native, 0).unwrap();
        assert!(!solution.success());
        assert_eq!(solution.status(), "Maximum_Iterations_Exceeded");
        assert_eq!(solution.objective(), 3.25);
        assert_eq!(solution.num_iterations(), 500);
        assert_eq!(solution.trajectory(), &two_state_trajectory());

        let again = named_to_native_solution(&solution).unwrap();
        assert_eq!(again, native);
    }

    #[test]
    fn test_input_not_mutated() {
        let named = two_state_trajectory();
        let copy = named.clone();
        let native = named_to_native(&named).unwrap();
        let native_copy = native.clone();
        let _ = native_to_iterate(&native, 0).unwrap();

        assert_eq!(named, copy);
        assert_eq!(native, native_copy);
    }
}
