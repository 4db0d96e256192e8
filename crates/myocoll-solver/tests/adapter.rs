//! Collocation adapter tests
//!
//! Covers construction from a model and problem, guess translation in both
//! directions, and per-node evaluation including failure propagation.
//!
//! Run with: cargo test -p myocoll-solver --test adapter

mod common;

use std::f64::consts::FRAC_PI_2;

use approx::assert_relative_eq;
use nalgebra::{DMatrix, DVector};

use common::{Brachistochrone, FailingModel, MisreportingModel, PlanarPointMass, GRAVITY};
use myocoll_core::{NamedTrajectory, TrajectoryError, TrajectoryNames};
use myocoll_solver::{
    Bounds, CollocationAdapter, CollocationProblem, ControlEffortCost, DaeInput, DaeOutput,
    EndpointInput, FinalTimeCost, GuessStrategy, ModelError, NodeInput, PathConstraint,
    ProblemDefinition, SolverConfig, SolverError, VariableInfo,
};

/// Keeps x within [lo, hi] at every node
#[derive(Debug)]
struct XWindow {
    lo: f64,
    hi: f64,
}

impl PathConstraint for XWindow {
    fn name(&self) -> &str {
        "x_window"
    }

    fn num_outputs(&self) -> usize {
        1
    }

    fn bounds(&self) -> Vec<Bounds> {
        vec![Bounds::new(self.lo, self.hi)]
    }

    fn evaluate(&self, input: &NodeInput<'_>, out: &mut [f64]) {
        out[0] = input.states[0];
    }
}

fn brachistochrone_problem() -> ProblemDefinition {
    let mut problem = ProblemDefinition::new();
    problem.set_time_bounds(Bounds::fixed(0.0), Bounds::new(0.0, 10.0));
    problem.set_state_info(
        VariableInfo::new("x", Bounds::new(0.0, 10.0))
            .with_initial(Bounds::fixed(0.0))
            .with_final(Bounds::fixed(1.0)),
    );
    problem.set_state_info(
        VariableInfo::new("y", Bounds::new(0.0, 10.0))
            .with_initial(Bounds::fixed(0.0))
            .with_final(Bounds::fixed(1.0)),
    );
    problem.set_state_info(
        VariableInfo::new("v", Bounds::new(-10.0, 10.0)).with_initial(Bounds::fixed(0.0)),
    );
    problem.set_control_info(VariableInfo::new("w", Bounds::new(-FRAC_PI_2, FRAC_PI_2)));
    problem.add_cost(FinalTimeCost::new(1.0));
    problem
}

fn brachistochrone_adapter() -> CollocationAdapter<Brachistochrone> {
    CollocationAdapter::new(Brachistochrone, brachistochrone_problem(), &SolverConfig::default())
        .unwrap()
}

fn point_mass_adapter() -> CollocationAdapter<PlanarPointMass> {
    let mut problem = ProblemDefinition::new();
    problem.set_time_bounds(Bounds::fixed(0.0), Bounds::fixed(1.0));
    CollocationAdapter::new(PlanarPointMass, problem, &SolverConfig::default()).unwrap()
}

mod construction_tests {
    use super::*;

    #[test]
    fn test_counts_follow_model() {
        let adapter = point_mass_adapter();

        assert_eq!(adapter.num_states(), 4);
        assert_eq!(adapter.num_controls(), 2);
        assert_eq!(adapter.num_multipliers(), 1);
        assert_eq!(adapter.num_derivatives(), 0);
        assert_eq!(adapter.num_adjuncts(), 1);
        assert_eq!(adapter.multiplier_names(), &["lambda"]);
        assert_eq!(adapter.adjunct_bounds(), &[Bounds::new(-1000.0, 1000.0)]);
    }

    #[test]
    fn test_residuals_lead_path_constraints() {
        let mut problem = ProblemDefinition::new();
        problem.add_path_constraint(XWindow { lo: -1.0, hi: 1.0 });
        let adapter =
            CollocationAdapter::new(PlanarPointMass, problem, &SolverConfig::default()).unwrap();

        assert_eq!(adapter.path_constraint_names(), &["model_residual_0", "x_window_0"]);
        assert_eq!(
            adapter.path_constraint_bounds(),
            &[Bounds::fixed(0.0), Bounds::new(-1.0, 1.0)]
        );
    }

    #[test]
    fn test_unmentioned_variables_unbounded() {
        let adapter = point_mass_adapter();
        assert_eq!(adapter.state_infos().len(), 4);
        assert_eq!(adapter.state_infos()[2].name, "vx");
        assert_eq!(adapter.state_infos()[2].bounds, Bounds::unbounded());
    }

    #[test]
    fn test_unknown_variable_rejected() {
        let mut problem = ProblemDefinition::new();
        problem.set_state_info(VariableInfo::new("knee_angle", Bounds::new(0.0, 1.0)));

        let result = CollocationAdapter::new(Brachistochrone, problem, &SolverConfig::default());
        match result {
            Err(SolverError::UnknownVariable { kind, name }) => {
                assert_eq!(kind, "state");
                assert_eq!(name, "knee_angle");
            }
            _ => panic!("expected UnknownVariable"),
        }
    }

    #[test]
    fn test_config_adjunct_bounds_applied() {
        let config = SolverConfig {
            multiplier_bounds: Bounds::new(-5.0, 5.0),
            ..Default::default()
        };
        let adapter =
            CollocationAdapter::new(PlanarPointMass, ProblemDefinition::new(), &config).unwrap();
        assert_eq!(adapter.adjunct_bounds(), &[Bounds::new(-5.0, 5.0)]);
    }
}

mod guess_tests {
    use super::*;

    #[test]
    fn test_default_guess_from_bounds() {
        let adapter = brachistochrone_adapter();
        let guess = adapter.default_guess(3, GuessStrategy::Bounds).unwrap();

        assert_eq!(guess.time().as_slice(), &[0.0, 2.5, 5.0]);
        assert_eq!(guess.state("x").unwrap().as_slice(), &[0.0, 5.0, 1.0]);
        assert_eq!(guess.state("v").unwrap().as_slice(), &[0.0, 0.0, 0.0]);
        assert_eq!(guess.control("w").unwrap().as_slice(), &[0.0, 0.0, 0.0]);
        assert_eq!(guess.multipliers().shape(), (3, 0));
    }

    #[test]
    fn test_zeros_guess_and_degenerate_span() {
        // Both time bounds fixed at 0: the span is widened to one unit
        let mut problem = ProblemDefinition::new();
        problem.set_time_bounds(Bounds::fixed(0.0), Bounds::fixed(0.0));
        let adapter =
            CollocationAdapter::new(PlanarPointMass, problem, &SolverConfig::default()).unwrap();

        let guess = adapter.default_guess(3, GuessStrategy::Zeros).unwrap();
        assert_eq!(guess.time().as_slice(), &[0.0, 0.5, 1.0]);
        assert_eq!(guess.multipliers(), &DMatrix::zeros(3, 1));
    }

    #[test]
    fn test_guess_round_trip_through_solver_layout() {
        let adapter = point_mass_adapter();
        let mut guess = adapter.default_guess(4, GuessStrategy::Bounds).unwrap();
        guess.set_multiplier("lambda", &[1.0, 2.0, 3.0, 4.0]).unwrap();
        guess.set_state("vx", &[0.1, 0.2, 0.3, 0.4]).unwrap();

        let native = adapter.initial_guess(&guess).unwrap();
        assert_eq!(native.adjuncts.shape(), (1, 4));
        assert_eq!(
            native.adjuncts,
            DMatrix::from_row_slice(1, 4, &[1.0, 2.0, 3.0, 4.0])
        );
        assert_eq!(native.controls.shape(), (2, 4));

        let back = adapter.iterate_from_native(&native).unwrap();
        assert_eq!(back, guess);
    }

    #[test]
    fn test_guess_missing_multipliers_rejected() {
        let adapter = point_mass_adapter();
        let names = TrajectoryNames::new()
            .with_states(["x", "y", "vx", "vy"])
            .with_controls(["fx", "fy"]);
        let guess = NamedTrajectory::zeros(DVector::from_vec(vec![0.0, 1.0]), names).unwrap();

        assert!(matches!(
            adapter.initial_guess(&guess),
            Err(TrajectoryError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_empty_guess_passes_through() {
        let adapter = point_mass_adapter();
        let native = adapter.initial_guess(&NamedTrajectory::empty()).unwrap();
        assert!(native.is_empty());
        assert!(adapter.iterate_from_native(&native).unwrap().is_empty());
    }

    #[test]
    fn test_reordered_iterate_rejected() {
        let adapter = point_mass_adapter();
        let guess = adapter.default_guess(3, GuessStrategy::Zeros).unwrap();
        let mut native = adapter.initial_guess(&guess).unwrap();
        native.control_names.swap(0, 1);

        assert!(matches!(
            adapter.iterate_from_native(&native),
            Err(TrajectoryError::InvariantViolation(_))
        ));
    }
}

mod evaluation_tests {
    use super::*;

    #[test]
    fn test_brachistochrone_dynamics() {
        let adapter = brachistochrone_adapter();
        let input = DaeInput {
            node: 0,
            time: 0.0,
            states: &[0.0, 0.0, 2.0],
            controls: &[FRAC_PI_2],
            adjuncts: &[],
            parameters: &[],
        };
        let mut output = DaeOutput::zeros(3, 0);
        adapter
            .calc_differential_algebraic_equations(&input, &mut output)
            .unwrap();

        assert_relative_eq!(output.dynamics[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(output.dynamics[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(output.dynamics[2], GRAVITY, epsilon = 1e-12);
    }

    #[test]
    fn test_adjuncts_split_at_multiplier_count() {
        let mut problem = ProblemDefinition::new();
        problem.add_path_constraint(XWindow { lo: -1.0, hi: 1.0 });
        let adapter =
            CollocationAdapter::new(PlanarPointMass, problem, &SolverConfig::default()).unwrap();

        let input = DaeInput {
            node: 2,
            time: 0.4,
            states: &[0.25, 0.0, 1.0, 0.5],
            controls: &[0.0, 1.0],
            adjuncts: &[3.0],
            parameters: &[],
        };
        // Deliberately undersized; the adapter resizes the path vector
        let mut output = DaeOutput::zeros(4, 0);
        adapter
            .calc_differential_algebraic_equations(&input, &mut output)
            .unwrap();

        assert_relative_eq!(output.dynamics[3], 1.0 - GRAVITY + 3.0, epsilon = 1e-12);
        assert_eq!(output.path.as_slice(), &[0.5, 0.25]);
    }

    #[test]
    fn test_model_failure_propagates() {
        let adapter = CollocationAdapter::new(
            FailingModel { fail_after: 0.5 },
            ProblemDefinition::new(),
            &SolverConfig::default(),
        )
        .unwrap();
        let input = DaeInput {
            node: 3,
            time: 0.75,
            states: &[0.0],
            controls: &[1.0],
            adjuncts: &[],
            parameters: &[],
        };
        let mut output = DaeOutput::zeros(1, 0);

        let err = adapter
            .calc_differential_algebraic_equations(&input, &mut output)
            .unwrap_err();
        assert_eq!(err.node, 3);
        assert_eq!(err.time, 0.75);
        assert!(matches!(err.source, ModelError::SingularConfiguration(_)));
    }

    #[test]
    fn test_model_output_size_checked() {
        let adapter = CollocationAdapter::new(
            MisreportingModel,
            ProblemDefinition::new(),
            &SolverConfig::default(),
        )
        .unwrap();
        let input = DaeInput {
            node: 0,
            time: 0.0,
            states: &[0.0, 0.0],
            controls: &[],
            adjuncts: &[],
            parameters: &[],
        };
        let mut output = DaeOutput::zeros(2, 0);

        let err = adapter
            .calc_differential_algebraic_equations(&input, &mut output)
            .unwrap_err();
        assert_eq!(
            err.source,
            ModelError::Dimension {
                what: "state derivative",
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn test_node_input_size_checked() {
        let adapter = point_mass_adapter();
        let input = DaeInput {
            node: 1,
            time: 0.1,
            states: &[0.0; 4],
            controls: &[0.0; 2],
            adjuncts: &[],
            parameters: &[],
        };

        let err = adapter.calc_integral_cost(&input).unwrap_err();
        assert_eq!(
            err.source,
            ModelError::Dimension {
                what: "adjunct",
                expected: 1,
                actual: 0,
            }
        );
    }

    #[test]
    fn test_costs_sum_over_terms() {
        let mut problem = ProblemDefinition::new();
        problem.add_cost(ControlEffortCost::new(2.0));
        problem.add_cost(FinalTimeCost::new(0.5));
        let adapter =
            CollocationAdapter::new(Brachistochrone, problem, &SolverConfig::default()).unwrap();

        let input = DaeInput {
            node: 0,
            time: 0.0,
            states: &[0.0, 0.0, 0.0],
            controls: &[3.0],
            adjuncts: &[],
            parameters: &[],
        };
        assert_relative_eq!(adapter.calc_integral_cost(&input).unwrap(), 18.0);

        let endpoint = EndpointInput {
            initial_time: 0.0,
            final_time: 4.0,
            initial_states: &[0.0, 0.0, 0.0],
            final_states: &[1.0, 1.0, 0.0],
            parameters: &[],
        };
        assert_relative_eq!(adapter.calc_endpoint_cost(&endpoint).unwrap(), 2.0);
    }
}
