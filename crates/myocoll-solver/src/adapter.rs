//! Collocation problem adapter
//!
//! Binds a [`MultibodyModel`] and a [`ProblemDefinition`] into a
//! [`CollocationProblem`], and translates trajectories between the
//! toolkit and solver layouts using the model's multiplier count.
//!
//! The multiplier count is read from the model once, at construction, and
//! every later conversion and evaluation uses that same value.

use nalgebra::{DMatrix, DVector, RowDVector};
use tracing::{debug, info, warn};

use myocoll_core::{
    linspace, named_to_native, native_to_iterate, native_to_solution, NamedTrajectory,
    NativeIterate, NativeSolution, Solution, TrajectoryError, TrajectoryNames, TrajectoryParts,
    TrajectoryResult,
};

use crate::collocation::{
    CollocationProblem, DaeInput, DaeOutput, DynamicsEvaluationError, EndpointInput,
};
use crate::config::{GuessStrategy, SolverConfig};
use crate::constraints::PathConstraintSet;
use crate::model::{ModelError, MultibodyModel, NodeInput};
use crate::problem::{Bounds, ProblemDefinition, VariableInfo};
use crate::solver::SolverError;

/// [`CollocationProblem`] over a multibody model
pub struct CollocationAdapter<M> {
    model: M,
    problem: ProblemDefinition,
    names: TrajectoryNames,
    num_multipliers: usize,
    state_infos: Vec<VariableInfo>,
    control_infos: Vec<VariableInfo>,
    adjunct_bounds: Vec<Bounds>,
    parameter_bounds: Vec<Bounds>,
    path: PathConstraintSet,
}

impl<M: MultibodyModel> CollocationAdapter<M> {
    /// Bind `model` and `problem`
    ///
    /// Fails if the model's names collide, or the problem bounds a variable
    /// the model does not have.
    pub fn new(
        model: M,
        problem: ProblemDefinition,
        config: &SolverConfig,
    ) -> Result<Self, SolverError> {
        let names = TrajectoryNames {
            states: model.state_names(),
            controls: model.control_names(),
            multipliers: model.multiplier_names(),
            derivatives: model.derivative_names(),
            parameters: problem.parameter_names(),
        };
        names.validate()?;

        let state_infos = resolve_infos("state", &names.states, problem.state_infos())?;
        let control_infos = resolve_infos("control", &names.controls, problem.control_infos())?;

        let num_multipliers = names.multipliers.len();
        let mut adjunct_bounds = vec![config.multiplier_bounds; num_multipliers];
        adjunct_bounds.extend(vec![config.derivative_bounds; names.derivatives.len()]);

        let parameter_bounds = problem.parameter_infos().iter().map(|p| p.bounds).collect();
        let path = PathConstraintSet::new(model.num_residuals(), problem.path_constraints())?;

        info!(
            num_states = names.states.len(),
            num_controls = names.controls.len(),
            num_multipliers,
            num_derivatives = names.derivatives.len(),
            num_parameters = names.parameters.len(),
            num_path_constraints = path.len(),
            "collocation adapter ready"
        );

        Ok(Self {
            model,
            problem,
            names,
            num_multipliers,
            state_infos,
            control_infos,
            adjunct_bounds,
            parameter_bounds,
            path,
        })
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn problem(&self) -> &ProblemDefinition {
        &self.problem
    }

    /// Variable names in toolkit form
    pub fn names(&self) -> &TrajectoryNames {
        &self.names
    }

    pub fn path_constraint_set(&self) -> &PathConstraintSet {
        &self.path
    }

    /// Convert a warm-start guess into the solver's layout
    ///
    /// The guess must carry exactly the bound model's variables in model
    /// order. An empty guess converts to an empty iterate.
    pub fn initial_guess(&self, guess: &NamedTrajectory) -> TrajectoryResult<NativeIterate> {
        if guess.is_empty() {
            return Ok(NativeIterate::empty());
        }
        self.check_names("guess", guess.names())?;

        let native = named_to_native(guess)?;
        debug!(num_times = native.num_times(), "converted initial guess");
        Ok(native)
    }

    /// Guess over `num_times` evenly spaced nodes, filled per `strategy`
    ///
    /// The time span runs from the initial-time guess to the final-time
    /// guess, or one unit past the initial time if those do not increase.
    pub fn default_guess(
        &self,
        num_times: usize,
        strategy: GuessStrategy,
    ) -> TrajectoryResult<NamedTrajectory> {
        let initial = self.problem.initial_time_bounds().guess_value();
        let mut final_time = self.problem.final_time_bounds().guess_value();
        if final_time <= initial {
            final_time = initial + 1.0;
        }
        let time = linspace(initial, final_time, num_times);

        if strategy == GuessStrategy::Zeros {
            return NamedTrajectory::zeros(time, self.names.clone());
        }

        let num_multipliers = self.num_multipliers;
        let num_derivatives = self.names.derivatives.len();

        NamedTrajectory::from_parts(TrajectoryParts {
            states: guess_block(&self.state_infos, num_times),
            controls: guess_block(&self.control_infos, num_times),
            multipliers: DMatrix::from_fn(num_times, num_multipliers, |_, j| {
                self.adjunct_bounds[j].guess_value()
            }),
            derivatives: DMatrix::from_fn(num_times, num_derivatives, |_, j| {
                self.adjunct_bounds[num_multipliers + j].guess_value()
            }),
            parameters: RowDVector::from_iterator(
                self.parameter_bounds.len(),
                self.parameter_bounds.iter().map(Bounds::guess_value),
            ),
            time,
            names: self.names.clone(),
        })
    }

    /// Solver iterate to toolkit trajectory, splitting adjuncts at the
    /// model's multiplier count
    ///
    /// The iterate must carry the bound model's variables in model order.
    pub fn iterate_from_native(&self, native: &NativeIterate) -> TrajectoryResult<NamedTrajectory> {
        let iterate = native_to_iterate(native, self.num_multipliers)?;
        if !iterate.is_empty() {
            self.check_names("solver iterate", iterate.names())?;
        }
        Ok(iterate)
    }

    /// Solver result to toolkit solution, carrying the termination report
    ///
    /// Fails if the back end returned variables other than the bound
    /// model's, in model order.
    pub fn solution_from_native(&self, native: &NativeSolution) -> TrajectoryResult<Solution> {
        let solution = native_to_solution(native, self.num_multipliers)?;
        self.check_names("solver result", solution.names())?;
        debug!(
            num_times = solution.num_times(),
            success = solution.success(),
            "converted solver result"
        );
        Ok(solution)
    }

    fn check_names(&self, what: &str, names: &TrajectoryNames) -> TrajectoryResult<()> {
        if names == &self.names {
            return Ok(());
        }
        Err(TrajectoryError::InvariantViolation(format!(
            "{} variables do not match the model: expected states {:?}, controls {:?}, \
             multipliers {:?}, derivatives {:?}, parameters {:?}; got {:?}, {:?}, {:?}, {:?}, {:?}",
            what,
            self.names.states,
            self.names.controls,
            self.names.multipliers,
            self.names.derivatives,
            self.names.parameters,
            names.states,
            names.controls,
            names.multipliers,
            names.derivatives,
            names.parameters,
        )))
    }

    /// Split one node into model inputs, checking every slice length
    fn node_input<'a>(
        &self,
        input: &DaeInput<'a>,
    ) -> Result<NodeInput<'a>, DynamicsEvaluationError> {
        let checks = [
            ("state", self.num_states(), input.states.len()),
            ("control", self.num_controls(), input.controls.len()),
            ("adjunct", self.num_adjuncts(), input.adjuncts.len()),
            ("parameter", self.num_parameters(), input.parameters.len()),
        ];
        for (what, expected, actual) in checks {
            if expected != actual {
                return Err(DynamicsEvaluationError {
                    node: input.node,
                    time: input.time,
                    source: ModelError::Dimension {
                        what,
                        expected,
                        actual,
                    },
                });
            }
        }

        let (multipliers, derivatives) = input.adjuncts.split_at(self.num_multipliers);
        Ok(NodeInput {
            time: input.time,
            states: input.states,
            controls: input.controls,
            multipliers,
            derivatives,
            parameters: input.parameters,
        })
    }
}

impl<M: MultibodyModel> CollocationProblem for CollocationAdapter<M> {
    fn state_names(&self) -> &[String] {
        &self.names.states
    }

    fn control_names(&self) -> &[String] {
        &self.names.controls
    }

    fn multiplier_names(&self) -> &[String] {
        &self.names.multipliers
    }

    fn derivative_names(&self) -> &[String] {
        &self.names.derivatives
    }

    fn parameter_names(&self) -> &[String] {
        &self.names.parameters
    }

    fn path_constraint_names(&self) -> &[String] {
        self.path.names()
    }

    fn num_multipliers(&self) -> usize {
        self.num_multipliers
    }

    fn initial_time_bounds(&self) -> Bounds {
        self.problem.initial_time_bounds()
    }

    fn final_time_bounds(&self) -> Bounds {
        self.problem.final_time_bounds()
    }

    fn state_infos(&self) -> &[VariableInfo] {
        &self.state_infos
    }

    fn control_infos(&self) -> &[VariableInfo] {
        &self.control_infos
    }

    fn adjunct_bounds(&self) -> &[Bounds] {
        &self.adjunct_bounds
    }

    fn parameter_bounds(&self) -> &[Bounds] {
        &self.parameter_bounds
    }

    fn path_constraint_bounds(&self) -> &[Bounds] {
        self.path.bounds()
    }

    fn calc_differential_algebraic_equations(
        &self,
        input: &DaeInput<'_>,
        output: &mut DaeOutput,
    ) -> Result<(), DynamicsEvaluationError> {
        let node = self.node_input(input)?;
        let fail = |source: ModelError| {
            warn!(node = input.node, time = input.time, error = %source, "model evaluation failed");
            DynamicsEvaluationError {
                node: input.node,
                time: input.time,
                source,
            }
        };

        let result = self.model.evaluate(&node).map_err(|e| fail(e))?;
        if result.state_derivatives.len() != self.num_states() {
            return Err(fail(ModelError::Dimension {
                what: "state derivative",
                expected: self.num_states(),
                actual: result.state_derivatives.len(),
            }));
        }
        if result.residuals.len() != self.path.num_residuals() {
            return Err(fail(ModelError::Dimension {
                what: "residual",
                expected: self.path.num_residuals(),
                actual: result.residuals.len(),
            }));
        }

        output.dynamics = result.state_derivatives;
        if output.path.len() != self.path.len() {
            output.path = DVector::zeros(self.path.len());
        }
        self.path.evaluate(
            self.problem.path_constraints(),
            result.residuals.as_slice(),
            &node,
            output.path.as_mut_slice(),
        );
        Ok(())
    }

    fn calc_integral_cost(&self, input: &DaeInput<'_>) -> Result<f64, DynamicsEvaluationError> {
        let node = self.node_input(input)?;
        Ok(self
            .problem
            .costs()
            .iter()
            .map(|cost| cost.integrand(&node))
            .sum())
    }

    fn calc_endpoint_cost(
        &self,
        input: &EndpointInput<'_>,
    ) -> Result<f64, DynamicsEvaluationError> {
        Ok(self.problem.costs().iter().map(|cost| cost.endpoint(input)).sum())
    }
}

/// Bounds for every model variable in model order; unmentioned ones are
/// unbounded
fn resolve_infos(
    kind: &'static str,
    names: &[String],
    infos: &[VariableInfo],
) -> Result<Vec<VariableInfo>, SolverError> {
    if let Some(unknown) = infos.iter().find(|info| !names.contains(&info.name)) {
        return Err(SolverError::UnknownVariable {
            kind,
            name: unknown.name.clone(),
        });
    }
    Ok(names
        .iter()
        .map(|name| {
            infos
                .iter()
                .find(|info| &info.name == name)
                .cloned()
                .unwrap_or_else(|| VariableInfo::new(name.clone(), Bounds::unbounded()))
        })
        .collect())
}

/// Time-major block of bound-derived guesses, honoring endpoint bounds
fn guess_block(infos: &[VariableInfo], num_times: usize) -> DMatrix<f64> {
    let last = num_times.saturating_sub(1);
    DMatrix::from_fn(num_times, infos.len(), |i, j| {
        let info = &infos[j];
        if i == 0 {
            info.at_initial().guess_value()
        } else if i == last {
            info.at_final().guess_value()
        } else {
            info.bounds.guess_value()
        }
    })
}
