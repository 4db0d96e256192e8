//! Solve driver
//!
//! Wraps an external NLP back end. Each solve:
//! 1. picks a guess (explicit, else previous solution resampled, else
//!    generated from bounds)
//! 2. converts it to the solver layout
//! 3. runs the back end
//! 4. converts the result back into a [`Solution`]

use thiserror::Error;
use tracing::{debug, info, warn};

use myocoll_core::{
    linspace, NamedTrajectory, NativeIterate, NativeSolution, Solution, TrajectoryError,
};

use crate::adapter::CollocationAdapter;
use crate::collocation::{CollocationProblem, DynamicsEvaluationError};
use crate::config::SolverConfig;
use crate::model::MultibodyModel;
use crate::problem::ProblemDefinition;

/// Solver errors
#[derive(Debug, Error)]
pub enum SolverError {
    #[error(transparent)]
    Trajectory(#[from] TrajectoryError),
    #[error(transparent)]
    Dynamics(#[from] DynamicsEvaluationError),
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),
    #[error("Problem references unknown {kind} '{name}'")]
    UnknownVariable { kind: &'static str, name: String },
    #[error("Back end failed: {0}")]
    Backend(String),
}

/// External NLP back end
///
/// Receives the problem, a guess in the solver layout, and the
/// configuration; returns its final iterate and termination report.
/// Non-convergence is a normal result (`success = false`), not an error.
pub trait CollocationBackend {
    fn solve(
        &mut self,
        problem: &dyn CollocationProblem,
        guess: NativeIterate,
        config: &SolverConfig,
    ) -> Result<NativeSolution, SolverError>;
}

impl<B: CollocationBackend + ?Sized> CollocationBackend for Box<B> {
    fn solve(
        &mut self,
        problem: &dyn CollocationProblem,
        guess: NativeIterate,
        config: &SolverConfig,
    ) -> Result<NativeSolution, SolverError> {
        (**self).solve(problem, guess, config)
    }
}

/// Trajectory optimizer over a multibody model
pub struct TrajectorySolver<M, B> {
    adapter: CollocationAdapter<M>,
    backend: B,
    config: SolverConfig,
    /// Last converged solution, kept for warm starting
    previous: Option<Solution>,
}

impl<M: MultibodyModel, B: CollocationBackend> TrajectorySolver<M, B> {
    pub fn new(
        model: M,
        problem: ProblemDefinition,
        backend: B,
        config: SolverConfig,
    ) -> Result<Self, SolverError> {
        config.validate()?;
        let adapter = CollocationAdapter::new(model, problem, &config)?;
        Ok(Self {
            adapter,
            backend,
            config,
            previous: None,
        })
    }

    pub fn adapter(&self) -> &CollocationAdapter<M> {
        &self.adapter
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Last solution the back end reported as converged
    pub fn last_solution(&self) -> Option<&Solution> {
        self.previous.as_ref()
    }

    /// Forget the stored solution; the next solve without a guess starts
    /// from bounds
    pub fn clear_warm_start(&mut self) {
        self.previous = None;
    }

    /// Solve, optionally from an explicit guess
    ///
    /// An empty guess counts as no guess.
    pub fn solve(&mut self, guess: Option<&NamedTrajectory>) -> Result<Solution, SolverError> {
        let guess = self.choose_guess(guess)?;
        let native_guess = self.adapter.initial_guess(&guess)?;

        info!(
            num_times = native_guess.num_times(),
            max_iterations = ?self.config.max_iterations,
            "starting solve"
        );
        let native = self
            .backend
            .solve(&self.adapter, native_guess, &self.config)?;
        let solution = self.adapter.solution_from_native(&native)?;

        if solution.success() {
            info!(
                status = solution.status(),
                objective = solution.objective(),
                iterations = solution.num_iterations(),
                "solve converged"
            );
            self.previous = Some(solution.clone());
        } else {
            warn!(
                status = solution.status(),
                iterations = solution.num_iterations(),
                "solve did not converge"
            );
        }
        Ok(solution)
    }

    fn choose_guess(
        &self,
        guess: Option<&NamedTrajectory>,
    ) -> Result<NamedTrajectory, SolverError> {
        if let Some(guess) = guess.filter(|g| !g.is_empty()) {
            debug!("using caller-supplied guess");
            return Ok(guess.clone());
        }

        let num_times = self.config.num_mesh_points;
        if self.config.warm_start {
            if let Some(previous) = &self.previous {
                match resample_onto_mesh(previous, num_times) {
                    Ok(resampled) => {
                        debug!(num_times, "warm starting from previous solution");
                        return Ok(resampled);
                    }
                    Err(err) => {
                        warn!(error = %err, "previous solution unusable as guess");
                    }
                }
            }
        }

        debug!(num_times, strategy = ?self.config.guess, "generating guess");
        Ok(self.adapter.default_guess(num_times, self.config.guess)?)
    }
}

/// Resample a trajectory onto `num_times` evenly spaced nodes over its own
/// time span
fn resample_onto_mesh(
    trajectory: &NamedTrajectory,
    num_times: usize,
) -> Result<NamedTrajectory, TrajectoryError> {
    match (trajectory.initial_time(), trajectory.final_time()) {
        (Some(initial), Some(final_time)) => {
            trajectory.resample(&linspace(initial, final_time, num_times))
        }
        _ => Err(TrajectoryError::InvariantViolation(
            "previous solution has no time samples".to_string(),
        )),
    }
}
