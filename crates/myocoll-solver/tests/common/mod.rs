//! Shared fixtures: small models and a scripted back end

#![allow(dead_code)]

use nalgebra::DVector;

use myocoll_solver::{
    CollocationBackend, CollocationProblem, ModelError, ModelOutput, MultibodyModel,
    NativeIterate, NativeSolution, NodeInput, SolverConfig, SolverError,
    TrapezoidalTranscription,
};

pub const GRAVITY: f64 = 9.81;

fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Bead sliding without friction along a wire, steered by the wire angle
///
/// xdot = v cos(w), ydot = v sin(w), vdot = g sin(w)
#[derive(Debug, Clone, Default)]
pub struct Brachistochrone;

impl MultibodyModel for Brachistochrone {
    fn state_names(&self) -> Vec<String> {
        strings(&["x", "y", "v"])
    }

    fn control_names(&self) -> Vec<String> {
        strings(&["w"])
    }

    fn evaluate(&self, input: &NodeInput<'_>) -> Result<ModelOutput, ModelError> {
        let v = input.states[2];
        let w = input.controls[0];
        Ok(ModelOutput {
            state_derivatives: DVector::from_vec(vec![
                v * w.cos(),
                v * w.sin(),
                GRAVITY * w.sin(),
            ]),
            residuals: DVector::zeros(0),
        })
    }
}

/// Unit point mass in the plane, constrained to the line y = 0
///
/// States (x, y, vx, vy), controls (fx, fy), one multiplier `lambda`
/// acting along y. Velocity-level residual: vy = 0.
#[derive(Debug, Clone, Default)]
pub struct PlanarPointMass;

impl MultibodyModel for PlanarPointMass {
    fn state_names(&self) -> Vec<String> {
        strings(&["x", "y", "vx", "vy"])
    }

    fn control_names(&self) -> Vec<String> {
        strings(&["fx", "fy"])
    }

    fn multiplier_names(&self) -> Vec<String> {
        strings(&["lambda"])
    }

    fn evaluate(&self, input: &NodeInput<'_>) -> Result<ModelOutput, ModelError> {
        let s = input.states;
        let u = input.controls;
        let lambda = input.multipliers[0];
        Ok(ModelOutput {
            state_derivatives: DVector::from_vec(vec![s[2], s[3], u[0], u[1] - GRAVITY + lambda]),
            residuals: DVector::from_vec(vec![s[3]]),
        })
    }
}

/// Integrator that reports a singular configuration from `fail_after` on
#[derive(Debug, Clone)]
pub struct FailingModel {
    pub fail_after: f64,
}

impl MultibodyModel for FailingModel {
    fn state_names(&self) -> Vec<String> {
        strings(&["q"])
    }

    fn control_names(&self) -> Vec<String> {
        strings(&["tau"])
    }

    fn evaluate(&self, input: &NodeInput<'_>) -> Result<ModelOutput, ModelError> {
        if input.time >= self.fail_after {
            return Err(ModelError::SingularConfiguration(
                "mass matrix not invertible".to_string(),
            ));
        }
        Ok(ModelOutput {
            state_derivatives: DVector::from_vec(vec![input.controls[0]]),
            residuals: DVector::zeros(0),
        })
    }
}

/// Model whose output has the wrong number of state derivatives
#[derive(Debug, Clone, Default)]
pub struct MisreportingModel;

impl MultibodyModel for MisreportingModel {
    fn state_names(&self) -> Vec<String> {
        strings(&["q", "u"])
    }

    fn control_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn evaluate(&self, _input: &NodeInput<'_>) -> Result<ModelOutput, ModelError> {
        Ok(ModelOutput {
            state_derivatives: DVector::zeros(1),
            residuals: DVector::zeros(0),
        })
    }
}

/// Back end that evaluates the guess once and returns it unchanged
///
/// Records every guess it receives. The reported objective comes from the
/// trapezoidal transcription of the guess.
#[derive(Debug, Clone)]
pub struct ScriptedBackend {
    pub guesses: Vec<NativeIterate>,
    pub success: bool,
    pub status: String,
    /// Offset added to every state value before returning
    pub state_shift: f64,
    /// Overwrites the first time sample of the returned iterate
    pub initial_time: Option<f64>,
    /// Renames the state at this index in the returned iterate
    pub rename_state: Option<(usize, String)>,
}

impl ScriptedBackend {
    pub fn converging() -> Self {
        Self {
            guesses: Vec::new(),
            success: true,
            status: "Solve_Succeeded".to_string(),
            state_shift: 0.0,
            initial_time: None,
            rename_state: None,
        }
    }

    pub fn failing() -> Self {
        Self {
            success: false,
            status: "Maximum_Iterations_Exceeded".to_string(),
            ..Self::converging()
        }
    }
}

impl CollocationBackend for ScriptedBackend {
    fn solve(
        &mut self,
        problem: &dyn CollocationProblem,
        guess: NativeIterate,
        config: &SolverConfig,
    ) -> Result<NativeSolution, SolverError> {
        self.guesses.push(guess.clone());
        let evaluation = TrapezoidalTranscription::new().evaluate(problem, &guess)?;

        let mut iterate = guess;
        iterate.states.add_scalar_mut(self.state_shift);
        if let Some(t0) = self.initial_time {
            iterate.time[0] = t0;
        }
        if let Some((index, name)) = &self.rename_state {
            iterate.state_names[*index] = name.clone();
        }

        Ok(NativeSolution {
            iterate,
            success: self.success,
            status: self.status.clone(),
            objective: evaluation.objective,
            num_iterations: config.max_iterations.unwrap_or(1),
            solve_time_ms: 0.5,
        })
    }
}
