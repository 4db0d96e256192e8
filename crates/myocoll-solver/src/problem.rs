//! Optimal control problem definition
//!
//! Bounds, cost terms, and path constraints posed over a multibody model.
//! Variables the definition does not mention are unbounded.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::model::NodeInput;

/// Closed interval `[lower, upper]`; infinite ends mean unbounded
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Both ends equal to `value`
    pub fn fixed(value: f64) -> Self {
        Self::new(value, value)
    }

    pub fn unbounded() -> Self {
        Self::new(f64::NEG_INFINITY, f64::INFINITY)
    }

    /// At least one end is finite
    pub fn is_set(&self) -> bool {
        self.lower.is_finite() || self.upper.is_finite()
    }

    pub fn is_fixed(&self) -> bool {
        self.lower == self.upper
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Midpoint when both ends are finite, else the finite end, else zero
    pub fn guess_value(&self) -> f64 {
        match (self.lower.is_finite(), self.upper.is_finite()) {
            (true, true) => 0.5 * (self.lower + self.upper),
            (true, false) => self.lower,
            (false, true) => self.upper,
            (false, false) => 0.0,
        }
    }

    /// Distance outside the interval (zero inside)
    pub fn violation(&self, value: f64) -> f64 {
        (self.lower - value).max(value - self.upper).max(0.0)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Bounds for one named variable
///
/// `initial_bounds` and `final_bounds` restrict the first and last node only and
/// fall back to `bounds` when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableInfo {
    pub name: String,
    pub bounds: Bounds,
    pub initial_bounds: Bounds,
    pub final_bounds: Bounds,
}

impl VariableInfo {
    pub fn new(name: impl Into<String>, bounds: Bounds) -> Self {
        Self {
            name: name.into(),
            bounds,
            initial_bounds: Bounds::unbounded(),
            final_bounds: Bounds::unbounded(),
        }
    }

    pub fn with_initial(mut self, initial: Bounds) -> Self {
        self.initial_bounds = initial;
        self
    }

    pub fn with_final(mut self, final_bounds: Bounds) -> Self {
        self.final_bounds = final_bounds;
        self
    }

    /// Bounds effective at the first node
    pub fn at_initial(&self) -> Bounds {
        if self.initial_bounds.is_set() {
            self.initial_bounds
        } else {
            self.bounds
        }
    }

    /// Bounds effective at the last node
    pub fn at_final(&self) -> Bounds {
        if self.final_bounds.is_set() {
            self.final_bounds
        } else {
            self.bounds
        }
    }
}

/// Values available to endpoint cost terms
#[derive(Debug, Clone, Copy)]
pub struct EndpointInput<'a> {
    pub initial_time: f64,
    pub final_time: f64,
    pub initial_states: &'a [f64],
    pub final_states: &'a [f64],
    pub parameters: &'a [f64],
}

/// One term of the objective
///
/// The objective is the time integral of every integrand plus every
/// endpoint value.
pub trait Cost: Debug {
    fn name(&self) -> &str;

    fn integrand(&self, _input: &NodeInput<'_>) -> f64 {
        0.0
    }

    fn endpoint(&self, _input: &EndpointInput<'_>) -> f64 {
        0.0
    }
}

/// `weight * sum(u_i^2)` integrated over the phase
#[derive(Debug, Clone)]
pub struct ControlEffortCost {
    pub weight: f64,
}

impl ControlEffortCost {
    pub fn new(weight: f64) -> Self {
        Self { weight }
    }
}

impl Cost for ControlEffortCost {
    fn name(&self) -> &str {
        "control_effort"
    }

    fn integrand(&self, input: &NodeInput<'_>) -> f64 {
        self.weight * input.controls.iter().map(|u| u * u).sum::<f64>()
    }
}

/// `weight * t_final`
#[derive(Debug, Clone)]
pub struct FinalTimeCost {
    pub weight: f64,
}

impl FinalTimeCost {
    pub fn new(weight: f64) -> Self {
        Self { weight }
    }
}

impl Cost for FinalTimeCost {
    fn name(&self) -> &str {
        "final_time"
    }

    fn endpoint(&self, input: &EndpointInput<'_>) -> f64 {
        self.weight * input.final_time
    }
}

/// Vector-valued constraint enforced at every node
pub trait PathConstraint: Debug {
    fn name(&self) -> &str;

    fn num_outputs(&self) -> usize;

    /// One entry per output
    fn bounds(&self) -> Vec<Bounds>;

    /// Write `num_outputs()` values into `out`
    fn evaluate(&self, input: &NodeInput<'_>, out: &mut [f64]);
}

/// Problem posed over a model: time bounds, variable bounds, objective,
/// and path constraints
#[derive(Debug, Default)]
pub struct ProblemDefinition {
    initial_time: Bounds,
    final_time: Bounds,
    states: Vec<VariableInfo>,
    controls: Vec<VariableInfo>,
    parameters: Vec<VariableInfo>,
    costs: Vec<Box<dyn Cost>>,
    path_constraints: Vec<Box<dyn PathConstraint>>,
}

impl ProblemDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_time_bounds(&mut self, initial: Bounds, final_time: Bounds) {
        self.initial_time = initial;
        self.final_time = final_time;
    }

    /// Set (or replace) the bounds of a state
    pub fn set_state_info(&mut self, info: VariableInfo) {
        upsert(&mut self.states, info);
    }

    /// Set (or replace) the bounds of a control
    pub fn set_control_info(&mut self, info: VariableInfo) {
        upsert(&mut self.controls, info);
    }

    /// Declare a static parameter optimized alongside the trajectory
    pub fn add_parameter(&mut self, name: impl Into<String>, bounds: Bounds) {
        upsert(&mut self.parameters, VariableInfo::new(name, bounds));
    }

    pub fn add_cost(&mut self, cost: impl Cost + 'static) {
        self.costs.push(Box::new(cost));
    }

    pub fn add_path_constraint(&mut self, constraint: impl PathConstraint + 'static) {
        self.path_constraints.push(Box::new(constraint));
    }

    pub fn initial_time_bounds(&self) -> Bounds {
        self.initial_time
    }

    pub fn final_time_bounds(&self) -> Bounds {
        self.final_time
    }

    pub fn state_infos(&self) -> &[VariableInfo] {
        &self.states
    }

    pub fn control_infos(&self) -> &[VariableInfo] {
        &self.controls
    }

    pub fn parameter_infos(&self) -> &[VariableInfo] {
        &self.parameters
    }

    pub fn state_info(&self, name: &str) -> Option<&VariableInfo> {
        self.states.iter().find(|info| info.name == name)
    }

    pub fn control_info(&self, name: &str) -> Option<&VariableInfo> {
        self.controls.iter().find(|info| info.name == name)
    }

    pub fn parameter_names(&self) -> Vec<String> {
        self.parameters.iter().map(|info| info.name.clone()).collect()
    }

    pub fn costs(&self) -> &[Box<dyn Cost>] {
        &self.costs
    }

    pub fn path_constraints(&self) -> &[Box<dyn PathConstraint>] {
        &self.path_constraints
    }
}

fn upsert(infos: &mut Vec<VariableInfo>, info: VariableInfo) {
    match infos.iter_mut().find(|existing| existing.name == info.name) {
        Some(existing) => *existing = info,
        None => infos.push(info),
    }
}
