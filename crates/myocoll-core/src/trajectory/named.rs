//! Named, time-major trajectory
//!
//! The toolkit-side representation: time as a column of samples, and five
//! blocks whose rows are time samples and whose columns are the variables
//! named by [`TrajectoryNames`]. Parameters are a single row.
//!
//! A block with zero variables is still a shape-consistent
//! `num_times x 0` matrix, never a `0 x num_times` one.

use nalgebra::{DMatrix, DVector, RowDVector};
use serde::{Deserialize, Serialize};

use super::names::{index_of, Block, TrajectoryNames};
use crate::error::{TrajectoryError, TrajectoryResult};

/// Unvalidated components of a [`NamedTrajectory`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryParts {
    pub time: DVector<f64>,
    pub names: TrajectoryNames,
    /// num_times x num_states
    pub states: DMatrix<f64>,
    /// num_times x num_controls
    pub controls: DMatrix<f64>,
    /// num_times x num_multipliers
    pub multipliers: DMatrix<f64>,
    /// num_times x num_derivatives
    pub derivatives: DMatrix<f64>,
    pub parameters: RowDVector<f64>,
}

impl TrajectoryParts {
    /// Zero-filled blocks consistent with `time` and `names`
    pub fn zeros(time: DVector<f64>, names: TrajectoryNames) -> Self {
        let n = time.len();
        Self {
            states: DMatrix::zeros(n, names.states.len()),
            controls: DMatrix::zeros(n, names.controls.len()),
            multipliers: DMatrix::zeros(n, names.multipliers.len()),
            derivatives: DMatrix::zeros(n, names.derivatives.len()),
            parameters: RowDVector::zeros(names.parameters.len()),
            time,
            names,
        }
    }
}

/// Time-major trajectory with named state, control, multiplier,
/// derivative, and parameter blocks.
///
/// Used both as a solver result and as a warm-start guess.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TrajectoryParts", into = "TrajectoryParts")]
pub struct NamedTrajectory {
    time: DVector<f64>,
    names: TrajectoryNames,
    states: DMatrix<f64>,
    controls: DMatrix<f64>,
    multipliers: DMatrix<f64>,
    derivatives: DMatrix<f64>,
    parameters: RowDVector<f64>,
}

impl NamedTrajectory {
    /// Trajectory with no time samples and no variables
    pub fn empty() -> Self {
        Self {
            time: DVector::zeros(0),
            names: TrajectoryNames::default(),
            states: DMatrix::zeros(0, 0),
            controls: DMatrix::zeros(0, 0),
            multipliers: DMatrix::zeros(0, 0),
            derivatives: DMatrix::zeros(0, 0),
            parameters: RowDVector::zeros(0),
        }
    }

    /// Validate names and block shapes, then take ownership of the parts
    pub fn from_parts(parts: TrajectoryParts) -> TrajectoryResult<Self> {
        parts.names.validate()?;

        let n = parts.time.len();
        let names = &parts.names;
        check_shape(Block::States, &parts.states, n, names.states.len())?;
        check_shape(Block::Controls, &parts.controls, n, names.controls.len())?;
        check_shape(Block::Multipliers, &parts.multipliers, n, names.multipliers.len())?;
        check_shape(Block::Derivatives, &parts.derivatives, n, names.derivatives.len())?;
        if parts.parameters.len() != names.parameters.len() {
            return Err(TrajectoryError::ShapeMismatch {
                block: Block::Parameters,
                expected: (1, names.parameters.len()),
                actual: (1, parts.parameters.len()),
            });
        }

        Ok(Self {
            time: parts.time,
            names: parts.names,
            states: parts.states,
            controls: parts.controls,
            multipliers: parts.multipliers,
            derivatives: parts.derivatives,
            parameters: parts.parameters,
        })
    }

    /// Zero-valued trajectory over `time` with the given variables
    pub fn zeros(time: DVector<f64>, names: TrajectoryNames) -> TrajectoryResult<Self> {
        Self::from_parts(TrajectoryParts::zeros(time, names))
    }

    pub fn into_parts(self) -> TrajectoryParts {
        TrajectoryParts {
            time: self.time,
            names: self.names,
            states: self.states,
            controls: self.controls,
            multipliers: self.multipliers,
            derivatives: self.derivatives,
            parameters: self.parameters,
        }
    }

    /// True when there are no time samples and no variables
    pub fn is_empty(&self) -> bool {
        self.time.is_empty() && self.names.is_empty()
    }

    pub fn num_times(&self) -> usize {
        self.time.len()
    }

    pub fn initial_time(&self) -> Option<f64> {
        self.time.iter().next().copied()
    }

    pub fn final_time(&self) -> Option<f64> {
        self.time.iter().last().copied()
    }

    pub fn time(&self) -> &DVector<f64> {
        &self.time
    }

    pub fn names(&self) -> &TrajectoryNames {
        &self.names
    }

    pub fn state_names(&self) -> &[String] {
        &self.names.states
    }

    pub fn control_names(&self) -> &[String] {
        &self.names.controls
    }

    pub fn multiplier_names(&self) -> &[String] {
        &self.names.multipliers
    }

    pub fn derivative_names(&self) -> &[String] {
        &self.names.derivatives
    }

    pub fn parameter_names(&self) -> &[String] {
        &self.names.parameters
    }

    pub fn states(&self) -> &DMatrix<f64> {
        &self.states
    }

    pub fn controls(&self) -> &DMatrix<f64> {
        &self.controls
    }

    pub fn multipliers(&self) -> &DMatrix<f64> {
        &self.multipliers
    }

    pub fn derivatives(&self) -> &DMatrix<f64> {
        &self.derivatives
    }

    pub fn parameters(&self) -> &RowDVector<f64> {
        &self.parameters
    }

    /// Time history of one state
    pub fn state(&self, name: &str) -> Option<DVector<f64>> {
        column(&self.states, &self.names.states, name)
    }

    /// Time history of one control
    pub fn control(&self, name: &str) -> Option<DVector<f64>> {
        column(&self.controls, &self.names.controls, name)
    }

    pub fn multiplier(&self, name: &str) -> Option<DVector<f64>> {
        column(&self.multipliers, &self.names.multipliers, name)
    }

    pub fn derivative(&self, name: &str) -> Option<DVector<f64>> {
        column(&self.derivatives, &self.names.derivatives, name)
    }

    pub fn parameter(&self, name: &str) -> Option<f64> {
        index_of(&self.names.parameters, name).map(|j| self.parameters[j])
    }

    /// Overwrite the time history of one state
    pub fn set_state(&mut self, name: &str, values: &[f64]) -> TrajectoryResult<()> {
        set_column(&mut self.states, &self.names.states, Block::States, name, values)
    }

    /// Overwrite the time history of one control
    pub fn set_control(&mut self, name: &str, values: &[f64]) -> TrajectoryResult<()> {
        set_column(&mut self.controls, &self.names.controls, Block::Controls, name, values)
    }

    pub fn set_multiplier(&mut self, name: &str, values: &[f64]) -> TrajectoryResult<()> {
        set_column(
            &mut self.multipliers,
            &self.names.multipliers,
            Block::Multipliers,
            name,
            values,
        )
    }

    pub fn set_derivative(&mut self, name: &str, values: &[f64]) -> TrajectoryResult<()> {
        set_column(
            &mut self.derivatives,
            &self.names.derivatives,
            Block::Derivatives,
            name,
            values,
        )
    }

    pub fn set_parameter(&mut self, name: &str, value: f64) -> TrajectoryResult<()> {
        let j = index_of(&self.names.parameters, name).ok_or_else(|| {
            TrajectoryError::UnknownVariable {
                block: Block::Parameters,
                name: name.to_string(),
            }
        })?;
        self.parameters[j] = value;
        Ok(())
    }

    /// Same names and shapes, with every value within `tolerance`
    pub fn is_numerically_equal(&self, other: &Self, tolerance: f64) -> bool {
        self.names == other.names
            && self.time.shape() == other.time.shape()
            && self.states.shape() == other.states.shape()
            && self.controls.shape() == other.controls.shape()
            && self.multipliers.shape() == other.multipliers.shape()
            && self.derivatives.shape() == other.derivatives.shape()
            && self.parameters.shape() == other.parameters.shape()
            && within(self.time.as_slice(), other.time.as_slice(), tolerance)
            && within(self.states.as_slice(), other.states.as_slice(), tolerance)
            && within(self.controls.as_slice(), other.controls.as_slice(), tolerance)
            && within(self.multipliers.as_slice(), other.multipliers.as_slice(), tolerance)
            && within(self.derivatives.as_slice(), other.derivatives.as_slice(), tolerance)
            && within(self.parameters.as_slice(), other.parameters.as_slice(), tolerance)
    }
}

impl Default for NamedTrajectory {
    fn default() -> Self {
        Self::empty()
    }
}

impl TryFrom<TrajectoryParts> for NamedTrajectory {
    type Error = TrajectoryError;

    fn try_from(parts: TrajectoryParts) -> TrajectoryResult<Self> {
        Self::from_parts(parts)
    }
}

impl From<NamedTrajectory> for TrajectoryParts {
    fn from(trajectory: NamedTrajectory) -> Self {
        trajectory.into_parts()
    }
}

/// Fail unless `matrix` is exactly `rows x cols`
pub(crate) fn check_shape(
    block: Block,
    matrix: &DMatrix<f64>,
    rows: usize,
    cols: usize,
) -> TrajectoryResult<()> {
    if matrix.shape() != (rows, cols) {
        return Err(TrajectoryError::ShapeMismatch {
            block,
            expected: (rows, cols),
            actual: matrix.shape(),
        });
    }
    Ok(())
}

fn column(matrix: &DMatrix<f64>, names: &[String], name: &str) -> Option<DVector<f64>> {
    index_of(names, name).map(|j| matrix.column(j).into_owned())
}

fn set_column(
    matrix: &mut DMatrix<f64>,
    names: &[String],
    block: Block,
    name: &str,
    values: &[f64],
) -> TrajectoryResult<()> {
    let j = index_of(names, name).ok_or_else(|| TrajectoryError::UnknownVariable {
        block,
        name: name.to_string(),
    })?;
    if values.len() != matrix.nrows() {
        return Err(TrajectoryError::ShapeMismatch {
            block,
            expected: (matrix.nrows(), 1),
            actual: (values.len(), 1),
        });
    }
    matrix.column_mut(j).copy_from_slice(values);
    Ok(())
}

fn within(a: &[f64], b: &[f64], tolerance: f64) -> bool {
    a.iter().zip(b).all(|(x, y)| (x - y).abs() <= tolerance)
}
