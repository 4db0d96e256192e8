//! Trajectory resampling
//!
//! Piecewise-linear interpolation of every block onto a new time grid,
//! used to carry a previous solution over to a different mesh when
//! warm-starting. Samples outside the source time span are clamped to the
//! first/last sample.

use nalgebra::{DMatrix, DVector};

use super::named::{NamedTrajectory, TrajectoryParts};
use crate::error::{TrajectoryError, TrajectoryResult};

/// Interpolation bracket for one target time
#[derive(Debug, Clone, Copy)]
struct Bracket {
    lower: usize,
    upper: usize,
    alpha: f64,
}

impl NamedTrajectory {
    /// Resample onto `new_time` (strictly increasing)
    ///
    /// Parameters are copied unchanged.
    pub fn resample(&self, new_time: &DVector<f64>) -> TrajectoryResult<NamedTrajectory> {
        if self.num_times() == 0 {
            return Err(TrajectoryError::InvariantViolation(
                "cannot resample a trajectory without time samples".to_string(),
            ));
        }
        check_increasing(self.time())?;
        check_increasing(new_time)?;

        let brackets: Vec<Bracket> = new_time
            .iter()
            .map(|&t| bracket(self.time().as_slice(), t))
            .collect();

        NamedTrajectory::from_parts(TrajectoryParts {
            time: new_time.clone(),
            names: self.names().clone(),
            states: interpolate_block(self.states(), &brackets),
            controls: interpolate_block(self.controls(), &brackets),
            multipliers: interpolate_block(self.multipliers(), &brackets),
            derivatives: interpolate_block(self.derivatives(), &brackets),
            parameters: self.parameters().clone(),
        })
    }
}

/// Evenly spaced time grid over `[initial, final]` with `num_times` samples
pub fn linspace(initial: f64, final_time: f64, num_times: usize) -> DVector<f64> {
    match num_times {
        0 => DVector::zeros(0),
        1 => DVector::from_element(1, initial),
        n => {
            let step = (final_time - initial) / (n - 1) as f64;
            DVector::from_fn(n, |i, _| {
                if i == n - 1 {
                    final_time
                } else {
                    initial + i as f64 * step
                }
            })
        }
    }
}

/// Every sample finite and strictly greater than the one before
fn check_increasing(time: &DVector<f64>) -> TrajectoryResult<()> {
    for (i, &t) in time.iter().enumerate() {
        let increasing = i == 0 || t > time[i - 1];
        if !t.is_finite() || !increasing {
            return Err(TrajectoryError::NonIncreasingTime { index: i });
        }
    }
    Ok(())
}

fn bracket(time: &[f64], t: f64) -> Bracket {
    let last = time.len() - 1;
    if t <= time[0] {
        return Bracket { lower: 0, upper: 0, alpha: 0.0 };
    }
    if t >= time[last] {
        return Bracket { lower: last, upper: last, alpha: 0.0 };
    }

    // Both grids are finite and increasing, and t is strictly inside the
    // span, so the first index with time > t is in 1..=last
    let upper = time.partition_point(|&s| s <= t);
    let lower = upper - 1;
    let alpha = (t - time[lower]) / (time[upper] - time[lower]);
    Bracket { lower, upper, alpha }
}

fn interpolate_block(block: &DMatrix<f64>, brackets: &[Bracket]) -> DMatrix<f64> {
    let num_vars = block.ncols();
    if num_vars == 0 {
        return DMatrix::zeros(brackets.len(), 0);
    }
    DMatrix::from_fn(brackets.len(), num_vars, |i, j| {
        let b = brackets[i];
        let start = block[(b.lower, j)];
        let end = block[(b.upper, j)];
        start + b.alpha * (end - start)
    })
}
