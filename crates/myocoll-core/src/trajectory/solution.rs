//! Solver result in toolkit form

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use super::named::NamedTrajectory;

/// Statistics reported by the NLP back end
///
/// Passed through untouched; this crate never interprets them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolveStatistics {
    /// Objective value at termination
    pub objective: f64,
    /// Number of NLP iterations
    pub num_iterations: usize,
    /// Wall-clock solve time [ms]
    pub solve_time_ms: f64,
}

/// A named trajectory together with the solver's termination report
///
/// Dereferences to its [`NamedTrajectory`] for read access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    trajectory: NamedTrajectory,
    success: bool,
    status: String,
    statistics: SolveStatistics,
}

impl Solution {
    pub fn new(
        trajectory: NamedTrajectory,
        success: bool,
        status: impl Into<String>,
        statistics: SolveStatistics,
    ) -> Self {
        Self {
            trajectory,
            success,
            status: status.into(),
            statistics,
        }
    }

    /// Whether the back end reported convergence
    pub fn success(&self) -> bool {
        self.success
    }

    /// Back-end status string, verbatim
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn statistics(&self) -> &SolveStatistics {
        &self.statistics
    }

    pub fn objective(&self) -> f64 {
        self.statistics.objective
    }

    pub fn num_iterations(&self) -> usize {
        self.statistics.num_iterations
    }

    pub fn trajectory(&self) -> &NamedTrajectory {
        &self.trajectory
    }

    pub fn into_trajectory(self) -> NamedTrajectory {
        self.trajectory
    }
}

impl Deref for Solution {
    type Target = NamedTrajectory;

    fn deref(&self) -> &NamedTrajectory {
        &self.trajectory
    }
}

impl AsRef<NamedTrajectory> for Solution {
    fn as_ref(&self) -> &NamedTrajectory {
        &self.trajectory
    }
}
