//! Variable name lists
//!
//! Each block's name list fixes the identity and order of its columns
//! (toolkit layout) or rows (solver layout). Both layouts must agree on
//! these lists exactly.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{TrajectoryError, TrajectoryResult};

/// Identifies one block of a trajectory in error reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Block {
    Time,
    States,
    Controls,
    Multipliers,
    Derivatives,
    /// Solver-side concatenation of multipliers and derivatives
    Adjuncts,
    Parameters,
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Block::Time => "time",
            Block::States => "states",
            Block::Controls => "controls",
            Block::Multipliers => "multipliers",
            Block::Derivatives => "derivatives",
            Block::Adjuncts => "adjuncts",
            Block::Parameters => "parameters",
        };
        f.write_str(name)
    }
}

/// The five ordered name lists of a toolkit trajectory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrajectoryNames {
    pub states: Vec<String>,
    pub controls: Vec<String>,
    /// Lagrange multipliers, one per kinematic constraint equation
    pub multipliers: Vec<String>,
    /// Auxiliary derivative variables (e.g. implicit accelerations)
    pub derivatives: Vec<String>,
    pub parameters: Vec<String>,
}

impl TrajectoryNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_states<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_controls<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.controls = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_multipliers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.multipliers = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_derivatives<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.derivatives = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_parameters<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = names.into_iter().map(Into::into).collect();
        self
    }

    /// True when every block has zero variables
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
            && self.controls.is_empty()
            && self.multipliers.is_empty()
            && self.derivatives.is_empty()
            && self.parameters.is_empty()
    }

    /// Multiplier names followed by derivative names
    pub fn adjunct_names(&self) -> Vec<String> {
        self.multipliers
            .iter()
            .chain(self.derivatives.iter())
            .cloned()
            .collect()
    }

    pub fn num_adjuncts(&self) -> usize {
        self.multipliers.len() + self.derivatives.len()
    }

    /// Check that names are unique within each block
    pub fn validate(&self) -> TrajectoryResult<()> {
        check_unique(Block::States, &self.states)?;
        check_unique(Block::Controls, &self.controls)?;
        check_unique(Block::Multipliers, &self.multipliers)?;
        check_unique(Block::Derivatives, &self.derivatives)?;
        check_unique(Block::Parameters, &self.parameters)
    }
}

/// Split a combined adjunct name list into (multipliers, derivatives).
///
/// The first `num_multipliers` names are multipliers, the remainder are
/// derivatives. A multiplier count larger than the list means the caller
/// paired names and counts from different models.
pub fn split_adjunct_names(
    adjunct_names: &[String],
    num_multipliers: usize,
) -> TrajectoryResult<(Vec<String>, Vec<String>)> {
    if num_multipliers > adjunct_names.len() {
        return Err(TrajectoryError::InvariantViolation(format!(
            "{} multipliers requested but only {} adjunct names available",
            num_multipliers,
            adjunct_names.len()
        )));
    }
    let (multipliers, derivatives) = adjunct_names.split_at(num_multipliers);
    Ok((multipliers.to_vec(), derivatives.to_vec()))
}

/// Position of `name` within `names`
pub(crate) fn index_of(names: &[String], name: &str) -> Option<usize> {
    names.iter().position(|n| n == name)
}

fn check_unique(block: Block, names: &[String]) -> TrajectoryResult<()> {
    let mut seen = HashSet::with_capacity(names.len());
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(TrajectoryError::DuplicateName {
                block,
                name: name.clone(),
            });
        }
    }
    Ok(())
}
