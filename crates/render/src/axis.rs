use std::{fmt, str::FromStr};

use attractor_core::State;
use thiserror::Error;

/// One of the three Lorenz state components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Errors that can occur when naming an [`Axis`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AxisError {
    #[error("axis index must be 0, 1, or 2, got {0}")]
    Index(usize),

    #[error("unknown axis {0:?}, expected x, y, or z")]
    Name(String),
}

impl Axis {
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Returns the state component index of this axis.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Returns the axis for a state component index.
    ///
    /// # Errors
    ///
    /// Returns [`AxisError::Index`] if `index` is not 0, 1, or 2.
    pub fn from_index(index: usize) -> Result<Self, AxisError> {
        Self::ALL.get(index).copied().ok_or(AxisError::Index(index))
    }

    /// Returns this axis's component of `state`.
    #[must_use]
    pub fn component(self, state: &State) -> f64 {
        state[self.index()]
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Axis {
    type Err = AxisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Self::X),
            "y" => Ok(Self::Y),
            "z" => Ok(Self::Z),
            _ => Err(AxisError::Name(s.to_owned())),
        }
    }
}

/// Which state components map to the screen's horizontal and vertical axes.
///
/// Selecting the same axis twice is allowed and projects every state onto a
/// single screen line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AxisSelection {
    pub horizontal: Axis,
    pub vertical: Axis,
}

impl Default for AxisSelection {
    fn default() -> Self {
        Self {
            horizontal: Axis::X,
            vertical: Axis::Z,
        }
    }
}

impl AxisSelection {
    #[must_use]
    pub fn new(horizontal: Axis, vertical: Axis) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Builds a selection from raw component indices.
    ///
    /// # Errors
    ///
    /// Returns [`AxisError::Index`] naming the first index outside `0..3`.
    pub fn from_indices(horizontal: usize, vertical: usize) -> Result<Self, AxisError> {
        Ok(Self::new(
            Axis::from_index(horizontal)?,
            Axis::from_index(vertical)?,
        ))
    }

    /// Returns `true` if both screen axes show the same component.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.horizontal == self.vertical
    }
}

impl fmt::Display for AxisSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.horizontal, self.vertical)
    }
}
