//! The Lorenz system.
//!
//! ```text
//! dx/dt = σ(y - x)
//! dy/dt = x(ρ - z) - y
//! dz/dt = xy - βz
//! ```
//!
//! The classic chaotic regime is `ρ = 28`, `σ = 10`, `β = 8/3`, which is what
//! [`Parameters::default`] returns.

use std::convert::Infallible;

use thiserror::Error;

use crate::VectorField;

/// A point `(x, y, z)` in Lorenz phase space.
pub type State = [f64; 3];

/// The three coefficients of the Lorenz vector field.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Parameters {
    /// ρ, the Rayleigh number analogue.
    pub rho: f64,

    /// σ, the Prandtl number analogue.
    pub sigma: f64,

    /// β, the geometric factor.
    pub beta: f64,
}

/// Error returned when a parameter is not a finite number.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ParametersError {
    #[error("rho must be finite, got {0}")]
    Rho(f64),

    #[error("sigma must be finite, got {0}")]
    Sigma(f64),

    #[error("beta must be finite, got {0}")]
    Beta(f64),
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            rho: 28.0,
            sigma: 10.0,
            beta: 8.0 / 3.0,
        }
    }
}

impl Parameters {
    /// Creates a parameter set.
    #[must_use]
    pub fn new(rho: f64, sigma: f64, beta: f64) -> Self {
        Self { rho, sigma, beta }
    }

    /// Validates that all parameters are finite.
    ///
    /// Finite parameters can still drive a trajectory to overflow; that is
    /// reported by trajectory generation, not here.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first non-finite parameter.
    pub fn validate(&self) -> Result<(), ParametersError> {
        if !self.rho.is_finite() {
            return Err(ParametersError::Rho(self.rho));
        }
        if !self.sigma.is_finite() {
            return Err(ParametersError::Sigma(self.sigma));
        }
        if !self.beta.is_finite() {
            return Err(ParametersError::Beta(self.beta));
        }
        Ok(())
    }
}

/// The Lorenz vector field for a fixed set of [`Parameters`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lorenz {
    parameters: Parameters,
}

impl Lorenz {
    /// Creates the vector field for the given parameters.
    #[must_use]
    pub fn new(parameters: Parameters) -> Self {
        Self { parameters }
    }

    /// Returns the parameters of this field.
    #[must_use]
    pub fn parameters(&self) -> Parameters {
        self.parameters
    }
}

impl VectorField<3> for Lorenz {
    type Error = Infallible;

    fn derivative(&self, _t: f64, y: &State) -> Result<State, Self::Error> {
        let Parameters { rho, sigma, beta } = self.parameters;
        let [x, y, z] = *y;

        Ok([sigma * (y - x), x * (rho - z) - y, x * y - beta * z])
    }
}
