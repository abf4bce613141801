use thiserror::Error;

/// Configuration for the Dormand–Prince integrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    rel_tol: f64,
    abs_tol: f64,
}

/// Errors that can occur when validating a Dormand–Prince config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("rel_tol must be finite and positive")]
    RelTol,

    #[error("abs_tol must be finite and positive")]
    AbsTol,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rel_tol: 1e-6,
            abs_tol: 1e-9,
        }
    }
}

impl Config {
    /// Creates a new config with validated tolerances.
    ///
    /// # Errors
    ///
    /// Returns an error if either tolerance is not finite and positive.
    pub fn new(rel_tol: f64, abs_tol: f64) -> Result<Self, ConfigError> {
        if !rel_tol.is_finite() || rel_tol <= 0.0 {
            return Err(ConfigError::RelTol);
        }
        if !abs_tol.is_finite() || abs_tol <= 0.0 {
            return Err(ConfigError::AbsTol);
        }

        Ok(Self { rel_tol, abs_tol })
    }

    /// Returns the relative error tolerance per step.
    #[must_use]
    pub fn rel_tol(&self) -> f64 {
        self.rel_tol
    }

    /// Returns the absolute error tolerance per step.
    #[must_use]
    pub fn abs_tol(&self) -> f64 {
        self.abs_tol
    }
}
