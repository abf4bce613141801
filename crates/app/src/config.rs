//! Viewer configuration loaded from TOML.
//!
//! Every section and field is optional; missing values take the defaults that
//! reproduce the classic Lorenz picture.
//!
//! ```toml
//! [parameters]
//! rho = 28.0
//! sigma = 10.0
//! beta = 2.6666666666666665
//!
//! [axes]
//! horizontal = "x"
//! vertical = "z"
//!
//! [integration]
//! max_t = 100.0
//! dt = 0.01
//! method = "dopri5"
//!
//! [playback]
//! seed = 7
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use attractor_core::{Parameters, ParametersError, Settings, SettingsError};
use attractor_render::{AxisSelection, Extent, Style, StyleError};
use attractor_solvers::transient::{dopri5, rk4::Rk4};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::integrator::{Integrator, Method};

/// Top-level viewer configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub parameters: Parameters,
    pub axes: AxisSelection,
    pub integration: IntegrationConfig,
    pub surface: Extent,
    pub style: Style,
    pub playback: PlaybackConfig,
}

/// Horizon, output step, and integrator selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationConfig {
    pub max_t: f64,
    pub dt: f64,
    pub method: Method,

    /// Relative tolerance, used by adaptive methods only.
    pub rel_tol: f64,

    /// Absolute tolerance, used by adaptive methods only.
    pub abs_tol: f64,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        let solver = dopri5::Config::default();
        let settings = Settings::default();
        Self {
            max_t: settings.max_t,
            dt: settings.dt,
            method: Method::default(),
            rel_tol: solver.rel_tol(),
            abs_tol: solver.abs_tol(),
        }
    }
}

/// Animation pacing and cursor randomness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Seed for the cursor start index; drawn from entropy if absent.
    pub seed: Option<u64>,

    /// Target delay between frames.
    pub frame_interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            seed: None,
            frame_interval_ms: 16,
        }
    }
}

/// Errors that can occur when loading or validating an [`AppConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Parameters(#[from] ParametersError),

    #[error("invalid integration settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("invalid solver settings: {0}")]
    Solver(#[from] dopri5::ConfigError),

    #[error("invalid style: {0}")]
    Style(#[from] StyleError),

    #[error("surface must have a non-zero size, got {0:?}")]
    EmptySurface(Extent),

    #[error("surface sides must be at most {max} pixels, got {0:?}", max = Extent::MAX_SIDE)]
    SurfaceTooLarge(Extent),
}

impl AppConfig {
    /// Reads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML for this
    /// schema, or holds invalid values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not parse or holds invalid values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every section for values that would fail later.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.parameters.validate()?;
        self.settings().grid()?;
        self.integrator()?;
        self.style.validate()?;
        if self.surface.is_empty() {
            return Err(ConfigError::EmptySurface(self.surface));
        }
        if !self.surface.is_within_limits() {
            return Err(ConfigError::SurfaceTooLarge(self.surface));
        }
        Ok(())
    }

    /// Returns the generation settings for the configured horizon.
    #[must_use]
    pub fn settings(&self) -> Settings {
        Settings::with_horizon(self.integration.max_t, self.integration.dt)
    }

    /// Builds the configured integrator.
    ///
    /// # Errors
    ///
    /// Returns an error if the adaptive solver settings are invalid.
    pub fn integrator(&self) -> Result<Integrator, ConfigError> {
        let integration = &self.integration;
        Ok(match integration.method {
            Method::Dopri5 => Integrator::Dopri5(dopri5::Dopri5::new(dopri5::Config::new(
                integration.rel_tol,
                integration.abs_tol,
            )?)),
            Method::Rk4 => Integrator::Rk4(Rk4),
        })
    }
}
