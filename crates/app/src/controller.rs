//! Regenerating the scene when the user changes parameters or axes.

use std::{sync::Arc, time::Instant};

use attractor_core::{DenseIntegrator, GenerateError, Parameters, ParametersError, generate};
use attractor_render::{Axis, AxisSelection, Projection, TrailImage};
use rand::{SeedableRng, rngs::StdRng};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    AppConfig, ConfigError,
    cursor::random_index,
    integrator::Integrator,
    scene::{Scene, SceneHandle},
};

/// A request to replace the active parameters and axis selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconfigureRequest {
    pub parameters: Parameters,
    pub axes: AxisSelection,
}

impl ReconfigureRequest {
    #[must_use]
    pub fn new(parameters: Parameters, axes: AxisSelection) -> Self {
        Self { parameters, axes }
    }

    /// Builds a request from raw axis indices, as supplied by a UI.
    ///
    /// # Errors
    ///
    /// Returns [`ReconfigureError::InvalidAxisSelection`] if either index is
    /// not 0, 1, or 2.
    pub fn from_indices(
        parameters: Parameters,
        horizontal: usize,
        vertical: usize,
    ) -> Result<Self, ReconfigureError> {
        let axis = |index| {
            Axis::from_index(index).map_err(|_| ReconfigureError::InvalidAxisSelection(index))
        };
        Ok(Self::new(
            parameters,
            AxisSelection::new(axis(horizontal)?, axis(vertical)?),
        ))
    }
}

/// Errors returned by [`Controller::reconfigure`].
///
/// On any error the previously published scene stays active.
#[derive(Debug, Error)]
pub enum ReconfigureError {
    #[error("axis index {0} is not one of x (0), y (1), z (2)")]
    InvalidAxisSelection(usize),

    #[error("invalid parameters: {0}")]
    InvalidParameters(#[from] ParametersError),

    #[error("trajectory generation failed: {0}")]
    Generate(#[source] GenerateError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Summary of a successful reconfiguration.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconfigured {
    pub generation: u64,
    pub samples: usize,

    /// Set when the trajectory was truncated and the partial one published.
    pub warning: Option<String>,
}

/// Owns the active configuration and publishes a new [`Scene`] per request.
///
/// Requests run synchronously and `&mut self` serializes them, so a second
/// request starts only after the first has published its scene.
#[derive(Debug)]
pub struct Controller<I = Integrator> {
    config: AppConfig,
    integrator: I,
    rng: StdRng,
    scenes: SceneHandle,
    generation: u64,
}

impl Controller<Integrator> {
    /// Validates `config` and generates the startup scene.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the startup
    /// trajectory cannot be generated at all.
    pub fn new(config: AppConfig) -> Result<Self, ReconfigureError> {
        config.validate()?;
        let integrator = config.integrator()?;
        Self::with_integrator(config, integrator)
    }
}

impl<I: DenseIntegrator<3>> Controller<I> {
    /// Generates the startup scene with a caller-supplied integrator.
    ///
    /// # Errors
    ///
    /// Returns an error if the startup trajectory cannot be generated at all.
    pub fn with_integrator(config: AppConfig, integrator: I) -> Result<Self, ReconfigureError> {
        let mut rng = match config.playback.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let request = ReconfigureRequest::new(config.parameters, config.axes);
        let (scene, _) = build_scene(&config, &integrator, &mut rng, request, 0)?;

        Ok(Self {
            config,
            integrator,
            rng,
            scenes: SceneHandle::new(scene),
            generation: 0,
        })
    }

    /// Returns the configuration the current scene was built from.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn integrator(&self) -> &I {
        &self.integrator
    }

    /// Returns the current scene.
    #[must_use]
    pub fn scene(&self) -> Arc<Scene> {
        self.scenes.current()
    }

    /// Returns a handle that always reads the latest published scene.
    #[must_use]
    pub fn scenes(&self) -> SceneHandle {
        self.scenes.clone()
    }

    /// Applies new parameters and axes.
    ///
    /// The trajectory is always regenerated, even when nothing changed. A
    /// diverging trajectory is truncated and published with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the current scene active, if the parameters
    /// are not finite or generation fails for a reason other than divergence.
    pub fn reconfigure(
        &mut self,
        request: ReconfigureRequest,
    ) -> Result<Reconfigured, ReconfigureError> {
        if let Err(err) = request.parameters.validate() {
            error!(%err, "rejected reconfiguration");
            return Err(err.into());
        }

        let generation = self.generation + 1;
        let (scene, outcome) =
            match build_scene(&self.config, &self.integrator, &mut self.rng, request, generation) {
                Ok(built) => built,
                Err(err) => {
                    error!(%err, "rejected reconfiguration");
                    return Err(err);
                }
            };

        self.scenes.publish(scene);
        self.generation = generation;
        self.config.parameters = request.parameters;
        self.config.axes = request.axes;
        Ok(outcome)
    }
}

/// Generates the trajectory and trail image for `request`.
fn build_scene<I: DenseIntegrator<3>>(
    config: &AppConfig,
    integrator: &I,
    rng: &mut StdRng,
    request: ReconfigureRequest,
    generation: u64,
) -> Result<(Scene, Reconfigured), ReconfigureError> {
    let started = Instant::now();

    let (trajectory, warning) = match generate(integrator, request.parameters, &config.settings()) {
        Ok(trajectory) => (trajectory, None),
        Err(GenerateError::Diverged { time, partial }) => {
            let warning = format!(
                "trajectory diverged at t = {time:.3}, showing the first {} samples",
                partial.len()
            );
            (partial, Some(warning))
        }
        Err(GenerateError::Stalled { time, partial }) => {
            let warning = format!(
                "integration stalled at t = {time:.3}, showing the first {} samples",
                partial.len()
            );
            (partial, Some(warning))
        }
        Err(err) => return Err(ReconfigureError::Generate(err)),
    };
    if let Some(warning) = &warning {
        warn!(generation, "{warning}");
    }

    let projection = Projection::new(request.axes, config.surface);
    let trail = TrailImage::render(&trajectory, projection, &config.style);
    let start_index = random_index(rng, trajectory.len());
    let samples = trajectory.len();

    info!(
        generation,
        samples,
        axes = %request.axes,
        start_index,
        elapsed_ms = started.elapsed().as_millis(),
        "published scene"
    );

    let scene = Scene::new(
        request.parameters,
        request.axes,
        Arc::new(trajectory),
        trail,
        generation,
        start_index,
        warning.clone(),
    );
    Ok((
        scene,
        Reconfigured {
            generation,
            samples,
            warning,
        },
    ))
}
