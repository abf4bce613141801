//! Adaptive Dormand–Prince 5(4) integrator with dense output.
//!
//! Stepping is done by [`ode_solvers::Dopri5`]. Internal steps are chosen by
//! its embedded error estimate and states are read off the continuous
//! extension every `dt`, so the output spacing is independent of the step
//! sizes the error control picks.
//!
//! # Example
//!
//! ```ignore
//! use attractor_solvers::transient::dopri5;
//!
//! let config = dopri5::Config::default();
//! let solution = dopri5::solve_unobserved(&field, 0.0, y0, 100.0, 0.01, &config)?;
//!
//! for sample in &solution.samples {
//!     println!("t={}: {:?}", sample.t, sample.y);
//! }
//! ```

mod config;

pub use config::{Config, ConfigError};

use ode_solvers::SVector;
use tracing::debug;

use attractor_core::{Action, DenseIntegrator, Event, Observer, Solution, VectorField};

use super::{
    Error,
    sampler::{Run, Stepper, sample_grid},
    system::FieldSystem,
};

/// A [`DenseIntegrator`] backed by [`solve`] with a fixed [`Config`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Dopri5 {
    config: Config,
}

impl Dopri5 {
    /// Creates an integrator with the given configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl<const N: usize> DenseIntegrator<N> for Dopri5 {
    type Error = Error;

    fn integrate<F, Obs>(
        &self,
        field: &F,
        t0: f64,
        y0: [f64; N],
        t1: f64,
        dt: f64,
        observer: Obs,
    ) -> Result<Solution<N>, Self::Error>
    where
        F: VectorField<N>,
        Obs: Observer<Event<N>, Action>,
    {
        let solution = solve(field, t0, y0, t1, dt, &self.config, observer)?;
        debug!(
            status = ?solution.status,
            samples = solution.samples.len(),
            evaluations = solution.stats.evaluations,
            accepted = solution.stats.accepted_steps,
            rejected = solution.stats.rejected_steps,
            "dopri5 finished"
        );
        Ok(solution)
    }
}

impl Stepper for Dopri5 {
    fn run<F, const N: usize>(
        &self,
        system: FieldSystem<'_, F, N>,
        x0: f64,
        y0: SVector<f64, N>,
        x_end: f64,
        step: f64,
    ) -> Run<N>
    where
        F: VectorField<N>,
    {
        let mut stepper = ode_solvers::Dopri5::new(
            system,
            x0,
            x_end,
            step,
            y0,
            self.config.rel_tol(),
            self.config.abs_tol(),
        );
        let result = stepper.integrate();
        Run::new(result, stepper.x_out().clone(), stepper.y_out().clone())
    }
}

/// Integrates `field` from `(t0, y0)` to `t1`, reporting the state every `dt`.
///
/// # Observer
///
/// The observer receives an [`Event`] for each grid sample and may return
/// [`Action::StopEarly`] to end the solution there.
///
/// # Errors
///
/// Returns an error if the grid is invalid or the vector field fails.
/// Divergence, step-size underflow, stiffness, and exhausting the step budget
/// are reported through [`Solution::status`] with the samples produced so far.
pub fn solve<F, Obs, const N: usize>(
    field: &F,
    t0: f64,
    y0: [f64; N],
    t1: f64,
    dt: f64,
    config: &Config,
    observer: Obs,
) -> Result<Solution<N>, Error>
where
    F: VectorField<N>,
    Obs: Observer<Event<N>, Action>,
{
    sample_grid(&Dopri5::new(*config), field, t0, y0, t1, dt, observer)
}

/// Integrates without observation.
///
/// This is a convenience wrapper around [`solve`] that discards events.
///
/// # Errors
///
/// Returns an error if the grid is invalid or the vector field fails.
pub fn solve_unobserved<F, const N: usize>(
    field: &F,
    t0: f64,
    y0: [f64; N],
    t1: f64,
    dt: f64,
    config: &Config,
) -> Result<Solution<N>, Error>
where
    F: VectorField<N>,
{
    solve(field, t0, y0, t1, dt, config, ())
}
