//! Classic fixed-step fourth-order Runge–Kutta.
//!
//! Stepping is done by [`ode_solvers::Rk4`] with a step of exactly `dt`, so
//! every step produces one grid sample. A final interval shorter than `dt`
//! is covered by one extra step of its own length.

use attractor_core::{Action, DenseIntegrator, Event, Observer, Solution, VectorField};
use ode_solvers::SVector;
use tracing::debug;

use super::{
    Error,
    sampler::{Run, Stepper, sample_grid},
    system::FieldSystem,
};

/// A [`DenseIntegrator`] backed by [`solve`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rk4;

impl<const N: usize> DenseIntegrator<N> for Rk4 {
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
        let solution = solve(field, t0, y0, t1, dt, observer)?;
        debug!(
            status = ?solution.status,
            samples = solution.samples.len(),
            evaluations = solution.stats.evaluations,
            "rk4 finished"
        );
        Ok(solution)
    }
}

impl Stepper for Rk4 {
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
        let mut stepper = ode_solvers::Rk4::new(system, x0, y0, x_end, step);
        let result = stepper.integrate();
        Run::new(result, stepper.x_out().clone(), stepper.y_out().clone())
    }
}

/// Integrates `field` from `(t0, y0)` to `t1` with steps of `dt`.
///
/// # Errors
///
/// Returns an error if the grid is invalid or the vector field fails.
/// A non-finite step ends the run with [`Status::NonFinite`] and the samples
/// produced before it.
///
/// [`Status::NonFinite`]: attractor_core::Status::NonFinite
pub fn solve<F, Obs, const N: usize>(
    field: &F,
    t0: f64,
    y0: [f64; N],
    t1: f64,
    dt: f64,
    observer: Obs,
) -> Result<Solution<N>, Error>
where
    F: VectorField<N>,
    Obs: Observer<Event<N>, Action>,
{
    sample_grid(&Rk4, field, t0, y0, t1, dt, observer)
}
