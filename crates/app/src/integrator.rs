use std::fmt;

use attractor_core::{Action, DenseIntegrator, Event, Observer, Solution, VectorField};
use attractor_solvers::transient::{Error, dopri5::Dopri5, rk4::Rk4};
use serde::{Deserialize, Serialize};

/// Integration method names accepted in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Adaptive Dormand–Prince 5(4) with dense output.
    #[default]
    Dopri5,

    /// Fixed-step fourth-order Runge–Kutta on the output grid.
    Rk4,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dopri5 => "dopri5",
            Self::Rk4 => "rk4",
        })
    }
}

/// The integrator chosen at runtime by [`Method`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Integrator {
    Dopri5(Dopri5),
    Rk4(Rk4),
}

impl Integrator {
    #[must_use]
    pub fn method(&self) -> Method {
        match self {
            Self::Dopri5(_) => Method::Dopri5,
            Self::Rk4(_) => Method::Rk4,
        }
    }
}

impl Default for Integrator {
    fn default() -> Self {
        Self::Dopri5(Dopri5::default())
    }
}

impl<const N: usize> DenseIntegrator<N> for Integrator {
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
        match self {
            Self::Dopri5(inner) => inner.integrate(field, t0, y0, t1, dt, observer),
            Self::Rk4(inner) => inner.integrate(field, t0, y0, t1, dt, observer),
        }
    }
}
