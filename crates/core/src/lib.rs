//! Core traits and types for the attractor workspace.
//!
//! This crate defines the shared abstractions that integrators, renderers, and
//! the viewer build on:
//!
//! - [`VectorField`]: the right-hand side `dy/dt = f(t, y)` of an ODE system
//! - [`Observer`]: receives integrator events and optionally returns control actions
//! - [`DenseIntegrator`]: the contract an integrator fulfils to produce
//!   samples on a uniform time grid
//! - [`Lorenz`] and [`Parameters`]: the Lorenz vector field
//! - [`generate`]: drives an integrator to build an immutable [`Trajectory`]

mod field;
pub mod integrator;
pub mod lorenz;
mod observer;
pub mod trajectory;

pub use field::VectorField;
pub use integrator::{
    Action, DenseIntegrator, Event, Grid, GridError, Sample, Solution, Stats, Status,
};
pub use lorenz::{Lorenz, Parameters, ParametersError, State};
pub use observer::Observer;
pub use trajectory::{Bounds, GenerateError, Settings, SettingsError, Trajectory, generate};
