//! Numerical integrators for the attractor workspace.
//!
//! Every integrator in [`transient`] implements
//! [`DenseIntegrator`](attractor_core::DenseIntegrator): it integrates a
//! vector field over `[t0, t1]` and reports the state on a uniform output
//! grid, emitting one [`Event`](attractor_core::Event) per grid sample.

pub mod transient;
