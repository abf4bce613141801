//! Integrators for initial value problems.
//!
//! # Integrators
//!
//! - [`dopri5`]: adaptive Dormand–Prince 5(4) with dense output; the output
//!   grid is independent of the internal step sizes
//! - [`rk4`]: classic fixed-step fourth-order Runge–Kutta stepping exactly on
//!   the output grid
//!
//! Both drive an [`ode_solvers`] stepper and lay its output onto the grid.

pub mod dopri5;
pub mod rk4;

mod error;
mod recorder;
mod sampler;
mod system;

pub use error::Error;
