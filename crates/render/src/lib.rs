//! Projection and raster rendering for Lorenz trajectories.
//!
//! - [`project`] maps a state onto the screen plane for an [`AxisSelection`]
//! - [`TrailImage`] caches the rasterized trail for a trajectory
//! - [`RenderSurface`] is where composed frames are presented; [`PixelSurface`]
//!   is an in-memory implementation

mod axis;
mod canvas;
pub mod projection;
mod surface;
mod trail;

pub use axis::{Axis, AxisError, AxisSelection};
pub use canvas::{Canvas, Color, ParseColorError};
pub use projection::{Extent, Pixel, Projection, SCALE, project};
pub use surface::{PixelSurface, RenderSurface, SurfaceError};
pub use trail::{Style, StyleError, TrailImage};
