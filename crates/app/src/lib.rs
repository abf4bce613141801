//! Animated Lorenz attractor viewer.
//!
//! The pieces fit together like this:
//!
//! - [`Controller`] owns the configuration, generates trajectories, and
//!   publishes an immutable [`Scene`] for each request
//! - [`AnimationDriver`] draws one frame per tick from the latest scene
//! - [`viewer`] wires both into an eframe window
//!
//! ```ignore
//! let mut controller = Controller::new(AppConfig::default())?;
//! let mut driver = AnimationDriver::new(PixelSurface::new(Extent::default()));
//! driver.setup(&controller.scene())?;
//! driver.tick(&controller.scene())?;
//! ```

pub mod config;
pub mod controller;
pub mod cursor;
pub mod driver;
pub mod integrator;
pub mod scene;
pub mod viewer;

pub use config::{AppConfig, ConfigError, IntegrationConfig, PlaybackConfig};
pub use controller::{Controller, ReconfigureError, ReconfigureRequest, Reconfigured};
pub use cursor::PlaybackCursor;
pub use driver::{AnimationDriver, DriverError, DriverState, StopHandle, Tick};
pub use integrator::{Integrator, Method};
pub use scene::{Scene, SceneHandle};
