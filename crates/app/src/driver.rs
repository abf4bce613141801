//! The per-frame animation loop.
//!
//! The driver owns a [`RenderSurface`] and a [`PlaybackCursor`]. Every tick it
//! composes the current scene's trail image with a marker at the cursor,
//! presents it, and advances the cursor. When a newer scene is published the
//! cursor jumps to that scene's random start index.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use attractor_render::{Canvas, Color, RenderSurface, SurfaceError};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    cursor::PlaybackCursor,
    scene::{Scene, SceneHandle},
};

/// Lifecycle of an [`AnimationDriver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Created but not yet set up; no frame has been drawn.
    Idle,

    /// Set up and drawing a frame per tick.
    Running,
}

/// Errors returned by [`AnimationDriver`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error("animation is already running")]
    AlreadyRunning,

    #[error("animation has not been set up")]
    NotRunning,
}

/// Cancels a running [`AnimationDriver::run`] loop.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks the loop to stop before its next frame.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

/// What a single tick drew.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Generation of the scene that was drawn.
    pub generation: u64,

    /// Sample under the marker, or `None` if the trajectory is empty.
    pub index: Option<usize>,
}

/// Draws the moving marker over the cached trail, one frame per tick.
#[derive(Debug)]
pub struct AnimationDriver<S> {
    surface: S,
    state: DriverState,
    cursor: PlaybackCursor,
    generation: u64,
    frame: Canvas,
}

impl<S: RenderSurface> AnimationDriver<S> {
    #[must_use]
    pub fn new(surface: S) -> Self {
        let frame = Canvas::new(surface.extent(), Color::TRANSPARENT);
        Self {
            surface,
            state: DriverState::Idle,
            cursor: PlaybackCursor::default(),
            generation: 0,
            frame,
        }
    }

    #[must_use]
    pub fn state(&self) -> DriverState {
        self.state
    }

    #[must_use]
    pub fn cursor(&self) -> PlaybackCursor {
        self.cursor
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Moves from `Idle` to `Running`, starting at the scene's start index.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::AlreadyRunning`] if called twice, or
    /// [`SurfaceError::Unavailable`] if the surface is not ready. Nothing is
    /// drawn in either case.
    pub fn setup(&mut self, scene: &Scene) -> Result<(), DriverError> {
        if self.state == DriverState::Running {
            return Err(DriverError::AlreadyRunning);
        }
        if !self.surface.is_ready() {
            return Err(SurfaceError::Unavailable.into());
        }

        self.follow(scene);
        self.state = DriverState::Running;
        info!(
            generation = scene.generation(),
            start_index = self.cursor.index(),
            "animation started"
        );
        Ok(())
    }

    /// Draws one frame of `scene` and advances the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::NotRunning`] before [`setup`](Self::setup), or
    /// the surface's error if presenting fails. The cursor does not advance
    /// when a frame is not presented.
    pub fn tick(&mut self, scene: &Scene) -> Result<Tick, DriverError> {
        if self.state != DriverState::Running {
            return Err(DriverError::NotRunning);
        }

        if scene.generation() != self.generation {
            self.follow(scene);
            debug!(
                generation = self.generation,
                start_index = self.cursor.index(),
                "switched to new scene"
            );
        }
        self.cursor.clamp(scene.trajectory().len());

        let index = (!self.cursor.is_empty()).then(|| self.cursor.index());
        let marker = index.and_then(|i| scene.state(i));
        scene.trail().compose(marker, &mut self.frame);
        self.surface.present(&self.frame)?;

        self.cursor.advance();
        Ok(Tick {
            generation: self.generation,
            index,
        })
    }

    /// Ticks once per `interval` until `stop` is signalled or `frames` ticks
    /// have been drawn, reading the latest scene each frame.
    ///
    /// Returns the number of frames drawn.
    ///
    /// # Errors
    ///
    /// Stops at the first failing tick and returns its error.
    pub fn run(
        &mut self,
        scenes: &SceneHandle,
        frames: Option<usize>,
        interval: Duration,
        stop: &StopHandle,
    ) -> Result<usize, DriverError> {
        let mut drawn = 0;
        while !stop.is_stopped() && frames.is_none_or(|limit| drawn < limit) {
            self.tick(&scenes.current())?;
            drawn += 1;
            if !interval.is_zero() {
                thread::sleep(interval);
            }
        }
        Ok(drawn)
    }

    fn follow(&mut self, scene: &Scene) {
        self.generation = scene.generation();
        self.cursor = PlaybackCursor::new(scene.start_index(), scene.trajectory().len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use attractor_core::{Parameters, Trajectory};
    use attractor_render::{AxisSelection, Extent, PixelSurface, Projection, Style, TrailImage};

    fn scene(states: Vec<[f64; 3]>, generation: u64, start_index: usize) -> Scene {
        let trajectory = Arc::new(Trajectory::from_states(0.0, 0.01, states));
        let trail = TrailImage::render(&trajectory, Projection::default(), &Style::default());
        Scene::new(
            Parameters::default(),
            AxisSelection::default(),
            trajectory,
            trail,
            generation,
            start_index,
            None,
        )
    }

    fn line(len: usize) -> Vec<[f64; 3]> {
        (0..len).map(|i| [i as f64, 0.0, 0.0]).collect()
    }

    #[test]
    fn setup_fails_without_a_ready_surface() {
        let mut driver = AnimationDriver::new(PixelSurface::detached(Extent::default()));
        let scene = scene(line(5), 0, 0);

        assert_eq!(
            driver.setup(&scene),
            Err(DriverError::Surface(SurfaceError::Unavailable))
        );
        assert_eq!(driver.state(), DriverState::Idle);
        assert_eq!(driver.tick(&scene), Err(DriverError::NotRunning));
        assert_eq!(driver.surface().frames_presented(), 0);
    }

    #[test]
    fn setup_runs_once() {
        let mut driver = AnimationDriver::new(PixelSurface::new(Extent::default()));
        let scene = scene(line(5), 0, 2);

        driver.setup(&scene).unwrap();

        assert_eq!(driver.state(), DriverState::Running);
        assert_eq!(driver.cursor().index(), 2);
        assert_eq!(driver.setup(&scene), Err(DriverError::AlreadyRunning));
    }

    #[test]
    fn cursor_returns_to_start_after_n_ticks() {
        let mut driver = AnimationDriver::new(PixelSurface::new(Extent::default()));
        let scene = scene(line(7), 0, 3);
        driver.setup(&scene).unwrap();

        let indices: Vec<_> = (0..8).map(|_| driver.tick(&scene).unwrap().index).collect();

        assert_eq!(
            indices,
            [3, 4, 5, 6, 0, 1, 2, 3].map(Some).to_vec()
        );
        assert_eq!(driver.surface().frames_presented(), 8);
    }

    #[test]
    fn new_scene_reseeds_and_clamps() {
        let mut driver = AnimationDriver::new(PixelSurface::new(Extent::default()));
        let first = scene(line(100), 0, 90);
        driver.setup(&first).unwrap();
        driver.tick(&first).unwrap();

        let second = scene(line(10), 1, 4);
        let tick = driver.tick(&second).unwrap();

        assert_eq!(tick, Tick { generation: 1, index: Some(4) });
        assert_eq!(driver.cursor().index(), 5);
    }

    #[test]
    fn empty_trajectory_hides_the_marker() {
        let mut driver = AnimationDriver::new(PixelSurface::new(Extent::default()));
        let empty = scene(Vec::new(), 0, 0);
        driver.setup(&empty).unwrap();

        let tick = driver.tick(&empty).unwrap();

        assert_eq!(tick.index, None);
        assert_eq!(
            driver.surface().last_frame(),
            Some(empty.trail().canvas())
        );
    }

    #[test]
    fn run_honours_frame_budget_and_stop_handle() {
        let mut driver = AnimationDriver::new(PixelSurface::new(Extent::default()));
        let scenes = SceneHandle::new(scene(line(3), 0, 0));
        driver.setup(&scenes.current()).unwrap();
        let stop = StopHandle::new();

        let drawn = driver.run(&scenes, Some(5), Duration::ZERO, &stop).unwrap();
        assert_eq!(drawn, 5);

        stop.clone().stop();
        let drawn = driver.run(&scenes, None, Duration::ZERO, &stop).unwrap();
        assert_eq!(drawn, 0);
        assert_eq!(driver.surface().frames_presented(), 5);
    }
}
