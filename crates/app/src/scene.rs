use std::sync::{Arc, PoisonError, RwLock};

use attractor_core::{Parameters, State, Trajectory};
use attractor_render::{AxisSelection, TrailImage};

/// Everything the animation needs for one configuration, built together.
///
/// A scene is immutable once published. Reconfiguration builds a new scene
/// and swaps it in whole, so a reader never sees a trajectory paired with the
/// trail image of another.
#[derive(Debug)]
pub struct Scene {
    parameters: Parameters,
    axes: AxisSelection,
    trajectory: Arc<Trajectory>,
    trail: TrailImage,
    generation: u64,
    start_index: usize,
    warning: Option<String>,
}

impl Scene {
    pub(crate) fn new(
        parameters: Parameters,
        axes: AxisSelection,
        trajectory: Arc<Trajectory>,
        trail: TrailImage,
        generation: u64,
        start_index: usize,
        warning: Option<String>,
    ) -> Self {
        Self {
            parameters,
            axes,
            trajectory,
            trail,
            generation,
            start_index,
            warning,
        }
    }

    #[must_use]
    pub fn parameters(&self) -> Parameters {
        self.parameters
    }

    #[must_use]
    pub fn axes(&self) -> AxisSelection {
        self.axes
    }

    #[must_use]
    pub fn trajectory(&self) -> &Arc<Trajectory> {
        &self.trajectory
    }

    #[must_use]
    pub fn trail(&self) -> &TrailImage {
        &self.trail
    }

    /// Returns the number of scenes published before this one.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the random index the cursor starts from.
    #[must_use]
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// Returns the reason the trajectory was truncated, if it was.
    #[must_use]
    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    /// Returns the state at `index`, if any.
    #[must_use]
    pub fn state(&self, index: usize) -> Option<&State> {
        self.trajectory.get(index)
    }
}

/// A shared slot holding the current [`Scene`].
///
/// Cloning the handle shares the slot. Readers take an `Arc` snapshot with
/// [`current`](Self::current) and keep using it even after a newer scene is
/// published.
#[derive(Debug, Clone)]
pub struct SceneHandle {
    slot: Arc<RwLock<Arc<Scene>>>,
}

impl SceneHandle {
    #[must_use]
    pub fn new(scene: Scene) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Arc::new(scene))),
        }
    }

    /// Returns the current scene.
    #[must_use]
    pub fn current(&self) -> Arc<Scene> {
        let guard = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Replaces the current scene.
    pub fn publish(&self, scene: Scene) {
        let scene = Arc::new(scene);
        let mut guard = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *guard = scene;
    }
}
