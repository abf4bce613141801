//! The contract between trajectory generation and numerical integrators.
//!
//! A [`DenseIntegrator`] integrates a [`VectorField`] from `t0` to `t1` and
//! reports the state on a uniform [`Grid`] of output times, whatever internal
//! step sizes it chooses. Every grid point is emitted to an [`Observer`] as an
//! [`Event`] and collected into the returned [`Solution`].

use thiserror::Error;

use crate::{Observer, VectorField};

/// Distance from a whole number below which an interval count is rounded.
///
/// Absorbs floating-point noise so that, for example, `100.0 / 0.01` yields
/// 10 000 intervals rather than 10 001. The check is absolute so that a real
/// partial interval still adds a sample on very long grids.
const GRID_TOLERANCE: f64 = 1e-6;

/// Upper bound on the number of samples a grid may hold.
pub const MAX_GRID_SAMPLES: usize = 50_000_000;

/// A uniform grid of output times covering `[start, end]`.
///
/// The grid holds `⌈(end - start) / step⌉ + 1` times, with interval counts
/// within 1e-6 of a whole number rounded instead. Time `k` is
/// `start + k * step`, except the final time, which is exactly `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    start: f64,
    end: f64,
    step: f64,
    samples: usize,
}

/// Errors that can occur when constructing a [`Grid`].
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum GridError {
    #[error("grid bounds must be finite, got [{start}, {end}]")]
    NonFiniteBounds { start: f64, end: f64 },

    #[error("grid end {end} must be greater than start {start}")]
    EmptyInterval { start: f64, end: f64 },

    #[error("grid step must be finite and positive, got {0}")]
    Step(f64),

    #[error("grid would hold {0} samples, more than the limit of {MAX_GRID_SAMPLES}")]
    TooLarge(f64),
}

impl Grid {
    /// Creates a grid from `start` to `end` with spacing `step`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bounds are not finite, the interval is empty,
    /// the step is not finite and positive, or the grid would be too large.
    pub fn new(start: f64, end: f64, step: f64) -> Result<Self, GridError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(GridError::NonFiniteBounds { start, end });
        }
        if end <= start {
            return Err(GridError::EmptyInterval { start, end });
        }
        if !step.is_finite() || step <= 0.0 {
            return Err(GridError::Step(step));
        }

        let ratio = (end - start) / step;
        let intervals = if (ratio - ratio.round()).abs() <= GRID_TOLERANCE {
            ratio.round()
        } else {
            ratio.ceil()
        };
        let samples = intervals + 1.0;

        #[allow(clippy::cast_precision_loss)]
        let limit = MAX_GRID_SAMPLES as f64;
        if !samples.is_finite() || samples > limit {
            return Err(GridError::TooLarge(samples));
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let samples = samples as usize;

        Ok(Self {
            start,
            end,
            step,
            samples,
        })
    }

    /// Returns the first grid time.
    #[must_use]
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Returns the last grid time.
    #[must_use]
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Returns the nominal spacing between grid times.
    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Returns the number of grid times, always at least two.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.samples
    }

    /// Returns the time of grid point `index`.
    ///
    /// Indices at or past the last grid point return `end`.
    #[must_use]
    pub fn time(&self, index: usize) -> f64 {
        if index + 1 >= self.samples {
            self.end
        } else {
            #[allow(clippy::cast_precision_loss)]
            let k = index as f64;
            self.start + k * self.step
        }
    }
}

/// A state sample at a single grid time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<const N: usize> {
    /// The independent variable (time).
    pub t: f64,

    /// The state at `t`.
    pub y: [f64; N],
}

impl<const N: usize> Sample<N> {
    /// Returns `true` if the time and every state component are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.t.is_finite() && self.y.iter().all(|v| v.is_finite())
    }
}

/// Event emitted by an integrator for each grid sample.
///
/// Step 0 is the initial state; steps `1..` follow in increasing time order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event<const N: usize> {
    /// Index of the sample on the output grid.
    pub step: usize,

    /// The emitted sample.
    pub sample: Sample<N>,
}

/// Control actions an observer can return to an integrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop the integrator and return the samples collected so far.
    StopEarly,
}

/// Indicates how an integration terminated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Status {
    /// Every grid sample was produced.
    Complete,

    /// Stopped early due to an observer action.
    StoppedByObserver,

    /// The state or its derivative became non-finite after `time`.
    NonFinite { time: f64 },

    /// The step size shrank below what floating point can resolve at `time`.
    StepSizeUnderflow { time: f64 },

    /// The step budget ran out at `time`.
    StepLimitReached { time: f64 },

    /// The integrator judged the problem stiff at `time` and gave up.
    StiffnessDetected { time: f64 },
}

impl Status {
    /// Returns `true` if every grid sample was produced.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Work counters reported by an integrator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Number of vector field evaluations.
    pub evaluations: usize,

    /// Number of accepted internal steps.
    pub accepted_steps: usize,

    /// Number of rejected internal steps.
    pub rejected_steps: usize,
}

/// The result of a grid integration.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution<const N: usize> {
    /// How the integrator terminated.
    pub status: Status,

    /// Samples on the output grid, in increasing time order.
    ///
    /// Holds every grid sample when `status` is [`Status::Complete`], and the
    /// finite prefix produced before termination otherwise.
    pub samples: Vec<Sample<N>>,

    /// Work counters for the run.
    pub stats: Stats,
}

/// An integrator that produces states on a uniform output grid.
///
/// Implementations must:
/// - emit the initial state unchanged as step 0 at `t0`,
/// - emit samples with strictly increasing `t`,
/// - emit exactly [`Grid::sample_count`] samples when the run completes,
/// - never emit a non-finite sample, reporting [`Status::NonFinite`] instead.
pub trait DenseIntegrator<const N: usize> {
    /// The error type returned if integration cannot start or the field fails.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Integrates `field` from `(t0, y0)` to `t1`, sampling every `dt`.
    ///
    /// The observer receives an [`Event`] per grid sample and may return
    /// [`Action::StopEarly`].
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the grid is invalid or the field fails.
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
        Obs: Observer<Event<N>, Action>;
}
