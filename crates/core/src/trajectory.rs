//! Trajectory generation.
//!
//! [`generate`] integrates the [`Lorenz`] field once over a fixed horizon and
//! collects every grid sample into an immutable [`Trajectory`]. The trajectory
//! is then replayed and projected by the renderer without further integration.

use std::{error::Error as StdError, time::Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    DenseIntegrator, Grid, GridError, Lorenz, Parameters, ParametersError, State, Status,
};

/// Time horizon, output step, and initial condition for a generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    /// State at `start`.
    pub initial_state: State,

    /// Time of the first sample.
    pub start: f64,

    /// Time of the last sample.
    pub max_t: f64,

    /// Spacing between samples.
    pub dt: f64,
}

/// Errors that can occur when validating [`Settings`].
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum SettingsError {
    #[error("initial state must be finite, got {0:?}")]
    InitialState(State),

    #[error(transparent)]
    Grid(#[from] GridError),
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            initial_state: [1.0, 1.0, 1.0],
            start: 0.0,
            max_t: 100.0,
            dt: 0.01,
        }
    }
}

impl Settings {
    /// Returns default settings with a different horizon and step.
    #[must_use]
    pub fn with_horizon(max_t: f64, dt: f64) -> Self {
        Self {
            max_t,
            dt,
            ..Self::default()
        }
    }

    /// Validates the settings and returns the output grid they describe.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial state is not finite or the horizon and
    /// step do not form a valid [`Grid`].
    pub fn grid(&self) -> Result<Grid, SettingsError> {
        if !self.initial_state.iter().all(|v| v.is_finite()) {
            return Err(SettingsError::InitialState(self.initial_state));
        }
        Ok(Grid::new(self.start, self.max_t, self.dt)?)
    }

    /// Returns the number of samples a complete generation produces.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid.
    pub fn expected_len(&self) -> Result<usize, SettingsError> {
        self.grid().map(|grid| grid.sample_count())
    }
}

/// An ordered, immutable sequence of Lorenz states sampled every `dt`.
///
/// Sample `i` is the state at `start + i * dt`. Sample 0 is the initial
/// condition. A trajectory may be shorter than its horizon if generation
/// diverged, and may be empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    start: f64,
    dt: f64,
    states: Vec<State>,
}

/// Component-wise extremes of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: State,
    pub max: State,
}

impl Trajectory {
    /// Creates a trajectory from states sampled every `dt` starting at `start`.
    #[must_use]
    pub fn from_states(start: f64, dt: f64, states: Vec<State>) -> Self {
        Self { start, dt, states }
    }

    /// Creates an empty trajectory.
    #[must_use]
    pub fn empty(start: f64, dt: f64) -> Self {
        Self::from_states(start, dt, Vec::new())
    }

    /// Returns the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns `true` if the trajectory holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Returns the state at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&State> {
        self.states.get(index)
    }

    /// Returns all states in time order.
    #[must_use]
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Returns an iterator over the states in time order.
    pub fn iter(&self) -> std::slice::Iter<'_, State> {
        self.states.iter()
    }

    /// Returns the time of the first sample.
    #[must_use]
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Returns the spacing between samples.
    #[must_use]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Returns the time of sample `index`.
    #[must_use]
    pub fn time_at(&self, index: usize) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let k = index as f64;
        self.start + k * self.dt
    }

    /// Returns the component-wise minimum and maximum, or `None` if empty.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        let (first, rest) = self.states.split_first()?;
        let bounds = rest.iter().fold(
            Bounds {
                min: *first,
                max: *first,
            },
            |mut acc, state| {
                for axis in 0..3 {
                    acc.min[axis] = acc.min[axis].min(state[axis]);
                    acc.max[axis] = acc.max[axis].max(state[axis]);
                }
                acc
            },
        );
        Some(bounds)
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a State;
    type IntoIter = std::slice::Iter<'a, State>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Errors that can occur during trajectory generation.
///
/// [`Diverged`](Self::Diverged) and [`Stalled`](Self::Stalled) still carry the
/// finite prefix of the trajectory, which callers may recover with
/// [`GenerateError::into_partial`].
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("invalid settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("invalid parameters: {0}")]
    Parameters(#[from] ParametersError),

    #[error("trajectory diverged at t = {time} after {} samples", .partial.len())]
    Diverged { time: f64, partial: Trajectory },

    #[error("integration stalled at t = {time} after {} samples", .partial.len())]
    Stalled { time: f64, partial: Trajectory },

    #[error("integrator error: {0}")]
    Integrator(#[source] Box<dyn StdError + Send + Sync>),
}

impl GenerateError {
    fn integrator<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Integrator(Box::new(err))
    }

    /// Returns the truncated trajectory for divergent or stalled runs.
    #[must_use]
    pub fn into_partial(self) -> Option<Trajectory> {
        match self {
            Self::Diverged { partial, .. } | Self::Stalled { partial, .. } => Some(partial),
            Self::Settings(_) | Self::Parameters(_) | Self::Integrator(_) => None,
        }
    }
}

/// Generates a Lorenz trajectory.
///
/// Integrates the [`Lorenz`] field for `parameters` from
/// `settings.initial_state` at `settings.start` to `settings.max_t`, collecting
/// one state every `settings.dt`. A complete trajectory holds
/// [`Settings::expected_len`] samples and starts with the initial state.
///
/// # Errors
///
/// - [`GenerateError::Settings`] or [`GenerateError::Parameters`] if the inputs
///   are invalid; nothing is integrated.
/// - [`GenerateError::Diverged`] if the state became non-finite; the error
///   carries the trajectory truncated at the last finite sample.
/// - [`GenerateError::Stalled`] if the integrator gave up before `max_t`.
/// - [`GenerateError::Integrator`] if the integrator itself failed.
pub fn generate<I>(
    integrator: &I,
    parameters: Parameters,
    settings: &Settings,
) -> Result<Trajectory, GenerateError>
where
    I: DenseIntegrator<3>,
{
    parameters.validate()?;
    let grid = settings.grid()?;

    let started = Instant::now();
    let field = Lorenz::new(parameters);
    let solution = integrator
        .integrate(
            &field,
            grid.start(),
            settings.initial_state,
            grid.end(),
            grid.step(),
            (),
        )
        .map_err(GenerateError::integrator)?;

    debug!(
        evaluations = solution.stats.evaluations,
        accepted = solution.stats.accepted_steps,
        rejected = solution.stats.rejected_steps,
        "integrator finished"
    );

    let mut status = solution.status;
    let mut states = Vec::with_capacity(grid.sample_count());
    for sample in &solution.samples {
        if !sample.is_finite() {
            status = Status::NonFinite { time: sample.t };
            break;
        }
        states.push(sample.y);
    }
    let trajectory = Trajectory::from_states(grid.start(), grid.step(), states);

    match status {
        Status::Complete => {
            info!(
                samples = trajectory.len(),
                elapsed_ms = started.elapsed().as_millis(),
                "generated trajectory"
            );
            Ok(trajectory)
        }
        Status::NonFinite { time } => {
            warn!(
                time,
                samples = trajectory.len(),
                "trajectory diverged, truncating at last finite sample"
            );
            Err(GenerateError::Diverged {
                time,
                partial: trajectory,
            })
        }
        Status::StepSizeUnderflow { time }
        | Status::StepLimitReached { time }
        | Status::StiffnessDetected { time } => {
            warn!(time, samples = trajectory.len(), ?status, "integration stalled");
            Err(GenerateError::Stalled {
                time,
                partial: trajectory,
            })
        }
        Status::StoppedByObserver => {
            let time = trajectory.time_at(trajectory.len().saturating_sub(1));
            Err(GenerateError::Stalled {
                time,
                partial: trajectory,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    use approx::assert_relative_eq;

    use crate::{Action, Event, Observer, Sample, Solution, Stats, VectorField};

    /// Forward Euler on the output grid, enough to exercise the generator.
    struct GridEuler;

    impl DenseIntegrator<3> for GridEuler {
        type Error = GridError;

        fn integrate<F, Obs>(
            &self,
            field: &F,
            t0: f64,
            y0: [f64; 3],
            t1: f64,
            dt: f64,
            mut observer: Obs,
        ) -> Result<Solution<3>, Self::Error>
        where
            F: VectorField<3>,
            Obs: Observer<Event<3>, Action>,
        {
            let grid = Grid::new(t0, t1, dt)?;
            let mut samples = vec![Sample { t: t0, y: y0 }];
            let mut stats = Stats::default();
            let _ = observer.observe(&Event {
                step: 0,
                sample: samples[0],
            });

            for step in 1..grid.sample_count() {
                let prev = samples[step - 1];
                let t = grid.time(step);
                let Ok(d) = field.derivative(prev.t, &prev.y) else {
                    unreachable!("test fields are infallible")
                };
                stats.evaluations += 1;
                let h = t - prev.t;
                let sample = Sample {
                    t,
                    y: [prev.y[0] + h * d[0], prev.y[1] + h * d[1], prev.y[2] + h * d[2]],
                };
                if !sample.is_finite() {
                    return Ok(Solution {
                        status: Status::NonFinite { time: prev.t },
                        samples,
                        stats,
                    });
                }
                samples.push(sample);
            }

            Ok(Solution {
                status: Status::Complete,
                samples,
                stats,
            })
        }
    }

    /// Reports samples containing NaN without flagging them.
    struct Leaky;

    impl DenseIntegrator<3> for Leaky {
        type Error = Infallible;

        fn integrate<F, Obs>(
            &self,
            _field: &F,
            t0: f64,
            y0: [f64; 3],
            _t1: f64,
            dt: f64,
            _observer: Obs,
        ) -> Result<Solution<3>, Self::Error>
        where
            F: VectorField<3>,
            Obs: Observer<Event<3>, Action>,
        {
            Ok(Solution {
                status: Status::Complete,
                samples: vec![
                    Sample { t: t0, y: y0 },
                    Sample {
                        t: t0 + dt,
                        y: [2.0, 2.0, 2.0],
                    },
                    Sample {
                        t: t0 + 2.0 * dt,
                        y: [f64::NAN, 2.0, 2.0],
                    },
                ],
                stats: Stats::default(),
            })
        }
    }

    #[test]
    fn default_settings_produce_ten_thousand_and_one_samples() {
        let settings = Settings::default();
        assert_eq!(settings.expected_len().unwrap(), 10_001);

        let trajectory = generate(&GridEuler, Parameters::default(), &settings).unwrap();

        assert_eq!(trajectory.len(), 10_001);
        assert_eq!(trajectory.states()[0], [1.0, 1.0, 1.0]);
        assert_relative_eq!(trajectory.time_at(10_000), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn expected_len_counts_a_short_final_interval_on_long_horizons() {
        let settings = Settings::with_horizon(1e7 + 0.01, 1.0);

        assert_eq!(settings.expected_len().unwrap(), 10_000_002);
        assert_eq!(Settings::with_horizon(0.3, 0.1).expected_len().unwrap(), 4);
    }

    #[test]
    fn trajectory_accessors() {
        let trajectory = Trajectory::from_states(
            0.0,
            0.5,
            vec![[1.0, -2.0, 3.0], [-1.0, 4.0, 0.0], [2.0, 0.0, -5.0]],
        );

        assert_eq!(trajectory.len(), 3);
        assert!(!trajectory.is_empty());
        assert_eq!(trajectory.get(1), Some(&[-1.0, 4.0, 0.0]));
        assert_eq!(trajectory.get(3), None);
        assert_relative_eq!(trajectory.time_at(2), 1.0);
        assert_eq!(trajectory.iter().count(), 3);
        assert_eq!(
            trajectory.bounds(),
            Some(Bounds {
                min: [-1.0, -2.0, -5.0],
                max: [2.0, 4.0, 3.0],
            })
        );
        assert_eq!(Trajectory::empty(0.0, 0.1).bounds(), None);
    }

    #[test]
    fn invalid_inputs_are_rejected_before_integrating() {
        let err = generate(
            &GridEuler,
            Parameters::new(f64::NAN, 10.0, 1.0),
            &Settings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, GenerateError::Parameters(_)));

        let err = generate(
            &GridEuler,
            Parameters::default(),
            &Settings::with_horizon(100.0, 0.0),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Settings(SettingsError::Grid(GridError::Step(_)))
        ));

        let settings = Settings {
            initial_state: [1.0, f64::INFINITY, 1.0],
            ..Settings::default()
        };
        let err = generate(&GridEuler, Parameters::default(), &settings).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Settings(SettingsError::InitialState(_))
        ));
        assert!(err.into_partial().is_none());
    }

    #[test]
    fn overflow_is_reported_as_divergence_with_a_partial_trajectory() {
        let parameters = Parameters::new(1e308, 10.0, 8.0 / 3.0);

        let err = generate(&GridEuler, parameters, &Settings::default()).unwrap_err();

        let GenerateError::Diverged { time, ref partial } = err else {
            panic!("expected divergence, got {err:?}");
        };
        assert!(time < 100.0);
        assert!(!partial.is_empty());
        assert!(partial.len() < 10_001);
        assert_eq!(partial.states()[0], [1.0, 1.0, 1.0]);
        assert!(partial.iter().flatten().all(|v| v.is_finite()));

        let partial = err.into_partial().unwrap();
        assert!(partial.len() < 10_001);
    }

    #[test]
    fn non_finite_samples_are_truncated_even_if_unflagged() {
        let err = generate(&Leaky, Parameters::default(), &Settings::default()).unwrap_err();

        let GenerateError::Diverged { time, partial } = err else {
            panic!("expected divergence");
        };
        assert_relative_eq!(time, 0.02);
        assert_eq!(partial.len(), 2);
    }
}
