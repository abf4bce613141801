//! Lays the output of an `ode_solvers` stepper onto a [`Grid`].
//!
//! The steppers emit states every `step` from their start time. Every grid
//! interval is `dt` except possibly the last, so the whole intervals are
//! covered by one run and a short final interval by a second run started
//! from the last whole-interval state.

use std::rc::Rc;

use attractor_core::{Action, Event, Grid, Observer, Sample, Solution, Stats, Status, VectorField};
use ode_solvers::{
    SVector,
    dop_shared::{IntegrationError, Stats as StepperStats},
};

use super::{
    Error,
    recorder::{Recorder, all_finite},
    system::{FieldSystem, Monitor},
};

/// A final interval shorter than this fraction of `dt` gets its own run.
const FULL_INTERVAL: f64 = 1.0 - 1e-6;

/// Largest distance, in steps, between a stepper output and its grid time.
const OUTPUT_SLACK: f64 = 0.25;

/// An `ode_solvers` method that can be run over one stretch of the grid.
pub(crate) trait Stepper {
    /// Integrates from `(x0, y0)` to `x_end`, emitting a state every `step`.
    fn run<F, const N: usize>(
        &self,
        system: FieldSystem<'_, F, N>,
        x0: f64,
        y0: SVector<f64, N>,
        x_end: f64,
        step: f64,
    ) -> Run<N>
    where
        F: VectorField<N>;
}

/// What a stepper left behind after `integrate` returned.
pub(crate) struct Run<const N: usize> {
    x_out: Vec<f64>,
    y_out: Vec<SVector<f64, N>>,
    stats: Option<StepperStats>,
    failure: Option<IntegrationError>,
}

impl<const N: usize> Run<N> {
    pub(crate) fn new(
        result: Result<StepperStats, IntegrationError>,
        x_out: Vec<f64>,
        y_out: Vec<SVector<f64, N>>,
    ) -> Self {
        let (stats, failure) = match result {
            Ok(stats) => (Some(stats), None),
            Err(failure) => (None, Some(failure)),
        };
        Self {
            x_out,
            y_out,
            stats,
            failure,
        }
    }
}

/// Why a stretch of the grid was left unfinished.
enum Halt {
    NonFinite,
    Failed(IntegrationError),
}

/// Integrates `field` with `stepper` and reports the state on the grid.
///
/// The observer sees the samples in order once the stepper has finished and
/// may still cut the returned solution short.
pub(crate) fn sample_grid<S, F, Obs, const N: usize>(
    stepper: &S,
    field: &F,
    t0: f64,
    y0: [f64; N],
    t1: f64,
    dt: f64,
    observer: Obs,
) -> Result<Solution<N>, Error>
where
    S: Stepper,
    F: VectorField<N>,
    Obs: Observer<Event<N>, Action>,
{
    let grid = Grid::new(t0, t1, dt)?;
    let count = grid.sample_count();
    let mut recorder = Recorder::new(observer, count);
    let mut stats = Stats::default();

    if !all_finite(&y0) {
        return Ok(recorder.finish(Status::NonFinite { time: t0 }, stats));
    }

    let mut states = Vec::with_capacity(count);
    states.push(y0);

    let penultimate = grid.time(count - 2);
    let last_interval = grid.end() - penultimate;
    let whole = if last_interval < dt * FULL_INTERVAL {
        count - 2
    } else {
        count - 1
    };

    let mut halt = segment(stepper, field, t0, dt, whole, &mut states, &mut stats)?;
    if halt.is_none() && whole < count - 1 {
        halt = segment(
            stepper,
            field,
            penultimate,
            last_interval,
            1,
            &mut states,
            &mut stats,
        )?;
    }

    let status = match halt {
        None => Status::Complete,
        Some(Halt::NonFinite) => Status::NonFinite {
            time: grid.time(states.len() - 1),
        },
        Some(Halt::Failed(failure)) => match failure {
            IntegrationError::MaxNumStepReached { x, .. } => Status::StepLimitReached { time: x },
            IntegrationError::StepSizeUnderflow { x, .. } => Status::StepSizeUnderflow { time: x },
            IntegrationError::StiffnessDetected { x, .. } => Status::StiffnessDetected { time: x },
        },
    };

    for (index, y) in states.into_iter().enumerate() {
        let sample = Sample {
            t: grid.time(index),
            y,
        };
        if recorder.record(sample) {
            return Ok(recorder.finish(Status::StoppedByObserver, stats));
        }
    }

    Ok(recorder.finish(status, stats))
}

/// Runs `count` steps of size `step` from `start` and the last state in
/// `states`, appending every finite output that lands on the grid.
fn segment<S, F, const N: usize>(
    stepper: &S,
    field: &F,
    start: f64,
    step: f64,
    count: usize,
    states: &mut Vec<[f64; N]>,
    stats: &mut Stats,
) -> Result<Option<Halt>, Error>
where
    S: Stepper,
    F: VectorField<N>,
{
    let Some(&y0) = states.last() else {
        return Ok(None);
    };
    if count == 0 {
        return Ok(None);
    }

    let monitor = Rc::new(Monitor::new());
    let system = FieldSystem::new(field, Rc::clone(&monitor));

    // Half a step of overrun keeps the last output from being lost to
    // rounding in the stepper's accumulated output times.
    #[allow(clippy::cast_precision_loss)]
    let x_end = start + (count as f64 + 0.5) * step;
    let run = stepper.run(system, start, SVector::from(y0), x_end, step);

    stats.evaluations += monitor.evaluations();
    if let Some(stepper_stats) = &run.stats {
        stats.accepted_steps += stepper_stats.accepted_steps as usize;
        stats.rejected_steps += stepper_stats.rejected_steps as usize;
    }
    if let Some(error) = monitor.take_error() {
        return Err(Error::field(error));
    }

    let mut next = 1;
    for (x, y) in run.x_out.iter().zip(&run.y_out) {
        if next > count {
            break;
        }

        #[allow(clippy::cast_precision_loss)]
        let target = next as f64;
        if ((x - start) / step - target).abs() > OUTPUT_SLACK {
            continue;
        }

        let y: [f64; N] = (*y).into();
        if !all_finite(&y) {
            return Ok(Some(Halt::NonFinite));
        }
        states.push(y);
        next += 1;
    }

    if next > count {
        return Ok(None);
    }

    Ok(Some(match run.failure {
        Some(failure) if !monitor.saw_non_finite() => Halt::Failed(failure),
        _ => Halt::NonFinite,
    }))
}
