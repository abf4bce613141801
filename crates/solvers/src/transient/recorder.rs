use attractor_core::{Action, Event, Observer, Sample, Solution, Stats, Status};

/// Collects grid samples and forwards each one to the observer.
pub(crate) struct Recorder<Obs, const N: usize> {
    observer: Obs,
    samples: Vec<Sample<N>>,
}

impl<Obs, const N: usize> Recorder<Obs, N>
where
    Obs: Observer<Event<N>, Action>,
{
    pub(crate) fn new(observer: Obs, capacity: usize) -> Self {
        Self {
            observer,
            samples: Vec::with_capacity(capacity),
        }
    }

    /// Records a sample and returns `true` if the observer asked to stop.
    pub(crate) fn record(&mut self, sample: Sample<N>) -> bool {
        let event = Event {
            step: self.samples.len(),
            sample,
        };
        self.samples.push(sample);
        matches!(self.observer.observe(&event), Some(Action::StopEarly))
    }

    pub(crate) fn finish(self, status: Status, stats: Stats) -> Solution<N> {
        Solution {
            status,
            samples: self.samples,
            stats,
        }
    }
}

pub(crate) fn all_finite<const N: usize>(values: &[f64; N]) -> bool {
    values.iter().all(|v| v.is_finite())
}
