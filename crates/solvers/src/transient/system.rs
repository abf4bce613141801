use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use attractor_core::VectorField;
use ode_solvers::{SVector, System};

use super::recorder::all_finite;

/// What happened inside the field while an `ode_solvers` stepper owned it.
///
/// The stepper takes its system by value, so these are shared through an
/// `Rc` and read back once the stepper returns.
pub(crate) struct Monitor<E> {
    error: RefCell<Option<E>>,
    non_finite: Cell<bool>,
    evaluations: Cell<usize>,
}

impl<E> Monitor<E> {
    pub(crate) fn new() -> Self {
        Self {
            error: RefCell::new(None),
            non_finite: Cell::new(false),
            evaluations: Cell::new(0),
        }
    }

    /// Takes the first error the field returned, if any.
    pub(crate) fn take_error(&self) -> Option<E> {
        self.error.borrow_mut().take()
    }

    /// Returns `true` if any evaluation saw a non-finite state or derivative.
    pub(crate) fn saw_non_finite(&self) -> bool {
        self.non_finite.get()
    }

    pub(crate) fn evaluations(&self) -> usize {
        self.evaluations.get()
    }
}

/// Adapts a [`VectorField`] to the `ode_solvers` [`System`] trait.
///
/// A field error is stored in the monitor and the derivative is set to NaN,
/// which forces the stepper to reject the step. `solout` then asks the
/// stepper to stop at the next accepted step.
pub(crate) struct FieldSystem<'a, F, const N: usize>
where
    F: VectorField<N>,
{
    field: &'a F,
    monitor: Rc<Monitor<F::Error>>,
}

impl<'a, F, const N: usize> FieldSystem<'a, F, N>
where
    F: VectorField<N>,
{
    pub(crate) fn new(field: &'a F, monitor: Rc<Monitor<F::Error>>) -> Self {
        Self { field, monitor }
    }
}

impl<F, const N: usize> System<f64, SVector<f64, N>> for FieldSystem<'_, F, N>
where
    F: VectorField<N>,
{
    fn system(&self, x: f64, y: &SVector<f64, N>, dy: &mut SVector<f64, N>) {
        let monitor = &self.monitor;
        monitor.evaluations.set(monitor.evaluations.get() + 1);

        if monitor.error.borrow().is_some() {
            *dy = SVector::from_element(f64::NAN);
            return;
        }

        let state: [f64; N] = (*y).into();
        match self.field.derivative(x, &state) {
            Ok(derivative) => {
                if !all_finite(&state) || !all_finite(&derivative) {
                    monitor.non_finite.set(true);
                }
                *dy = SVector::from_row_slice(&derivative);
            }
            Err(error) => {
                *monitor.error.borrow_mut() = Some(error);
                *dy = SVector::from_element(f64::NAN);
            }
        }
    }

    fn solout(&mut self, _x: f64, _y: &SVector<f64, N>, _dy: &SVector<f64, N>) -> bool {
        self.monitor.error.borrow().is_some()
    }
}
