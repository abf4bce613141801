/// Observes events emitted by a solver and optionally returns a control action.
///
/// Observers are how callers watch an integration as it runs. Returning
/// `Some(action)` asks the solver to act on it (for example to stop early);
/// returning `None` lets the solver continue.
///
/// Implemented for:
/// - `()`, which ignores every event,
/// - any `FnMut(&E) -> Option<A>` closure.
pub trait Observer<E, A> {
    /// Handles a single event.
    fn observe(&mut self, event: &E) -> Option<A>;
}

impl<E, A> Observer<E, A> for () {
    fn observe(&mut self, _event: &E) -> Option<A> {
        None
    }
}

impl<E, A, F> Observer<E, A> for F
where
    F: FnMut(&E) -> Option<A>,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        self(event)
    }
}
