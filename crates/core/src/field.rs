/// The right-hand side of a first-order ODE system with `N` state variables.
///
/// A vector field maps a time `t` and state `y` to the time derivative
/// `dy/dt`. Integrators call it many times per step, so implementations should
/// be cheap and deterministic.
pub trait VectorField<const N: usize> {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Evaluates `dy/dt` at `(t, y)`.
    ///
    /// Non-finite components in the result are not an error here; integrators
    /// detect them and report divergence.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the derivative cannot be evaluated.
    fn derivative(&self, t: f64, y: &[f64; N]) -> Result<[f64; N], Self::Error>;
}
