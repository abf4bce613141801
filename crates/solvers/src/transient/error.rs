use std::error::Error as StdError;

use attractor_core::GridError;

/// Errors that can occur before or during integration.
///
/// Divergence is not an error; it is reported through
/// [`Status::NonFinite`](attractor_core::Status::NonFinite).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("vector field error: {0}")]
    Field(#[source] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn field<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Field(Box::new(err))
    }
}
