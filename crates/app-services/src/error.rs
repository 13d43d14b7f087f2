//! Service errors.

use shared_bus::BusError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The bus rejected a publish or subscribe.
    #[error(transparent)]
    Bus(#[from] BusError),

    /// The service was used after `destroy`.
    #[error("{service} has been destroyed")]
    Destroyed { service: &'static str },
}
