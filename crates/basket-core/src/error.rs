//! Error types for basket-core

use thiserror::Error;

/// Result type alias using basket-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised outside the remote and auth layers, which keep their own
/// [`RemoteError`](crate::remote::RemoteError) and
/// [`AuthError`](crate::auth::AuthError).
#[derive(Error, Debug)]
pub enum Error {
    /// Backend configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
