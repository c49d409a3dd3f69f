//! Client-side errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The authority rejected the credentials. Not retried; the stored
    /// credentials are wrong and retrying cannot fix them.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Network-level failure or server error, after retries were exhausted.
    #[error("transport error: {0}")]
    Transport(String),

    /// The authority answered with something we could not interpret.
    #[error("protocol error: {0}")]
    Protocol(String),
}
