//! API server configuration.

use passgate_core::auth::secret::resolve_signing_secret;

/// Configuration for the token authority server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3100").
    pub bind_addr: String,
    /// Symmetric token signing secret.
    pub signing_secret: String,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                          | Default                       |
    /// |-----------------------------------|-------------------------------|
    /// | `BIND_ADDR`                       | `127.0.0.1:3100`              |
    /// | `SIGNING_SECRET` / `AUTH_SECRET`  | generated & persisted to file |
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3100".into()),
            signing_secret: resolve_signing_secret(),
        }
    }
}
