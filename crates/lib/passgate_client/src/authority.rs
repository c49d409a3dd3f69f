//! Token authority abstraction and its HTTP implementation.
//!
//! Calls the authority's client-credentials endpoint with retry logic
//! (max 3 attempts, fixed backoff). Credential rejections fail fast:
//! retrying bad credentials cannot succeed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::time::{Duration, sleep};
use tracing::warn;

use crate::error::ClientError;

const MAX_RETRY_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(500);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Stored credentials for one client identity.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// A granted access token and its expiry, as returned by the authority.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Something that can exchange client credentials for a token.
///
/// The cache is generic over this so tests can count and fail fetches
/// without a network.
#[async_trait]
pub trait TokenAuthority: Send + Sync {
    async fn fetch_token(&self, credentials: &ClientCredentials) -> Result<TokenGrant, ClientError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
}

/// HTTP implementation of [`TokenAuthority`] against a Passgate server.
#[derive(Debug, Clone)]
pub struct HttpTokenAuthority {
    http: reqwest::Client,
    auth_url: String,
}

impl HttpTokenAuthority {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:3100`.
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth_url: format!("{}/auth", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl TokenAuthority for HttpTokenAuthority {
    async fn fetch_token(&self, credentials: &ClientCredentials) -> Result<TokenGrant, ClientError> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRY_ATTEMPTS {
            let result = self
                .http
                .post(&self.auth_url)
                .timeout(REQUEST_TIMEOUT)
                .json(&AuthRequest {
                    client_id: &credentials.client_id,
                    client_secret: &credentials.client_secret,
                })
                .send()
                .await;

            match result {
                Ok(resp) => {
                    let status = resp.status();
                    if status == StatusCode::UNAUTHORIZED {
                        return Err(ClientError::AuthenticationFailed(format!(
                            "client `{}` was rejected",
                            credentials.client_id
                        )));
                    }
                    if status.is_server_error() {
                        last_error = Some(ClientError::Transport(format!(
                            "authority answered {status}"
                        )));
                    } else if !status.is_success() {
                        let body = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
                        return Err(ClientError::Protocol(format!(
                            "unexpected response {status}: {body}"
                        )));
                    } else {
                        return resp.json::<TokenGrant>().await.map_err(|e| {
                            ClientError::Protocol(format!("token response parse error: {e}"))
                        });
                    }
                }
                Err(e) => {
                    last_error = Some(ClientError::Transport(format!("request failed: {e}")));
                }
            }

            if attempt + 1 < MAX_RETRY_ATTEMPTS {
                warn!(attempt = attempt + 1, "token fetch failed, retrying");
                sleep(RETRY_BACKOFF).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ClientError::Transport(format!(
                "failed to fetch token after {MAX_RETRY_ATTEMPTS} attempts"
            ))
        }))
    }
}
