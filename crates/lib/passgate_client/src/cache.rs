//! Refresh-ahead token cache.
//!
//! Tokens are refreshed a margin ahead of their expiry so callers never
//! present a token that dies mid-request. One fetch per client identity at a
//! time: concurrent callers for the same identity queue on the identity's
//! slot and reuse the token the first one fetched.

use std::sync::Arc;

use chrono::{Duration, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::authority::{ClientCredentials, TokenAuthority, TokenGrant};
use crate::error::ClientError;

/// How long before expiry a cached token is refreshed: 5 minutes.
pub const DEFAULT_REFRESH_MARGIN_SECS: i64 = 300;

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: chrono::DateTime<Utc>,
}

type Slot = Arc<Mutex<Option<CachedToken>>>;

/// Caches one token per client identity, fetching through a [`TokenAuthority`].
pub struct CredentialCache<A: TokenAuthority> {
    authority: A,
    refresh_margin: Duration,
    slots: DashMap<String, Slot>,
}

impl<A: TokenAuthority> CredentialCache<A> {
    pub fn new(authority: A) -> Self {
        Self {
            authority,
            refresh_margin: Duration::seconds(DEFAULT_REFRESH_MARGIN_SECS),
            slots: DashMap::new(),
        }
    }

    pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
        self.refresh_margin = margin;
        self
    }

    /// Get a token for the identity, fetching or refreshing if the cached one
    /// is absent or inside the refresh margin.
    pub async fn access_token(
        &self,
        credentials: &ClientCredentials,
    ) -> Result<String, ClientError> {
        let slot = self.slot(&credentials.client_id);
        let mut guard = slot.lock().await;

        if let Some(cached) = guard.as_ref() {
            if cached.expires_at - self.refresh_margin > Utc::now() {
                return Ok(cached.access_token.clone());
            }
            debug!(
                client_id = credentials.client_id,
                "cached token inside refresh margin, refreshing"
            );
        }

        let grant = self.authority.fetch_token(credentials).await?;
        let token = grant.access_token.clone();
        *guard = Some(cached_from(grant));
        Ok(token)
    }

    /// Fetch eagerly so the first real caller does not pay the fetch latency.
    pub async fn prime(&self, credentials: &ClientCredentials) -> Result<(), ClientError> {
        self.access_token(credentials).await.map(|_| ())
    }

    /// Drop the cached token for an identity; the next access fetches anew.
    pub fn invalidate(&self, client_id: &str) {
        self.slots.remove(client_id);
    }

    fn slot(&self, client_id: &str) -> Slot {
        // Clone the Arc out so the map shard lock is not held across await.
        self.slots
            .entry(client_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .clone()
    }
}

fn cached_from(grant: TokenGrant) -> CachedToken {
    CachedToken {
        access_token: grant.access_token,
        expires_at: grant.expires_at,
    }
}
