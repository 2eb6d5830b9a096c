//! Process-wide access-token cache.
//!
//! Lifecycle: created empty, filled lazily by the first authenticated
//! forward, replaced in place when expired. There is no teardown — the cache
//! lives as long as the process.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::credentials::ServiceAccount;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// The token exchange failed or was denied. Fatal to the current request;
/// surfaced as a server error, never retried silently.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token exchange request failed: {0}")]
    Exchange(#[from] reqwest::Error),
    #[error("token endpoint returned HTTP {status}: {body}")]
    Denied {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("service account has no permission to mint access tokens")]
    NoAccessToken,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenGrant {
    access_token: Option<String>,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

/// Cache of the store access token, shared by all forwarding handlers.
///
/// Without a service account the static startup token is returned verbatim
/// and the token endpoint is never called. With one, the cached token is
/// served until `expires_at` and then replaced by a single fresh exchange;
/// the lock is held across the exchange, so concurrent callers of an
/// expired cache wait for that one exchange instead of issuing their own.
pub struct TokenCache {
    client: reqwest::Client,
    account: Option<ServiceAccount>,
    static_token: String,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new(
        client: reqwest::Client,
        account: Option<ServiceAccount>,
        static_token: Option<String>,
    ) -> Self {
        Self {
            client,
            account,
            static_token: static_token.unwrap_or_default(),
            cached: Mutex::new(None),
        }
    }

    /// Current access token, minting or refreshing if needed.
    pub async fn token(&self) -> Result<String, AuthError> {
        let Some(account) = &self.account else {
            return Ok(self.static_token.clone());
        };

        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.access_token.clone());
            }
        }

        let fresh = self.exchange(account).await?;
        let access_token = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access_token)
    }

    async fn exchange(&self, account: &ServiceAccount) -> Result<CachedToken, AuthError> {
        let assertion = account.sign_assertion(unix_now());
        let resp = self
            .client
            .post(&account.token_uri)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::Denied { status, body });
        }

        let grant: TokenGrant = resp.json().await?;
        let access_token = grant
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::NoAccessToken)?;

        Ok(CachedToken {
            access_token,
            expires_at: Instant::now() + Duration::from_secs(grant.expires_in),
        })
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
