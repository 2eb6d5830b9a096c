//! HTTP client for the remote store.
//!
//! The store exposes the whole tree over REST: every path takes a `.json`
//! data suffix, `?shallow=true` returns a single level (object children as
//! the literal `true`), and authenticated calls carry an `access_token`
//! query parameter. The same contract is spoken by the store itself and by
//! the treebase proxy in front of it, so a [`StoreClient`] can point at
//! either — with a token for direct access, without one when the proxy
//! injects it.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use treebase_core::TreePath;

/// Transport-level or store-level failure of a single call.
///
/// Neither variant is retried anywhere; recovery is the next poll cycle or
/// an explicit user action.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request to remote store failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("remote store returned HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Typed client for the store REST contract.
pub struct StoreClient {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl StoreClient {
    /// Create a new client with the given base URL and request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create from an existing `reqwest::Client` (e.g. shared in tests).
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: None,
        }
    }

    /// Token appended to every call. Leave unset when talking through the
    /// authenticating proxy.
    pub fn set_access_token(&mut self, token: String) {
        self.access_token = Some(token);
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &TreePath) -> String {
        format!("{}{}.json", self.base_url, path)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.access_token.as_deref() {
            Some(token) if !token.is_empty() => req.query(&[("access_token", token)]),
            _ => req,
        }
    }

    /// One level of children at `path`: object children as `true`, leaf
    /// children as their literal value.
    pub async fn get_shallow(&self, path: &TreePath) -> Result<Value, StoreError> {
        let req = self
            .client
            .get(self.url(path))
            .query(&[("shallow", "true")]);
        parse_response(self.authed(req).send().await?).await
    }

    /// Full subtree at `path`.
    pub async fn get_deep(&self, path: &TreePath) -> Result<Value, StoreError> {
        let req = self.client.get(self.url(path));
        parse_response(self.authed(req).send().await?).await
    }

    /// Replace the value at `path`. The store echoes the stored value back.
    pub async fn put(&self, path: &TreePath, value: &Value) -> Result<Value, StoreError> {
        let req = self.client.put(self.url(path)).json(value);
        parse_response(self.authed(req).send().await?).await
    }

    /// Remove the value at `path`.
    pub async fn delete(&self, path: &TreePath) -> Result<(), StoreError> {
        let req = self.client.delete(self.url(path));
        let resp = self.authed(req).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }
        Ok(())
    }
}

/// Deserialize the body on 2xx, or surface the status and body text.
async fn parse_response(resp: reqwest::Response) -> Result<Value, StoreError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(StoreError::Status { status, body });
    }
    Ok(resp.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_appends_data_suffix() {
        let client = StoreClient::with_client(reqwest::Client::new(), "https://db.example.com/");
        assert_eq!(client.url(&TreePath::root()), "https://db.example.com/.json");
        assert_eq!(
            client.url(&TreePath::parse("/users/alice")),
            "https://db.example.com/users/alice.json"
        );
    }
}
