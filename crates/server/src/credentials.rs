//! Service-account credentials and the signed grant assertion.
//!
//! A service account is a JSON file holding the account identity, its
//! signing key, and the authorization endpoint to exchange assertions at.
//! The assertion is a JWT signed with HMAC-SHA256 over the account key.

use std::path::Path;

use anyhow::Context;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

/// Assertion header (always HS256).
const ASSERTION_HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// Assertion lifetime: 1 hour in seconds.
pub const ASSERTION_LIFETIME_SECS: u64 = 3600;

/// Credentials loaded from a service-account JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: String,
}

impl ServiceAccount {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading service account {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing service account {}", path.display()))
    }

    /// Build the JWT-bearer assertion presented to the token endpoint.
    pub fn sign_assertion(&self, now_unix: u64) -> String {
        let header_b64 = URL_SAFE_NO_PAD.encode(ASSERTION_HEADER.as_bytes());

        let claims = serde_json::json!({
            "iss": self.client_email,
            "aud": self.token_uri,
            "iat": now_unix,
            "exp": now_unix + ASSERTION_LIFETIME_SECS,
        });
        let payload_b64 = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());

        let signing_input = format!("{header_b64}.{payload_b64}");
        let signature = hmac_sha256(self.private_key.as_bytes(), signing_input.as_bytes());
        let sig_b64 = URL_SAFE_NO_PAD.encode(signature);

        format!("{signing_input}.{sig_b64}")
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac =
        <Hmac<Sha256> as Mac>::new_from_slice(key).expect("HMAC can take a key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}
