//! Google service-account authentication
//!
//! Exchanges a signed JWT assertion for a short-lived bearer token.
//! Tokens are fetched freshly for every store operation: the store is
//! rate-limited anyway, and a cached credential that outlives a key
//! rotation is a worse failure mode than one extra round-trip.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{DomainError, DomainResult};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
const TOKEN_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Fetches access tokens for a service account.
pub struct TokenProvider {
    http: reqwest::Client,
    client_email: String,
    private_key: String,
}

impl TokenProvider {
    /// `private_key` is the service account's PEM-encoded RSA key.
    pub fn new(http: reqwest::Client, client_email: String, private_key: String) -> Self {
        Self {
            http,
            client_email,
            private_key,
        }
    }

    /// Obtain a fresh bearer token. Any failure here is a hard
    /// [`DomainError::Auth`]; no store call proceeds without a
    /// credential.
    pub async fn fetch_token(&self) -> DomainResult<String> {
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| DomainError::Auth(format!("invalid service account key: {e}")))?;

        let now = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: CALENDAR_SCOPE,
            aud: TOKEN_URL,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| DomainError::Auth(format!("failed to sign assertion: {e}")))?;

        let response = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DomainError::Auth(format!("token endpoint unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            // Body is diagnostic text from Google, never the credential.
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::Auth(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Auth(format!("malformed token response: {e}")))?;

        debug!(client_email = %self.client_email, "access token obtained");
        Ok(token.access_token)
    }
}
