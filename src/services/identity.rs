// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider client (Keycloak / OpenID Connect).
//!
//! Handles:
//! - Login via the resource-owner password grant
//! - Access token refresh via the refresh-token grant
//! - Session termination at the provider
//! - Reading identity claims out of issued tokens

use crate::config::Config;
use crate::error::AuthError;
use crate::models::IdentityClaims;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;

/// Assumed access-token lifetime when the provider reports none.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 300;

/// Tokens issued by the identity provider for one login.
#[derive(Debug, Clone)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    /// Claims from the ID token, or the access token when no ID token was issued.
    pub claims: Option<IdentityClaims>,
}

impl TokenSet {
    /// Build a token set from a token endpoint response received at `now`.
    ///
    /// Expiry comes from the access token's `exp` claim when readable, otherwise
    /// from `expires_in`.
    pub fn from_response(response: TokenResponse, now: DateTime<Utc>) -> Self {
        let access_claims = read_claims(&response.access_token);
        let expires_at = access_claims
            .as_ref()
            .and_then(|c| c.exp)
            .and_then(|exp| DateTime::from_timestamp(exp, 0))
            .unwrap_or_else(|| expiry_after(now, response.expires_in));

        let claims = response
            .id_token
            .as_deref()
            .and_then(read_claims)
            .or(access_claims);

        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at,
            claims,
        }
    }

    /// True if the access token is still valid `margin` from now.
    pub fn is_fresh(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        now.checked_add_signed(margin)
            .is_some_and(|deadline| deadline < self.expires_at)
    }
}

/// `now + expires_in`, or the default lifetime when the reported one is missing
/// or does not fit in a timestamp.
fn expiry_after(now: DateTime<Utc>, expires_in: Option<i64>) -> DateTime<Utc> {
    expires_in
        .and_then(Duration::try_seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .unwrap_or_else(|| now + Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECS))
}

/// Parse identity claims from a JWT without verifying its signature.
///
/// The console only displays these claims; the directory service verifies tokens.
pub fn read_claims(token: &str) -> Option<IdentityClaims> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<IdentityClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .ok()
}

/// Token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
}

/// OAuth error body returned by the token endpoint.
#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// The external identity provider the auth session delegates to.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Run the login flow and return freshly issued tokens.
    async fn authenticate(&self) -> Result<TokenSet, AuthError>;

    /// Exchange a refresh token for new tokens.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, AuthError>;

    /// Terminate the provider-side session.
    async fn end_session(&self, refresh_token: &str) -> Result<(), AuthError>;
}

/// Username and password for the password grant.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Keycloak realm client.
#[derive(Clone)]
pub struct KeycloakProvider {
    http: reqwest::Client,
    token_url: String,
    logout_url: String,
    client_id: String,
    credentials: Credentials,
}

impl KeycloakProvider {
    /// Create a provider for the realm named in `config`.
    pub fn new(config: &Config, credentials: Credentials) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| AuthError::Provider(format!("failed building HTTP client: {}", e)))?;

        let base = config.oidc_base();
        Ok(Self {
            http,
            token_url: format!("{}/token", base),
            logout_url: format!("{}/logout", base),
            client_id: config.auth_client_id.clone(),
            credentials,
        })
    }

    async fn request_tokens(&self, form: &[(&str, &str)]) -> Result<TokenSet, TokenFailure> {
        let response = self
            .http
            .post(&self.token_url)
            .form(form)
            .send()
            .await
            .map_err(|e| TokenFailure::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<OAuthErrorBody>(&body) {
                Ok(err) => TokenFailure::Rejected {
                    error: err.error,
                    description: err.error_description,
                },
                Err(_) => TokenFailure::Transport(format!("HTTP {}: {}", status, body)),
            });
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| TokenFailure::Transport(format!("JSON parse error: {}", e)))?;

        Ok(TokenSet::from_response(tokens, Utc::now()))
    }
}

/// Internal classification of token endpoint failures.
enum TokenFailure {
    Rejected {
        error: String,
        description: Option<String>,
    },
    Transport(String),
}

#[async_trait]
impl IdentityProvider for KeycloakProvider {
    async fn authenticate(&self) -> Result<TokenSet, AuthError> {
        let form = [
            ("grant_type", "password"),
            ("client_id", self.client_id.as_str()),
            ("username", self.credentials.username.as_str()),
            ("password", self.credentials.password.as_str()),
            ("scope", "openid"),
        ];

        match self.request_tokens(&form).await {
            Ok(tokens) => {
                tracing::info!(username = %self.credentials.username, "Login succeeded");
                Ok(tokens)
            }
            Err(TokenFailure::Rejected { error, description }) => {
                tracing::warn!(error = %error, "Login rejected by identity provider");
                Err(AuthError::LoginRejected(description.unwrap_or(error)))
            }
            Err(TokenFailure::Transport(msg)) => Err(AuthError::Provider(msg)),
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, AuthError> {
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("refresh_token", refresh_token),
        ];

        match self.request_tokens(&form).await {
            Ok(tokens) => Ok(tokens),
            Err(TokenFailure::Rejected { error, .. }) => {
                tracing::info!(error = %error, "Refresh token rejected");
                Err(AuthError::Expired)
            }
            Err(TokenFailure::Transport(msg)) => Err(AuthError::Provider(msg)),
        }
    }

    async fn end_session(&self, refresh_token: &str) -> Result<(), AuthError> {
        let response = self
            .http
            .post(&self.logout_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Provider(format!("Logout request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AuthError::Provider(format!("Logout failed with status {}", status)));
        }
        Ok(())
    }
}
