// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The coach's authenticated session.
//!
//! One `AuthSession` is constructed at startup and shared by reference with
//! the API client and the console shell. It owns the current tokens, keeps
//! them fresh ahead of expiry, and publishes its status so the shell can
//! start a new login when a refresh fails.

use crate::error::AuthError;
use crate::models::Identity;
use crate::services::identity::{IdentityProvider, TokenSet};
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, RwLock};
use tokio::sync::{watch, Mutex};

/// Where the session stands with the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Never logged in, or logged out.
    Unauthenticated,
    Authenticated,
    /// A token refresh is in flight.
    Expiring,
    /// A refresh failed; the user must log in again before any request is sent.
    LoginRequired,
}

/// Authenticated session shared across all views.
pub struct AuthSession {
    provider: Arc<dyn IdentityProvider>,
    tokens: RwLock<Option<TokenSet>>,
    /// Serializes refreshes so concurrent callers share one provider round-trip.
    refresh_lock: Mutex<()>,
    status: watch::Sender<SessionStatus>,
}

impl AuthSession {
    /// Create an unauthenticated session backed by `provider`.
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let (status, _) = watch::channel(SessionStatus::Unauthenticated);
        Self {
            provider,
            tokens: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            status,
        }
    }

    /// Create a session from previously issued tokens.
    pub fn with_tokens(provider: Arc<dyn IdentityProvider>, tokens: TokenSet) -> Self {
        let session = Self::new(provider);
        session.store(Some(tokens));
        session.status.send_replace(SessionStatus::Authenticated);
        session
    }

    /// Start the session, requiring a login.
    ///
    /// Returns whether the user ended up authenticated. A rejected login is
    /// `Ok(false)`; an unreachable provider is an error.
    pub async fn init(&self) -> Result<bool, AuthError> {
        match self.login().await {
            Ok(()) => Ok(true),
            Err(AuthError::LoginRejected(reason)) => {
                tracing::warn!(reason = %reason, "Initial login rejected");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Run the provider's login flow and adopt the issued tokens.
    pub async fn login(&self) -> Result<(), AuthError> {
        let tokens = self.provider.authenticate().await?;
        tracing::debug!(expires_at = %tokens.expires_at, "Session tokens issued");
        self.store(Some(tokens));
        self.status.send_replace(SessionStatus::Authenticated);
        Ok(())
    }

    /// End the session locally and, best effort, at the provider.
    pub async fn logout(&self) {
        let previous = self.take();
        if let Some(refresh_token) = previous.and_then(|t| t.refresh_token) {
            if let Err(e) = self.provider.end_session(&refresh_token).await {
                tracing::warn!(error = %e, "Failed to end provider session, continuing logout");
            }
        }
        self.status.send_replace(SessionStatus::Unauthenticated);
        tracing::info!("Logged out");
    }

    pub fn status(&self) -> SessionStatus {
        *self.status.borrow()
    }

    /// Watch status changes (the shell uses this as its login trigger).
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    /// Best available human-readable identity of the signed-in user.
    pub fn current_identity(&self) -> Identity {
        let guard = self.read();
        Identity::from_claims(guard.as_ref().and_then(|t| t.claims.as_ref()))
    }

    /// When the current access token expires, if there is one.
    pub fn token_expiry(&self) -> Option<DateTime<Utc>> {
        self.read().as_ref().map(|t| t.expires_at)
    }

    /// Return an access token valid for at least `margin_secs` more seconds.
    ///
    /// - `Ok(None)`: no session exists; the caller sends the request without
    ///   credentials.
    /// - `Ok(Some(token))`: token is fresh, refreshing it first if needed.
    /// - `Err(AuthError::Expired)`: refresh failed or a login is pending; the
    ///   status moves to [`SessionStatus::LoginRequired`].
    pub async fn ensure_fresh_token(&self, margin_secs: i64) -> Result<Option<String>, AuthError> {
        // A margin too large to represent means "always refresh"
        let margin = Duration::try_seconds(margin_secs).unwrap_or(Duration::MAX);

        // Fast path: no I/O
        if let Some(token) = self.fresh_token(margin)? {
            return Ok(Some(token));
        }
        if !self.is_authenticated() {
            return Ok(None);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another task may have refreshed while we were waiting
        if let Some(token) = self.fresh_token(margin)? {
            return Ok(Some(token));
        }

        let Some(refresh_token) = self.read().as_ref().map(|t| t.refresh_token.clone()) else {
            return Ok(None);
        };
        let Some(refresh_token) = refresh_token else {
            tracing::warn!("Access token expiring and no refresh token available");
            return Err(self.require_login());
        };

        self.status.send_replace(SessionStatus::Expiring);
        tracing::debug!("Access token expiring, refreshing");

        match self.provider.refresh(&refresh_token).await {
            Ok(tokens) => {
                let access_token = tokens.access_token.clone();
                self.store(Some(tokens));
                self.status.send_replace(SessionStatus::Authenticated);
                tracing::debug!("Access token refreshed");
                Ok(Some(access_token))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed");
                Err(self.require_login())
            }
        }
    }

    /// Token from the current set if it is fresh; `Err` while a login is pending.
    fn fresh_token(&self, margin: Duration) -> Result<Option<String>, AuthError> {
        if self.status() == SessionStatus::LoginRequired {
            return Err(AuthError::Expired);
        }
        let now = Utc::now();
        Ok(self
            .read()
            .as_ref()
            .filter(|t| t.is_fresh(now, margin))
            .map(|t| t.access_token.clone()))
    }

    /// Drop the tokens and flag that a new login is needed.
    fn require_login(&self) -> AuthError {
        self.take();
        self.status.send_replace(SessionStatus::LoginRequired);
        AuthError::Expired
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<TokenSet>> {
        self.tokens.read().unwrap_or_else(|e| e.into_inner())
    }

    fn store(&self, tokens: Option<TokenSet>) {
        *self.tokens.write().unwrap_or_else(|e| e.into_inner()) = tokens;
    }

    fn take(&self) -> Option<TokenSet> {
        self.tokens.write().unwrap_or_else(|e| e.into_inner()).take()
    }
}
