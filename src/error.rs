// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types for the auth session and the directory API client.

/// Failures of the identity provider or the local auth session.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    /// Token refresh failed; the user has to log in again.
    #[error("Session expired, login required")]
    Expired,

    /// The login flow itself was rejected (bad credentials, disabled account...).
    #[error("Login rejected: {0}")]
    LoginRejected(String),

    /// The identity provider could not be reached or answered garbage.
    #[error("Identity provider error: {0}")]
    Provider(String),
}

/// Errors surfaced by [`crate::services::ApiClient`] operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication expired, please log in again")]
    AuthExpired,

    #[error("Network error: {0}")]
    NetworkFault(String),

    #[error("Service error (HTTP {status}): {body}")]
    ServiceFault { status: u16, body: String },

    #[error("Athlete directory unavailable (HTTP {status}): {body}")]
    DirectoryUnavailable { status: u16, body: String },

    #[error("Invalid input: {0}")]
    ValidationFault(String),

    #[error("Unexpected response body: {0}")]
    MalformedResponse(String),
}

impl ApiError {
    /// True when the failure is caused by the auth session rather than the data.
    pub fn is_auth_fault(&self) -> bool {
        matches!(self, ApiError::AuthExpired)
    }

    /// HTTP status of the failed call, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::ServiceFault { status, .. }
            | ApiError::DirectoryUnavailable { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Expired => ApiError::AuthExpired,
            AuthError::LoginRejected(_) => ApiError::AuthExpired,
            AuthError::Provider(msg) => ApiError::NetworkFault(msg),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_keys()
            .map(|k| k.to_string())
            .collect();
        fields.sort_unstable();
        ApiError::ValidationFault(format!("required field missing: {}", fields.join(", ")))
    }
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;
