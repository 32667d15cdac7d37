// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity claims carried by the coach's access token.

use serde::{Deserialize, Serialize};

/// Display name used when the token carries no usable claim.
pub const UNKNOWN_USER: &str = "Unknown";

/// Subset of the OIDC claims the console cares about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub preferred_username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Expiration time (Unix timestamp)
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Human-readable identity of the signed-in coach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub display_name: String,
    pub email: Option<String>,
}

impl Identity {
    /// Best available identity: `preferred_username`, then `name`, then `email`.
    pub fn from_claims(claims: Option<&IdentityClaims>) -> Self {
        let Some(claims) = claims else {
            return Self::unknown();
        };

        let email = present(&claims.email);
        let display_name = present(&claims.preferred_username)
            .or_else(|| present(&claims.name))
            .or_else(|| email.clone())
            .unwrap_or_else(|| UNKNOWN_USER.to_string());

        Self {
            display_name,
            email,
        }
    }

    pub fn unknown() -> Self {
        Self {
            display_name: UNKNOWN_USER.to_string(),
            email: None,
        }
    }

    /// Single-letter avatar for the console header.
    pub fn initial(&self) -> char {
        self.display_name
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('T')
    }
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
