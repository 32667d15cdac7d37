// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Console configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honoured for local development.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// How a single athlete is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AthleteLookup {
    /// `GET /trainer/clients/{id}`
    Endpoint,
    /// `GET /trainer/clients` followed by a local find.
    ListScan,
}

impl FromStr for AthleteLookup {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "endpoint" => Ok(AthleteLookup::Endpoint),
            "list" | "list_scan" | "scan" => Ok(AthleteLookup::ListScan),
            other => Err(ConfigError::Invalid {
                name: "ATHLETE_LOOKUP",
                value: other.to_string(),
            }),
        }
    }
}

/// Console configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Directory service ---
    /// Backend origin, without trailing slash
    pub api_base_url: String,
    /// Per-request timeout for all HTTP calls
    pub http_timeout: Duration,
    pub athlete_lookup: AthleteLookup,

    // --- Identity provider ---
    /// Keycloak base URL
    pub auth_url: String,
    pub auth_realm: String,
    /// Public OIDC client ID
    pub auth_client_id: String,
    /// Refresh the access token when it expires within this many seconds
    pub token_refresh_margin_secs: i64,

    // --- Credentials (optional, prompted when missing) ---
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for Config {
    /// Local development defaults.
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            http_timeout: Duration::from_secs(10),
            athlete_lookup: AthleteLookup::Endpoint,
            auth_url: "http://localhost:8081".to_string(),
            auth_realm: "trainer-app".to_string(),
            auth_client_id: "trainer-api".to_string(),
            token_refresh_margin_secs: 30,
            username: None,
            password: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        Ok(Self {
            api_base_url: env::var("API_BASE_URL")
                .map(|v| trim_origin(&v))
                .unwrap_or(defaults.api_base_url),
            http_timeout: Duration::from_secs(parse_var("HTTP_TIMEOUT_SECS", 10u64)?),
            athlete_lookup: match env::var("ATHLETE_LOOKUP") {
                Ok(v) => v.parse()?,
                Err(_) => defaults.athlete_lookup,
            },
            auth_url: env::var("AUTH_URL")
                .map(|v| trim_origin(&v))
                .unwrap_or(defaults.auth_url),
            auth_realm: env::var("AUTH_REALM").unwrap_or(defaults.auth_realm),
            auth_client_id: env::var("AUTH_CLIENT_ID").unwrap_or(defaults.auth_client_id),
            token_refresh_margin_secs: refresh_margin(parse_var(
                "TOKEN_REFRESH_MARGIN_SECS",
                defaults.token_refresh_margin_secs,
            )?)?,
            username: non_empty_var("COACH_USERNAME"),
            password: non_empty_var("COACH_PASSWORD"),
        })
    }

    /// OIDC endpoint root for the configured realm.
    pub fn oidc_base(&self) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect",
            self.auth_url, self.auth_realm
        )
    }
}

/// Largest accepted refresh margin (one day).
const MAX_REFRESH_MARGIN_SECS: i64 = 24 * 60 * 60;

fn refresh_margin(secs: i64) -> Result<i64, ConfigError> {
    if (0..=MAX_REFRESH_MARGIN_SECS).contains(&secs) {
        Ok(secs)
    } else {
        Err(ConfigError::Invalid {
            name: "TOKEN_REFRESH_MARGIN_SECS",
            value: secs.to_string(),
        })
    }
}

fn trim_origin(value: &str) -> String {
    value.trim().trim_end_matches('/').to_string()
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serializes tests that mutate process environment variables.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_config_from_env() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        env::set_var("API_BASE_URL", "https://coach.example.com/");
        env::set_var("AUTH_REALM", "coaches");
        env::set_var("ATHLETE_LOOKUP", "list");
        env::set_var("COACH_USERNAME", "  ");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.api_base_url, "https://coach.example.com");
        assert_eq!(config.auth_realm, "coaches");
        assert_eq!(config.athlete_lookup, AthleteLookup::ListScan);
        assert_eq!(config.token_refresh_margin_secs, 30);
        assert!(config.username.is_none());

        env::remove_var("API_BASE_URL");
        env::remove_var("AUTH_REALM");
        env::remove_var("ATHLETE_LOOKUP");
        env::remove_var("COACH_USERNAME");
    }

    #[test]
    fn test_out_of_range_refresh_margin_rejected() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        env::set_var("TOKEN_REFRESH_MARGIN_SECS", "9223372036854775807");

        let result = Config::from_env();
        env::remove_var("TOKEN_REFRESH_MARGIN_SECS");

        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                name: "TOKEN_REFRESH_MARGIN_SECS",
                ..
            })
        ));
    }

    #[test]
    fn test_refresh_margin_range() {
        assert_eq!(refresh_margin(0).unwrap(), 0);
        assert_eq!(refresh_margin(30).unwrap(), 30);
        assert!(refresh_margin(-1).is_err());
        assert!(matches!(
            refresh_margin(i64::MAX),
            Err(ConfigError::Invalid {
                name: "TOKEN_REFRESH_MARGIN_SECS",
                ..
            })
        ));
    }

    #[test]
    fn test_athlete_lookup_rejects_unknown() {
        assert_eq!(
            "Endpoint".parse::<AthleteLookup>().unwrap(),
            AthleteLookup::Endpoint
        );
        assert!("graphql".parse::<AthleteLookup>().is_err());
    }

    #[test]
    fn test_oidc_base() {
        let config = Config::default();
        assert_eq!(
            config.oidc_base(),
            "http://localhost:8081/realms/trainer-app/protocol/openid-connect"
        );
    }
}
