// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - identity, session and directory service clients.

pub mod api;
pub mod auth_session;
pub mod identity;

pub use api::ApiClient;
pub use auth_session::{AuthSession, SessionStatus};
pub use identity::{Credentials, IdentityProvider, KeycloakProvider, TokenSet};
