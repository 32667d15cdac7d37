// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Coach console: manage athlete records and session feedback
//!
//! This crate provides the client side of the trainer dashboard: an
//! authenticated session against the identity provider, a typed client for
//! the athlete directory service, and the per-page view state built on them.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod shell;
pub mod time_utils;
pub mod views;

use config::Config;
use services::{ApiClient, AuthSession};
use std::sync::Arc;
use views::Notices;

/// Shared console state, handed to every page.
pub struct Console {
    pub session: Arc<AuthSession>,
    pub api: ApiClient,
    pub notices: Notices,
}

impl Console {
    /// Wire a console around an existing session.
    pub fn new(config: &Config, session: Arc<AuthSession>) -> error::Result<Self> {
        let api = ApiClient::new(config, session.clone())?;
        Ok(Self {
            session,
            api,
            notices: Notices::new(),
        })
    }
}
