// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Interactive terminal prompts.

use crate::config::Config;
use crate::services::Credentials;
use anyhow::Context;
use dialoguer::{Confirm, Input, Password};

/// Credentials from config, prompting for whatever is missing.
pub fn credentials(config: &Config) -> anyhow::Result<Credentials> {
    let username = match &config.username {
        Some(u) => u.clone(),
        None => Input::new()
            .with_prompt("Username")
            .interact_text()
            .context("failed reading username")?,
    };

    let password = match &config.password {
        Some(p) => p.clone(),
        None => Password::new()
            .with_prompt(format!("Password for {}", username))
            .interact()
            .context("failed reading password")?,
    };

    Ok(Credentials { username, password })
}

/// Yes/no question on the terminal, defaulting to "no".
pub fn confirm(prompt: &str) -> bool {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .unwrap_or(false)
}
