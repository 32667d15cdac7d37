// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Coach Console
//!
//! Command-line trainer dashboard: lists, creates, edits and removes athlete
//! records and leaves feedback on their training sessions.

use anyhow::Context;
use clap::Parser;
use coach_console::{
    config::Config,
    services::{AuthSession, KeycloakProvider},
    shell::{self, prompt, Cli},
    Console,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging();

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!(api = %config.api_base_url, auth = %config.auth_url, "Configuration loaded");

    let credentials = prompt::credentials(&config)?;
    let provider = KeycloakProvider::new(&config, credentials)?;
    let session = Arc::new(AuthSession::new(Arc::new(provider)));

    if !session.init().await? {
        eprintln!("Login failed: check your username and password");
        return Ok(ExitCode::FAILURE);
    }

    let watcher = shell::spawn_login_watcher(session.clone());
    let console = Console::new(&config, session)?;

    let ok = shell::run(&cli, &console).await;
    watcher.abort();

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Initialize logging on stderr: JSON when `LOG_FORMAT=json`, compact text otherwise.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,coach_console=info"));

    let layer = if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(false)
            .with_current_span(true)
            .flatten_event(true)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry().with(filter).with(layer).init();
}
