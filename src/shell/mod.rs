// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Console shell: command-line pages on top of the view state.

pub mod prompt;
pub mod render;

use crate::models::{AthleteId, SessionId};
use crate::services::{AuthSession, SessionStatus};
use crate::time_utils::remaining_label;
use crate::views::{Confirm, DirectoryStore, LoadState, RemoveOutcome, SessionHistory};
use crate::Console;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::task::JoinHandle;

#[derive(Parser)]
#[command(name = "coach-console")]
#[command(version, about = "Trainer console for athlete records and session feedback")]
pub struct Cli {
    /// Skip confirmation prompts
    #[arg(long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub page: Page,
}

#[derive(Subcommand)]
pub enum Page {
    /// Show the signed-in coach
    Whoami,
    /// End the session
    Logout,
    /// Athlete overview
    Dashboard,
    /// Manage the athlete directory
    Athletes {
        #[command(subcommand)]
        command: AthleteCommand,
    },
    /// Session history and feedback
    Sessions {
        #[command(subcommand)]
        command: SessionCommand,
    },
}

#[derive(Subcommand)]
pub enum AthleteCommand {
    /// List athletes, optionally filtered by name or goal
    List {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one athlete with their sessions
    Show { id: String },
    /// Add a new athlete
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        goal: String,
        #[arg(long)]
        profile: Option<String>,
    },
    /// Edit an athlete; omitted fields keep their current value
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        goal: Option<String>,
        #[arg(long)]
        profile: Option<String>,
    },
    /// Remove an athlete
    Remove { id: String },
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// List an athlete's sessions
    List { athlete_id: String },
    /// Leave feedback on a session
    Feedback {
        athlete_id: String,
        session_id: String,
        #[arg(short, long)]
        text: String,
        /// 1 to 5
        #[arg(short, long)]
        rating: Option<u8>,
    },
}

/// Re-run the login flow whenever the session reports that one is required.
pub fn spawn_login_watcher(session: Arc<AuthSession>) -> JoinHandle<()> {
    let mut status = session.subscribe();
    tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let current = *status.borrow_and_update();
            if current != SessionStatus::LoginRequired {
                continue;
            }
            tracing::info!("Session expired, starting a new login");
            if let Err(e) = session.login().await {
                tracing::warn!(error = %e, "Re-login failed");
            }
        }
    })
}

/// Render the chrome and the requested page. Returns whether the page's action succeeded.
pub async fn run(cli: &Cli, console: &Console) -> bool {
    let identity = console.session.current_identity();
    let token_left = console
        .session
        .token_expiry()
        .map(|exp| remaining_label(exp, chrono::Utc::now()));
    render::chrome(&identity, token_left.as_deref());

    let ok = match &cli.page {
        Page::Whoami => true,
        Page::Logout => {
            console.session.logout().await;
            console.notices.info("Logged out");
            true
        }
        Page::Dashboard => dashboard(console).await,
        Page::Athletes { command } => athletes(cli, console, command).await,
        Page::Sessions { command } => sessions(console, command).await,
    };

    render::notices(&console.notices.drain());
    ok
}

async fn dashboard(console: &Console) -> bool {
    let store = directory(console);
    let ok = store.refresh().await;
    if ok {
        render::dashboard(&store.summary());
    }
    store.deactivate();
    ok
}

async fn athletes(cli: &Cli, console: &Console, command: &AthleteCommand) -> bool {
    let store = directory(console);
    let ok = match command {
        AthleteCommand::List { search } => {
            let ok = store.refresh().await;
            store.set_filter(search.clone().unwrap_or_default());
            if store.load_state() == LoadState::Ready {
                render::athletes(&store.filtered(), &store.filter_text());
            }
            ok
        }
        AthleteCommand::Show { id } => show_athlete(console, &AthleteId::new(id.as_str())).await,
        AthleteCommand::Add {
            name,
            goal,
            profile,
        } => {
            let mut form = store.open_create();
            form.set_name(name.as_str());
            form.set_goal(goal.as_str());
            form.set_profile(profile.clone().unwrap_or_default());
            submit_form(&store, &form, console).await
        }
        AthleteCommand::Edit {
            id,
            name,
            goal,
            profile,
        } => {
            let id = AthleteId::new(id.as_str());
            if !store.refresh().await {
                store.deactivate();
                return false;
            }
            let Some(mut form) = store.open_edit(&id) else {
                console.notices.error(format!("Athlete {} not found", id));
                store.deactivate();
                return false;
            };
            if let Some(name) = name {
                form.set_name(name.as_str());
            }
            if let Some(goal) = goal {
                form.set_goal(goal.as_str());
            }
            if let Some(profile) = profile {
                form.set_profile(profile.as_str());
            }
            submit_form(&store, &form, console).await
        }
        AthleteCommand::Remove { id } => {
            let confirm: Box<dyn Confirm> = if cli.yes {
                Box::new(|_: &str| true)
            } else {
                Box::new(prompt::confirm)
            };
            let outcome = store.remove(&AthleteId::new(id.as_str()), confirm.as_ref()).await;
            if outcome == RemoveOutcome::Cancelled {
                console.notices.info("Removal cancelled");
            }
            outcome != RemoveOutcome::Failed
        }
    };
    store.deactivate();
    ok
}

async fn submit_form(
    store: &DirectoryStore,
    form: &crate::views::AthleteForm,
    console: &Console,
) -> bool {
    if !form.can_submit() {
        console
            .notices
            .error("Name and goal are required before saving");
        store.close_modal();
        return false;
    }
    match store.submit(form).await {
        Some(record) => {
            render::athlete(&record);
            true
        }
        None => false,
    }
}

async fn show_athlete(console: &Console, id: &AthleteId) -> bool {
    let record = match console.api.get_athlete_by_id(id).await {
        Ok(record) => record,
        Err(e) => {
            console.notices.report("Failed to load athlete", &e);
            return false;
        }
    };
    render::athlete(&record);
    println!();

    let history = session_history(console);
    let ok = history.load_sessions(id).await;
    if ok {
        render::sessions(&history.sessions());
    }
    history.deactivate();
    ok
}

async fn sessions(console: &Console, command: &SessionCommand) -> bool {
    let history = session_history(console);
    let ok = match command {
        SessionCommand::List { athlete_id } => {
            let ok = history.load_sessions(&AthleteId::new(athlete_id.as_str())).await;
            if ok {
                render::sessions(&history.sessions());
            }
            ok
        }
        SessionCommand::Feedback {
            athlete_id,
            session_id,
            text,
            rating,
        } => {
            let session_id = SessionId::new(session_id.as_str());
            if !history.load_sessions(&AthleteId::new(athlete_id.as_str())).await {
                history.deactivate();
                return false;
            }
            history.set_draft(&session_id, text.as_str());
            if let Some(rating) = rating {
                history.set_rating(&session_id, *rating);
            }
            let ok = history.submit_feedback(&session_id).await;
            if ok {
                render::sessions(&history.sessions());
            }
            ok
        }
    };
    history.deactivate();
    ok
}

fn directory(console: &Console) -> DirectoryStore {
    DirectoryStore::new(console.api.clone(), console.notices.clone())
}

fn session_history(console: &Console) -> SessionHistory {
    SessionHistory::new(console.api.clone(), console.notices.clone())
}
