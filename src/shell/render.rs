// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Terminal rendering of pages and notices.

use crate::models::{AthleteRecord, Identity, TrainingSession};
use crate::views::{DashboardSummary, Level, Notice};
use console::{style, Emoji};

static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR] ");
static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[i] ");

/// Header shown above every page.
pub fn chrome(identity: &Identity, token_left: Option<&str>) {
    let email = identity
        .email
        .as_deref()
        .map(|e| format!(" <{}>", e))
        .unwrap_or_default();
    println!(
        "{} {}{}",
        style(format!("[{}]", identity.initial())).cyan().bold(),
        style(&identity.display_name).bold(),
        style(email).dim()
    );
    if let Some(left) = token_left {
        println!("{}", style(format!("token valid for {}", left)).dim());
    }
    println!();
}

pub fn dashboard(summary: &DashboardSummary) {
    println!("{}", style("Athlete Overview").bold().underlined());
    println!("  Total athletes   {}", style(summary.total).cyan());
    println!("  Active goals     {}", style(summary.active_goals).cyan());
}

pub fn athletes(records: &[AthleteRecord], filter: &str) {
    println!("{}", style("My Athletes").bold().underlined());
    if !filter.is_empty() {
        println!("{}", style(format!("search: {:?}", filter)).dim());
    }
    if records.is_empty() {
        println!("No athletes found. Try adjusting your search or add a new athlete.");
        return;
    }
    for record in records {
        athlete_line(record);
    }
}

fn athlete_line(record: &AthleteRecord) {
    println!(
        "  {}  {}  {}",
        style(record.id.as_str()).dim(),
        style(&record.name).bold(),
        record.active_goal().unwrap_or("No goal set")
    );
    if let Some(profile) = record.profile.as_deref().filter(|p| !p.is_empty()) {
        println!("      {}", style(profile).italic());
    }
}

pub fn athlete(record: &AthleteRecord) {
    println!("{}", style(&record.name).bold().underlined());
    println!("  id     {}", record.id);
    println!("  goal   {}", record.active_goal().unwrap_or("No goal set"));
    if let Some(profile) = record.profile.as_deref().filter(|p| !p.is_empty()) {
        println!("  notes  {}", profile);
    }
}

pub fn sessions(sessions: &[TrainingSession]) {
    println!("{}", style("Session History").bold().underlined());
    if sessions.is_empty() {
        println!("No sessions logged yet.");
        return;
    }
    for session in sessions {
        let rating = session
            .performance_rating
            .map(|r| format!("{}/5", r))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {}  {}  {}  {}",
            style(session.id.as_str()).dim(),
            session.date,
            style(rating).cyan(),
            session.feedback.as_deref().unwrap_or("")
        );
    }
}

pub fn notices(notices: &[Notice]) {
    if !notices.is_empty() {
        eprintln!();
    }
    for notice in notices {
        match notice.level {
            Level::Success => eprintln!("{}{}", CHECK, style(&notice.message).green()),
            Level::Error => eprintln!("{}{}", CROSS, style(&notice.message).red()),
            Level::Info => eprintln!("{}{}", INFO, notice.message),
        }
    }
}
