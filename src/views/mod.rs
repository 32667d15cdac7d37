// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! View-level state: each page owns its fetched snapshot and drafts.

pub mod directory;
pub mod form;
pub mod gate;
pub mod notice;
pub mod sessions;

pub use directory::{filter_records, DashboardSummary, DirectoryStore, LoadState, Modal, RemoveOutcome};
pub use form::{AthleteDraft, AthleteForm};
pub use gate::{ResponseGate, Ticket};
pub use notice::{Level, Notice, Notices};
pub use sessions::{FeedbackDrafts, SessionHistory, DEFAULT_PERFORMANCE_RATING};

/// Explicit confirmation step in front of destructive actions.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}
