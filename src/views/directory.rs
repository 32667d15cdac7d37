// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Athlete directory page state.
//!
//! The record list is a read-through cache of the directory service: it is
//! replaced wholesale by [`DirectoryStore::refresh`] and never patched
//! locally. Every create, edit or delete that reached the service is
//! followed by a refresh.

use crate::error::ApiError;
use crate::models::{AthleteId, AthleteRecord};
use crate::services::ApiClient;
use crate::views::form::AthleteForm;
use crate::views::gate::ResponseGate;
use crate::views::notice::Notices;
use crate::views::Confirm;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed,
}

/// Create/edit dialog state.
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    Closed,
    Creating,
    Editing(AthleteRecord),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Cancelled,
    Removed,
    Failed,
}

/// Headline numbers for the dashboard page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardSummary {
    pub total: usize,
    /// Athletes with a non-empty goal
    pub active_goals: usize,
}

impl DashboardSummary {
    pub fn from_records(records: &[AthleteRecord]) -> Self {
        Self {
            total: records.len(),
            active_goals: records.iter().filter(|r| r.active_goal().is_some()).count(),
        }
    }
}

/// Records whose name or goal contains `filter`, case-insensitively, in order.
///
/// Lazy and restartable: clone the iterator to walk it again.
pub fn filter_records<'a>(
    records: &'a [AthleteRecord],
    filter: &str,
) -> impl Iterator<Item = &'a AthleteRecord> + Clone + 'a {
    let needle = filter.to_lowercase();
    records.iter().filter(move |r| r.matches(&needle))
}

#[derive(Debug)]
struct DirectoryState {
    records: Vec<AthleteRecord>,
    filter_text: String,
    modal: Modal,
    load_state: LoadState,
}

/// State behind the "My Athletes" page.
pub struct DirectoryStore {
    api: ApiClient,
    notices: Notices,
    gate: ResponseGate,
    state: Mutex<DirectoryState>,
}

impl DirectoryStore {
    pub fn new(api: ApiClient, notices: Notices) -> Self {
        Self {
            api,
            notices,
            gate: ResponseGate::new(),
            state: Mutex::new(DirectoryState {
                records: Vec::new(),
                filter_text: String::new(),
                modal: Modal::Closed,
                load_state: LoadState::Loading,
            }),
        }
    }

    /// Re-fetch the full athlete list.
    ///
    /// Returns true when the fetch succeeded. A response overtaken by a newer
    /// refresh, or arriving after [`Self::deactivate`], is discarded.
    pub async fn refresh(&self) -> bool {
        let ticket = self.gate.issue();
        self.lock().load_state = LoadState::Loading;

        let result = self.api.list_athletes().await;

        let mut state = self.lock();
        if !self.gate.admit(ticket) {
            tracing::debug!(?ticket, "Discarding stale athlete list");
            return result.is_ok();
        }

        let latest = self.gate.is_latest(ticket);
        match result {
            Ok(records) => {
                tracing::debug!(count = records.len(), "Athlete list loaded");
                state.records = records;
                state.load_state = if latest { LoadState::Ready } else { LoadState::Loading };
                true
            }
            Err(e) => {
                state.load_state = LoadState::Failed;
                drop(state);
                self.notices.report("Failed to load athletes", &e);
                false
            }
        }
    }

    pub fn load_state(&self) -> LoadState {
        self.lock().load_state
    }

    /// Snapshot of every cached record.
    pub fn records(&self) -> Vec<AthleteRecord> {
        self.lock().records.clone()
    }

    pub fn set_filter(&self, text: impl Into<String>) {
        self.lock().filter_text = text.into();
    }

    pub fn filter_text(&self) -> String {
        self.lock().filter_text.clone()
    }

    /// Records matching the current filter, recomputed on every call.
    pub fn filtered(&self) -> Vec<AthleteRecord> {
        let state = self.lock();
        filter_records(&state.records, &state.filter_text)
            .cloned()
            .collect()
    }

    pub fn find(&self, id: &AthleteId) -> Option<AthleteRecord> {
        self.lock().records.iter().find(|r| &r.id == id).cloned()
    }

    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary::from_records(&self.lock().records)
    }

    // ─── Create / edit dialog ────────────────────────────────────────────

    pub fn modal(&self) -> Modal {
        self.lock().modal.clone()
    }

    pub fn open_create(&self) -> AthleteForm {
        self.lock().modal = Modal::Creating;
        AthleteForm::create()
    }

    /// Open the edit dialog for a cached record; `None` if it is not cached.
    pub fn open_edit(&self, id: &AthleteId) -> Option<AthleteForm> {
        let mut state = self.lock();
        let record = state.records.iter().find(|r| &r.id == id).cloned()?;
        state.modal = Modal::Editing(record.clone());
        Some(AthleteForm::edit(record))
    }

    pub fn close_modal(&self) {
        self.lock().modal = Modal::Closed;
    }

    /// Submit the form; on success close the dialog and refresh.
    ///
    /// On failure the dialog stays open and the form keeps its draft.
    pub async fn submit(&self, form: &AthleteForm) -> Option<AthleteRecord> {
        let editing = form.editing().is_some();
        match form.submit(&self.api).await {
            Ok(record) => {
                self.notices.success(if editing {
                    "Athlete profile updated successfully"
                } else {
                    "New athlete added successfully"
                });
                self.close_modal();
                self.refresh().await;
                Some(record)
            }
            Err(e) => {
                self.notices.report("Failed to save athlete", &e);
                if reached_service(&e) {
                    self.refresh().await;
                }
                None
            }
        }
    }

    /// Delete an athlete after explicit confirmation.
    pub async fn remove(&self, id: &AthleteId, confirm: &dyn Confirm) -> RemoveOutcome {
        if !confirm.confirm("Remove athlete profile? This action cannot be undone.") {
            return RemoveOutcome::Cancelled;
        }

        let result = self.api.delete_athlete(id).await;
        let outcome = match &result {
            Ok(()) => {
                self.notices.success("Athlete removed successfully");
                RemoveOutcome::Removed
            }
            Err(e) => {
                self.notices.report("Failed to delete athlete", e);
                RemoveOutcome::Failed
            }
        };

        if result.as_ref().map_or_else(reached_service, |_| true) {
            self.refresh().await;
        }
        outcome
    }

    /// Stop applying responses; called when the page goes away.
    pub fn deactivate(&self) {
        self.gate.deactivate();
    }

    fn lock(&self) -> MutexGuard<'_, DirectoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// False when the failure happened before any request was sent.
fn reached_service(err: &ApiError) -> bool {
    !matches!(err, ApiError::ValidationFault(_) | ApiError::AuthExpired)
}
