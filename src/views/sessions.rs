// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session history page: an athlete's sessions and per-session feedback drafts.

use crate::error::ApiError;
use crate::models::{AthleteId, FeedbackUpdate, SessionId, TrainingSession};
use crate::services::ApiClient;
use crate::views::directory::LoadState;
use crate::views::gate::ResponseGate;
use crate::views::notice::Notices;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Rating sent with feedback when none was picked.
pub const DEFAULT_PERFORMANCE_RATING: u8 = 5;

/// Pending feedback, keyed by session, for the lifetime of the page.
#[derive(Debug, Clone, Default)]
pub struct FeedbackDrafts {
    text: HashMap<SessionId, String>,
    rating: HashMap<SessionId, u8>,
}

impl FeedbackDrafts {
    pub fn set_text(&mut self, session_id: SessionId, text: impl Into<String>) {
        self.text.insert(session_id, text.into());
    }

    pub fn set_rating(&mut self, session_id: SessionId, rating: u8) {
        self.rating.insert(session_id, rating);
    }

    pub fn text(&self, session_id: &SessionId) -> Option<&str> {
        self.text.get(session_id).map(String::as_str)
    }

    pub fn rating(&self, session_id: &SessionId) -> u8 {
        self.rating
            .get(session_id)
            .copied()
            .unwrap_or(DEFAULT_PERFORMANCE_RATING)
    }

    /// The update to send for `session_id`, if any text is pending.
    pub fn update_for(&self, session_id: &SessionId) -> Option<FeedbackUpdate> {
        let text = self.text(session_id)?.trim();
        if text.is_empty() {
            return None;
        }
        Some(FeedbackUpdate::new(text, self.rating(session_id)))
    }

    pub fn discard(&mut self, session_id: &SessionId) {
        self.text.remove(session_id);
        self.rating.remove(session_id);
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.rating.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.rating.is_empty()
    }
}

#[derive(Debug)]
struct SessionsState {
    athlete_id: Option<AthleteId>,
    sessions: Vec<TrainingSession>,
    load_state: LoadState,
    drafts: FeedbackDrafts,
}

/// State behind an athlete's session history.
pub struct SessionHistory {
    api: ApiClient,
    notices: Notices,
    gate: ResponseGate,
    state: Mutex<SessionsState>,
}

impl SessionHistory {
    pub fn new(api: ApiClient, notices: Notices) -> Self {
        Self {
            api,
            notices,
            gate: ResponseGate::new(),
            state: Mutex::new(SessionsState {
                athlete_id: None,
                sessions: Vec::new(),
                load_state: LoadState::Loading,
                drafts: FeedbackDrafts::default(),
            }),
        }
    }

    /// Fetch and replace the session list for `athlete_id`.
    ///
    /// Switching to another athlete discards pending drafts. On failure the
    /// list is left empty.
    pub async fn load_sessions(&self, athlete_id: &AthleteId) -> bool {
        let ticket = self.gate.issue();
        {
            let mut state = self.lock();
            if state.athlete_id.as_ref() != Some(athlete_id) {
                state.athlete_id = Some(athlete_id.clone());
                state.sessions.clear();
                state.drafts.clear();
            }
            state.load_state = LoadState::Loading;
        }

        let result = self.api.list_sessions(athlete_id).await;

        let mut state = self.lock();
        if !self.gate.admit(ticket) || state.athlete_id.as_ref() != Some(athlete_id) {
            tracing::debug!(athlete_id = %athlete_id, "Discarding stale session list");
            return result.is_ok();
        }

        match result {
            Ok(sessions) => {
                tracing::debug!(athlete_id = %athlete_id, count = sessions.len(), "Sessions loaded");
                state.sessions = sessions;
                state.load_state = if self.gate.is_latest(ticket) {
                    LoadState::Ready
                } else {
                    LoadState::Loading
                };
                true
            }
            Err(e) => {
                state.sessions.clear();
                state.load_state = LoadState::Failed;
                drop(state);
                self.notices.report("Failed to load sessions", &e);
                false
            }
        }
    }

    pub fn sessions(&self) -> Vec<TrainingSession> {
        self.lock().sessions.clone()
    }

    pub fn load_state(&self) -> LoadState {
        self.lock().load_state
    }

    pub fn athlete_id(&self) -> Option<AthleteId> {
        self.lock().athlete_id.clone()
    }

    /// Edit one session's pending note without touching the others.
    pub fn set_draft(&self, session_id: &SessionId, text: impl Into<String>) {
        self.lock().drafts.set_text(session_id.clone(), text);
    }

    pub fn set_rating(&self, session_id: &SessionId, rating: u8) {
        self.lock().drafts.set_rating(session_id.clone(), rating);
    }

    pub fn draft(&self, session_id: &SessionId) -> Option<String> {
        self.lock().drafts.text(session_id).map(str::to_string)
    }

    /// Send the pending note for `session_id`, then reload the whole list.
    pub async fn submit_feedback(&self, session_id: &SessionId) -> bool {
        let (update, athlete_id) = {
            let state = self.lock();
            (state.drafts.update_for(session_id), state.athlete_id.clone())
        };

        let Some(update) = update else {
            self.notices.report(
                "Failed to save feedback",
                &ApiError::ValidationFault("feedback text is empty".to_string()),
            );
            return false;
        };

        match self.api.update_session_feedback(session_id, &update).await {
            Ok(_) => {
                self.lock().drafts.discard(session_id);
                self.notices.success("Feedback saved");
                if let Some(athlete_id) = athlete_id {
                    self.load_sessions(&athlete_id).await;
                }
                true
            }
            Err(e) => {
                self.notices.report("Failed to save feedback", &e);
                false
            }
        }
    }

    /// Stop applying responses; pending drafts die with the page.
    pub fn deactivate(&self) {
        self.gate.deactivate();
    }

    fn lock(&self) -> MutexGuard<'_, SessionsState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drafts_are_independent_per_session() {
        let mut drafts = FeedbackDrafts::default();
        let s1 = SessionId::new("s1");
        let s2 = SessionId::new("s2");

        drafts.set_text(s1.clone(), "Great pace");
        drafts.set_text(s2.clone(), "Watch form");
        drafts.set_text(s1.clone(), "Great pace, strong finish");

        assert_eq!(drafts.text(&s1), Some("Great pace, strong finish"));
        assert_eq!(drafts.text(&s2), Some("Watch form"));

        drafts.discard(&s1);
        assert_eq!(drafts.text(&s1), None);
        assert_eq!(drafts.text(&s2), Some("Watch form"));
    }

    #[test]
    fn test_update_uses_default_rating() {
        let mut drafts = FeedbackDrafts::default();
        let s1 = SessionId::new("s1");
        assert!(drafts.update_for(&s1).is_none());

        drafts.set_text(s1.clone(), "   ");
        assert!(drafts.update_for(&s1).is_none());

        drafts.set_text(s1.clone(), "Great pace");
        let update = drafts.update_for(&s1).unwrap();
        assert_eq!(update.performance_rating, DEFAULT_PERFORMANCE_RATING);

        drafts.set_rating(s1.clone(), 3);
        assert_eq!(drafts.update_for(&s1).unwrap().performance_rating, 3);
    }
}
