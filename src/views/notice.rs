// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Transient user-visible notifications.

use crate::error::ApiError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Oldest notices are dropped past this many.
const MAX_NOTICES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    pub message: String,
}

/// Shared notice queue. Clones push into the same queue.
#[derive(Debug, Clone, Default)]
pub struct Notices {
    queue: Arc<Mutex<VecDeque<Notice>>>,
}

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, level: Level, message: impl Into<String>) {
        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        if queue.len() == MAX_NOTICES {
            queue.pop_front();
        }
        queue.push_back(Notice {
            level,
            message: message.into(),
        });
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(Level::Info, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(Level::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(Level::Error, message);
    }

    /// Turn a failed action into an error notice.
    pub fn report(&self, action: &str, err: &ApiError) {
        tracing::warn!(action, error = %err, "Action failed");
        let message = match err {
            ApiError::AuthExpired => "Your session has expired. Please log in again.".to_string(),
            ApiError::ValidationFault(reason) => format!("{}: {}", action, reason),
            _ => format!("{}. Please try again.", action),
        };
        self.error(message);
    }

    /// Take every pending notice, oldest first.
    pub fn drain(&self) -> Vec<Notice> {
        self.queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_maps_faults() {
        let notices = Notices::new();
        notices.report("Failed to load athletes", &ApiError::NetworkFault("reset".into()));
        notices.report("Failed to save athlete", &ApiError::AuthExpired);

        let drained = notices.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].level, Level::Error);
        assert_eq!(drained[0].message, "Failed to load athletes. Please try again.");
        assert!(drained[1].message.contains("log in again"));
        assert!(notices.is_empty());
    }

    #[test]
    fn test_queue_is_bounded() {
        let notices = Notices::new();
        for i in 0..(MAX_NOTICES + 5) {
            notices.info(format!("n{}", i));
        }
        let drained = notices.drain();
        assert_eq!(drained.len(), MAX_NOTICES);
        assert_eq!(drained[0].message, "n5");
    }
}
