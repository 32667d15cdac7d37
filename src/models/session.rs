// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Training sessions logged by athletes, with coach feedback.

use super::opaque_id;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

opaque_id!(
    /// Backend-assigned training session identifier.
    SessionId
);

/// Lowest accepted performance rating.
pub const MIN_PERFORMANCE_RATING: u8 = 1;
/// Highest accepted performance rating.
pub const MAX_PERFORMANCE_RATING: u8 = 5;

/// When a session took place. Backends send either a full timestamp or a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionDate {
    Timestamp(DateTime<Utc>),
    Day(NaiveDate),
}

impl SessionDate {
    /// Calendar day of the session (UTC).
    pub fn day(&self) -> NaiveDate {
        match self {
            SessionDate::Timestamp(ts) => ts.date_naive(),
            SessionDate::Day(day) => *day,
        }
    }
}

impl fmt::Display for SessionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionDate::Timestamp(ts) => f.write_str(&crate::time_utils::format_utc_rfc3339(*ts)),
            SessionDate::Day(day) => write!(f, "{}", day.format("%Y-%m-%d")),
        }
    }
}

/// A logged workout belonging to exactly one athlete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSession {
    pub id: SessionId,
    pub date: SessionDate,
    /// Coach note
    #[serde(default, alias = "trainer_feedback")]
    pub feedback: Option<String>,
    /// Coach score, 1 to 5
    #[serde(default)]
    pub performance_rating: Option<u8>,
}

/// Partial update body for `PATCH /trainer/sessions/{id}/feedback`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackUpdate {
    pub feedback: String,
    pub performance_rating: u8,
}

impl FeedbackUpdate {
    pub fn new(feedback: impl Into<String>, performance_rating: u8) -> Self {
        Self {
            feedback: feedback.into(),
            performance_rating,
        }
    }

    /// Reject ratings outside the accepted scale.
    pub fn check_rating(&self) -> Result<(), String> {
        if (MIN_PERFORMANCE_RATING..=MAX_PERFORMANCE_RATING).contains(&self.performance_rating) {
            Ok(())
        } else {
            Err(format!(
                "performance_rating must be between {} and {}, got {}",
                MIN_PERFORMANCE_RATING, MAX_PERFORMANCE_RATING, self.performance_rating
            ))
        }
    }
}
