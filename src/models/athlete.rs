// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Athlete (client) records managed by the coach.

use super::opaque_id;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

opaque_id!(
    /// Backend-assigned athlete identifier, immutable once created.
    AthleteId
);

/// Athlete record as returned by the directory service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteRecord {
    pub id: AthleteId,
    /// Display name (never empty for records created through this console)
    pub name: String,
    /// Training objective
    #[serde(default)]
    pub goal: Option<String>,
    /// Free-text coach notes
    #[serde(default)]
    pub profile: Option<String>,
}

impl AthleteRecord {
    /// Case-insensitive substring match on name or goal.
    ///
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(needle)
            || self
                .goal
                .as_deref()
                .is_some_and(|goal| goal.to_lowercase().contains(needle))
    }

    /// Goal text, or `None` when missing or blank.
    pub fn active_goal(&self) -> Option<&str> {
        self.goal.as_deref().filter(|g| !g.trim().is_empty())
    }

    /// The full current field set, as sent with an update.
    pub fn fields(&self) -> AthleteFields {
        AthleteFields {
            name: self.name.clone(),
            goal: self.goal.clone().unwrap_or_default(),
            profile: self.profile.clone(),
        }
    }
}

/// Request body for creating or updating an athlete.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Validate)]
pub struct AthleteFields {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[validate(custom(function = "not_blank"))]
    pub goal: String,
    pub profile: Option<String>,
}

impl AthleteFields {
    pub fn new(
        name: impl Into<String>,
        goal: impl Into<String>,
        profile: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            goal: goal.into(),
            profile: profile.filter(|p| !p.is_empty()),
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, name: &str, goal: Option<&str>) -> AthleteRecord {
        AthleteRecord {
            id: AthleteId::new(id.to_string()),
            name: name.to_string(),
            goal: goal.map(str::to_string),
            profile: None,
        }
    }

    #[test]
    fn test_matches_name_or_goal_case_insensitive() {
        let alex = record(1, "Alex", Some("Marathon"));
        assert!(alex.matches("mar"));
        assert!(alex.matches("ale"));
        assert!(alex.matches(""));
        assert!(!alex.matches("strength"));

        let no_goal = record(2, "Sam", None);
        assert!(!no_goal.matches("mar"));
    }

    #[test]
    fn test_deserialize_numeric_and_string_ids() {
        let numeric: AthleteRecord =
            serde_json::from_str(r#"{"id": 7, "name": "Jo", "goal": null}"#).unwrap();
        assert_eq!(numeric.id.as_str(), "7");
        assert!(numeric.profile.is_none());

        let uuid: AthleteRecord = serde_json::from_str(
            r#"{"id": "7f1c9a52-0000-4000-8000-000000000000", "name": "Jo", "goal": "5k", "profile": ""}"#,
        )
        .unwrap();
        assert_eq!(uuid.goal.as_deref(), Some("5k"));
    }

    #[test]
    fn test_fields_validation() {
        assert!(AthleteFields::new("Jo", "5k", None).validate().is_ok());
        assert!(AthleteFields::new("", "5k", None).validate().is_err());
        assert!(AthleteFields::new("Jo", "   ", None).validate().is_err());
    }

    #[test]
    fn test_empty_profile_dropped() {
        let fields = AthleteFields::new("Jo", "5k", Some(String::new()));
        assert!(fields.profile.is_none());
    }

    #[test]
    fn test_active_goal_ignores_blank() {
        assert_eq!(record(1, "A", Some("  ")).active_goal(), None);
        assert_eq!(record(1, "A", Some("Row")).active_goal(), Some("Row"));
    }
}
