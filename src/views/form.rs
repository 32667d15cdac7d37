// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Create/edit form for athlete records.

use crate::error::ApiError;
use crate::models::{AthleteFields, AthleteRecord};
use crate::services::ApiClient;
use validator::Validate;

/// Editable field values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AthleteDraft {
    pub name: String,
    pub goal: String,
    pub profile: String,
}

impl AthleteDraft {
    fn from_record(record: &AthleteRecord) -> Self {
        Self {
            name: record.name.clone(),
            goal: record.goal.clone().unwrap_or_default(),
            profile: record.profile.clone().unwrap_or_default(),
        }
    }

    pub fn to_fields(&self) -> AthleteFields {
        AthleteFields::new(
            self.name.trim(),
            self.goal.trim(),
            Some(self.profile.trim().to_string()),
        )
    }
}

/// Form state: blank for a new athlete, pre-filled when editing.
#[derive(Debug, Clone)]
pub struct AthleteForm {
    draft: AthleteDraft,
    editing: Option<AthleteRecord>,
}

impl AthleteForm {
    pub fn create() -> Self {
        Self {
            draft: AthleteDraft::default(),
            editing: None,
        }
    }

    pub fn edit(record: AthleteRecord) -> Self {
        Self {
            draft: AthleteDraft::from_record(&record),
            editing: Some(record),
        }
    }

    pub fn title(&self) -> &'static str {
        if self.editing.is_some() {
            "Edit Athlete Profile"
        } else {
            "Add New Athlete"
        }
    }

    pub fn editing(&self) -> Option<&AthleteRecord> {
        self.editing.as_ref()
    }

    pub fn draft(&self) -> &AthleteDraft {
        &self.draft
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
    }

    pub fn set_goal(&mut self, goal: impl Into<String>) {
        self.draft.goal = goal.into();
    }

    pub fn set_profile(&mut self, profile: impl Into<String>) {
        self.draft.profile = profile.into();
    }

    /// Name and goal are present.
    pub fn can_submit(&self) -> bool {
        self.draft.to_fields().validate().is_ok()
    }

    /// Create or update depending on whether a record is being edited.
    ///
    /// The draft is left untouched whatever the outcome, so a failed submit
    /// loses nothing. An invalid draft never reaches the network.
    pub async fn submit(&self, api: &ApiClient) -> Result<AthleteRecord, ApiError> {
        let fields = self.draft.to_fields();
        fields.validate()?;

        match &self.editing {
            Some(record) => api.update_athlete(&record.id, &fields).await,
            None => api.create_athlete(&fields).await,
        }
    }
}
