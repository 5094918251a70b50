use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::question::{IntegrityError, Question};

/// Top-level form document: an ordered sequence of questions plus publish
/// state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    /// Store-assigned identifier; empty until first saved.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Opaque asset reference, resolved by the upload collaborator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_image: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    /// Refreshed by the store on every save.
    pub updated_at: DateTime<Utc>,
}

impl Form {
    /// New unsaved draft with both timestamps set to `now`.
    pub fn new(title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            description: None,
            header_image: None,
            questions: Vec::new(),
            is_published: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Toggle publish state. Deliberately does not validate question
    /// completeness; a draft with broken questions can still be published.
    pub fn set_published(&mut self, published: bool) {
        self.is_published = published;
    }

    /// Integrity findings across all questions, paired with each question's
    /// 0-based position. Advisory; see [`Question::integrity_errors`].
    pub fn integrity_report(&self) -> Vec<(usize, IntegrityError)> {
        self.questions
            .iter()
            .enumerate()
            .flat_map(|(index, question)| {
                question
                    .integrity_errors()
                    .into_iter()
                    .map(move |error| (index, error))
            })
            .collect()
    }
}
