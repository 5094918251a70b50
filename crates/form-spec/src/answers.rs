use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One candidate per-question entry of a submission, before validation.
///
/// Deliberately loose: `type` is the client's echo of the question type and
/// unknown values must survive deserialization (they select the fallback
/// emptiness rule), `answer` is the raw variant payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerEntry {
    /// 0-based index into the target form's question sequence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<u64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub answer: Value,
}

impl AnswerEntry {
    pub fn new(question_id: u64, kind: impl Into<String>, answer: Value) -> Self {
        Self {
            question_id: Some(question_id),
            kind: Some(kind.into()),
            answer,
        }
    }
}

/// A validated entry: the required fields are proven present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedAnswer {
    pub question_id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub answer: Value,
}

/// Wire envelope accepted by the submission boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionInput {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub form_id: String,
    #[serde(default)]
    pub responses: Vec<AnswerEntry>,
}

/// One respondent's stored submission. Created once at submission and
/// immutable thereafter; removed only when its form is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// Store-assigned identifier; empty until saved.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub form_id: String,
    pub responses: Vec<AcceptedAnswer>,
    pub submitted_at: DateTime<Utc>,
}

impl Response {
    pub fn new(
        form_id: impl Into<String>,
        responses: Vec<AcceptedAnswer>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: String::new(),
            form_id: form_id.into(),
            responses,
            submitted_at,
        }
    }

    /// First accepted answer for a question index, if any. Later duplicates
    /// for the same index are stored but never win.
    pub fn answer_for(&self, question_id: u64) -> Option<&AcceptedAnswer> {
        self.responses
            .iter()
            .find(|entry| entry.question_id == question_id)
    }
}
