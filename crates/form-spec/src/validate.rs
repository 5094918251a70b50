use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::answers::{AcceptedAnswer, AnswerEntry, Response};
use crate::spec::form::Form;
use crate::spec::question::QuestionType;
use crate::store::{FormStore, StoreError};

/// Rejection reasons for a submission.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Form not found")]
    FormNotFound,
    #[error("Form is not published")]
    FormNotPublished,
    #[error("At least one answered question is required")]
    EmptySubmission,
    /// `position` is 1-based and counts the submitted sequence, before
    /// empty entries are filtered out.
    #[error("Response {position}: {field} is required")]
    MalformedEntry { position: usize, field: &'static str },
    #[error(transparent)]
    Store(StoreError),
}

/// Variant-specific emptiness rule. An entry echoing one of the known
/// question types is empty iff its answer mapping has zero entries; anything
/// else falls back to null-or-empty-string.
fn is_empty_answer(entry: &AnswerEntry) -> bool {
    let known = entry
        .kind
        .as_deref()
        .is_some_and(|kind| kind.parse::<QuestionType>().is_ok());
    match &entry.answer {
        Value::Null => true,
        Value::Object(map) if known => map.is_empty(),
        Value::String(text) if !known => text.is_empty(),
        _ => false,
    }
}

/// Check a candidate submission against a loaded form.
///
/// Unanswered entries are filtered out first; at least one answered question
/// must remain, the form must be published, and each surviving entry must
/// carry `questionId` (0 is a legal value), `type`, and a non-null `answer`.
/// Accepted entries keep their submitted order.
///
/// `questionId` is not cross-checked against the form's question count, and
/// the echoed `type` is not checked against the question's actual type:
/// out-of-range or mislabeled entries are stored as submitted. Tightening
/// either check would be a behavior change, not a fix.
pub fn validate(form: &Form, entries: &[AnswerEntry]) -> Result<Vec<AcceptedAnswer>, SubmitError> {
    let survivors: Vec<(usize, &AnswerEntry)> = entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| !is_empty_answer(entry))
        .collect();

    if survivors.is_empty() {
        return Err(SubmitError::EmptySubmission);
    }

    if !form.is_published {
        return Err(SubmitError::FormNotPublished);
    }

    let mut accepted = Vec::with_capacity(survivors.len());
    for (index, entry) in survivors {
        let position = index + 1;
        let Some(question_id) = entry.question_id else {
            return Err(SubmitError::MalformedEntry {
                position,
                field: "questionId",
            });
        };
        let Some(kind) = entry.kind.clone() else {
            return Err(SubmitError::MalformedEntry {
                position,
                field: "type",
            });
        };
        if entry.answer.is_null() {
            return Err(SubmitError::MalformedEntry {
                position,
                field: "answer",
            });
        }
        accepted.push(AcceptedAnswer {
            question_id,
            kind,
            answer: entry.answer.clone(),
        });
    }

    Ok(accepted)
}

/// Submission boundary: load the form, validate the candidate entries, and
/// persist the accepted response.
///
/// A store not-found maps to [`SubmitError::FormNotFound`]; every other
/// store failure propagates untouched.
pub fn submit(
    store: &mut dyn FormStore,
    form_id: &str,
    entries: &[AnswerEntry],
    now: DateTime<Utc>,
) -> Result<Response, SubmitError> {
    let form = match store.load_form(form_id) {
        Ok(form) => form,
        Err(StoreError::NotFound(_)) => return Err(SubmitError::FormNotFound),
        Err(error) => return Err(SubmitError::Store(error)),
    };

    let accepted = validate(&form, entries)?;
    store
        .save_response(Response::new(form_id, accepted, now))
        .map_err(SubmitError::Store)
}
