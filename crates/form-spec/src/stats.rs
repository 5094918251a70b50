use serde::{Deserialize, Serialize};

use crate::answers::Response;
use crate::score::{ScoreReport, score};
use crate::spec::form::Form;

/// Per-question aggregate across all stored responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionStats {
    pub question_id: u64,
    /// Responses that answered at least one part of this question.
    pub attempts: usize,
    /// Mean correct fraction over those attempts.
    pub average_fraction: f64,
}

/// Aggregate statistics for a form's stored responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseStats {
    pub total_responses: usize,
    /// Mean aggregate score over responses that attempted anything.
    pub average_score: f64,
    pub per_question: Vec<QuestionStats>,
}

/// Score every stored response and fold the reports into per-form and
/// per-question aggregates.
pub fn response_stats(form: &Form, responses: &[Response]) -> ResponseStats {
    let reports: Vec<ScoreReport> = responses
        .iter()
        .map(|response| score(form, response))
        .collect();

    let scored: Vec<&ScoreReport> = reports
        .iter()
        .filter(|report| report.attempted > 0)
        .collect();
    let average_score = if scored.is_empty() {
        0.0
    } else {
        scored.iter().map(|report| report.aggregate).sum::<f64>() / scored.len() as f64
    };

    let per_question = (0..form.questions.len())
        .map(|index| {
            let attempts: Vec<f64> = reports
                .iter()
                .filter_map(|report| report.per_question.get(index))
                .filter(|question| question.attempted_any())
                .map(|question| question.fraction())
                .collect();
            let average_fraction = if attempts.is_empty() {
                0.0
            } else {
                attempts.iter().sum::<f64>() / attempts.len() as f64
            };
            QuestionStats {
                question_id: index as u64,
                attempts: attempts.len(),
                average_fraction,
            }
        })
        .collect();

    ResponseStats {
        total_responses: responses.len(),
        average_score,
        per_question,
    }
}
