use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::answers::Response;
use crate::spec::form::Form;
use crate::spec::question::{
    CategorizeQuestion, ClozeQuestion, ComprehensionQuestion, Question, QuestionPayload,
};

/// Correctness verdict for one question of one response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionScore {
    pub question_id: u64,
    /// Parts answered correctly.
    pub correct: usize,
    /// Parts the respondent answered.
    pub attempted: usize,
    /// Parts the question has in total.
    pub total: usize,
}

impl QuestionScore {
    /// Correct fraction over the attempted parts; 0.0 when nothing was
    /// attempted.
    pub fn fraction(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.correct as f64 / self.attempted as f64
        }
    }

    /// Fully correct: every part of the question answered and right.
    pub fn is_correct(&self) -> bool {
        self.total > 0 && self.correct == self.total
    }

    pub fn attempted_any(&self) -> bool {
        self.attempted > 0
    }
}

/// Scoring result for a whole response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    /// One entry per form question, in question order.
    pub per_question: Vec<QuestionScore>,
    /// Questions with at least one answered part.
    pub attempted: usize,
    /// Mean correct fraction over attempted questions, in [0, 1]. 0.0 when
    /// `attempted` is zero; check `attempted` to tell "nothing answered"
    /// apart from "all wrong".
    pub aggregate: f64,
}

/// Compare a stored response against the form's correctness keys.
///
/// Unattempted questions are excluded from the aggregate denominator rather
/// than counted as wrong. Entries whose `questionId` indexes no question are
/// skipped; for a question answered more than once the first entry wins.
pub fn score(form: &Form, response: &Response) -> ScoreReport {
    let per_question: Vec<QuestionScore> = form
        .questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let answer = response
                .answer_for(index as u64)
                .map(|entry| &entry.answer);
            score_question(index as u64, question, answer)
        })
        .collect();

    let attempted = per_question
        .iter()
        .filter(|score| score.attempted_any())
        .count();
    let aggregate = if attempted == 0 {
        0.0
    } else {
        per_question
            .iter()
            .filter(|score| score.attempted_any())
            .map(QuestionScore::fraction)
            .sum::<f64>()
            / attempted as f64
    };

    ScoreReport {
        per_question,
        attempted,
        aggregate,
    }
}

fn score_question(question_id: u64, question: &Question, answer: Option<&Value>) -> QuestionScore {
    match &question.payload {
        QuestionPayload::Categorize(payload) => score_categorize(question_id, payload, answer),
        QuestionPayload::Cloze(payload) => score_cloze(question_id, payload, answer),
        QuestionPayload::Comprehension(payload) => score_comprehension(question_id, payload, answer),
    }
}

/// A placement is correct iff the mapped category equals the item's
/// `correctCategory`. Items absent from the mapping count as unattempted;
/// mapping keys that name no item are ignored.
fn score_categorize(
    question_id: u64,
    question: &CategorizeQuestion,
    answer: Option<&Value>,
) -> QuestionScore {
    let total = question.items.len();
    let Some(map) = answer.and_then(Value::as_object) else {
        return QuestionScore {
            question_id,
            correct: 0,
            attempted: 0,
            total,
        };
    };

    let mut correct = 0;
    let mut attempted = 0;
    for item in &question.items {
        if let Some(placed) = map.get(&item.text).and_then(Value::as_str) {
            attempted += 1;
            if placed == item.correct_category {
                correct += 1;
            }
        }
    }

    QuestionScore {
        question_id,
        correct,
        attempted,
        total,
    }
}

/// Exact-match policy: case-sensitive comparison after trimming surrounding
/// whitespace on both sides. No fuzzy matching.
fn score_cloze(question_id: u64, question: &ClozeQuestion, answer: Option<&Value>) -> QuestionScore {
    let total = question.blanks.len();
    let Some(map) = answer.and_then(Value::as_object) else {
        return QuestionScore {
            question_id,
            correct: 0,
            attempted: 0,
            total,
        };
    };

    let mut correct = 0;
    let mut attempted = 0;
    for (index, blank) in question.blanks.iter().enumerate() {
        if let Some(filled) = map.get(&index.to_string()).and_then(Value::as_str) {
            attempted += 1;
            if filled.trim() == blank.correct_answer.trim() {
                correct += 1;
            }
        }
    }

    QuestionScore {
        question_id,
        correct,
        attempted,
        total,
    }
}

/// A sub-question is correct iff the chosen option index equals its
/// `correctAnswer`. Non-integer selections count as unattempted.
fn score_comprehension(
    question_id: u64,
    question: &ComprehensionQuestion,
    answer: Option<&Value>,
) -> QuestionScore {
    let total = question.questions.len();
    let Some(map) = answer.and_then(Value::as_object) else {
        return QuestionScore {
            question_id,
            correct: 0,
            attempted: 0,
            total,
        };
    };

    let mut correct = 0;
    let mut attempted = 0;
    for (index, sub) in question.questions.iter().enumerate() {
        if let Some(chosen) = map.get(&index.to_string()).and_then(Value::as_u64) {
            attempted += 1;
            if chosen as usize == sub.correct_answer {
                correct += 1;
            }
        }
    }

    QuestionScore {
        question_id,
        correct,
        attempted,
        total,
    }
}
