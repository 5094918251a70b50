use serde_json::{Map, Value, json};

use crate::spec::form::Form;
use crate::spec::question::{Question, QuestionPayload};

/// Build a JSON Schema describing the answer payload each question of a
/// form expects, keyed by 0-based question index.
///
/// The submission boundary can serve this to clients so the per-variant
/// mapping shapes don't have to be hardcoded on the other side. Correctness
/// keys are never leaked; only the shapes and the visible choice sets are.
pub fn generate(form: &Form) -> Value {
    let mut properties = Map::new();
    for (index, question) in form.questions.iter().enumerate() {
        properties.insert(index.to_string(), question_schema(question));
    }

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": form.title,
        "type": "object",
        "properties": properties,
        "additionalProperties": false,
    })
}

fn question_schema(question: &Question) -> Value {
    match &question.payload {
        QuestionPayload::Categorize(payload) => {
            let mut properties = Map::new();
            for item in &payload.items {
                properties.insert(
                    item.text.clone(),
                    json!({
                        "type": "string",
                        "enum": payload.categories,
                    }),
                );
            }
            json!({
                "title": question.title,
                "description": "item text mapped to the chosen category",
                "type": "object",
                "properties": properties,
                "additionalProperties": false,
            })
        }
        QuestionPayload::Cloze(payload) => {
            let mut properties = Map::new();
            for index in 0..payload.blanks.len() {
                properties.insert(index.to_string(), json!({ "type": "string" }));
            }
            json!({
                "title": question.title,
                "description": "blank index mapped to the filled-in text",
                "type": "object",
                "properties": properties,
                "additionalProperties": false,
            })
        }
        QuestionPayload::Comprehension(payload) => {
            let mut properties = Map::new();
            for (index, sub) in payload.questions.iter().enumerate() {
                properties.insert(
                    index.to_string(),
                    json!({
                        "type": "integer",
                        "minimum": 0,
                        "maximum": sub.options.len().saturating_sub(1),
                    }),
                );
            }
            json!({
                "title": question.title,
                "description": "sub-question index mapped to the chosen option index",
                "type": "object",
                "properties": properties,
                "additionalProperties": false,
            })
        }
    }
}
