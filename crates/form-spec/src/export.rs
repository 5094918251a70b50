use serde_json::{Map, Value};

use crate::answers::{AcceptedAnswer, Response};
use crate::spec::form::Form;
use crate::spec::question::QuestionType;

/// Render a form's responses as CSV: one row per response, one column per
/// question, prefixed by the response id and submission time.
pub fn responses_to_csv(form: &Form, responses: &[Response]) -> String {
    let mut header = vec!["Response ID".to_string(), "Submitted At".to_string()];
    for (index, question) in form.questions.iter().enumerate() {
        header.push(format!("Q{}: {}", index + 1, question.title));
    }

    let mut rows = vec![render_row(&header)];
    for response in responses {
        let mut row = vec![
            response.id.clone(),
            response.submitted_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ];
        for index in 0..form.questions.len() {
            let cell = response
                .answer_for(index as u64)
                .map(format_answer_cell)
                .unwrap_or_default();
            row.push(cell);
        }
        rows.push(render_row(&row));
    }

    rows.join("\n")
}

/// Flat cell text for one stored answer, per the variant mapping shapes:
/// categorize `item: category; …`, cloze answers joined by `; `,
/// comprehension `Q<n>: Option <letter>; …`.
pub fn format_answer_cell(entry: &AcceptedAnswer) -> String {
    let Some(map) = entry.answer.as_object() else {
        return display_value(&entry.answer);
    };

    match entry.kind.parse::<QuestionType>() {
        Ok(QuestionType::Categorize) => map
            .iter()
            .map(|(item, category)| format!("{item}: {}", display_value(category)))
            .collect::<Vec<_>>()
            .join("; "),
        Ok(QuestionType::Cloze) => numeric_entries(map)
            .into_iter()
            .map(|(_, value)| display_value(value))
            .collect::<Vec<_>>()
            .join("; "),
        Ok(QuestionType::Comprehension) => numeric_entries(map)
            .into_iter()
            .map(|(key, value)| format!("Q{}: Option {}", key + 1, option_letter(value)))
            .collect::<Vec<_>>()
            .join("; "),
        Err(_) => display_value(&entry.answer),
    }
}

/// Mapping entries with numeric keys, in key order. Cloze and comprehension
/// answers key by stringified index; anything else is dropped.
fn numeric_entries(map: &Map<String, Value>) -> Vec<(u64, &Value)> {
    let mut entries: Vec<(u64, &Value)> = map
        .iter()
        .filter_map(|(key, value)| key.parse::<u64>().ok().map(|key| (key, value)))
        .collect();
    entries.sort_by_key(|(key, _)| *key);
    entries
}

fn option_letter(value: &Value) -> String {
    match value.as_u64() {
        Some(index) if index < 26 => char::from(b'A' + index as u8).to_string(),
        Some(index) => (index + 1).to_string(),
        None => display_value(value),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(num) => num.to_string(),
        other => other.to_string(),
    }
}

fn render_row(cells: &[String]) -> String {
    cells
        .iter()
        .map(|cell| quote(cell))
        .collect::<Vec<_>>()
        .join(",")
}

fn quote(cell: &str) -> String {
    if cell.contains([',', '"', '\n']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
