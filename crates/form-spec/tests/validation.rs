use chrono::{TimeZone, Utc};
use serde_json::json;

use form_spec::{
    AnswerEntry, Form, FormStore, MemoryStore, SubmitError, submit, validate,
};

fn make_form(published: bool) -> Form {
    let mut form: Form =
        serde_json::from_str(include_str!("fixtures/science_form.json")).expect("fixture");
    form.is_published = published;
    form
}

fn categorize_entry() -> AnswerEntry {
    AnswerEntry::new(0, "categorize", json!({ "Apple": "Fruit", "Carrot": "Veg" }))
}

#[test]
fn empty_submission_is_rejected() {
    let form = make_form(true);
    let error = validate(&form, &[]).unwrap_err();
    assert!(matches!(error, SubmitError::EmptySubmission));
}

#[test]
fn all_empty_answer_mappings_are_rejected() {
    let form = make_form(true);
    let entries = vec![
        AnswerEntry::new(0, "categorize", json!({})),
        AnswerEntry::new(1, "cloze", json!({})),
        AnswerEntry::new(2, "comprehension", json!(null)),
    ];
    let error = validate(&form, &entries).unwrap_err();
    assert!(matches!(error, SubmitError::EmptySubmission));
}

#[test]
fn unknown_type_uses_fallback_emptiness_rule() {
    let form = make_form(true);

    // An empty string counts as unanswered for an unknown type.
    let blank = vec![AnswerEntry::new(0, "ranking", json!(""))];
    assert!(matches!(
        validate(&form, &blank).unwrap_err(),
        SubmitError::EmptySubmission
    ));

    // A non-empty string survives and is stored as submitted.
    let filled = vec![AnswerEntry::new(0, "ranking", json!("first"))];
    let accepted = validate(&form, &filled).expect("accepted");
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].kind, "ranking");
}

#[test]
fn unpublished_form_rejects_any_submission() {
    let form = make_form(false);
    let error = validate(&form, &[categorize_entry()]).unwrap_err();
    assert!(matches!(error, SubmitError::FormNotPublished));

    // The publish gate outranks per-entry well-formedness.
    let malformed = vec![AnswerEntry {
        question_id: None,
        kind: Some("categorize".into()),
        answer: json!({ "Apple": "Fruit" }),
    }];
    let error = validate(&form, &malformed).unwrap_err();
    assert!(matches!(error, SubmitError::FormNotPublished));
}

#[test]
fn malformed_entry_positions_count_the_submitted_sequence() {
    let form = make_form(true);
    let entries = vec![
        AnswerEntry::new(0, "categorize", json!({})),
        AnswerEntry {
            question_id: None,
            kind: Some("cloze".into()),
            answer: json!({ "0": "hundred" }),
        },
    ];
    let error = validate(&form, &entries).unwrap_err();
    match error {
        SubmitError::MalformedEntry { position, field } => {
            assert_eq!(position, 2);
            assert_eq!(field, "questionId");
        }
        other => panic!("expected MalformedEntry, got {other:?}"),
    }
}

#[test]
fn missing_type_is_malformed() {
    let form = make_form(true);
    let entries = vec![AnswerEntry {
        question_id: Some(1),
        kind: None,
        answer: json!("free text"),
    }];
    let error = validate(&form, &entries).unwrap_err();
    assert!(matches!(
        error,
        SubmitError::MalformedEntry {
            position: 1,
            field: "type"
        }
    ));
}

#[test]
fn question_id_zero_is_a_legal_value() {
    let form = make_form(true);
    let accepted = validate(&form, &[categorize_entry()]).expect("accepted");
    assert_eq!(accepted[0].question_id, 0);
}

#[test]
fn out_of_range_question_id_is_stored_as_submitted() {
    // Deliberate permissiveness: questionId is not cross-checked against
    // the form's question count.
    let form = make_form(true);
    let entries = vec![AnswerEntry::new(99, "cloze", json!({ "0": "hundred" }))];
    let accepted = validate(&form, &entries).expect("accepted");
    assert_eq!(accepted[0].question_id, 99);
}

#[test]
fn submit_rejects_unknown_form_id() {
    let mut store = MemoryStore::new();
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
    let error = submit(&mut store, "missing", &[categorize_entry()], now).unwrap_err();
    assert!(matches!(error, SubmitError::FormNotFound));
}

#[test]
fn submit_stores_accepted_responses() {
    let mut store = MemoryStore::new();
    let created = Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap();
    let saved = store.save_form(make_form(true), created).expect("save");

    let submitted = Utc.with_ymd_and_hms(2025, 5, 2, 14, 30, 0).unwrap();
    let response = submit(&mut store, &saved.id, &[categorize_entry()], submitted).expect("submit");

    assert!(!response.id.is_empty());
    assert_eq!(response.form_id, saved.id);
    assert_eq!(response.submitted_at, submitted);

    let stored = store.load_responses(&saved.id).expect("load responses");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].responses[0].question_id, 0);
}

#[test]
fn submit_rejects_draft_form() {
    let mut store = MemoryStore::new();
    let created = Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap();
    let saved = store.save_form(make_form(false), created).expect("save");

    let now = Utc.with_ymd_and_hms(2025, 5, 2, 14, 30, 0).unwrap();
    let error = submit(&mut store, &saved.id, &[categorize_entry()], now).unwrap_err();
    assert!(matches!(error, SubmitError::FormNotPublished));
}

#[test]
fn deleting_a_form_cascades_to_responses() {
    let mut store = MemoryStore::new();
    let created = Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap();
    let saved = store.save_form(make_form(true), created).expect("save");

    let now = Utc.with_ymd_and_hms(2025, 5, 2, 14, 30, 0).unwrap();
    submit(&mut store, &saved.id, &[categorize_entry()], now).expect("submit");

    store.delete_form(&saved.id).expect("delete");
    assert!(matches!(
        store.load_form(&saved.id),
        Err(form_spec::StoreError::NotFound(_))
    ));
    assert!(store.load_responses(&saved.id).expect("load").is_empty());
}
