use form_spec::{
    CategorizeItem, CategorizeQuestion, ClozeBlank, ClozeQuestion, Form, IntegrityError, Question,
    QuestionPayload, QuestionType,
};

fn fixture() -> &'static str {
    include_str!("fixtures/science_form.json")
}

#[test]
fn question_type_display_and_parse() {
    assert_eq!(QuestionType::Categorize.to_string(), "categorize");
    assert_eq!(QuestionType::Cloze.to_string(), "cloze");
    assert_eq!(
        "comprehension".parse::<QuestionType>().unwrap(),
        QuestionType::Comprehension
    );
    assert!("ranking".parse::<QuestionType>().is_err());
}

#[test]
fn round_trip_preserves_order_and_variant_fields() {
    let form: Form = serde_json::from_str(fixture()).expect("deserialize fixture");
    let encoded = serde_json::to_string(&form).expect("serialize");
    let decoded: Form = serde_json::from_str(&encoded).expect("deserialize again");
    assert_eq!(form, decoded);

    let kinds: Vec<QuestionType> = decoded.questions.iter().map(Question::kind).collect();
    assert_eq!(
        kinds,
        vec![
            QuestionType::Categorize,
            QuestionType::Cloze,
            QuestionType::Comprehension
        ]
    );

    let QuestionPayload::Categorize(categorize) = &decoded.questions[0].payload else {
        panic!("expected categorize payload");
    };
    assert_eq!(categorize.categories, vec!["Fruit", "Veg"]);
    assert_eq!(categorize.items[1].correct_category, "Veg");

    let QuestionPayload::Cloze(cloze) = &decoded.questions[1].payload else {
        panic!("expected cloze payload");
    };
    assert_eq!(cloze.blanks[0].text, "hundred");
    assert_eq!(cloze.blanks[1].correct_answer, "celsius");

    let QuestionPayload::Comprehension(comprehension) = &decoded.questions[2].payload else {
        panic!("expected comprehension payload");
    };
    assert_eq!(comprehension.questions[0].options.len(), 3);
    assert_eq!(comprehension.questions[0].options[1].text, "A star");
    assert_eq!(comprehension.questions[0].correct_answer, 1);
}

#[test]
fn fixture_questions_are_well_formed() {
    let form: Form = serde_json::from_str(fixture()).expect("deserialize fixture");
    assert!(form.integrity_report().is_empty());
    for question in &form.questions {
        assert!(question.is_well_formed());
    }
}

#[test]
fn categorize_integrity_flags_undeclared_category() {
    let question = CategorizeQuestion {
        categories: vec!["Fruit".into(), "Veg".into()],
        items: vec![CategorizeItem {
            text: "Apple".into(),
            correct_category: "Meat".into(),
        }],
    };
    let errors = question.integrity_errors();
    assert_eq!(
        errors,
        vec![IntegrityError::UnknownCategory {
            item: "Apple".into(),
            category: "Meat".into(),
        }]
    );
}

#[test]
fn cloze_blank_positions_resolve_by_first_unclaimed_occurrence() {
    let question = ClozeQuestion {
        text: "the cat chased the dog".into(),
        blanks: vec![
            ClozeBlank {
                text: "the".into(),
                correct_answer: "the".into(),
            },
            ClozeBlank {
                text: "the".into(),
                correct_answer: "the".into(),
            },
        ],
    };
    assert_eq!(question.blank_positions(), vec![Some(0), Some(3)]);
    assert_eq!(question.ambiguous_blanks(), vec![0, 1]);
    assert_eq!(question.masked_text(), "[1] cat chased [2] dog");

    let errors = question.integrity_errors();
    assert!(
        errors
            .iter()
            .all(|error| matches!(error, IntegrityError::AmbiguousBlank { .. }))
    );
    assert_eq!(errors.len(), 2);
}

#[test]
fn cloze_integrity_flags_unmatched_blank() {
    let question = ClozeQuestion {
        text: "water boils at hundred degrees".into(),
        blanks: vec![ClozeBlank {
            text: "celsius".into(),
            correct_answer: "celsius".into(),
        }],
    };
    assert_eq!(question.blank_positions(), vec![None]);
    assert_eq!(
        question.integrity_errors(),
        vec![IntegrityError::UnmatchedBlank {
            position: 1,
            token: "celsius".into(),
        }]
    );
}

#[test]
fn comprehension_integrity_flags_drift_and_range() {
    let mut form: Form = serde_json::from_str(fixture()).expect("deserialize fixture");
    let QuestionPayload::Comprehension(comprehension) = &mut form.questions[2].payload else {
        panic!("expected comprehension payload");
    };

    // Flag a second option correct without moving correctAnswer.
    comprehension.questions[0].options[0].is_correct = true;
    assert_eq!(
        comprehension.integrity_errors(),
        vec![IntegrityError::CorrectFlagDrift { position: 1 }]
    );

    comprehension.questions[0].options[0].is_correct = false;
    comprehension.questions[0].correct_answer = 9;
    let errors = comprehension.integrity_errors();
    assert!(errors.contains(&IntegrityError::CorrectAnswerOutOfRange {
        position: 1,
        index: 9,
        options: 3,
    }));
}
