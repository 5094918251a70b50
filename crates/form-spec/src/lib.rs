#![allow(missing_docs)]

pub mod answers;
pub mod answers_schema;
pub mod export;
pub mod score;
pub mod spec;
pub mod stats;
pub mod store;
pub mod validate;

pub use answers::{AcceptedAnswer, AnswerEntry, Response, SubmissionInput};
pub use answers_schema::generate as answers_schema;
pub use export::{format_answer_cell, responses_to_csv};
pub use score::{QuestionScore, ScoreReport, score};
pub use spec::{
    CategorizeItem, CategorizeQuestion, ClozeBlank, ClozeQuestion, ComprehensionQuestion, Form,
    IntegrityError, McqOption, Question, QuestionPayload, QuestionType, SubQuestion,
};
pub use stats::{QuestionStats, ResponseStats, response_stats};
pub use store::{FormStore, MemoryStore, StoreError};
pub use validate::{SubmitError, submit, validate};
