pub mod form;
pub mod question;

pub use form::Form;
pub use question::{
    CategorizeItem, CategorizeQuestion, ClozeBlank, ClozeQuestion, ComprehensionQuestion,
    IntegrityError, McqOption, Question, QuestionPayload, QuestionType, SubQuestion,
};
