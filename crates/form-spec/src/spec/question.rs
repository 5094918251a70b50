use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of question variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Categorize,
    Cloze,
    Comprehension,
}

impl QuestionType {
    /// Wire label, as stored in documents and echoed by submissions.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Categorize => "categorize",
            QuestionType::Cloze => "cloze",
            QuestionType::Comprehension => "comprehension",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "categorize" => Ok(QuestionType::Categorize),
            "cloze" => Ok(QuestionType::Cloze),
            "comprehension" => Ok(QuestionType::Comprehension),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// Definition of a single question inside a form.
///
/// The variant payload is tagged by `type` and flattened into the same
/// object, so a stored document reads `{"type": "cloze", "title": …, "text":
/// …, "blanks": […]}` with only the fields its variant owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Question {
    pub title: String,
    /// Opaque asset reference (URL or inline-encoded bytes); never
    /// interpreted by the core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(flatten)]
    pub payload: QuestionPayload,
}

impl Question {
    pub fn kind(&self) -> QuestionType {
        self.payload.kind()
    }

    /// Authoring-side integrity findings for this question. Advisory only:
    /// neither saving nor publishing gates on them.
    pub fn integrity_errors(&self) -> Vec<IntegrityError> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(IntegrityError::EmptyTitle);
        }
        errors.extend(self.payload.integrity_errors());
        errors
    }

    pub fn is_well_formed(&self) -> bool {
        self.integrity_errors().is_empty()
    }
}

/// Variant payload of a question; `type` decides which fields exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QuestionPayload {
    Categorize(CategorizeQuestion),
    Cloze(ClozeQuestion),
    Comprehension(ComprehensionQuestion),
}

impl QuestionPayload {
    pub fn kind(&self) -> QuestionType {
        match self {
            QuestionPayload::Categorize(_) => QuestionType::Categorize,
            QuestionPayload::Cloze(_) => QuestionType::Cloze,
            QuestionPayload::Comprehension(_) => QuestionType::Comprehension,
        }
    }

    pub fn integrity_errors(&self) -> Vec<IntegrityError> {
        match self {
            QuestionPayload::Categorize(payload) => payload.integrity_errors(),
            QuestionPayload::Cloze(payload) => payload.integrity_errors(),
            QuestionPayload::Comprehension(payload) => payload.integrity_errors(),
        }
    }
}

/// Categorize payload: place each item into one of the named categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CategorizeQuestion {
    /// Ordered, unique category names; at least one.
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<CategorizeItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategorizeItem {
    pub text: String,
    pub correct_category: String,
}

impl CategorizeQuestion {
    pub fn integrity_errors(&self) -> Vec<IntegrityError> {
        let mut errors = Vec::new();
        if self.categories.is_empty() {
            errors.push(IntegrityError::NoCategories);
        }
        let mut seen = BTreeSet::new();
        for category in &self.categories {
            if !seen.insert(category.as_str()) {
                errors.push(IntegrityError::DuplicateCategory(category.clone()));
            }
        }
        for item in &self.items {
            if !self.categories.contains(&item.correct_category) {
                errors.push(IntegrityError::UnknownCategory {
                    item: item.text.clone(),
                    category: item.correct_category.clone(),
                });
            }
        }
        errors
    }
}

/// Cloze payload: a source text with fill-in blanks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClozeQuestion {
    /// Source text; blanks match its whitespace-delimited tokens.
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blanks: Vec<ClozeBlank>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClozeBlank {
    /// The token of `text` this blank stands for.
    pub text: String,
    pub correct_answer: String,
}

impl ClozeQuestion {
    /// Whitespace-delimited tokens of the source text.
    pub fn tokens(&self) -> Vec<&str> {
        self.text.split_whitespace().collect()
    }

    /// Resolve each blank to a token position.
    ///
    /// Matching is by exact token text. A repeated token is inherently
    /// ambiguous, so each blank claims the first occurrence not already
    /// claimed by an earlier blank; a blank whose token has no unclaimed
    /// occurrence resolves to `None`.
    pub fn blank_positions(&self) -> Vec<Option<usize>> {
        let tokens = self.tokens();
        let mut claimed = vec![false; tokens.len()];
        self.blanks
            .iter()
            .map(|blank| {
                let slot = tokens
                    .iter()
                    .enumerate()
                    .find(|(index, token)| **token == blank.text && !claimed[*index])
                    .map(|(index, _)| index);
                if let Some(index) = slot {
                    claimed[index] = true;
                }
                slot
            })
            .collect()
    }

    /// 0-based indices of blanks whose token occurs more than once in the
    /// text, i.e. whose position is not uniquely determined by its text.
    pub fn ambiguous_blanks(&self) -> Vec<usize> {
        let tokens = self.tokens();
        self.blanks
            .iter()
            .enumerate()
            .filter(|(_, blank)| tokens.iter().filter(|token| **token == blank.text).count() > 1)
            .map(|(index, _)| index)
            .collect()
    }

    /// The source text with each blank's token replaced by its 1-based
    /// number in brackets, e.g. `The [1] sat on the [2]`.
    pub fn masked_text(&self) -> String {
        let tokens = self.tokens();
        let mut rendered: Vec<String> = tokens.iter().map(|token| token.to_string()).collect();
        for (blank_index, position) in self.blank_positions().iter().enumerate() {
            if let Some(position) = position {
                rendered[*position] = format!("[{}]", blank_index + 1);
            }
        }
        rendered.join(" ")
    }

    pub fn integrity_errors(&self) -> Vec<IntegrityError> {
        let tokens = self.tokens();
        let positions = self.blank_positions();
        let mut errors = Vec::new();
        for (index, blank) in self.blanks.iter().enumerate() {
            let occurrences = tokens.iter().filter(|token| **token == blank.text).count();
            if positions[index].is_none() {
                errors.push(IntegrityError::UnmatchedBlank {
                    position: index + 1,
                    token: blank.text.clone(),
                });
            } else if occurrences > 1 {
                errors.push(IntegrityError::AmbiguousBlank {
                    position: index + 1,
                    token: blank.text.clone(),
                    occurrences,
                });
            }
        }
        errors
    }
}

/// Comprehension payload: a paragraph followed by multiple-choice
/// sub-questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComprehensionQuestion {
    pub paragraph: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub questions: Vec<SubQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubQuestion {
    pub question: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<McqOption>,
    /// Index into `options`; the authoritative correctness key.
    pub correct_answer: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct McqOption {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

impl ComprehensionQuestion {
    /// `correctAnswer` stays authoritative even when the `isCorrect` flags
    /// drift from it; drift is reported, never fatal.
    pub fn integrity_errors(&self) -> Vec<IntegrityError> {
        let mut errors = Vec::new();
        for (index, sub) in self.questions.iter().enumerate() {
            let position = index + 1;
            if sub.correct_answer >= sub.options.len() {
                errors.push(IntegrityError::CorrectAnswerOutOfRange {
                    position,
                    index: sub.correct_answer,
                    options: sub.options.len(),
                });
            }
            let flagged: Vec<usize> = sub
                .options
                .iter()
                .enumerate()
                .filter(|(_, option)| option.is_correct)
                .map(|(option_index, _)| option_index)
                .collect();
            if flagged.len() != 1 || flagged.first() != Some(&sub.correct_answer) {
                errors.push(IntegrityError::CorrectFlagDrift { position });
            }
        }
        errors
    }
}

/// Authoring-side integrity findings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("question title is empty")]
    EmptyTitle,
    #[error("categorize question declares no categories")]
    NoCategories,
    #[error("duplicate category '{0}'")]
    DuplicateCategory(String),
    #[error("item '{item}' references undeclared category '{category}'")]
    UnknownCategory { item: String, category: String },
    #[error("blank {position} ('{token}') matches no available token in the text")]
    UnmatchedBlank { position: usize, token: String },
    #[error("blank {position} ('{token}') occurs {occurrences} times in the text; resolved to the first unclaimed occurrence")]
    AmbiguousBlank {
        position: usize,
        token: String,
        occurrences: usize,
    },
    #[error("sub-question {position}: correctAnswer {index} is out of range for {options} options")]
    CorrectAnswerOutOfRange {
        position: usize,
        index: usize,
        options: usize,
    },
    #[error("sub-question {position}: isCorrect flags disagree with correctAnswer")]
    CorrectFlagDrift { position: usize },
}
