use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::QuestionId;

/// Local resource locator handed back by the image picker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageLocator(String);

impl ImageLocator {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user-supplied answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerValue {
    Text(String),
    Image(ImageLocator),
}

impl AnswerValue {
    /// Raw textual form; images yield their locator.
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Image(locator) => locator.as_str(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Image(_) => false,
        }
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<ImageLocator> for AnswerValue {
    fn from(value: ImageLocator) -> Self {
        Self::Image(value)
    }
}

/// Current answers keyed by question id. At most one entry per question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet {
    answers: BTreeMap<QuestionId, AnswerValue>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the answer for `question_id`, returning the previous one.
    pub fn set(&mut self, question_id: QuestionId, value: AnswerValue) -> Option<AnswerValue> {
        self.answers.insert(question_id, value)
    }

    pub fn get(&self, question_id: QuestionId) -> Option<&AnswerValue> {
        self.answers.get(&question_id)
    }

    pub fn remove(&mut self, question_id: QuestionId) -> Option<AnswerValue> {
        self.answers.remove(&question_id)
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Iterates answers in ascending question id order.
    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, &AnswerValue)> {
        self.answers.iter().map(|(id, value)| (*id, value))
    }
}

impl FromIterator<(QuestionId, AnswerValue)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (QuestionId, AnswerValue)>>(iter: I) -> Self {
        Self {
            answers: iter.into_iter().collect(),
        }
    }
}

/// Images picked for image questions, resolved to bytes only at submit time.
pub type ImageAttachments = BTreeMap<QuestionId, ImageLocator>;

/// Validation error metadata reported by [`crate::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub question_id: QuestionId,
    pub message: String,
    pub code: String,
}

/// Outcome of validating an answer set against the question schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_missing: Option<QuestionId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_mandatory: Vec<QuestionId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationError>,
    /// Answered ids that no question of the schema carries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unknown_answers: Vec<QuestionId>,
}

impl ValidationResult {
    /// Human readable summary suitable for a snackbar style message.
    pub fn summary(&self) -> String {
        if self.valid {
            return "all mandatory questions answered".into();
        }
        let mut parts = Vec::new();
        if !self.missing_mandatory.is_empty() {
            let ids = self
                .missing_mandatory
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            parts.push(format!("missing mandatory answers: {ids}"));
        }
        if !self.unknown_answers.is_empty() {
            let ids = self
                .unknown_answers
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            parts.push(format!("answers to unknown questions: {ids}"));
        }
        parts.extend(
            self.errors
                .iter()
                .map(|error| format!("question {}: {}", error.question_id, error.message)),
        );
        parts.join("; ")
    }
}
