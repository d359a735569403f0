use std::collections::BTreeSet;

use serde_json::Value;
use thiserror::Error;

use crate::schema::{Question, QuestionId};

/// Errors raised while reading a question schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid question schema: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate question id {0}")]
    DuplicateId(QuestionId),
}

/// Parses a schema document and returns its questions sorted by id.
pub fn parse_questions(raw: &str) -> Result<Vec<Question>, SchemaError> {
    let questions: Vec<Question> = serde_json::from_str(raw)?;
    finish(questions)
}

/// Same as [`parse_questions`] for an already decoded JSON value.
pub fn parse_questions_value(value: Value) -> Result<Vec<Question>, SchemaError> {
    let questions: Vec<Question> = serde_json::from_value(value)?;
    finish(questions)
}

/// Lenient loader for bundled schemas: a malformed document yields no questions.
pub fn load_questions(raw: &str) -> Vec<Question> {
    parse_questions(raw).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "question schema rejected, continuing without questions");
        Vec::new()
    })
}

/// Lenient counterpart of [`parse_questions_value`].
pub fn load_questions_value(value: Value) -> Vec<Question> {
    parse_questions_value(value).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "question schema rejected, continuing without questions");
        Vec::new()
    })
}

fn finish(mut questions: Vec<Question>) -> Result<Vec<Question>, SchemaError> {
    questions.sort_by_key(|question| question.id);
    let mut seen = BTreeSet::new();
    for question in &questions {
        if !seen.insert(question.id) {
            return Err(SchemaError::DuplicateId(question.id));
        }
    }
    tracing::debug!(count = questions.len(), "question schema loaded");
    Ok(questions)
}
