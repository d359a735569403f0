use serde::{Deserialize, Serialize};

use crate::answers::{AnswerSet, AnswerValue, ValidationError, ValidationResult};
use crate::schema::{Datatype, Question, QuestionId, QuestionKind};
use crate::visibility::resolve_visibility;

/// Which questions take part in mandatory-answer validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationScope {
    /// Only questions currently in the render order.
    #[default]
    Visible,
    /// Every question of the schema, shown or not.
    FullSchema,
}

/// Validates answers against every question of the schema.
pub fn validate(questions: &[Question], answers: &AnswerSet) -> ValidationResult {
    validate_scoped(questions, answers, true, ValidationScope::FullSchema)
}

/// Validates answers against the questions selected by `scope`.
///
/// Questions are checked in ascending id order. `missing_mandatory` lists every
/// mandatory question without a non-empty answer and `first_missing` is its head.
/// Answers whose id is not in the schema are reported in `unknown_answers`.
///
/// `valid` also requires every non-empty answer to fit its question, optional
/// ones included: a choice outside the options, a non-finite or non-numeric
/// Number input and a text/image kind mismatch all fail the result.
pub fn validate_scoped(
    questions: &[Question],
    answers: &AnswerSet,
    show_conditional_group: bool,
    scope: ValidationScope,
) -> ValidationResult {
    let visibility = resolve_visibility(questions, show_conditional_group);

    let mut ordered: Vec<&Question> = questions.iter().collect();
    ordered.sort_by_key(|question| question.id);

    let mut missing_mandatory = Vec::new();
    let mut errors = Vec::new();

    for question in ordered {
        if scope == ValidationScope::Visible
            && !visibility.get(&question.id).copied().unwrap_or(true)
        {
            continue;
        }

        match answers.get(question.id) {
            Some(value) if !value.is_empty() => {
                if let Some(error) = validate_value(question, value) {
                    errors.push(error);
                }
            }
            _ => {
                if question.mandatory {
                    missing_mandatory.push(question.id);
                }
            }
        }
    }

    let unknown_answers: Vec<QuestionId> = answers
        .iter()
        .map(|(question_id, _)| question_id)
        .filter(|question_id| !visibility.contains_key(question_id))
        .collect();

    ValidationResult {
        valid: missing_mandatory.is_empty() && errors.is_empty() && unknown_answers.is_empty(),
        first_missing: missing_mandatory.first().copied(),
        missing_mandatory,
        errors,
        unknown_answers,
    }
}

fn validate_value(question: &Question, value: &AnswerValue) -> Option<ValidationError> {
    match (&question.kind, value) {
        (QuestionKind::Image, AnswerValue::Image(_)) => None,
        (QuestionKind::Image, AnswerValue::Text(_)) | (_, AnswerValue::Image(_)) => {
            Some(base_error(question, "type mismatch", "type_mismatch"))
        }
        (
            QuestionKind::UserInput {
                datatype: Datatype::Number,
            },
            AnswerValue::Text(text),
        ) => {
            if text
                .trim()
                .parse::<f64>()
                .is_ok_and(|number| number.is_finite())
            {
                None
            } else {
                Some(base_error(question, "value is not a number", "not_a_number"))
            }
        }
        (QuestionKind::UserInput { .. }, AnswerValue::Text(_)) => None,
        (QuestionKind::SingleChoice { .. } | QuestionKind::Matrix { .. }, AnswerValue::Text(text)) => {
            if question.choice_position(text).is_some() {
                None
            } else {
                Some(base_error(question, "invalid choice", "choice_mismatch"))
            }
        }
    }
}

fn base_error(question: &Question, message: &str, code: &str) -> ValidationError {
    ValidationError {
        question_id: question.id,
        message: message.into(),
        code: code.into(),
    }
}
