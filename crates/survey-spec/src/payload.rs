use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::answers::AnswerSet;
use crate::result_id::ResultId;
use crate::schema::{Question, QuestionId};

/// Encoded image bodies keyed by the question they answer.
pub type EncodedImages = BTreeMap<QuestionId, String>;

/// Answer id sent for questions without options or values outside them.
pub const NO_CHOICE_ANSWER_ID: &str = "0";

/// Outlet and visit metadata captured before the questionnaire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreSurveyDetails {
    #[serde(default)]
    pub outlet_name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub end_time: String,
}

/// Project, survey and visit a submission belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyTarget {
    pub project_id: String,
    pub survey_id: String,
    pub result_id: ResultId,
}

/// One answered question row as expected by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnsweredQuestion {
    pub survey_id: String,
    pub result_id: ResultId,
    pub question_id: QuestionId,
    pub answer_id: String,
    pub answer_text: String,
    pub device_id: String,
    pub project_id: String,
    pub location: String,
    pub remarks: String,
}

/// Body of a survey submission. Built per submit call and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub project_id: String,
    pub survey_id: String,
    pub result_id: ResultId,
    pub pre_survey_details: PreSurveyDetails,
    pub answered_questions: Vec<AnsweredQuestion>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub images: EncodedImages,
}

/// Assembles the submission body; one row per answer in ascending question id order.
pub fn build_payload(
    target: &SurveyTarget,
    details: &PreSurveyDetails,
    answers: &AnswerSet,
    questions: &[Question],
    device_id: &str,
    images: EncodedImages,
) -> SubmissionPayload {
    let answered_questions = answers
        .iter()
        .map(|(question_id, value)| {
            let question = questions.iter().find(|question| question.id == question_id);
            let answer_text = value.as_text().to_string();
            AnsweredQuestion {
                survey_id: target.survey_id.clone(),
                result_id: target.result_id.clone(),
                question_id,
                answer_id: answer_id(question, &answer_text),
                answer_text,
                device_id: device_id.to_string(),
                project_id: target.project_id.clone(),
                location: details.location.clone(),
                remarks: String::new(),
            }
        })
        .collect();

    SubmissionPayload {
        project_id: target.project_id.clone(),
        survey_id: target.survey_id.clone(),
        result_id: target.result_id.clone(),
        pre_survey_details: details.clone(),
        answered_questions,
        images,
    }
}

/// `"{question id}-{1-based choice index}"` for a matching option, `"0"` otherwise.
pub fn answer_id(question: Option<&Question>, value: &str) -> String {
    question
        .and_then(|question| {
            question
                .choice_position(value)
                .map(|position| format!("{}-{}", question.id, position))
        })
        .unwrap_or_else(|| NO_CHOICE_ANSWER_ID.to_string())
}
