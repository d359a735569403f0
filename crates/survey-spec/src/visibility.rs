use std::collections::BTreeMap;

use crate::answers::AnswerSet;
use crate::schema::{Question, QuestionId};

pub type VisibilityMap = BTreeMap<QuestionId, bool>;

/// Questions in display order: every non-image question in schema order, then the
/// image questions when the conditional group is shown. Hidden questions are left out.
pub fn render_order(questions: &[Question], show_conditional_group: bool) -> Vec<&Question> {
    let (images, others): (Vec<&Question>, Vec<&Question>) =
        questions.iter().partition(|question| question.is_image());

    let mut ordered = others;
    if show_conditional_group {
        ordered.extend(images);
    }
    ordered
}

pub fn resolve_visibility(questions: &[Question], show_conditional_group: bool) -> VisibilityMap {
    questions
        .iter()
        .map(|question| (question.id, !question.is_image() || show_conditional_group))
        .collect()
}

/// Answers that belong in a submission: those of questions in the render order.
/// Hidden image questions and ids outside the schema are dropped.
pub fn visible_answers(
    questions: &[Question],
    answers: &AnswerSet,
    show_conditional_group: bool,
) -> AnswerSet {
    let visibility = resolve_visibility(questions, show_conditional_group);
    answers
        .iter()
        .filter(|(question_id, _)| visibility.get(question_id).copied().unwrap_or(false))
        .map(|(question_id, value)| (question_id, value.clone()))
        .collect()
}
