use crate::answers::{AnswerSet, AnswerValue, ImageAttachments, ImageLocator};
use crate::schema::QuestionId;

/// Question whose yes/no answer reveals the image group unless configured otherwise.
pub const DEFAULT_TRIGGER_QUESTION_ID: QuestionId = 2;

/// Screen-scoped answer state: answers, picked images and the conditional group flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerAccumulator {
    trigger_question_id: QuestionId,
    answers: AnswerSet,
    images: ImageAttachments,
    show_conditional_group: bool,
}

impl Default for AnswerAccumulator {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGER_QUESTION_ID)
    }
}

impl AnswerAccumulator {
    pub fn new(trigger_question_id: QuestionId) -> Self {
        Self {
            trigger_question_id,
            answers: AnswerSet::new(),
            images: ImageAttachments::new(),
            show_conditional_group: false,
        }
    }

    /// Inserts or overwrites the answer for `question_id`.
    ///
    /// Answering the trigger question with "yes" or "no" (any ASCII case) shows or
    /// hides the conditional image group. Other values leave the flag untouched.
    pub fn set_answer(&mut self, question_id: QuestionId, value: impl Into<AnswerValue>) {
        let value = value.into();
        if question_id == self.trigger_question_id
            && let AnswerValue::Text(text) = &value
            && let Some(show) = trigger_state(text)
        {
            if show != self.show_conditional_group {
                tracing::debug!(question_id, show, "conditional group toggled");
            }
            self.show_conditional_group = show;
        }
        self.answers.set(question_id, value);
    }

    pub fn get_answer(&self, question_id: QuestionId) -> Option<&AnswerValue> {
        self.answers.get(question_id)
    }

    /// Records a picked image and stores it as the question's answer.
    pub fn attach_image(&mut self, question_id: QuestionId, locator: ImageLocator) {
        self.images.insert(question_id, locator.clone());
        self.answers.set(question_id, AnswerValue::Image(locator));
    }

    /// Drops a picked image together with its answer entry.
    pub fn detach_image(&mut self, question_id: QuestionId) -> Option<ImageLocator> {
        let removed = self.images.remove(&question_id);
        if removed.is_some() {
            self.answers.remove(question_id);
        }
        removed
    }

    /// Returns every piece of state to its initial value.
    pub fn reset(&mut self) {
        self.answers.clear();
        self.images.clear();
        self.show_conditional_group = false;
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn images(&self) -> &ImageAttachments {
        &self.images
    }

    /// Attachments that take part in a submission: none while the group is hidden.
    pub fn submittable_images(&self) -> ImageAttachments {
        if self.show_conditional_group {
            self.images.clone()
        } else {
            ImageAttachments::new()
        }
    }

    pub fn show_conditional_group(&self) -> bool {
        self.show_conditional_group
    }

    pub fn trigger_question_id(&self) -> QuestionId {
        self.trigger_question_id
    }
}

fn trigger_state(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("yes") {
        Some(true)
    } else if value.eq_ignore_ascii_case("no") {
        Some(false)
    } else {
        None
    }
}
