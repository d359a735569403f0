use survey_spec::{
    AnswerAccumulator, AnswerSet, AnswerValue, ImageAttachments, ImageLocator, PreSurveyDetails,
    Question, QuestionId, ResultId, SubmissionPayload, SurveyTarget, ValidationResult,
    ValidationScope, build_payload, render_order, validate_scoped, visible_answers,
};

use crate::collaborators::{
    DeviceIdentity, ImagePicker, ImageReader, QuestionSource, SubmissionTransport,
};
use crate::encode::encode_images;
use crate::error::{PickError, SessionError, TransportError};

/// Collaborators needed to turn a submit plan into a backend call.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub device: &'a dyn DeviceIdentity,
    pub images: &'a dyn ImageReader,
    pub transport: &'a dyn SubmissionTransport,
}

/// Successful submission as acknowledged by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub result_id: ResultId,
    pub answered: usize,
    pub images: usize,
    pub message: Option<String>,
}

/// State of one questionnaire screen: the schema, the answers and a generation
/// counter that invalidates submissions started before the last reset.
#[derive(Debug, Clone)]
pub struct QuestionnaireController {
    questions: Vec<Question>,
    accumulator: AnswerAccumulator,
    scope: ValidationScope,
    generation: u64,
}

impl QuestionnaireController {
    pub fn new(
        questions: Vec<Question>,
        trigger_question_id: QuestionId,
        scope: ValidationScope,
    ) -> Self {
        Self {
            questions,
            accumulator: AnswerAccumulator::new(trigger_question_id),
            scope,
            generation: 0,
        }
    }

    pub fn from_source(
        source: &dyn QuestionSource,
        trigger_question_id: QuestionId,
        scope: ValidationScope,
    ) -> Self {
        Self::new(source.questions(), trigger_question_id, scope)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn accumulator(&self) -> &AnswerAccumulator {
        &self.accumulator
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn set_answer(&mut self, question_id: QuestionId, value: impl Into<AnswerValue>) {
        self.accumulator.set_answer(question_id, value);
    }

    pub fn get_answer(&self, question_id: QuestionId) -> Option<&AnswerValue> {
        self.accumulator.get_answer(question_id)
    }

    pub fn attach_image(
        &mut self,
        question_id: QuestionId,
        locator: ImageLocator,
    ) -> Result<(), SessionError> {
        if !self.accepts_image(question_id) {
            return Err(SessionError::NotAnImageQuestion(question_id));
        }
        self.accumulator.attach_image(question_id, locator);
        Ok(())
    }

    fn accepts_image(&self, question_id: QuestionId) -> bool {
        self.questions
            .iter()
            .any(|question| question.id == question_id && question.is_image())
    }

    /// Questions to display right now.
    pub fn render_order(&self) -> Vec<&Question> {
        render_order(&self.questions, self.accumulator.show_conditional_group())
    }

    pub fn validate(&self) -> ValidationResult {
        validate_scoped(
            &self.questions,
            self.accumulator.answers(),
            self.accumulator.show_conditional_group(),
            self.scope,
        )
    }

    /// Clears answers and images and invalidates in-flight submissions.
    pub fn reset(&mut self) {
        self.accumulator.reset();
        self.generation += 1;
        tracing::debug!(generation = self.generation, "questionnaire reset");
    }

    /// Runs the picker for an image question and attaches the result.
    ///
    /// A cancelled pick returns `Ok(None)`. A denied permission is logged and
    /// returned without touching any other answer.
    pub async fn pick_image(
        &mut self,
        question_id: QuestionId,
        picker: &dyn ImagePicker,
    ) -> Result<Option<ImageLocator>, SessionError> {
        if !self.accepts_image(question_id) {
            return Err(SessionError::NotAnImageQuestion(question_id));
        }

        match picker.pick_image().await {
            Ok(Some(locator)) => {
                self.accumulator.attach_image(question_id, locator.clone());
                Ok(Some(locator))
            }
            Ok(None) => Ok(None),
            Err(err @ PickError::PermissionDenied) => {
                tracing::warn!(question_id, "image library permission denied");
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Validates the current answers and snapshots everything a submission needs.
    pub fn plan_submit(
        &self,
        target: SurveyTarget,
        details: PreSurveyDetails,
    ) -> Result<SubmitPlan, SessionError> {
        let validation = self.validate();
        if !validation.valid {
            tracing::info!(summary = %validation.summary(), "submission blocked by validation");
            return Err(SessionError::Validation(validation));
        }

        Ok(SubmitPlan {
            generation: self.generation,
            target,
            details,
            questions: self.questions.clone(),
            answers: visible_answers(
                &self.questions,
                self.accumulator.answers(),
                self.accumulator.show_conditional_group(),
            ),
            images: self.accumulator.submittable_images(),
        })
    }

    /// Accepts the outcome of a plan unless the answers were reset meanwhile.
    pub fn complete(&self, outcome: SubmitOutcome) -> Result<SubmitReceipt, SessionError> {
        if outcome.generation != self.generation {
            tracing::warn!(
                submitted = outcome.generation,
                current = self.generation,
                "discarding result of a superseded submission"
            );
            return Err(SessionError::Superseded {
                submitted: outcome.generation,
                current: self.generation,
            });
        }
        outcome.result
    }

    /// Validates, encodes, builds and sends the submission. Answers are kept
    /// whatever the outcome.
    pub async fn submit(
        &self,
        target: SurveyTarget,
        details: PreSurveyDetails,
        collaborators: Collaborators<'_>,
    ) -> Result<SubmitReceipt, SessionError> {
        let plan = self.plan_submit(target, details)?;
        let outcome = plan.execute(collaborators).await;
        self.complete(outcome)
    }
}

/// Snapshot of a validated questionnaire, detached from the controller so the
/// screen stays usable while the submission is in flight.
#[derive(Debug, Clone)]
pub struct SubmitPlan {
    generation: u64,
    target: SurveyTarget,
    details: PreSurveyDetails,
    questions: Vec<Question>,
    answers: AnswerSet,
    images: ImageAttachments,
}

/// Result of executing a plan, tagged with the generation it was planned in.
#[derive(Debug)]
pub struct SubmitOutcome {
    generation: u64,
    result: Result<SubmitReceipt, SessionError>,
}

impl SubmitOutcome {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl SubmitPlan {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn images(&self) -> &ImageAttachments {
        &self.images
    }

    /// Resolves the device id and encodes images, then assembles the payload.
    pub async fn prepare(
        &self,
        device: &dyn DeviceIdentity,
        images: &dyn ImageReader,
    ) -> Result<SubmissionPayload, SessionError> {
        let device_id = device.device_id().await?;
        let encoded = encode_images(images, &self.images).await?;
        Ok(build_payload(
            &self.target,
            &self.details,
            &self.answers,
            &self.questions,
            &device_id,
            encoded,
        ))
    }

    pub async fn execute(self, collaborators: Collaborators<'_>) -> SubmitOutcome {
        let generation = self.generation;
        let result = self.run(collaborators).await;
        SubmitOutcome { generation, result }
    }

    async fn run(&self, collaborators: Collaborators<'_>) -> Result<SubmitReceipt, SessionError> {
        let payload = self
            .prepare(collaborators.device, collaborators.images)
            .await?;
        tracing::info!(
            result_id = %payload.result_id,
            answered = payload.answered_questions.len(),
            images = payload.images.len(),
            "submitting survey"
        );

        let response = collaborators.transport.submit(&payload).await?;
        if !response.is_success() {
            return Err(TransportError::Rejected {
                status: response.status,
                message: response.message.unwrap_or_default(),
            }
            .into());
        }

        Ok(SubmitReceipt {
            result_id: payload.result_id,
            answered: payload.answered_questions.len(),
            images: payload.images.len(),
            message: response.message,
        })
    }
}
