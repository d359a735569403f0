use std::collections::BTreeMap;
use std::io;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;
use survey_collect::{
    Collaborators, FixedDeviceId, ImagePicker, ImageReader, PickError, QuestionnaireController,
    SessionError, SubmissionTransport, SubmitResponse, TransportError,
};
use survey_spec::{
    AnswerValue, ImageLocator, PreSurveyDetails, Question, ResultId, SubmissionPayload,
    SurveyTarget, ValidationScope, parse_questions_value,
};

fn store_audit() -> Vec<Question> {
    parse_questions_value(json!([
        {"QuestionID": 1, "Question": "Facings counted", "Questiontype": "User Input",
         "Mandatory": "Yes", "Datatype": "Number"},
        {"QuestionID": 2, "Question": "Display present?", "Questiontype": "Single Choice",
         "Mandatory": "Yes", "Choices": [{"ChoiceText": "Yes"}, {"ChoiceText": "No"}]},
        {"QuestionID": 3, "Question": "Display photo", "Questiontype": "Image", "Mandatory": "No"}
    ]))
    .expect("fixture should deserialize")
}

fn controller() -> QuestionnaireController {
    QuestionnaireController::new(store_audit(), 2, ValidationScope::Visible)
}

fn target() -> SurveyTarget {
    SurveyTarget {
        project_id: "P-17".into(),
        survey_id: "SV-3".into(),
        result_id: ResultId::supplied("R-1"),
    }
}

fn details() -> PreSurveyDetails {
    PreSurveyDetails {
        outlet_name: "Corner Mart".into(),
        location: "12.97,77.59".into(),
        ..PreSurveyDetails::default()
    }
}

#[derive(Default)]
struct RecordingTransport {
    status: &'static str,
    sent: Mutex<Vec<SubmissionPayload>>,
}

impl RecordingTransport {
    fn accepting() -> Self {
        Self {
            status: "success",
            ..Self::default()
        }
    }

    fn sent(&self) -> Vec<SubmissionPayload> {
        self.sent.lock().expect("lock").clone()
    }
}

#[async_trait]
impl SubmissionTransport for RecordingTransport {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmitResponse, TransportError> {
        self.sent.lock().expect("lock").push(payload.clone());
        Ok(SubmitResponse {
            status: self.status.to_string(),
            message: Some("stored".into()),
        })
    }
}

struct MemoryImages(BTreeMap<String, Vec<u8>>);

impl MemoryImages {
    fn with(locator: &str, bytes: &[u8]) -> Self {
        Self(BTreeMap::from([(locator.to_string(), bytes.to_vec())]))
    }

    fn empty() -> Self {
        Self(BTreeMap::new())
    }
}

#[async_trait]
impl ImageReader for MemoryImages {
    async fn read_image(&self, locator: &ImageLocator) -> io::Result<Vec<u8>> {
        self.0
            .get(locator.as_str())
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such image"))
    }
}

enum PickerBehaviour {
    Pick(&'static str),
    Cancel,
    Deny,
}

#[async_trait]
impl ImagePicker for PickerBehaviour {
    async fn pick_image(&self) -> Result<Option<ImageLocator>, PickError> {
        match self {
            Self::Pick(locator) => Ok(Some(ImageLocator::new(*locator))),
            Self::Cancel => Ok(None),
            Self::Deny => Err(PickError::PermissionDenied),
        }
    }
}

fn collaborators<'a>(
    device: &'a FixedDeviceId,
    images: &'a MemoryImages,
    transport: &'a RecordingTransport,
) -> Collaborators<'a> {
    Collaborators {
        device,
        images,
        transport,
    }
}

#[tokio::test]
async fn answered_audit_without_photo_submits_two_rows() {
    let mut controller = controller();
    controller.set_answer(1, "42");
    controller.set_answer(2, "Yes");

    let visible: Vec<u32> = controller.render_order().iter().map(|q| q.id).collect();
    assert_eq!(visible, vec![1, 2, 3]);

    let device = FixedDeviceId("device-9".into());
    let images = MemoryImages::empty();
    let transport = RecordingTransport::accepting();
    let receipt = controller
        .submit(target(), details(), collaborators(&device, &images, &transport))
        .await
        .expect("submission succeeds");

    assert_eq!(receipt.answered, 2);
    assert_eq!(receipt.images, 0);
    assert_eq!(receipt.result_id.as_str(), "R-1");
    assert_eq!(receipt.message.as_deref(), Some("stored"));

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    let rows = &sent[0].answered_questions;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].answer_text, "42");
    assert_eq!(rows[0].answer_id, "0");
    assert_eq!(rows[1].answer_id, "2-1");
    assert_eq!(rows[1].device_id, "device-9");
    assert_eq!(rows[1].location, "12.97,77.59");
    assert_eq!(sent[0].pre_survey_details.outlet_name, "Corner Mart");
}

#[tokio::test]
async fn picked_photo_is_encoded_into_the_payload() {
    let mut controller = controller();
    controller.set_answer(1, "42");
    controller.set_answer(2, "yes");
    let picked = controller
        .pick_image(3, &PickerBehaviour::Pick("file:///shelf.jpg"))
        .await
        .expect("pick succeeds");
    assert_eq!(picked, Some(ImageLocator::new("file:///shelf.jpg")));

    let device = FixedDeviceId("device-9".into());
    let images = MemoryImages::with("file:///shelf.jpg", b"jpeg");
    let transport = RecordingTransport::accepting();
    let receipt = controller
        .submit(target(), details(), collaborators(&device, &images, &transport))
        .await
        .expect("submission succeeds");

    assert_eq!(receipt.answered, 3);
    assert_eq!(receipt.images, 1);
    let sent = transport.sent();
    assert_eq!(sent[0].images.get(&3).map(String::as_str), Some("anBlZw=="));
    assert_eq!(sent[0].answered_questions[2].answer_text, "file:///shelf.jpg");
}

#[tokio::test]
async fn hidden_group_images_are_not_encoded() {
    let mut controller = controller();
    controller.set_answer(2, "Yes");
    controller
        .attach_image(3, ImageLocator::new("missing.jpg"))
        .expect("image question");
    controller.set_answer(2, "No");
    controller.set_answer(1, "5");

    let plan = controller
        .plan_submit(target(), details())
        .expect("answers are complete");
    assert!(plan.images().is_empty());
    assert_eq!(plan.answers().len(), 2);

    // The reader has no such image; encoding it would fail the submit.
    let device = FixedDeviceId("d".into());
    let images = MemoryImages::empty();
    let transport = RecordingTransport::accepting();
    let outcome = plan
        .execute(collaborators(&device, &images, &transport))
        .await;
    let receipt = controller.complete(outcome).expect("submission succeeds");
    assert_eq!(receipt.images, 0);
    assert_eq!(receipt.answered, 2);

    let sent = transport.sent();
    let rows: Vec<u32> = sent[0]
        .answered_questions
        .iter()
        .map(|row| row.question_id)
        .collect();
    assert_eq!(rows, vec![1, 2]);
    assert!(
        sent[0]
            .answered_questions
            .iter()
            .all(|row| row.answer_text != "missing.jpg")
    );
    assert!(controller.accumulator().images().contains_key(&3));
}

#[tokio::test]
async fn answers_outside_the_schema_block_submission() {
    let mut controller = controller();
    controller.set_answer(1, "42");
    controller.set_answer(2, "No");
    controller.set_answer(99, "typo");

    let err = controller
        .plan_submit(target(), details())
        .expect_err("question 99 does not exist");
    match err {
        SessionError::Validation(result) => {
            assert!(result.missing_mandatory.is_empty());
            assert_eq!(result.unknown_answers, vec![99]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn missing_mandatory_answer_blocks_submission_and_keeps_answers() {
    let mut controller = controller();
    controller.set_answer(2, "No");

    let device = FixedDeviceId("d".into());
    let images = MemoryImages::empty();
    let transport = RecordingTransport::accepting();
    let err = controller
        .submit(target(), details(), collaborators(&device, &images, &transport))
        .await
        .expect_err("question 1 is unanswered");

    match err {
        SessionError::Validation(result) => {
            assert_eq!(result.first_missing, Some(1));
            assert_eq!(result.missing_mandatory, vec![1]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(transport.sent().is_empty());
    assert_eq!(
        controller.get_answer(2),
        Some(&AnswerValue::Text("No".into()))
    );
}

#[tokio::test]
async fn unreadable_image_aborts_the_submission() {
    let mut controller = controller();
    controller.set_answer(1, "42");
    controller.set_answer(2, "Yes");
    controller
        .attach_image(3, ImageLocator::new("gone.jpg"))
        .expect("image question");

    let device = FixedDeviceId("d".into());
    let images = MemoryImages::empty();
    let transport = RecordingTransport::accepting();
    let err = controller
        .submit(target(), details(), collaborators(&device, &images, &transport))
        .await
        .expect_err("image cannot be read");

    match err {
        SessionError::ImageEncoding(failure) => assert_eq!(failure.question_id, 3),
        other => panic!("unexpected error: {other}"),
    }
    assert!(transport.sent().is_empty());
    assert_eq!(controller.accumulator().answers().len(), 3);
}

#[tokio::test]
async fn backend_rejection_is_reported() {
    let mut controller = controller();
    controller.set_answer(1, "42");
    controller.set_answer(2, "No");

    let device = FixedDeviceId("d".into());
    let images = MemoryImages::empty();
    let transport = RecordingTransport {
        status: "error",
        ..RecordingTransport::default()
    };
    let err = controller
        .submit(target(), details(), collaborators(&device, &images, &transport))
        .await
        .expect_err("backend refuses");

    assert!(matches!(
        err,
        SessionError::Transport(TransportError::Rejected { ref status, .. }) if status == "error"
    ));
    assert_eq!(controller.accumulator().answers().len(), 2);
}

#[tokio::test]
async fn reset_while_in_flight_supersedes_the_result() {
    let mut controller = controller();
    controller.set_answer(1, "42");
    controller.set_answer(2, "No");
    let plan = controller
        .plan_submit(target(), details())
        .expect("answers are complete");

    controller.reset();
    assert!(controller.accumulator().answers().is_empty());

    let device = FixedDeviceId("d".into());
    let images = MemoryImages::empty();
    let transport = RecordingTransport::accepting();
    let outcome = plan
        .execute(collaborators(&device, &images, &transport))
        .await;
    assert_eq!(outcome.generation(), 0);

    let err = controller.complete(outcome).expect_err("reset happened");
    assert!(matches!(
        err,
        SessionError::Superseded {
            submitted: 0,
            current: 1
        }
    ));
}

#[tokio::test]
async fn cancelled_or_denied_pick_leaves_answers_alone() {
    let mut controller = controller();
    controller.set_answer(2, "Yes");

    let cancelled = controller
        .pick_image(3, &PickerBehaviour::Cancel)
        .await
        .expect("cancel is not an error");
    assert_eq!(cancelled, None);

    let denied = controller
        .pick_image(3, &PickerBehaviour::Deny)
        .await
        .expect_err("permission denied");
    assert!(matches!(
        denied,
        SessionError::ImagePick(PickError::PermissionDenied)
    ));

    assert!(controller.accumulator().images().is_empty());
    assert_eq!(controller.accumulator().answers().len(), 1);
}

#[tokio::test]
async fn images_only_attach_to_image_questions() {
    let mut controller = controller();
    let err = controller
        .pick_image(1, &PickerBehaviour::Pick("a.jpg"))
        .await
        .expect_err("question 1 is text");
    assert!(matches!(err, SessionError::NotAnImageQuestion(1)));
    assert!(matches!(
        controller.attach_image(2, ImageLocator::new("a.jpg")),
        Err(SessionError::NotAnImageQuestion(2))
    ));
}
