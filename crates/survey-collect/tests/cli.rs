use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;

const QUESTIONS: &str = r#"[
  {"QuestionID": 3, "Question": "Display photo", "Questiontype": "Image", "Mandatory": "No"},
  {"QuestionID": 1, "Question": "Facings", "Questiontype": "User Input", "Mandatory": "Yes", "Datatype": "Number"},
  {"QuestionID": 2, "Question": "Display present?", "Questiontype": "Single Choice", "Mandatory": "Yes",
   "Choices": [{"ChoiceText": "Yes"}, {"ChoiceText": "No"}]}
]"#;

fn workspace(answers: &str) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    dir.child("questions.json")
        .write_str(QUESTIONS)
        .expect("write questions");
    dir.child("answers.json")
        .write_str(answers)
        .expect("write answers");
    dir
}

fn survey_collect(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("survey-collect").expect("binary builds");
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(dir.child("absent.toml").path());
    cmd
}

#[test]
fn check_reports_render_order_for_complete_answers() {
    let dir = workspace(r#"{"answers": {"1": "42", "2": "Yes"}}"#);
    survey_collect(&dir)
        .args(["check", "--questions", "questions.json", "--answers", "answers.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"render_order\""))
        .stdout(predicate::str::contains("\"show_conditional_group\": true"))
        .stdout(predicate::str::contains("\"valid\": true"));
}

#[test]
fn check_fails_when_a_mandatory_answer_is_missing() {
    let dir = workspace(r#"{"answers": {"2": "No"}}"#);
    survey_collect(&dir)
        .args(["check", "--questions", "questions.json", "--answers", "answers.json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"first_missing\": 1"))
        .stderr(predicate::str::contains("missing mandatory answers: 1"));
}

#[test]
fn payload_prints_the_submission_body() {
    let dir = workspace(r#"{"answers": {"1": "42", "2": "No"}}"#);
    dir.child("details.json")
        .write_str(r#"{"outletName": "Corner Mart", "location": "Pune"}"#)
        .expect("write details");
    survey_collect(&dir)
        .args([
            "payload",
            "--questions",
            "questions.json",
            "--answers",
            "answers.json",
            "--details",
            "details.json",
            "--project",
            "P-17",
            "--survey",
            "SV-3",
            "--result-id",
            "R-9",
            "--device-id",
            "device-1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"resultId\": \"R-9\""))
        .stdout(predicate::str::contains("\"answerId\": \"2-2\""))
        .stdout(predicate::str::contains("\"deviceId\": \"device-1\""))
        .stdout(predicate::str::contains("\"outletName\": \"Corner Mart\""))
        .stdout(predicate::str::contains("\"images\"").not());
}

#[test]
fn payload_encodes_attached_images() {
    let dir = workspace("{}");
    dir.child("shelf.jpg").write_binary(b"jpeg").expect("write image");
    dir.child("answers.json")
        .write_str(&format!(
            r#"{{"answers": {{"1": "3", "2": "Yes"}}, "images": {{"3": "{}"}}}}"#,
            dir.child("shelf.jpg").path().display()
        ))
        .expect("write answers");
    survey_collect(&dir)
        .args([
            "payload",
            "--questions",
            "questions.json",
            "--answers",
            "answers.json",
            "--project",
            "P",
            "--survey",
            "S",
            "--device-id",
            "d",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"3\": \"anBlZw==\""));
}

#[test]
fn images_on_text_questions_are_refused() {
    let dir = workspace(r#"{"answers": {"1": "1"}, "images": {"1": "x.jpg"}}"#);
    survey_collect(&dir)
        .args(["check", "--questions", "questions.json", "--answers", "answers.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not accept images"));
}
