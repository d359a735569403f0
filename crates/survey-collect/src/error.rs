use std::io;
use std::path::PathBuf;

use survey_spec::{ImageLocator, QuestionId, ValidationResult};
use thiserror::Error;

/// Failures talking to the survey backend.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid backend url '{url}': {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend responded with status {0}")]
    Status(u16),
    #[error("submission rejected ({status}): {message}")]
    Rejected { status: String, message: String },
}

/// Failures of the image picker collaborator.
#[derive(Debug, Error)]
pub enum PickError {
    #[error("image library permission denied")]
    PermissionDenied,
    #[error("image picker failed: {0}")]
    Failed(String),
}

/// An attachment could not be turned into its transport encoding.
#[derive(Debug, Error)]
#[error("failed to encode image for question {question_id} ({locator}): {source}")]
pub struct ImageEncodingError {
    pub question_id: QuestionId,
    pub locator: ImageLocator,
    #[source]
    pub source: io::Error,
}

/// Failures reading or persisting the device identifier.
#[derive(Debug, Error)]
pub enum DeviceIdError {
    #[error("device id storage failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("device id unavailable: {0}")]
    Unavailable(String),
}

/// Recoverable outcomes surfaced to the questionnaire screen.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("please answer all mandatory questions before submitting ({})", .0.summary())]
    Validation(ValidationResult),
    #[error(transparent)]
    ImageEncoding(#[from] ImageEncodingError),
    #[error("submission failed: {0}")]
    Transport(#[from] TransportError),
    #[error("image selection failed: {0}")]
    ImagePick(#[from] PickError),
    #[error("question {0} does not accept images")]
    NotAnImageQuestion(QuestionId),
    #[error("submission discarded: answers were reset after it started")]
    Superseded { submitted: u64, current: u64 },
    #[error(transparent)]
    Device(#[from] DeviceIdError),
}
