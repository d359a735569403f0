//! Contracts of the platform services the questionnaire depends on, plus the
//! local implementations used by the command line front-end.

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use survey_spec::{ImageLocator, Question, SubmissionPayload, load_questions};

use crate::error::{DeviceIdError, PickError, TransportError};

/// Supplies the static question schema.
pub trait QuestionSource: Send + Sync {
    fn questions(&self) -> Vec<Question>;
}

/// Schema bundled with the application as a JSON string.
#[derive(Debug, Clone)]
pub struct BundledQuestions {
    raw: String,
}

impl BundledQuestions {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }
}

impl QuestionSource for BundledQuestions {
    fn questions(&self) -> Vec<Question> {
        load_questions(&self.raw)
    }
}

/// Schema read from a JSON file; unreadable files behave like an empty schema.
#[derive(Debug, Clone)]
pub struct FileQuestions {
    path: PathBuf,
}

impl FileQuestions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl QuestionSource for FileQuestions {
    fn questions(&self) -> Vec<Question> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => load_questions(&raw),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "question schema unreadable");
                Vec::new()
            }
        }
    }
}

/// Lets the user pick an image; `Ok(None)` means the picker was cancelled.
#[async_trait]
pub trait ImagePicker: Send + Sync {
    async fn pick_image(&self) -> Result<Option<ImageLocator>, PickError>;
}

/// Resolves a picked image locator to its bytes.
#[async_trait]
pub trait ImageReader: Send + Sync {
    async fn read_image(&self, locator: &ImageLocator) -> io::Result<Vec<u8>>;
}

/// Reads images from the local file system; `file://` locators are accepted.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsImageReader;

#[async_trait]
impl ImageReader for FsImageReader {
    async fn read_image(&self, locator: &ImageLocator) -> io::Result<Vec<u8>> {
        let path = locator
            .as_str()
            .strip_prefix("file://")
            .unwrap_or(locator.as_str());
        tokio::fs::read(path).await
    }
}

/// Backend verdict on a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SubmitResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Delivers a submission payload to the backend.
#[async_trait]
pub trait SubmissionTransport: Send + Sync {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmitResponse, TransportError>;
}

/// Stable identifier of the device collecting answers.
#[async_trait]
pub trait DeviceIdentity: Send + Sync {
    async fn device_id(&self) -> Result<String, DeviceIdError>;
}

/// Device identity fixed up front, e.g. from a command line flag.
#[derive(Debug, Clone)]
pub struct FixedDeviceId(pub String);

#[async_trait]
impl DeviceIdentity for FixedDeviceId {
    async fn device_id(&self) -> Result<String, DeviceIdError> {
        Ok(self.0.clone())
    }
}
