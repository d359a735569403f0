//! Questionnaire screen controller, survey backend client and the
//! `survey-collect` command line front-end.

pub mod cli;
pub mod collaborators;
pub mod config;
pub mod controller;
pub mod device;
pub mod encode;
pub mod error;
pub mod http;

pub use collaborators::{
    BundledQuestions, DeviceIdentity, FileQuestions, FixedDeviceId, FsImageReader, ImagePicker,
    ImageReader, QuestionSource, SubmissionTransport, SubmitResponse,
};
pub use config::{ClientConfig, ConfigError};
pub use controller::{
    Collaborators, QuestionnaireController, SubmitOutcome, SubmitPlan, SubmitReceipt,
};
pub use device::FileDeviceIdentity;
pub use encode::encode_images;
pub use error::{DeviceIdError, ImageEncodingError, PickError, SessionError, TransportError};
pub use http::{ApiResponse, Credentials, CredentialsError, HttpApi, LoginError};
