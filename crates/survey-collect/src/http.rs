use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use survey_spec::{Question, SubmissionPayload, load_questions_value};
use thiserror::Error;
use url::Url;

use crate::collaborators::{SubmissionTransport, SubmitResponse};
use crate::config::ClientConfig;
use crate::error::TransportError;

static EMAIL_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[\w-]+(\.[\w-]+)*@([\w-]+\.)+[a-zA-Z]{2,7}$").ok());

/// Username and password for `/auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("username and password are required")]
    Empty,
    #[error("username must be an email address")]
    InvalidEmail,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), CredentialsError> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(CredentialsError::Empty);
        }
        if !EMAIL_RE
            .as_ref()
            .is_some_and(|email| email.is_match(&self.username))
        {
            return Err(CredentialsError::InvalidEmail);
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error(transparent)]
    Credentials(#[from] CredentialsError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
}

/// Generic acknowledgement returned by the survey endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}

/// JSON client for the survey backend.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpApi {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let mut raw = config.base_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = Url::parse(&raw).map_err(|source| TransportError::Url {
            url: config.base_url.clone(),
            source,
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Sends `Authorization: Bearer <token>` on every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path)
            .map_err(|source| TransportError::Url {
                url: format!("{}{path}", self.base_url),
                source,
            })
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let mut request = self.client.post(url).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(path, status = status.as_u16(), "backend request failed");
            return Err(TransportError::Status(status.as_u16()));
        }
        Ok(response.json::<T>().await?)
    }

    /// Exchanges credentials for an access token.
    pub async fn login(&self, credentials: &Credentials) -> Result<String, LoginError> {
        credentials.validate()?;
        let response: LoginResponse = self.post_json("auth/login", credentials).await?;
        Ok(response.access_token)
    }

    pub async fn validate_project(
        &self,
        project_id: &str,
        survey_id: &str,
    ) -> Result<ApiResponse, TransportError> {
        self.post_json(
            "survey/validate-project",
            &json!({ "projectId": project_id, "surveyId": survey_id }),
        )
        .await
    }

    /// Downloads the questions of a survey. A malformed schema yields no questions.
    pub async fn fetch_questions(
        &self,
        project_id: &str,
        survey_id: &str,
    ) -> Result<Vec<Question>, TransportError> {
        let body: Value = self
            .post_json(
                "survey/get-questions",
                &json!({ "projectId": project_id, "surveyId": survey_id }),
            )
            .await?;
        Ok(load_questions_value(questions_field(body)))
    }
}

fn questions_field(body: Value) -> Value {
    match body {
        Value::Object(mut map) => map
            .remove("questions")
            .or_else(|| map.remove("data"))
            .unwrap_or(Value::Object(map)),
        other => other,
    }
}

#[async_trait]
impl SubmissionTransport for HttpApi {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmitResponse, TransportError> {
        self.post_json("survey/submit-survey", payload).await
    }
}
