use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::Client;
use riquer_core::Language;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::InstituteContext;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("chat backend is not configured")]
    NotConfigured,
    #[error("chat backend transport failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("chat backend answered with HTTP {0}")]
    Status(u16),
    #[error("chat backend rejected the message: {0}")]
    Rejected(String),
    #[error("chat backend returned a malformed body")]
    Malformed,
}

#[derive(Debug, Serialize)]
struct BackendRequest<'a> {
    message: &'a str,
    language: &'a str,
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct BackendResponse {
    status: String,
    response: Option<String>,
    error: Option<String>,
}

#[derive(Clone)]
pub struct HttpChatBackend {
    client: Client,
    url: String,
    api_key: Option<String>,
    context: Arc<InstituteContext>,
}

impl HttpChatBackend {
    pub fn new(
        url: impl Into<String>,
        api_key: Option<String>,
        context: Arc<InstituteContext>,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(6))
            .timeout(Duration::from_secs(20))
            .build()
            .context("failed to build backend HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
            api_key,
            context,
        })
    }

    // One attempt per user submission. Failures surface as a single localized
    // error and the caller stays retryable.
    async fn send(
        &self,
        message: &str,
        language: Language,
        user_name: Option<&str>,
    ) -> Result<String, BackendError> {
        let prompt = self.context.system_prompt();
        let body = BackendRequest {
            message,
            language: language.as_code(),
            timestamp: Utc::now().to_rfc3339(),
            user_name,
            context: Some(prompt.as_str()),
        };

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(api_key) = self.api_key.as_deref() {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        let parsed = response
            .json::<BackendResponse>()
            .await
            .map_err(|_| BackendError::Malformed)?;

        match parsed.status.as_str() {
            "success" => parsed.response.ok_or(BackendError::Malformed),
            "error" => Err(BackendError::Rejected(
                parsed.error.unwrap_or_else(|| "unknown error".to_string()),
            )),
            _ => Err(BackendError::Malformed),
        }
    }
}

#[derive(Clone)]
pub enum ChatBackend {
    Http(HttpChatBackend),
    Disabled,
}

impl ChatBackend {
    pub fn http(
        url: impl Into<String>,
        api_key: Option<String>,
        context: Arc<InstituteContext>,
    ) -> Result<Self> {
        Ok(Self::Http(HttpChatBackend::new(url, api_key, context)?))
    }

    pub fn disabled() -> Self {
        Self::Disabled
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Http(_))
    }

    pub async fn send(
        &self,
        message: &str,
        language: Language,
        user_name: Option<&str>,
    ) -> Result<String, BackendError> {
        match self {
            Self::Http(backend) => backend.send(message, language, user_name).await,
            Self::Disabled => Err(BackendError::NotConfigured),
        }
    }
}
