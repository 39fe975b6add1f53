use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::ClientConfig;

const USER_AGENT: &str = concat!("recipe-assist/", env!("CARGO_PKG_VERSION"));
// How much of a failing response body is kept on the error
const ERROR_BODY_PREVIEW_CHARS: usize = 240;

#[derive(Debug, Error)]
pub enum ApiConnectionError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("API error {status}: {error_body}")]
    ApiError {
        status: StatusCode,
        error_body: String,
    },
    #[error("Invalid API url: {0}")]
    InvalidUrl(String),
}

impl ApiConnectionError {
    /// HTTP status of the failed exchange, when the backend got far enough to send one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiConnectionError::ApiError { status, .. } => Some(*status),
            ApiConnectionError::NetworkError(err) => err.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

/// Thin JSON client over the recipe REST backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl BackendClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiConnectionError> {
        let base_url = config.api_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiConnectionError::InvalidUrl(config.api_url.clone()));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url,
            auth_token: config.auth_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get_json<Q>(&self, path: &str, query: &Q) -> Result<Value, ApiConnectionError>
    where
        Q: Serialize + ?Sized,
    {
        let request = self.client.get(self.url(path)).query(query);
        self.execute(path, request).await
    }

    pub async fn post_json<B>(&self, path: &str, body: &B) -> Result<Value, ApiConnectionError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.client.post(self.url(path)).json(body);
        self.execute(path, request).await
    }

    async fn execute(&self, path: &str, request: RequestBuilder) -> Result<Value, ApiConnectionError> {
        let request = match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        debug!(path, %status, "backend responded");

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            let error_body: String = error_body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect();
            return Err(ApiConnectionError::ApiError { status, error_body });
        }

        let body = response.text().await?;
        // Some endpoints answer 200 with no body at all
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}
