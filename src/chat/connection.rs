use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use super::endpoints::{ChatCompletionRequest, ChatCompletionResponse};

#[derive(Debug, Error)]
pub enum ApiConnectionError {
    #[error("no API key provided")]
    MissingApiKey,
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("API error {status}: {error_body}")]
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },
    #[error("completion had no usable content: {0}")]
    EmptyCompletion(String),
}

/// Client for an OpenAI-compatible chat completions API.
///
/// One instance is shared by all requests; the API key is passed per call because
/// callers may bring their own.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: Client,
    base_url: String,
    default_model: String,
}

impl CompletionClient {
    pub fn new(base_url: &str, default_model: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            default_model: default_model.to_string(),
        }
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    pub async fn call_chat_completion(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ApiConnectionError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ApiConnectionError::MissingApiKey);
        }

        debug!(model = %request.model, url = %self.completions_url(), "calling chat completion");
        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        if response.status().is_success() {
            let chat_response = response.json::<ChatCompletionResponse>().await?;
            Ok(chat_response)
        } else {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            Err(ApiConnectionError::ApiError { status, error_body })
        }
    }
}
