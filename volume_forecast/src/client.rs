//! Client for the external language-model service
//!
//! The pipelines only see the [`LanguageModel`] trait. [`OpenAiClient`] is the
//! production implementation speaking the OpenAI-compatible chat completion
//! and embedding endpoints over blocking HTTP.

use crate::config::ServiceConfig;
use crate::error::{ForecastError, Result};
use crate::prompt::Prompt;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Token accounting reported by the completion service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Raw answer of a completion request, kept for audit and debugging
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Completion {
    /// Text of the first choice
    pub text: String,
    /// Model that produced the answer
    pub model: String,
    pub usage: Option<Usage>,
}

impl Completion {
    /// Completion with only a text, as produced by test doubles
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: String::new(),
            usage: None,
        }
    }

    /// Parse a chat completion response body
    pub fn from_response_json(body: &str) -> Result<Self> {
        let response: ChatResponse = serde_json::from_str(body).map_err(|e| {
            ForecastError::ExternalService(format!("Unreadable completion response: {}", e))
        })?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                ForecastError::ExternalService("Completion response has no content".to_string())
            })?;

        Ok(Self {
            text,
            model: response.model.unwrap_or_default(),
            usage: response.usage,
        })
    }
}

/// An external service that completes prompts and embeds text
pub trait LanguageModel {
    /// Send one completion request and return the first answer
    fn complete(&self, prompt: &Prompt) -> Result<Completion>;

    /// Send one embedding request and return its vector unmodified
    fn embed(&self, input: &str) -> Result<Vec<f64>>;
}

/// Chat completion request body
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

impl<'a> ChatRequest<'a> {
    pub fn new(model: &'a str, prompt: &'a Prompt) -> Self {
        Self {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
        }
    }
}

/// Embedding request body
#[derive(Debug, Serialize)]
pub struct EmbeddingRequest<'a> {
    pub model: &'a str,
    pub input: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Parse an embedding response body into the first vector
pub fn parse_embedding_response(body: &str) -> Result<Vec<f64>> {
    let response: EmbeddingResponse = serde_json::from_str(body).map_err(|e| {
        ForecastError::ExternalService(format!("Unreadable embedding response: {}", e))
    })?;

    response
        .data
        .into_iter()
        .next()
        .map(|item| item.embedding)
        .ok_or_else(|| ForecastError::ExternalService("Missing embedding data".to_string()))
}

/// Blocking client for OpenAI-compatible endpoints
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
    completion_model: String,
    embedding_model: String,
}

impl OpenAiClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        completion_model: &str,
        embedding_model: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let http = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            completion_model: completion_model.to_string(),
            embedding_model: embedding_model.to_string(),
        })
    }

    /// Build a client from configuration, reading the API key from the environment
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            ForecastError::ConfigError(format!(
                "Environment variable {} is not set",
                config.api_key_env
            ))
        })?;

        Self::new(
            &config.base_url,
            &api_key,
            &config.completion_model,
            &config.embedding_model,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn completion_model(&self) -> &str {
        &self.completion_model
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|e| ForecastError::ConfigError(format!("Invalid API key: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }

    /// POST a JSON body and return the response text of a successful call
    fn post<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<String> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(body)
            .send()?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ForecastError::ExternalService(format!(
                "{} failed ({}): {}",
                endpoint, status, message
            )));
        }

        Ok(text)
    }
}

impl LanguageModel for OpenAiClient {
    fn complete(&self, prompt: &Prompt) -> Result<Completion> {
        let request = ChatRequest::new(&self.completion_model, prompt);
        let body = self.post("chat/completions", &request)?;
        Completion::from_response_json(&body)
    }

    fn embed(&self, input: &str) -> Result<Vec<f64>> {
        let request = EmbeddingRequest {
            model: &self.embedding_model,
            input: vec![input],
        };
        let body = self.post("embeddings", &request)?;
        parse_embedding_response(&body)
    }
}
