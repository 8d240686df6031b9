//! Text-generation clients

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use super::prompt::InsightPrompt;
use crate::config::InsightConfig;
use crate::error::InsightError;

/// Longest slice of an error body kept in [`InsightError::Status`]
const MAX_ERROR_BODY: usize = 200;

/// Submit a prompt, receive free text
#[async_trait]
pub trait InsightProvider: Send + Sync {
    async fn generate(&self, prompt: &InsightPrompt) -> Result<String, InsightError>;
}

/// Stands in when no endpoint is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledProvider;

#[async_trait]
impl InsightProvider for DisabledProvider {
    async fn generate(&self, _prompt: &InsightPrompt) -> Result<String, InsightError> {
        Err(InsightError::NotConfigured)
    }
}

// ============================================================================
// Chat-completions wire format
// ============================================================================

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatContent,
}

#[derive(Deserialize)]
struct ChatContent {
    content: Option<String>,
}

fn extract_text(response: ChatResponse) -> Result<String, InsightError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| InsightError::Malformed("response has no message content".to_string()))
}

// ============================================================================
// HTTP client
// ============================================================================

/// OpenAI-compatible chat-completions client with a hard timeout and one retry
pub struct HttpInsightClient {
    client: Client,
    config: InsightConfig,
    retry_delay: Duration,
}

impl HttpInsightClient {
    pub fn new(config: InsightConfig) -> Result<Self, InsightError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| InsightError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            config,
            retry_delay: Duration::from_millis(250),
        })
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    fn transport_error(&self, err: reqwest::Error) -> InsightError {
        if err.is_timeout() {
            InsightError::Timeout(self.config.timeout)
        } else {
            InsightError::Transport(err.to_string())
        }
    }

    async fn attempt(&self, prompt: &InsightPrompt) -> Result<String, InsightError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: 0.2,
        };

        let mut request = self.client.post(&self.config.endpoint).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InsightError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }
        let parsed: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                InsightError::Timeout(self.config.timeout)
            } else {
                InsightError::Malformed(e.to_string())
            }
        })?;
        extract_text(parsed)
    }

    async fn attempt_with_retry(&self, prompt: &InsightPrompt) -> Result<String, InsightError> {
        match self.attempt(prompt).await {
            Err(e) if e.is_retryable() => {
                warn!("Insight request failed ({}); retrying once", e);
                sleep(self.retry_delay).await;
                self.attempt(prompt).await
            }
            other => other,
        }
    }
}

#[async_trait]
impl InsightProvider for HttpInsightClient {
    async fn generate(&self, prompt: &InsightPrompt) -> Result<String, InsightError> {
        debug!("Requesting insight from {}", self.config.endpoint);
        // One deadline for the first attempt, the retry delay and the retry
        match timeout(self.config.timeout, self.attempt_with_retry(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(InsightError::Timeout(self.config.timeout)),
        }
    }
}

/// HTTP client when an endpoint is configured, otherwise [`DisabledProvider`]
pub fn build_provider(
    config: Option<InsightConfig>,
) -> Result<Arc<dyn InsightProvider>, InsightError> {
    Ok(match config {
        Some(config) => Arc::new(HttpInsightClient::new(config)?),
        None => Arc::new(DisabledProvider),
    })
}
