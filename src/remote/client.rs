// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision client for OpenAI-compatible chat-completions APIs

use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::parser::parse_reply;
use super::prompt::{ANALYSIS_PROMPT, MAX_REPLY_TOKENS, TEMPERATURE};
use super::provider::VisionProvider;
use crate::config::ProviderConfig;
use crate::errors::RecognitionError;
use crate::types::AnalysisResult;
use crate::vision::image_utils::EncodedImage;

// --- OpenAI-compatible serde structs ---

#[derive(serde::Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(serde::Serialize)]
struct ChatMessage {
    role: String,
    content: serde_json::Value,
}

#[derive(serde::Deserialize)]
struct ChatUsage {
    #[serde(default)]
    total_tokens: Option<u32>,
}

#[derive(serde::Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(serde::Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(serde::Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Longest error body kept in `RequestFailed`
const MAX_ERROR_BODY: usize = 200;

/// Client for one configured vision provider
pub struct VisionClient {
    client: Client,
    config: ProviderConfig,
}

impl VisionClient {
    /// Create a new vision client
    pub fn new(config: ProviderConfig) -> Result<Self, RecognitionError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| RecognitionError::ServiceUnavailable {
                provider: config.kind.id().to_string(),
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        info!(
            "Vision client configured: provider={}, endpoint={}, model={}",
            config.kind, config.endpoint, config.model
        );

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Models route next to the chat-completions route
    pub fn models_url(&self) -> String {
        let trimmed = self.config.endpoint.trim_end_matches('/');
        let base = trimmed.strip_suffix("/chat/completions").unwrap_or(trimmed);
        format!("{}/models", base)
    }

    fn build_request(&self, image: &EncodedImage) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: serde_json::json!([
                    {"type": "text", "text": ANALYSIS_PROMPT},
                    {"type": "image_url", "image_url": {"url": image.data_url}}
                ]),
            }],
            max_tokens: MAX_REPLY_TOKENS,
            temperature: TEMPERATURE,
        }
    }

    fn map_send_error(&self, e: reqwest::Error) -> RecognitionError {
        if e.is_timeout() {
            RecognitionError::Timeout {
                timeout_ms: self.config.timeout_ms,
            }
        } else if e.is_connect() {
            RecognitionError::ServiceUnavailable {
                provider: self.name().to_string(),
                message: e.to_string(),
            }
        } else {
            RecognitionError::RequestFailed {
                status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                message: e.to_string(),
            }
        }
    }

    /// Send the request and return the assistant's reply text
    async fn request_completion(&self, image: &EncodedImage) -> Result<String, RecognitionError> {
        let mut request = self
            .client
            .post(&self.config.endpoint)
            .json(&self.build_request(image));
        if !self.config.api_key.trim().is_empty() {
            request = request.bearer_auth(self.config.api_key.trim());
        }

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message: String = body.chars().take(MAX_ERROR_BODY).collect();
            warn!("{} returned {}: {}", self.name(), status, message);
            return Err(RecognitionError::RequestFailed {
                status: status.as_u16(),
                message,
            });
        }

        let chat_response: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| RecognitionError::RequestFailed {
                    status: 0,
                    message: format!("Invalid response envelope: {}", e),
                })?;

        if let Some(total) = chat_response.usage.and_then(|u| u.total_tokens) {
            debug!("{} used {} tokens", self.name(), total);
        }

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                RecognitionError::ResponseParseFailed("Response contained no message content".to_string())
            })
    }
}

#[async_trait]
impl VisionProvider for VisionClient {
    async fn analyze(&self, image: &EncodedImage) -> Result<AnalysisResult, RecognitionError> {
        if !self.is_configured() {
            return Err(RecognitionError::ServiceUnconfigured {
                provider: self.name().to_string(),
            });
        }

        let start = Instant::now();
        let timeout = Duration::from_millis(self.config.timeout_ms);
        let reply = match tokio::time::timeout(timeout, self.request_completion(image)).await {
            Ok(reply) => reply?,
            Err(_) => {
                warn!("{} request timed out after {}ms", self.name(), self.config.timeout_ms);
                return Err(RecognitionError::Timeout {
                    timeout_ms: self.config.timeout_ms,
                });
            }
        };

        let result = parse_reply(&reply)?.into_result();
        info!(
            "{} returned {} elements in {}ms",
            self.name(),
            result.elements.len(),
            start.elapsed().as_millis()
        );
        Ok(result)
    }

    fn name(&self) -> &str {
        self.config.kind.id()
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn health_check(&self) -> Result<(), RecognitionError> {
        let mut request = self.client.get(self.models_url());
        if !self.config.api_key.trim().is_empty() {
            request = request.bearer_auth(self.config.api_key.trim());
        }

        let unavailable = |message: String| RecognitionError::ServiceUnavailable {
            provider: self.name().to_string(),
            message,
        };

        match request.send().await {
            Ok(resp) if resp.status().is_success() => Ok(()),
            Ok(resp) => Err(unavailable(format!("health check returned {}", resp.status()))),
            Err(e) => {
                debug!("{} health check failed: {}", self.name(), e);
                Err(unavailable(e.to_string()))
            }
        }
    }
}
