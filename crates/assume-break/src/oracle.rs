//! Oracle abstraction: the remote language model behind each capability.
//!
//! An oracle takes a role instruction and a transcript and returns free text.
//! Retries live in [`RetryingOracle`] so the transport stays a single call.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use coordination::RetryPolicy;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Settings;

/// Anthropic Messages API version header value.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Errors from an oracle invocation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OracleError {
    #[error("no API key configured")]
    CredentialsAbsent,

    #[error("rate limited by the oracle")]
    RateLimited,

    #[error("transient oracle failure: {0}")]
    Transient(String),

    #[error("oracle rejected the request: {0}")]
    Permanent(String),

    #[error("malformed oracle reply: {0}")]
    MalformedReply(String),
}

impl OracleError {
    pub fn is_credentials_absent(&self) -> bool {
        matches!(self, Self::CredentialsAbsent)
    }

    /// Rate limits and transient transport failures are worth another try.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Transient(_))
    }
}

/// Classify a non-success HTTP status.
pub fn classify_status(status: u16, body: &str) -> OracleError {
    match status {
        429 => OracleError::RateLimited,
        408 | 500..=599 => OracleError::Transient(format!("HTTP {}: {}", status, body)),
        _ => OracleError::Permanent(format!("HTTP {}: {}", status, body)),
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Oracle: Send + Sync {
    /// One request/response exchange.
    async fn invoke(&self, role_instruction: &str, transcript: &str)
        -> Result<String, OracleError>;
}

#[async_trait]
impl<T: Oracle + ?Sized> Oracle for Arc<T> {
    async fn invoke(
        &self,
        role_instruction: &str,
        transcript: &str,
    ) -> Result<String, OracleError> {
        (**self).invoke(role_instruction, transcript).await
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Anthropic Messages API client.
pub struct AnthropicOracle {
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    endpoint: String,
    client: reqwest::Client,
}

impl AnthropicOracle {
    pub fn new(settings: &Settings) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| OracleError::Permanent(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            api_key: settings.anthropic_api_key.clone(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            endpoint: format!("{}/v1/messages", settings.api_base_url.trim_end_matches('/')),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Oracle for AnthropicOracle {
    async fn invoke(
        &self,
        role_instruction: &str,
        transcript: &str,
    ) -> Result<String, OracleError> {
        if self.api_key.is_empty() {
            return Err(OracleError::CredentialsAbsent);
        }

        let request_body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "system": role_instruction,
            "messages": [{
                "role": "user",
                "content": transcript
            }]
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() {
                    OracleError::Permanent(e.to_string())
                } else {
                    OracleError::Transient(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| OracleError::MalformedReply(e.to_string()))?;

        parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .find_map(|block| block.text)
            .ok_or_else(|| OracleError::MalformedReply("no text content".to_string()))
    }
}

/// Wraps an oracle with exponential backoff on retryable failures.
pub struct RetryingOracle<O> {
    inner: O,
    policy: RetryPolicy,
}

impl<O: Oracle> RetryingOracle<O> {
    pub fn new(inner: O, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<O: Oracle> Oracle for RetryingOracle<O> {
    async fn invoke(
        &self,
        role_instruction: &str,
        transcript: &str,
    ) -> Result<String, OracleError> {
        let mut attempt = 0u32;
        loop {
            let err = match self.inner.invoke(role_instruction, transcript).await {
                Ok(reply) => return Ok(reply),
                Err(err) => err,
            };
            if !err.is_retryable() || self.policy.is_last_attempt(attempt) {
                debug!(attempt, error = %err, "oracle call failed; not retrying");
                return Err(err);
            }

            let delay = match err {
                OracleError::RateLimited => self.policy.rate_limit_delay(attempt),
                _ => self.policy.transient_delay(attempt),
            };
            warn!(
                attempt = attempt + 1,
                max_attempts = self.policy.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "oracle call failed, backing off"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
