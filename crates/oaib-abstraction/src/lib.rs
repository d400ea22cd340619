//! Provider boundary for oaib.
//!
//! This crate defines the types exchanged with a text-generation provider and the
//! [`GenerationClient`] trait the batch engine drives. It deliberately knows nothing
//! about transports: implementations live with the caller.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Represents an error that can occur when calling a generation provider.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelError {
    /// The request could not be delivered (e.g., network issues, invalid request).
    #[error("Request Error: {0}")]
    RequestError(String),

    /// The provider answered with an error (e.g., invalid input, content filter).
    #[error("Model Response Error: {0}")]
    ModelResponseError(String),

    /// The provider payload could not be encoded or decoded.
    #[error("Serialization Error: {0}")]
    SerializationError(String),

    /// Provider quota exceeded or rate limit hit.
    #[error("Provider '{provider}' quota exceeded{}", message.as_ref().map(|m| format!(": {}", m)).unwrap_or_default())]
    QuotaExceeded {
        /// The provider name (e.g., "openai").
        provider: String,
        /// Optional error message from the provider.
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// Other unexpected errors.
    #[error("Other Model Error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// A single turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message sender (e.g., "user", "assistant", "system").
    pub role: String,
    /// The content of the message.
    pub content: String,
}

impl ChatMessage {
    /// Creates a message with an arbitrary role.
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self { role: role.into(), content: content.into() }
    }

    /// Creates a `system` message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    /// Creates a `user` message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    /// Creates an `assistant` message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

/// Generation parameters forwarded untouched to the provider.
///
/// Every field is optional; `None` means "use the provider default".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    /// Sampling temperature, usually between 0 and 2.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Nucleus sampling probability mass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// The maximum number of tokens to generate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sequences where the provider stops generating further tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
}

/// The response of one generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    /// The generated text.
    pub content: String,

    /// Messages produced by the exchange, as echoed back by the provider.
    #[serde(default)]
    pub messages: Vec<ChatMessage>,

    /// Optional: The ID of the model that produced the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,

    /// Optional: Usage statistics for the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<ModelUsage>,
}

impl ModelResponse {
    /// Builds a response whose echo is a single assistant turn carrying `content`.
    pub fn from_text(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            messages: vec![ChatMessage::assistant(content.clone())],
            content,
            model_id: None,
            usage: None,
        }
    }

    /// Sets the model ID.
    #[must_use]
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    /// Sets the usage statistics.
    #[must_use]
    pub fn with_usage(mut self, usage: ModelUsage) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// Usage statistics for a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelUsage {
    /// Number of tokens in the prompt.
    pub prompt_tokens: u32,

    /// Number of tokens in the completion.
    pub completion_tokens: u32,

    /// Total number of tokens used.
    pub total_tokens: u32,
}

/// A text-generation provider.
///
/// Implementations must be `Send + Sync` so one client can serve every in-flight
/// request of a batch.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Generates a reply to the given conversation.
    ///
    /// # Arguments
    /// * `messages` - The conversation, passed through verbatim
    /// * `parameters` - Generation parameters, passed through verbatim
    ///
    /// # Errors
    /// Returns a `ModelError` if generation fails.
    async fn generate(
        &self,
        messages: &[ChatMessage],
        parameters: &ModelParameters,
    ) -> Result<ModelResponse, ModelError>;

    /// Returns the ID of the model behind this client.
    fn model_id(&self) -> &str;
}

#[async_trait]
impl<T> GenerationClient for Arc<T>
where
    T: GenerationClient + ?Sized,
{
    async fn generate(
        &self,
        messages: &[ChatMessage],
        parameters: &ModelParameters,
    ) -> Result<ModelResponse, ModelError> {
        (**self).generate(messages, parameters).await
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}
