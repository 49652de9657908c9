//! Plain prompt-in, text-out language model access.

use crate::error::{PalaverError, Result};
use crate::openai::create_client_for;
use async_openai::config::OpenAIConfig;
use async_openai::types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs};
use async_openai::Client;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// A model that turns a prompt into a completion.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete a single prompt.
    async fn invoke(&self, prompt: &str) -> Result<String>;

    /// Model identifier, for logging.
    fn model_name(&self) -> &str;
}

/// Chat-completions model on any OpenAI-compatible endpoint.
pub struct OpenAiModel {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiModel {
    /// Use the default OpenAI endpoint.
    pub fn new(model: &str, timeout: Duration) -> Result<Self> {
        Self::with_api_base(model, None, timeout)
    }

    /// Use a custom endpoint, such as a local Ollama server.
    pub fn with_api_base(model: &str, api_base: Option<&str>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: create_client_for(api_base, timeout)?,
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    async fn invoke(&self, prompt: &str) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| PalaverError::OpenAI(e.to_string()))?
                .into()])
            .build()
            .map_err(|e| PalaverError::OpenAI(e.to_string()))?;

        debug!("Invoking {} with {} chars", self.model, prompt.len());

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| PalaverError::OpenAI(format!("Completion failed: {}", e)))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| PalaverError::OpenAI("No response from model".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
