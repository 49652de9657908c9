//! OpenAI client and HTTP client construction.

use crate::config::Settings;
use crate::error::{PalaverError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create an OpenAI client for the chat model configured in `settings`.
pub fn create_chat_client(settings: &Settings) -> Result<Client<OpenAIConfig>> {
    create_client_for(
        settings.llm.api_base.as_deref(),
        Duration::from_secs(settings.llm.timeout_secs),
    )
}

/// Create a client for any OpenAI-compatible endpoint (OpenAI, Ollama, ...).
///
/// The API key is read from `OPENAI_API_KEY` when set; local endpoints that
/// ignore it still get a placeholder so requests are well-formed.
pub fn create_client_for(api_base: Option<&str>, timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| PalaverError::OpenAI(format!("Failed to create HTTP client: {}", e)))?;

    let mut config = OpenAIConfig::default();
    if let Some(base) = api_base {
        config = config.with_api_base(base);
        if std::env::var("OPENAI_API_KEY").map(|k| k.is_empty()).unwrap_or(true) {
            config = config.with_api_key("local");
        }
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}

/// Create the plain HTTP client used by the web-facing tools.
pub fn create_http_client(timeout: Duration, user_agent: &str) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clients_build_offline() {
        assert!(create_chat_client(&Settings::default()).is_ok());
        assert!(create_client_for(Some("http://localhost:11434/v1"), Duration::from_secs(5)).is_ok());
        assert!(create_http_client(Duration::from_secs(5), "palaver-test").is_ok());
    }
}
