//! Pre-flight checks before operations that need external services.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{PalaverError, Result};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Chatting with the assistant requires an API key, unless a custom endpoint is set.
    Chat,
    /// Attaching an image requires tesseract.
    Ocr,
    /// Local data queries need nothing.
    Query,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Chat => {
            if settings.llm.api_base.is_none() {
                check_api_key()?;
            }
        }
        Operation::Ocr => {
            check_tool(&settings.tools.tesseract_cmd)?;
        }
        Operation::Query => {}
    }
    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(PalaverError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(PalaverError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(PalaverError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(PalaverError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(PalaverError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_query_no_requirements() {
        assert!(check(Operation::Query, &Settings::default()).is_ok());
    }

    #[test]
    fn test_chat_with_custom_endpoint_skips_key() {
        let mut settings = Settings::default();
        settings.llm.api_base = Some("http://localhost:11434/v1".to_string());
        assert!(check(Operation::Chat, &settings).is_ok());
    }

    #[test]
    fn test_missing_ocr_binary() {
        let mut settings = Settings::default();
        settings.tools.tesseract_cmd = "palaver-no-such-binary".to_string();
        let err = check(Operation::Ocr, &settings).unwrap_err();
        assert!(matches!(err, PalaverError::ToolNotFound(_)));
    }
}
