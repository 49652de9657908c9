//! Configuration settings for Palaver.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub llm: LlmSettings,
    pub agent: AgentSettings,
    pub graph: GraphSettings,
    pub tools: ToolSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data (uploaded files live under `uploads/`).
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.palaver".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Chat model settings for the assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Chat completion model.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens in a reply.
    pub max_tokens: u32,
    /// Alternative OpenAI-compatible endpoint. None = api.openai.com.
    pub api_base: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            temperature: 0.7,
            max_tokens: 1500,
            api_base: None,
            timeout_secs: 300,
        }
    }
}

/// Tool-calling agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Maximum model round-trips per user message.
    pub max_iterations: usize,
    /// Number of memory entries sent with each request.
    pub history_window: usize,
    /// Custom system prompt (overrides the built-in one).
    pub system_prompt: Option<String>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            history_window: 10,
            system_prompt: None,
        }
    }
}

/// Conversation graph demo settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    /// Model served by the endpoint below.
    pub model: String,
    /// OpenAI-compatible endpoint (Ollama by default).
    pub api_base: String,
    /// The conversation ends once it holds this many messages.
    pub max_messages: usize,
    /// Opening human message.
    pub prompt: String,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            model: "llama3.2".to_string(),
            api_base: "http://localhost:11434/v1".to_string(),
            max_messages: 6,
            prompt: "Tell me a short story about a brave adventurer.".to_string(),
        }
    }
}

/// Settings for the external tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Timeout for HTTP-backed tools, in seconds.
    pub http_timeout_secs: u64,
    /// Maximum characters returned by the web scraper.
    pub scrape_max_chars: usize,
    /// Tesseract executable used for OCR.
    pub tesseract_cmd: String,
    /// User agent sent by HTTP-backed tools.
    pub user_agent: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            http_timeout_secs: 30,
            scrape_max_chars: 1000,
            tesseract_cmd: "tesseract".to_string(),
            user_agent: concat!("palaver/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::PalaverError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("palaver")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Directory where attached files are copied.
    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir().join("uploads")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [llm]
            model = "gpt-4o-mini"

            [graph]
            max_messages = 4
            "#,
        )
        .unwrap();
        assert_eq!(settings.llm.model, "gpt-4o-mini");
        assert_eq!(settings.llm.max_tokens, 1500);
        assert_eq!(settings.graph.max_messages, 4);
        assert_eq!(settings.graph.model, "llama3.2");
        assert_eq!(settings.agent.history_window, 10);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut settings = Settings::default();
        settings.tools.scrape_max_chars = 250;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.tools.scrape_max_chars, 250);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = PathBuf::from("/definitely/not/here/config.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.llm.model, "gpt-4");
    }
}
