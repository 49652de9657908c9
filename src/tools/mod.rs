//! Text-in, text-out tools available to the assistant.
//!
//! Every tool takes a single string input and always answers with a string:
//! failures are rendered as `Error ...` text rather than returned as errors,
//! since the model reasons over whatever comes back.

mod data;
mod finance;
mod ocr;
mod search;
mod weather;
mod web;

pub use data::{CsvProcessorTool, JsonProcessorTool, ReadFileTool};
pub use finance::{StockPriceTool, YahooFinanceNewsTool};
pub use ocr::{OcrTool, NO_TEXT_FOUND};
pub use search::{ArxivTool, DuckDuckGoSearchTool, WikipediaTool};
pub use weather::WeatherTool;
pub use web::WebScraperTool;

use crate::config::ToolSettings;
use crate::error::{PalaverError, Result};
use crate::openai::create_http_client;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// A single tool the agent can call.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model uses to call the tool.
    fn name(&self) -> &str;

    /// What the tool does and what its input should be.
    fn description(&self) -> &str;

    /// Run the tool. Never fails: errors come back as text.
    async fn run(&self, input: &str) -> String;
}

/// Render a fallible tool outcome as text.
pub(crate) fn text_or_error(result: Result<String>, context: &str) -> String {
    match result {
        Ok(text) => text,
        Err(e) => format!("Error {}: {}", context, e),
    }
}

/// Ordered collection of tools, looked up by name.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in tool.
    pub fn with_defaults(settings: &ToolSettings) -> Result<Self> {
        let http = create_http_client(
            Duration::from_secs(settings.http_timeout_secs),
            &settings.user_agent,
        )?;

        let mut registry = Self::new();
        registry.register(Arc::new(ReadFileTool));
        registry.register(Arc::new(CsvProcessorTool));
        registry.register(Arc::new(JsonProcessorTool));
        registry.register(Arc::new(ArxivTool::new(http.clone())));
        registry.register(Arc::new(WikipediaTool::new(http.clone())));
        registry.register(Arc::new(DuckDuckGoSearchTool::new(http.clone())));
        registry.register(Arc::new(StockPriceTool::new(http.clone())));
        registry.register(Arc::new(YahooFinanceNewsTool::new(http.clone())));
        registry.register(Arc::new(WeatherTool::new(http.clone())));
        registry.register(Arc::new(WebScraperTool::new(http, settings.scrape_max_chars)));
        registry.register(Arc::new(OcrTool::new(&settings.tesseract_cmd)));
        Ok(registry)
    }

    /// Add a tool. A tool with the same name replaces the earlier one.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    /// All registered tools, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run a tool by name.
    pub async fn execute(&self, name: &str, input: &str) -> Result<String> {
        let tool = self
            .get(name)
            .ok_or_else(|| PalaverError::UnknownTool(name.to_string()))?;
        info!("Running tool {} ({} bytes of input)", name, input.len());
        Ok(tool.run(input).await)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Tool that echoes its input with a prefix.
    pub struct EchoTool(pub &'static str);

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "Echo the input back."
        }

        async fn run(&self, input: &str) -> String {
            format!("{} says {}", self.0, input)
        }
    }
}
