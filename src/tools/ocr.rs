//! Image text extraction through the tesseract CLI.

use super::{text_or_error, Tool};
use crate::error::{PalaverError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Returned when OCR succeeds but finds nothing.
pub const NO_TEXT_FOUND: &str = "No text found in the image.";

/// Extract text from an image file.
pub struct OcrTool {
    command: String,
}

impl OcrTool {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
        }
    }

    #[instrument(skip(self))]
    async fn extract(&self, image_path: &Path) -> Result<String> {
        let result = Command::new(&self.command)
            .arg(image_path)
            .arg("stdout")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PalaverError::ToolNotFound(self.command.clone()));
            }
            Err(e) => {
                return Err(PalaverError::ToolFailed(format!(
                    "{} execution failed: {e}",
                    self.command
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PalaverError::ToolFailed(format!(
                "{} failed: {}",
                self.command,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!("OCR extracted {} characters", text.len());
        Ok(text)
    }
}

#[async_trait]
impl Tool for OcrTool {
    fn name(&self) -> &str {
        "image_text_extractor"
    }

    fn description(&self) -> &str {
        "Extract text from images using OCR. Input should be the absolute path to the image file."
    }

    async fn run(&self, input: &str) -> String {
        let path = Path::new(input.trim());
        if !path.is_file() {
            return format!("Error: Image file not found at path: {}", input.trim());
        }

        match self.extract(path).await {
            Ok(text) if text.is_empty() => NO_TEXT_FOUND.to_string(),
            other => text_or_error(other, "processing image"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_image() {
        let tool = OcrTool::new("tesseract");
        assert_eq!(
            tool.run("/no/such/image.png").await,
            "Error: Image file not found at path: /no/such/image.png"
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_reported_as_text() {
        let image = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        let tool = OcrTool::new("definitely-not-a-real-ocr-binary");
        let text = tool.run(&image.path().to_string_lossy()).await;
        assert!(text.starts_with("Error processing image: External tool not found"));
    }
}
