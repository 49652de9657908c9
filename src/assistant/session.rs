//! A stateful chat session with memory and attached files.

use super::files::{copy_to_uploads, AttachedFiles, FileKind};
use crate::agent::{Agent, AgentResponse, ChatTurn};
use crate::config::Settings;
use crate::error::{PalaverError, Result};
use crate::tools::ToolRegistry;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

const OCR_TOOL: &str = "image_text_extractor";

/// Conversation memory plus the files the user has handed over.
pub struct AssistantSession {
    agent: Agent,
    tools: Arc<ToolRegistry>,
    memory: Vec<ChatTurn>,
    files: AttachedFiles,
    uploads_dir: PathBuf,
    history_window: usize,
}

impl AssistantSession {
    /// Create a session with every built-in tool.
    pub fn new(settings: &Settings) -> Result<Self> {
        let tools = Arc::new(ToolRegistry::with_defaults(&settings.tools)?);
        Self::with_tools(tools, settings)
    }

    /// Create a session over a specific tool registry.
    pub fn with_tools(tools: Arc<ToolRegistry>, settings: &Settings) -> Result<Self> {
        Ok(Self {
            agent: Agent::new(tools.clone(), settings)?,
            tools,
            memory: Vec::new(),
            files: AttachedFiles::default(),
            uploads_dir: settings.uploads_dir(),
            history_window: settings.agent.history_window,
        })
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    pub fn memory(&self) -> &[ChatTurn] {
        &self.memory
    }

    pub fn files(&self) -> &AttachedFiles {
        &self.files
    }

    /// Attach a file, optionally copying it into the uploads directory first.
    ///
    /// Images are run through OCR straight away and the result is noted in memory.
    pub async fn attach(&mut self, kind: FileKind, source: &Path, copy: bool) -> Result<PathBuf> {
        if !source.is_file() {
            return Err(PalaverError::InvalidInput(format!(
                "File not found: {}",
                source.display()
            )));
        }

        let path = if copy {
            copy_to_uploads(source, kind, &self.uploads_dir)?
        } else {
            source.to_path_buf()
        };
        info!("Attached {} file {}", kind, path.display());
        self.files.set(kind, path.clone());

        if kind == FileKind::Image {
            self.note_image(&path).await;
        }
        Ok(path)
    }

    async fn note_image(&mut self, path: &Path) {
        self.memory.push(ChatTurn::system(format!(
            "An image has been uploaded and is available at: {}",
            path.display()
        )));

        let Some(ocr) = self.tools.get(OCR_TOOL) else {
            return;
        };
        let text = ocr.run(&path.to_string_lossy()).await;
        if text.is_empty() || text.starts_with("Error") {
            warn!("OCR skipped for {}: {}", path.display(), text);
            return;
        }
        self.memory
            .push(ChatTurn::system(format!("Text extracted from image: {}", text)));
    }

    /// Messages sent for the next request: system prompt, file context, recent memory.
    pub fn build_context(&self) -> Vec<ChatTurn> {
        let mut turns = vec![ChatTurn::system(self.agent.system_prompt())];
        if let Some(context) = self.files.context() {
            turns.push(ChatTurn::system(context));
        }
        let start = self.memory.len().saturating_sub(self.history_window);
        turns.extend_from_slice(&self.memory[start..]);
        turns
    }

    /// Send a message and return the assistant's reply, or an error message.
    pub async fn chat(&mut self, message: &str) -> String {
        match self.try_chat(message).await {
            Ok(response) => response.content,
            Err(e) => {
                warn!("Chat failed: {}", e);
                format!(
                    "I encountered an error: {}. Please make sure you have set up your OpenAI API key.",
                    e
                )
            }
        }
    }

    /// Send a message, keeping the full agent response.
    pub async fn try_chat(&mut self, message: &str) -> Result<AgentResponse> {
        self.memory.push(ChatTurn::user(message));
        let response = self.agent.run(&self.build_context()).await?;
        self.memory.push(ChatTurn::assistant(response.content.clone()));
        Ok(response)
    }

    /// Forget the conversation. Attached files stay.
    pub fn clear(&mut self) {
        self.memory.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Role, DEFAULT_SYSTEM_PROMPT};
    use crate::tools::Tool;
    use async_trait::async_trait;

    struct FakeOcr(&'static str);

    #[async_trait]
    impl Tool for FakeOcr {
        fn name(&self) -> &str {
            OCR_TOOL
        }

        fn description(&self) -> &str {
            "Fake OCR."
        }

        async fn run(&self, _input: &str) -> String {
            self.0.to_string()
        }
    }

    fn session(dir: &Path, ocr_output: &'static str) -> AssistantSession {
        let mut settings = Settings::default();
        settings.general.data_dir = dir.to_string_lossy().to_string();
        settings.agent.history_window = 3;
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(FakeOcr(ocr_output)));
        AssistantSession::with_tools(Arc::new(tools), &settings).unwrap()
    }

    #[tokio::test]
    async fn test_attach_image_notes_ocr_text() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("receipt.png");
        std::fs::write(&image, b"png").unwrap();

        let mut session = session(dir.path(), "TOTAL 42.00");
        let path = session.attach(FileKind::Image, &image, true).await.unwrap();

        assert!(path.starts_with(dir.path().join("uploads")));
        assert_eq!(session.files().get(FileKind::Image), Some(path.as_path()));
        assert_eq!(session.memory().len(), 2);
        assert_eq!(
            session.memory()[0].content,
            format!("An image has been uploaded and is available at: {}", path.display())
        );
        assert_eq!(session.memory()[1].content, "Text extracted from image: TOTAL 42.00");
    }

    #[tokio::test]
    async fn test_ocr_error_is_not_noted() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("blank.png");
        std::fs::write(&image, b"png").unwrap();

        let mut session = session(dir.path(), "Error processing image: tesseract failed");
        session.attach(FileKind::Image, &image, false).await.unwrap();
        assert_eq!(session.memory().len(), 1);
    }

    #[tokio::test]
    async fn test_attach_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path(), "");
        let result = session
            .attach(FileKind::Csv, &dir.path().join("missing.csv"), true)
            .await;
        assert!(result.is_err());
        assert!(session.files().is_empty());
    }

    #[tokio::test]
    async fn test_context_window_and_file_note() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("data.csv");
        std::fs::write(&csv, "a\n1\n").unwrap();

        let mut session = session(dir.path(), "");
        session.attach(FileKind::Csv, &csv, false).await.unwrap();
        for i in 0..5 {
            session.memory.push(ChatTurn::user(format!("message {}", i)));
        }

        let context = session.build_context();
        assert_eq!(context.len(), 5);
        assert_eq!(context[0].content, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(context[1].role, Role::System);
        assert!(context[1].content.starts_with("Available files:\n- csv: "));
        assert_eq!(context[2].content, "message 2");
        assert_eq!(context[4].content, "message 4");
    }

    #[tokio::test]
    async fn test_clear_keeps_files() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("data.json");
        std::fs::write(&json, "{}").unwrap();

        let mut session = session(dir.path(), "");
        session.attach(FileKind::Json, &json, false).await.unwrap();
        session.memory.push(ChatTurn::user("hello"));
        session.clear();

        assert!(session.memory().is_empty());
        assert!(session.files().get(FileKind::Json).is_some());
        assert_eq!(session.build_context().len(), 2);
    }
}
