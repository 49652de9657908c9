//! A two-party conversation driven by a single generate node.

use super::state_graph::{CompiledGraph, Node, StateGraph, END};
use crate::error::{PalaverError, Result};
use crate::llm::LanguageModel;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::info;

const GENERATE: &str = "generate";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", content = "content", rename_all = "lowercase")]
pub enum Message {
    Human(String),
    Ai(String),
}

impl Message {
    pub fn content(&self) -> &str {
        match self {
            Message::Human(text) | Message::Ai(text) => text,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Human(text) => write!(f, "Human: {}", text),
            Message::Ai(text) => write!(f, "AI: {}", text),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversationState {
    pub messages: Vec<Message>,
}

impl ConversationState {
    /// Start a conversation from one human message.
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            messages: vec![Message::Human(prompt.to_string())],
        }
    }

    /// The transcript as printed after a run.
    pub fn log(&self) -> String {
        let mut out = String::from("Conversation Log:");
        for message in &self.messages {
            out.push('\n');
            out.push_str(&message.to_string());
        }
        out
    }
}

/// Answers the latest message with the model's completion.
pub struct GenerateNode {
    llm: Arc<dyn LanguageModel>,
}

impl GenerateNode {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Node<ConversationState> for GenerateNode {
    async fn run(&self, mut state: ConversationState) -> Result<ConversationState> {
        let last = state
            .messages
            .last()
            .ok_or_else(|| PalaverError::Graph("Conversation has no messages".to_string()))?;

        info!("Generating reply with {}", self.llm.model_name());
        let reply = self.llm.invoke(last.content()).await?;
        state.messages.push(Message::Ai(reply));
        Ok(state)
    }
}

/// END once the transcript holds `max_messages` entries, otherwise generate again.
pub fn route_to_end(state: &ConversationState, max_messages: usize) -> String {
    if state.messages.len() >= max_messages {
        END.to_string()
    } else {
        GENERATE.to_string()
    }
}

pub fn create_conversation_graph(
    llm: Arc<dyn LanguageModel>,
    max_messages: usize,
) -> Result<CompiledGraph<ConversationState>> {
    let mut graph = StateGraph::new();
    graph.add_node(GENERATE, Arc::new(GenerateNode::new(llm)))?;
    graph.set_entry_point(GENERATE);
    graph.add_conditional_edges(
        GENERATE,
        move |state: &ConversationState| route_to_end(state, max_messages),
        &[(GENERATE, GENERATE), (END, END)],
    )?;
    graph.compile()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingModel {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LanguageModel for CountingModel {
        async fn invoke(&self, prompt: &str) -> Result<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("reply {} to {}", n, prompt.len()))
        }

        fn model_name(&self) -> &str {
            "counting"
        }
    }

    struct FailingModel;

    #[async_trait]
    impl LanguageModel for FailingModel {
        async fn invoke(&self, _prompt: &str) -> Result<String> {
            Err(PalaverError::OpenAI("connection refused".to_string()))
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_conversation_stops_at_limit() {
        let model = Arc::new(CountingModel { calls: AtomicUsize::new(0) });
        let graph = create_conversation_graph(model.clone(), 6).unwrap();

        let state = graph.invoke(ConversationState::from_prompt("Hi")).await.unwrap();

        assert_eq!(state.messages.len(), 6);
        assert_eq!(model.calls.load(Ordering::SeqCst), 5);
        assert_eq!(state.messages[0], Message::Human("Hi".to_string()));
        assert!(matches!(state.messages[5], Message::Ai(_)));
    }

    #[tokio::test]
    async fn test_generate_runs_at_least_once() {
        let model = Arc::new(CountingModel { calls: AtomicUsize::new(0) });
        let graph = create_conversation_graph(model.clone(), 1).unwrap();

        let state = graph.invoke(ConversationState::from_prompt("Hi")).await.unwrap();
        assert_eq!(state.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_model_error_propagates() {
        let graph = create_conversation_graph(Arc::new(FailingModel), 6).unwrap();
        let err = graph
            .invoke(ConversationState::from_prompt("Hi"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_empty_state_is_rejected() {
        let model = Arc::new(CountingModel { calls: AtomicUsize::new(0) });
        let graph = create_conversation_graph(model, 6).unwrap();
        assert!(graph.invoke(ConversationState::default()).await.is_err());
    }

    #[test]
    fn test_log_format() {
        let state = ConversationState {
            messages: vec![
                Message::Human("Tell me a story".to_string()),
                Message::Ai("Once upon a time".to_string()),
            ],
        };
        assert_eq!(
            state.log(),
            "Conversation Log:\nHuman: Tell me a story\nAI: Once upon a time"
        );
    }

    #[test]
    fn test_route_to_end() {
        let state = ConversationState::from_prompt("Hi");
        assert_eq!(route_to_end(&state, 2), GENERATE);
        assert_eq!(route_to_end(&state, 1), END);
    }
}
