//! Converse command: run the conversation graph and print the log.

use crate::cli::Output;
use crate::config::Settings;
use crate::graph::{create_conversation_graph, ConversationState};
use crate::llm::OpenAiModel;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

/// Run the converse command.
pub async fn run_converse(
    prompt: Option<String>,
    model: Option<String>,
    max_messages: Option<usize>,
    settings: Settings,
) -> Result<()> {
    let graph_settings = settings.graph;
    let model = model.unwrap_or(graph_settings.model);
    let prompt = prompt.unwrap_or(graph_settings.prompt);
    let max_messages = max_messages.unwrap_or(graph_settings.max_messages);

    let llm = OpenAiModel::with_api_base(
        &model,
        Some(&graph_settings.api_base),
        Duration::from_secs(settings.llm.timeout_secs),
    )?;
    let graph = create_conversation_graph(Arc::new(llm), max_messages)?;

    let spinner = Output::spinner(&format!("Conversing with {}...", model));
    let result = graph.invoke(ConversationState::from_prompt(&prompt)).await;
    spinner.finish_and_clear();

    match result {
        Ok(state) => {
            println!("{}", state.log());
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Conversation failed: {}", e));
            Output::info(&format!(
                "Is an OpenAI-compatible server running at {}?",
                graph_settings.api_base
            ));
            Err(e.into())
        }
    }
}
