//! Run or list registry tools from the command line.

use crate::cli::Output;
use crate::config::Settings;
use crate::tools::ToolRegistry;
use anyhow::Result;

/// Run the tool command.
pub async fn run_tool(name: &str, input: &str, settings: &Settings) -> Result<()> {
    let registry = ToolRegistry::with_defaults(&settings.tools)?;

    if registry.get(name).is_none() {
        Output::error(&format!("Unknown tool: {}", name));
        Output::info("Run 'palaver tools' to see what is available.");
        anyhow::bail!("unknown tool '{}'", name);
    }

    let spinner = Output::spinner(&format!("Running {}...", name));
    let output = registry.execute(name, input).await;
    spinner.finish_and_clear();

    println!("{}", output?);
    Ok(())
}

/// Run the tools command.
pub fn run_tools(settings: &Settings) -> Result<()> {
    let registry = ToolRegistry::with_defaults(&settings.tools)?;

    Output::header(&format!("Available tools ({})", registry.len()));
    for tool in registry.iter() {
        Output::tool_info(tool.name(), tool.description());
    }
    println!();

    Ok(())
}
