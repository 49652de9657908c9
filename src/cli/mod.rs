//! CLI module for Palaver.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Palaver - a multimodal assistant with data tools
///
/// Chat with an assistant that can read CSV, JSON and image files, search
/// the web and look things up, or run the data tools directly.
#[derive(Parser, Debug)]
#[command(name = "palaver")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,

        /// Attach an image file
        #[arg(long)]
        image: Option<String>,

        /// Attach a CSV file
        #[arg(long)]
        csv: Option<String>,

        /// Attach a JSON file
        #[arg(long)]
        json: Option<String>,

        /// Ask a single question and exit
        #[arg(long)]
        message: Option<String>,
    },

    /// Run the self-conversation graph against a local model
    Converse {
        /// Opening message (defaults to the configured prompt)
        prompt: Option<String>,

        /// Model to use (defaults to graph.model)
        #[arg(short, long)]
        model: Option<String>,

        /// Stop once the conversation holds this many messages
        #[arg(long)]
        max_messages: Option<usize>,
    },

    /// Query a CSV file
    Csv {
        /// Path to the CSV file
        path: String,

        /// Operation: read, head, describe, columns, list, query
        #[arg(short, long, default_value = "read")]
        operation: String,

        /// Column for the 'list' operation
        #[arg(long)]
        column: Option<String>,

        /// Expression for the 'query' operation (e.g. "age > 30")
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Query a JSON file
    Json {
        /// Path to the JSON file
        path: String,

        /// Operation: read, keys, query
        #[arg(short, long, default_value = "read")]
        operation: String,

        /// Dot-separated path for the 'query' operation (e.g. "users.0.name")
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Run a single tool by name
    Tool {
        /// Tool name (see `palaver tools`)
        name: String,

        /// Tool input
        input: String,
    },

    /// List available tools
    Tools,

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Start MCP server exposing the tools to AI assistants
    Mcp,

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
