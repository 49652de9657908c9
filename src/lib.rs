//! Palaver - a multimodal assistant with data tools
//!
//! An assistant that reads CSV, JSON and image files, looks things up on the
//! web, and answers through an OpenAI-compatible chat model.
//!
//! # Overview
//!
//! Palaver allows you to:
//! - Query CSV tables (describe, filter, list values) and JSON documents (dot paths)
//! - Chat with an agent that calls tools on your behalf
//! - Attach images and have their text extracted with tesseract
//! - Run a small state graph that lets a local model talk to itself
//!
//! # Architecture
//!
//! - `query` - CSV and JSON query evaluation
//! - `tools` - Text-in, text-out tools and their registry
//! - `agent` - Tool-calling loop over the chat completions API
//! - `assistant` - Chat session with memory and attached files
//! - `graph` - State graph runner and the conversation demo
//! - `llm` - Plain prompt-to-text model access
//! - `config` - Configuration management
//! - `cli`, `mcp` - Command line, HTTP and MCP surfaces
//!
//! # Example
//!
//! ```rust,no_run
//! use palaver::query::csv_tool;
//!
//! let answer = csv_tool(r#"{"path": "people.csv", "operation": "query", "query": "age > 30"}"#);
//! println!("{}", answer);
//! ```

pub mod agent;
pub mod assistant;
pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod llm;
pub mod mcp;
pub mod openai;
pub mod query;
pub mod tools;

pub use error::{PalaverError, Result};
