//! MCP (Model Context Protocol) server for Palaver.
//!
//! Lets AI assistants call the Palaver tools.
//! Implements JSON-RPC 2.0 over stdio.

mod protocol;
mod server;
mod tools;

pub use server::McpServer;
