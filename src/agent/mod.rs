//! Agent system for task execution with tool calling.
//!
//! Provides an LLM agent that can call any tool in the registry: file and
//! data processing, OCR, web lookups and research.

mod runner;
mod tools;

pub use runner::{
    Agent, AgentResponse, ChatTurn, Role, ToolCallRecord, DEFAULT_SYSTEM_PROMPT,
};
pub use tools::{parse_tool_call, tool_definitions, ToolCall};
