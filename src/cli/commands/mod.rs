//! CLI command implementations.

mod chat;
mod config;
mod converse;
mod data;
mod doctor;
mod mcp;
mod serve;
mod tool;

pub use chat::{run_chat, Attachments};
pub use config::run_config;
pub use converse::run_converse;
pub use data::{run_csv, run_json};
pub use doctor::run_doctor;
pub use mcp::run_mcp;
pub use serve::run_serve;
pub use tool::{run_tool, run_tools};
