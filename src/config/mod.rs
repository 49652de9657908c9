//! Configuration module for Palaver.
//!
//! Handles loading and saving application settings.

mod settings;

pub use settings::{
    AgentSettings, GeneralSettings, GraphSettings, LlmSettings, Settings, ToolSettings,
};
