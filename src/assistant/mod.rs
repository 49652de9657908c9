//! The multimodal assistant: chat memory, attached files and the agent.

mod files;
mod session;

pub use files::{copy_to_uploads, AttachedFiles, FileKind};
pub use session::AssistantSession;
