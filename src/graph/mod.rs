//! State graph execution and the conversation demo built on it.

mod conversation;
mod state_graph;

pub use conversation::{
    create_conversation_graph, route_to_end, ConversationState, GenerateNode, Message,
};
pub use state_graph::{CompiledGraph, Node, Router, StateGraph, END};
