//! LLM对话层 - 消息模型、OpenAI兼容客户端与工具调用解析器

pub mod chat;
pub mod client;
pub mod resolver;
pub mod tools;

pub use chat::{ChatMessage, ChatModel, ChatReply, LlmError, Role, ToolSpec};
pub use client::{OpenAiChatClient, check_connection};
pub use resolver::{Resolution, ResolveError, ToolCallResolver};
pub use tools::{AgentTool, ToolRegistry};
