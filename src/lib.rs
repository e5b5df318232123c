// Public modules
pub mod chat;
pub mod client;
pub mod clipboard;
pub mod conversation;
pub mod error;
pub mod observability;
pub mod plugin;
pub mod render;
pub mod sse;
pub mod types;

// Re-exports
pub use client::{FragmentStream, OpenAi, ResponseSource};
pub use clipboard::{ClipboardSink, SystemClipboard};
pub use conversation::{Conversation, ConversationEntry};
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use plugin::{CommandRegistry, Plugin, PluginContext, PluginOutcome, dispatch};
pub use render::{PlainTextRenderer, Renderer, TerminalWidth, WidthProvider, WordWrap};
pub use types::*;
