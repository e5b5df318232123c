//! The interactive chat application.
//!
//! This module ties the pieces together into a REPL session:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: the per-line state machine and streaming turns
//! - [`commands`]: exit words
//! - [`interrupt`]: Ctrl+C delivery while a response streams

mod commands;
mod config;
mod interrupt;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer, TerminalWidth};
pub use commands::{EXIT_COMMANDS, is_exit_command};
pub use config::{
    ChatArgs, ChatConfig, DEFAULT_DOCUMENTS_PATH, DEFAULT_EMBED_FILE, DEFAULT_PREAMBLE,
};
pub use interrupt::Interrupt;
pub use session::{ChatSession, LoopControl};
