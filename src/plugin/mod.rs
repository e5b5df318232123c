//! Command plugins that intercept user input before it reaches the model.
//!
//! A plugin claims one command token (for example `-c`).  When the first
//! whitespace-delimited token of an input line equals that token, the plugin
//! runs and either hands back a replacement prompt or ends the turn.
//!
//! - [`registry`]: the command table and plugin discovery
//! - [`dispatch`]: routing of raw input lines to plugins
//! - [`copy_response`], [`force_code`], [`documents`]: the built-in plugins

pub mod copy_response;
pub mod dispatch;
pub mod documents;
pub mod force_code;
pub mod registry;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::clipboard::ClipboardSink;
use crate::conversation::Conversation;
use crate::render::Renderer;

pub use copy_response::CopyLastResponse;
pub use dispatch::{dispatch, first_token};
pub use documents::{
    DocumentClear, DocumentEmbed, DocumentQuery, DocumentStore, DocumentStoreHandle, StoreDocument,
};
pub use force_code::{CODE_ONLY_DIRECTIVE, ForceCodeOnly};
pub use registry::{CommandRegistry, PluginDescriptor};

/// What the session should do after a plugin ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginOutcome {
    /// Continue the turn with this text as the effective prompt.
    Continue(String),

    /// End the turn now: no model call, no conversation entry.
    Terminate,
}

/// Everything a plugin may touch while it runs.
pub struct PluginContext<'a> {
    /// Completed turns, oldest first.
    pub conversation: &'a Conversation,

    /// Side-effect sink for copying text out of the session.
    pub clipboard: &'a mut dyn ClipboardSink,

    /// User-visible output.
    pub renderer: &'a mut dyn Renderer,
}

impl<'a> PluginContext<'a> {
    /// Bundles the per-turn collaborators for a plugin run.
    pub fn new(
        conversation: &'a Conversation,
        clipboard: &'a mut dyn ClipboardSink,
        renderer: &'a mut dyn Renderer,
    ) -> Self {
        Self {
            conversation,
            clipboard,
            renderer,
        }
    }
}

/// The contract every command plugin implements.
pub trait Plugin: Send + Sync {
    /// The token that triggers this plugin.
    ///
    /// Must be non-empty and free of whitespace; it is read once at
    /// registration.
    fn command(&self) -> &str;

    /// One-line summary shown in the startup listing.
    fn description(&self) -> &str {
        ""
    }

    /// Handles an input line whose first token equals [`Plugin::command`].
    ///
    /// `input` is the whole line, command token included.
    fn run(&self, input: &str, ctx: &mut PluginContext<'_>) -> PluginOutcome;
}

/// Returns the text that follows the command token, trimmed.
///
/// `None` when the line is the bare token or only whitespace follows it.
pub fn argument(input: &str) -> Option<&str> {
    input
        .split_once(char::is_whitespace)
        .map(|(_, rest)| rest.trim())
        .filter(|rest| !rest.is_empty())
}

/// Locations the built-in plugins read from and write to.
#[derive(Debug, Clone)]
pub struct PluginPaths {
    /// JSON file backing the document store.
    pub documents: PathBuf,

    /// File ingested by `-dbembed`.
    pub embed_file: PathBuf,
}

/// The compile-time plugin manifest.
///
/// Every built-in plugin appears here exactly once; the registry is built from
/// this list at startup.
pub fn builtin_plugins(paths: &PluginPaths) -> Vec<Box<dyn Plugin>> {
    let store: DocumentStoreHandle = Arc::new(Mutex::new(DocumentStore::new(&paths.documents)));
    vec![
        Box::new(CopyLastResponse),
        Box::new(ForceCodeOnly),
        Box::new(StoreDocument::new(Arc::clone(&store))),
        Box::new(DocumentQuery::new(Arc::clone(&store))),
        Box::new(DocumentClear::new(Arc::clone(&store))),
        Box::new(DocumentEmbed::new(store, paths.embed_file.clone())),
    ]
}
