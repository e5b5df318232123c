//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and the resolved
//! configuration the session runs with.

use std::path::PathBuf;

use arrrg_derive::CommandLine;

use crate::plugin::PluginPaths;
use crate::types::{KnownModel, Model};

/// System message sent ahead of every conversation unless overridden.
pub const DEFAULT_PREAMBLE: &str = "You are a helpful assistant.";

/// Default JSON file backing the document store.
pub const DEFAULT_DOCUMENTS_PATH: &str = "a0_docs.json";

/// Default file ingested by `-dbembed`.
pub const DEFAULT_EMBED_FILE: &str = "embed.txt";

/// Command-line arguments for the a0 tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: gpt-4o)", "MODEL")]
    pub model: Option<String>,

    /// System prompt to set context for the conversation.
    #[arrrg(optional, "System prompt for the conversation", "PROMPT")]
    pub system: Option<String>,

    /// Base URL of an OpenAI-compatible API.
    #[arrrg(optional, "API base URL (default: https://api.openai.com/v1/)", "URL")]
    pub base_url: Option<String>,

    /// Document store location.
    #[arrrg(optional, "Document store file (default: a0_docs.json)", "PATH")]
    pub documents: Option<String>,

    /// File read by `-dbembed`.
    #[arrrg(optional, "File stored by -dbembed (default: embed.txt)", "PATH")]
    pub embed_file: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// The model to use for generating responses.
    pub model: Model,

    /// System message prepended to every request.
    pub preamble: String,

    /// API base URL; `None` uses the client's default.
    pub base_url: Option<String>,

    /// JSON file backing the document store.
    pub documents_path: PathBuf,

    /// File ingested by `-dbembed`.
    pub embed_file: PathBuf,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: gpt-4o
    /// - Preamble: "You are a helpful assistant."
    /// - Documents: a0_docs.json, embed file: embed.txt
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            model: Model::Known(KnownModel::Gpt4o),
            preamble: DEFAULT_PREAMBLE.to_string(),
            base_url: None,
            documents_path: PathBuf::from(DEFAULT_DOCUMENTS_PATH),
            embed_file: PathBuf::from(DEFAULT_EMBED_FILE),
            use_color: true,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Sets the system preamble.
    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = preamble.into();
        self
    }

    /// Sets the API base URL.
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    /// Sets the document store location.
    pub fn with_documents_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.documents_path = path.into();
        self
    }

    /// Sets the file read by `-dbembed`.
    pub fn with_embed_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.embed_file = path.into();
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Paths handed to the built-in plugins.
    pub fn plugin_paths(&self) -> PluginPaths {
        PluginPaths {
            documents: self.documents_path.clone(),
            embed_file: self.embed_file.clone(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let defaults = ChatConfig::new();
        ChatConfig {
            model: args.model.map(Model::from).unwrap_or(defaults.model),
            preamble: args.system.unwrap_or(defaults.preamble),
            base_url: args.base_url,
            documents_path: args
                .documents
                .map(PathBuf::from)
                .unwrap_or(defaults.documents_path),
            embed_file: args
                .embed_file
                .map(PathBuf::from)
                .unwrap_or(defaults.embed_file),
            use_color: !args.no_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert_eq!(config.model, Model::Known(KnownModel::Gpt4o));
        assert_eq!(config.preamble, "You are a helpful assistant.");
        assert!(config.base_url.is_none());
        assert_eq!(config.documents_path, PathBuf::from("a0_docs.json"));
        assert_eq!(config.embed_file, PathBuf::from("embed.txt"));
        assert!(config.use_color);
    }

    #[test]
    fn config_from_args_defaults() {
        let config = ChatConfig::from(ChatArgs::default());
        assert_eq!(config.model, Model::Known(KnownModel::Gpt4o));
        assert_eq!(config.preamble, DEFAULT_PREAMBLE);
        assert!(config.use_color);
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            model: Some("gpt-4o-mini".to_string()),
            system: Some("You are terse.".to_string()),
            base_url: Some("http://localhost:8080/v1".to_string()),
            documents: Some("/tmp/docs.json".to_string()),
            embed_file: Some("notes.txt".to_string()),
            no_color: true,
        };
        let config = ChatConfig::from(args);
        assert_eq!(config.model, Model::Known(KnownModel::Gpt4oMini));
        assert_eq!(config.preamble, "You are terse.");
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080/v1"));
        assert_eq!(config.plugin_paths().documents, PathBuf::from("/tmp/docs.json"));
        assert_eq!(config.plugin_paths().embed_file, PathBuf::from("notes.txt"));
        assert!(!config.use_color);
    }

    #[test]
    fn unknown_model_is_custom() {
        let args = ChatArgs {
            model: Some("llama3".to_string()),
            ..Default::default()
        };
        assert_eq!(
            ChatConfig::from(args).model,
            Model::Custom("llama3".to_string())
        );
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_model(Model::Known(KnownModel::Gpt4oMini))
            .with_preamble("Be brief.")
            .with_base_url(Some("http://example.test/v1/".to_string()))
            .with_documents_path("docs.json")
            .with_embed_file("in.txt")
            .without_color();
        assert_eq!(config.model, Model::Known(KnownModel::Gpt4oMini));
        assert_eq!(config.preamble, "Be brief.");
        assert_eq!(config.base_url.as_deref(), Some("http://example.test/v1/"));
        assert_eq!(config.documents_path, PathBuf::from("docs.json"));
        assert_eq!(config.embed_file, PathBuf::from("in.txt"));
        assert!(!config.use_color);
    }
}
