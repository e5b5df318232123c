//! Clipboard sink used by plugins.

use crate::error::{Error, Result};

/// Destination for text a plugin hands off to the desktop.
///
/// Writes are fire-and-forget from the session's point of view: the plugin
/// that calls [`ClipboardSink::write`] owns the failure.
pub trait ClipboardSink {
    /// Replaces the clipboard contents with `text`.
    fn write(&mut self, text: &str) -> Result<()>;
}

/// The system clipboard.
///
/// A platform handle is opened per write, so a0 still starts on machines
/// without a display server.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl SystemClipboard {
    /// Creates a system clipboard sink.
    pub fn new() -> Self {
        Self
    }
}

impl ClipboardSink for SystemClipboard {
    fn write(&mut self, text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new().map_err(|e| {
            Error::clipboard(format!("could not open clipboard: {e}"), Some(Box::new(e)))
        })?;
        clipboard.set_text(text.to_string()).map_err(|e| {
            Error::clipboard(format!("could not write clipboard: {e}"), Some(Box::new(e)))
        })
    }
}
