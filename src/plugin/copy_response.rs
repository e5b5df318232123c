use tracing::warn;

use crate::observability::CLIPBOARD_FAILURES;
use crate::plugin::{Plugin, PluginContext, PluginOutcome};

/// `-c`: copies the most recent assistant response to the clipboard.
///
/// Always ends the turn.
#[derive(Debug, Default, Clone, Copy)]
pub struct CopyLastResponse;

impl Plugin for CopyLastResponse {
    fn command(&self) -> &str {
        "-c"
    }

    fn description(&self) -> &str {
        "copy the last response to the clipboard"
    }

    fn run(&self, _: &str, ctx: &mut PluginContext<'_>) -> PluginOutcome {
        let Some(entry) = ctx.conversation.last() else {
            ctx.renderer.print_info("No response to copy yet.");
            return PluginOutcome::Terminate;
        };
        match ctx.clipboard.write(entry.response()) {
            Ok(()) => ctx.renderer.print_info("Last response copied to clipboard."),
            Err(err) => {
                CLIPBOARD_FAILURES.click();
                warn!(error = %err, "clipboard write failed");
                ctx.renderer.print_error(&err.to_string());
            }
        }
        PluginOutcome::Terminate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::ClipboardSink;
    use crate::conversation::{Conversation, ConversationEntry};
    use crate::error::{Error, Result};
    use crate::render::Renderer;

    #[derive(Default)]
    struct RecordingClipboard {
        writes: Vec<String>,
        fail: bool,
    }

    impl ClipboardSink for RecordingClipboard {
        fn write(&mut self, text: &str) -> Result<()> {
            if self.fail {
                return Err(Error::clipboard("no display", None));
            }
            self.writes.push(text.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        info: Vec<String>,
        errors: Vec<String>,
    }

    impl Renderer for RecordingRenderer {
        fn print_text(&mut self, _: &str) {}

        fn print_error(&mut self, error: &str) {
            self.errors.push(error.to_string());
        }

        fn print_info(&mut self, info: &str) {
            self.info.push(info.to_string());
        }

        fn finish_response(&mut self) {}
    }

    #[test]
    fn empty_conversation_leaves_clipboard_alone() {
        let conversation = Conversation::new();
        let mut clipboard = RecordingClipboard::default();
        let mut renderer = RecordingRenderer::default();
        let mut ctx = PluginContext::new(&conversation, &mut clipboard, &mut renderer);
        assert_eq!(CopyLastResponse.run("-c", &mut ctx), PluginOutcome::Terminate);
        assert!(clipboard.writes.is_empty());
        assert_eq!(renderer.info, vec!["No response to copy yet."]);
    }

    #[test]
    fn copies_most_recent_response() {
        let mut conversation = Conversation::new();
        conversation.push(ConversationEntry::new("Hi", "Hello"));
        conversation.push(ConversationEntry::new("Again", "Hello again"));
        let mut clipboard = RecordingClipboard::default();
        let mut renderer = RecordingRenderer::default();
        let mut ctx = PluginContext::new(&conversation, &mut clipboard, &mut renderer);
        assert_eq!(CopyLastResponse.run("-c", &mut ctx), PluginOutcome::Terminate);
        assert_eq!(clipboard.writes, vec!["Hello again"]);
        assert_eq!(renderer.info, vec!["Last response copied to clipboard."]);
    }

    #[test]
    fn clipboard_failure_is_reported_not_propagated() {
        let mut conversation = Conversation::new();
        conversation.push(ConversationEntry::new("Hi", "Hello"));
        let mut clipboard = RecordingClipboard {
            fail: true,
            ..Default::default()
        };
        let mut renderer = RecordingRenderer::default();
        let mut ctx = PluginContext::new(&conversation, &mut clipboard, &mut renderer);
        assert_eq!(CopyLastResponse.run("-c", &mut ctx), PluginOutcome::Terminate);
        assert_eq!(renderer.errors.len(), 1);
        assert!(renderer.info.is_empty());
    }
}
