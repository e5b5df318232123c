//! Routing of raw input lines to plugins.

use tracing::debug;

use crate::observability::{PLUGIN_DISPATCHES, PLUGIN_TERMINATIONS};
use crate::plugin::{CommandRegistry, PluginContext, PluginOutcome};

/// Returns the candidate command token of an input line.
///
/// This is the text before the first whitespace character, or the whole line
/// when it has none.
pub fn first_token(input: &str) -> &str {
    input
        .split_once(char::is_whitespace)
        .map_or(input, |(token, _)| token)
}

/// Routes `input` to the plugin registered for its first token.
///
/// Lines whose first token matches no plugin come back unchanged as
/// [`PluginOutcome::Continue`].  Only the first token is considered, and the
/// match is exact.
pub fn dispatch(
    input: &str,
    registry: &CommandRegistry,
    ctx: &mut PluginContext<'_>,
) -> PluginOutcome {
    let token = first_token(input);
    let Some(plugin) = registry.lookup(token) else {
        return PluginOutcome::Continue(input.to_string());
    };

    PLUGIN_DISPATCHES.click();
    let outcome = plugin.run(input, ctx);
    match &outcome {
        PluginOutcome::Continue(prompt) => {
            debug!(command = token, prompt_len = prompt.len(), "plugin rewrote prompt");
        }
        PluginOutcome::Terminate => {
            PLUGIN_TERMINATIONS.click();
            debug!(command = token, "plugin ended the turn");
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::clipboard::ClipboardSink;
    use crate::conversation::Conversation;
    use crate::error::Result;
    use crate::plugin::Plugin;
    use crate::render::Renderer;

    struct NullClipboard;

    impl ClipboardSink for NullClipboard {
        fn write(&mut self, _: &str) -> Result<()> {
            Ok(())
        }
    }

    struct NullRenderer;

    impl Renderer for NullRenderer {
        fn print_text(&mut self, _: &str) {}
        fn print_error(&mut self, _: &str) {}
        fn print_info(&mut self, _: &str) {}
        fn finish_response(&mut self) {}
    }

    struct Counting {
        runs: Arc<AtomicUsize>,
        outcome: PluginOutcome,
    }

    impl Plugin for Counting {
        fn command(&self) -> &str {
            "-t"
        }

        fn run(&self, _: &str, _: &mut PluginContext<'_>) -> PluginOutcome {
            self.runs.fetch_add(1, Ordering::Relaxed);
            self.outcome.clone()
        }
    }

    fn registry_with(outcome: PluginOutcome) -> (CommandRegistry, Arc<AtomicUsize>) {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut registry = CommandRegistry::new();
        registry
            .register(Box::new(Counting {
                runs: Arc::clone(&runs),
                outcome,
            }))
            .unwrap();
        (registry, runs)
    }

    fn run(input: &str, registry: &CommandRegistry) -> PluginOutcome {
        let conversation = Conversation::new();
        let mut clipboard = NullClipboard;
        let mut renderer = NullRenderer;
        let mut ctx = PluginContext::new(&conversation, &mut clipboard, &mut renderer);
        dispatch(input, registry, &mut ctx)
    }

    #[test]
    fn first_token_splits_on_whitespace() {
        assert_eq!(first_token("-f make it compile"), "-f");
        assert_eq!(first_token("-f\tx"), "-f");
        assert_eq!(first_token("-c"), "-c");
        assert_eq!(first_token(""), "");
    }

    #[test]
    fn unmatched_input_passes_through() {
        let (registry, runs) = registry_with(PluginOutcome::Terminate);
        for input in ["hello there", "", "-tx", "-T", "say -t now", " -t"] {
            assert_eq!(
                run(input, &registry),
                PluginOutcome::Continue(input.to_string())
            );
        }
        assert_eq!(runs.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn matched_token_runs_plugin() {
        let (registry, runs) = registry_with(PluginOutcome::Terminate);
        assert_eq!(run("-t", &registry), PluginOutcome::Terminate);
        assert_eq!(run("-t with args", &registry), PluginOutcome::Terminate);
        assert_eq!(runs.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn matched_token_can_rewrite() {
        let (registry, _) = registry_with(PluginOutcome::Continue("rewritten".to_string()));
        assert_eq!(
            run("-t original", &registry),
            PluginOutcome::Continue("rewritten".to_string())
        );
    }
}
