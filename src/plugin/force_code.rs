use crate::plugin::{Plugin, PluginContext, PluginOutcome};

/// Appended verbatim to prompts sent with `-f`.
pub const CODE_ONLY_DIRECTIVE: &str = "!!! ONLY respond with a code fix, no explanation text. \
The goal is to be able to copy it right into source code. \
Do NOT wrap it in markdown!!!";

/// `-f`: asks the model for a bare code fix.
///
/// The whole input line, token included, is kept and the directive is
/// appended to it.
#[derive(Debug, Default, Clone, Copy)]
pub struct ForceCodeOnly;

impl Plugin for ForceCodeOnly {
    fn command(&self) -> &str {
        "-f"
    }

    fn description(&self) -> &str {
        "answer with a code fix only"
    }

    fn run(&self, input: &str, _: &mut PluginContext<'_>) -> PluginOutcome {
        PluginOutcome::Continue(format!("{input}{CODE_ONLY_DIRECTIVE}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::ClipboardSink;
    use crate::conversation::Conversation;
    use crate::error::Result;
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

    fn run(input: &str) -> String {
        let conversation = Conversation::new();
        let mut clipboard = NullClipboard;
        let mut renderer = NullRenderer;
        let mut ctx = PluginContext::new(&conversation, &mut clipboard, &mut renderer);
        match ForceCodeOnly.run(input, &mut ctx) {
            PluginOutcome::Continue(prompt) => prompt,
            PluginOutcome::Terminate => panic!("-f never terminates"),
        }
    }

    #[test]
    fn directive_text() {
        assert!(CODE_ONLY_DIRECTIVE.starts_with("!!! ONLY respond with a code fix"));
        assert!(CODE_ONLY_DIRECTIVE.contains("no explanation text. The goal"));
        assert!(CODE_ONLY_DIRECTIVE.ends_with("Do NOT wrap it in markdown!!!"));
    }

    #[test]
    fn appends_to_whole_line() {
        assert_eq!(
            run("-f make it compile"),
            format!("-f make it compile{CODE_ONLY_DIRECTIVE}")
        );
        assert_eq!(run("-f"), format!("-f{CODE_ONLY_DIRECTIVE}"));
    }

    #[test]
    fn applying_twice_appends_twice() {
        let once = run("-f fix");
        let twice = run(&once);
        assert_eq!(twice, format!("-f fix{CODE_ONLY_DIRECTIVE}{CODE_ONLY_DIRECTIVE}"));
    }
}
