//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the conversation,
//! routes input through the plugin registry, and renders streamed responses.

use std::time::Instant;

use futures::StreamExt;
use tracing::{debug, error};

use crate::chat::commands::is_exit_command;
use crate::chat::config::ChatConfig;
use crate::chat::interrupt::Interrupt;
use crate::client::ResponseSource;
use crate::clipboard::{ClipboardSink, SystemClipboard};
use crate::conversation::{Conversation, ConversationEntry};
use crate::error::{Error, Result};
use crate::observability::{
    STREAM_BYTES, STREAM_DURATION, STREAM_FRAGMENTS, STREAM_TTFB, TURNS_COMPLETED, TURNS_FAILED,
    TURNS_INTERRUPTED,
};
use crate::plugin::{CommandRegistry, PluginContext, PluginOutcome, dispatch};
use crate::render::{Renderer, WidthProvider, WordWrap};
use crate::types::{ChatCompletionRequest, Model};

/// What the input loop should do after a line was processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    /// Read the next line.
    Continue,

    /// Leave the loop.
    Exit,
}

/// A chat session that manages conversation state and model interactions.
pub struct ChatSession<S: ResponseSource> {
    source: S,
    config: ChatConfig,
    conversation: Conversation,
    registry: CommandRegistry,
    clipboard: Box<dyn ClipboardSink>,
}

impl<S: ResponseSource> ChatSession<S> {
    /// Creates a session that copies to the system clipboard.
    pub fn new(source: S, config: ChatConfig, registry: CommandRegistry) -> Self {
        Self {
            source,
            config,
            conversation: Conversation::new(),
            registry,
            clipboard: Box::new(SystemClipboard::new()),
        }
    }

    /// Replaces the clipboard sink.
    pub fn with_clipboard(mut self, clipboard: Box<dyn ClipboardSink>) -> Self {
        self.clipboard = clipboard;
        self
    }

    /// Returns the completed turns.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Returns the command registry.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Returns the current model.
    pub fn model(&self) -> &Model {
        &self.config.model
    }

    /// Handles one line of user input.
    ///
    /// Blank lines are ignored and exit words end the loop.  Everything else
    /// goes through plugin dispatch and, unless a plugin ends the turn, to the
    /// model.  Model errors are printed and the loop continues; an interrupt
    /// ends it.
    pub async fn process_input(
        &mut self,
        line: &str,
        renderer: &mut dyn Renderer,
        width: &dyn WidthProvider,
        interrupt: &Interrupt,
    ) -> LoopControl {
        let line = line.trim();
        if line.is_empty() {
            return LoopControl::Continue;
        }
        if is_exit_command(line) {
            return LoopControl::Exit;
        }

        let outcome = {
            let mut ctx =
                PluginContext::new(&self.conversation, self.clipboard.as_mut(), &mut *renderer);
            dispatch(line, &self.registry, &mut ctx)
        };
        let prompt = match outcome {
            PluginOutcome::Continue(prompt) => prompt,
            PluginOutcome::Terminate => return LoopControl::Continue,
        };

        match self.send_streaming(&prompt, renderer, width, interrupt).await {
            Ok(_) => LoopControl::Continue,
            Err(err) if err.is_interrupted() => {
                renderer.print_interrupted();
                LoopControl::Exit
            }
            Err(err) => {
                error!(
                    error = %err,
                    status = ?err.status_code(),
                    request_id = ?err.request_id(),
                    "turn failed"
                );
                renderer.print_error(&err.to_string());
                if let Some(hint) = failure_hint(&err) {
                    renderer.print_info(hint);
                }
                LoopControl::Continue
            }
        }
    }

    /// Sends `prompt` with the conversation so far and renders the reply.
    ///
    /// Fragments are word-wrapped for display while the raw text is
    /// accumulated.  Only a stream that ends cleanly is appended to the
    /// conversation; on error or interrupt nothing is recorded.
    ///
    /// # Errors
    ///
    /// Returns the source's error if the request or the stream fails, and
    /// [`Error::Interrupted`] if `interrupt` fires first.
    pub async fn send_streaming(
        &mut self,
        prompt: &str,
        renderer: &mut dyn Renderer,
        width: &dyn WidthProvider,
        interrupt: &Interrupt,
    ) -> Result<ConversationEntry> {
        let messages = self.conversation.to_messages(&self.config.preamble, prompt);
        let request = ChatCompletionRequest::new_streaming(self.config.model.clone(), messages);
        debug!(
            model = %self.config.model,
            history = self.conversation.len(),
            "sending prompt"
        );

        let started = Instant::now();
        let mut stream = tokio::select! {
            biased;
            _ = interrupt.triggered() => {
                TURNS_INTERRUPTED.click();
                return Err(Error::interrupted("interrupted before the response started"));
            }
            stream = self.source.stream(request) => {
                stream.inspect_err(|_| TURNS_FAILED.click())?
            }
        };

        let mut wrap = WordWrap::from_provider(width);
        let mut response = String::new();
        let mut first_fragment = true;
        renderer.start_response();
        loop {
            let next = tokio::select! {
                biased;
                _ = interrupt.triggered() => {
                    TURNS_INTERRUPTED.click();
                    debug!(received = response.len(), "response interrupted");
                    return Err(Error::interrupted("response interrupted"));
                }
                next = stream.next() => next,
            };
            let fragment = match next {
                Some(Ok(fragment)) => fragment,
                Some(Err(err)) => {
                    TURNS_FAILED.click();
                    renderer.finish_response();
                    return Err(err);
                }
                None => break,
            };
            if first_fragment {
                STREAM_TTFB.add(started.elapsed().as_secs_f64());
                first_fragment = false;
            }
            STREAM_FRAGMENTS.click();
            STREAM_BYTES.count(fragment.len() as u64);
            renderer.print_text(&wrap.wrap(&fragment));
            response.push_str(&fragment);
        }
        renderer.finish_response();
        STREAM_DURATION.add(started.elapsed().as_secs_f64());
        TURNS_COMPLETED.click();

        let entry = ConversationEntry::new(prompt, response);
        self.conversation.push(entry.clone());
        debug!(turns = self.conversation.len(), "turn complete");
        Ok(entry)
    }
}

/// A follow-up line for turn failures the user can act on.
fn failure_hint(err: &Error) -> Option<&'static str> {
    if err.is_authentication() {
        Some("Check that OPENAI_API_KEY is set to a valid key.")
    } else if err.is_rate_limit() {
        Some("Rate limited; wait a moment and try again.")
    } else if err.is_timeout() || err.is_server_error() {
        Some("The API did not answer in time; try again.")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use futures::stream;

    use super::*;
    use crate::client::FragmentStream;
    use crate::types::KnownModel;

    struct Canned(Vec<&'static str>);

    #[async_trait::async_trait]
    impl ResponseSource for Canned {
        async fn stream(&self, _: ChatCompletionRequest) -> Result<FragmentStream> {
            let fragments = self
                .0
                .iter()
                .map(|f| Ok(f.to_string()))
                .collect::<Vec<_>>();
            Ok(Box::pin(stream::iter(fragments)))
        }
    }

    struct Silent;

    impl Renderer for Silent {
        fn print_text(&mut self, _: &str) {}
        fn print_error(&mut self, _: &str) {}
        fn print_info(&mut self, _: &str) {}
        fn finish_response(&mut self) {}
    }

    struct NoClipboard;

    impl ClipboardSink for NoClipboard {
        fn write(&mut self, _: &str) -> Result<()> {
            Ok(())
        }
    }

    fn session(fragments: Vec<&'static str>) -> ChatSession<Canned> {
        ChatSession::new(Canned(fragments), ChatConfig::new(), CommandRegistry::new())
            .with_clipboard(Box::new(NoClipboard))
    }

    #[test]
    fn new_session_empty() {
        let session = session(vec![]);
        assert!(session.conversation().is_empty());
        assert!(session.registry().is_empty());
        assert_eq!(session.model(), &Model::Known(KnownModel::Gpt4o));
    }

    #[tokio::test]
    async fn streamed_turn_is_recorded() {
        let mut session = session(vec!["Hi", " there"]);
        let entry = session
            .send_streaming("hello", &mut Silent, &|| 80_usize, &Interrupt::new())
            .await
            .unwrap();
        assert_eq!(entry.prompt(), "hello");
        assert_eq!(entry.response(), "Hi there");
        assert_eq!(session.conversation().len(), 1);
    }

    #[tokio::test]
    async fn blank_and_exit_lines() {
        let mut session = session(vec!["unused"]);
        let interrupt = Interrupt::new();
        assert_eq!(
            session.process_input("   ", &mut Silent, &|| 80_usize, &interrupt).await,
            LoopControl::Continue
        );
        assert_eq!(
            session.process_input(" Quit ", &mut Silent, &|| 80_usize, &interrupt).await,
            LoopControl::Exit
        );
        assert!(session.conversation().is_empty());
    }

    #[test]
    fn hints_for_actionable_failures() {
        assert!(failure_hint(&Error::authentication("bad key")).is_some());
        assert!(failure_hint(&Error::rate_limit("slow down", Some(3))).is_some());
        assert!(failure_hint(&Error::timeout("late", None)).is_some());
        assert!(failure_hint(&Error::service_unavailable("down", None)).is_some());
        assert!(failure_hint(&Error::streaming("reset", None)).is_none());
        assert!(failure_hint(&Error::bad_request("nope", None)).is_none());
    }

    #[tokio::test]
    async fn interrupt_exits_without_recording() {
        let mut session = session(vec!["never", "seen"]);
        let interrupt = Interrupt::new();
        interrupt.trigger();
        assert_eq!(
            session.process_input("hello", &mut Silent, &|| 80_usize, &interrupt).await,
            LoopControl::Exit
        );
        assert!(session.conversation().is_empty());
    }
}
