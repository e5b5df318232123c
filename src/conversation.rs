//! Conversation state for a chat session.
//!
//! A [`Conversation`] is the ordered log of completed turns.  It is owned by the
//! chat session, lent read-only to plugins and to the request builder, and only
//! ever grows: entries are appended after a turn completes and are never edited,
//! removed, or reordered.

use crate::types::ChatMessage;

/// One completed turn: the prompt that reached the model and its full response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationEntry {
    prompt: String,
    response: String,
}

impl ConversationEntry {
    /// Creates an entry from a prompt and the unwrapped response text.
    pub fn new(prompt: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response: response.into(),
        }
    }

    /// The effective prompt sent to the model.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The response exactly as streamed, without display line breaks.
    pub fn response(&self) -> &str {
        &self.response
    }
}

/// Ordered log of completed turns.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    entries: Vec<ConversationEntry>,
}

impl Conversation {
    /// Creates an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a completed turn.
    pub fn push(&mut self, entry: ConversationEntry) {
        self.entries.push(entry);
    }

    /// Returns the number of completed turns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no turn has completed yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the most recent turn.
    pub fn last(&self) -> Option<&ConversationEntry> {
        self.entries.last()
    }

    /// Iterates over turns in chat order.
    pub fn iter(&self) -> impl Iterator<Item = &ConversationEntry> {
        self.entries.iter()
    }

    /// Builds the model-facing transcript for a new prompt.
    ///
    /// The system preamble comes first, then every completed turn as a
    /// user/assistant pair, then `prompt` as the final user message.
    pub fn to_messages(&self, preamble: &str, prompt: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.entries.len() * 2 + 2);
        messages.push(ChatMessage::system(preamble));
        for entry in &self.entries {
            messages.push(ChatMessage::user(entry.prompt()));
            messages.push(ChatMessage::assistant(entry.response()));
        }
        messages.push(ChatMessage::user(prompt));
        messages
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a ConversationEntry;
    type IntoIter = std::slice::Iter<'a, ConversationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatRole;

    #[test]
    fn new_conversation_is_empty() {
        let conversation = Conversation::new();
        assert!(conversation.is_empty());
        assert!(conversation.last().is_none());
    }

    #[test]
    fn entries_keep_insertion_order() {
        let mut conversation = Conversation::new();
        conversation.push(ConversationEntry::new("one", "1"));
        conversation.push(ConversationEntry::new("two", "2"));
        let prompts = conversation.iter().map(|e| e.prompt()).collect::<Vec<_>>();
        assert_eq!(prompts, vec!["one", "two"]);
        assert_eq!(conversation.last().unwrap().response(), "2");
    }

    #[test]
    fn messages_replay_history() {
        let mut conversation = Conversation::new();
        conversation.push(ConversationEntry::new("Hi", "Hello!"));
        let messages = conversation.to_messages("Be brief.", "How are you?");
        assert_eq!(
            messages,
            vec![
                ChatMessage::system("Be brief."),
                ChatMessage::user("Hi"),
                ChatMessage::assistant("Hello!"),
                ChatMessage::user("How are you?"),
            ]
        );
    }

    #[test]
    fn empty_history_is_preamble_and_prompt() {
        let messages = Conversation::new().to_messages("sys", "prompt");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(messages[1].role, ChatRole::User);
    }
}
