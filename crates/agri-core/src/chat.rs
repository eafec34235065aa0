use crate::models::{ChatMessage, ChatRole};

pub const CHAT_GREETING: &str =
    "Hello! I am your AI farming assistant. Ask me anything about crops, weather, or prices.";

/// Append-only message log for one open chat panel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
}

impl ChatTranscript {
    pub fn with_greeting() -> Self {
        Self {
            messages: vec![ChatMessage::bot(CHAT_GREETING)],
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn count_by_role(&self, role: ChatRole) -> usize {
        self.messages
            .iter()
            .filter(|message| message.role == role)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPanel {
    pub generation: u64,
    pub transcript: ChatTranscript,
    pub loading: bool,
}

impl ChatPanel {
    pub fn open(generation: u64) -> Self {
        Self {
            generation,
            transcript: ChatTranscript::with_greeting(),
            loading: false,
        }
    }
}
