use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Role type for a transcript message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User role.
    User,

    /// Assistant role.
    Assistant,
}

/// A single message in the conversation transcript.
///
/// `full_text` is the complete text of the message; `visible_text` is what the
/// view should display right now. For user messages the two are always equal.
/// For assistant messages `visible_text` starts empty and grows to `full_text`
/// as the reveal engine steps through it, so it is always a prefix of
/// `full_text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message.
    pub role: MessageRole,

    /// The complete text of the message.
    pub full_text: String,

    /// The portion of the text currently visible.
    pub visible_text: String,

    /// When the message was created.
    #[serde(with = "crate::utils::time")]
    pub created_at: OffsetDateTime,
}

impl Message {
    /// Create a new user message. User messages are visible in full
    /// immediately; there is no reveal animation for them.
    pub fn user(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            role: MessageRole::User,
            visible_text: text.clone(),
            full_text: text,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Create a new assistant message with nothing visible yet. The reveal
    /// engine grows `visible_text` toward `full_text`.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            full_text: text.into(),
            visible_text: String::new(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Create a new assistant message that is visible in full immediately.
    ///
    /// Used for fallback texts (failed session start, failed turn) where an
    /// animation would be misleading.
    pub fn assistant_revealed(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            role: MessageRole::Assistant,
            visible_text: text.clone(),
            full_text: text,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Returns true once the whole message is visible.
    pub fn is_fully_revealed(&self) -> bool {
        self.visible_text == self.full_text
    }
}
