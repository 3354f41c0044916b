//! Chat session data model

use serde::{Deserialize, Serialize};

/// Fixed id of the session every fresh store is seeded with.
pub const DEFAULT_SESSION_ID: &str = "default";

/// Placeholder title given to sessions created without one.
pub const DEFAULT_SESSION_TITLE: &str = "New Chat";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Who {
    User,
    Bot,
}

/// One transcript entry. `content` is an already-rendered fragment; the
/// store never inspects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub who: Who,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,

    /// Whether the canned prompt buttons have been rendered at the top of
    /// this session's transcript. Older persisted blobs predate the field.
    #[serde(default, rename = "quickRepliesShown")]
    pub quick_replies_shown: bool,
}

impl Session {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            messages: Vec::new(),
            quick_replies_shown: false,
        }
    }

    /// The session a fresh store starts with.
    pub fn seed() -> Self {
        Self::new(DEFAULT_SESSION_ID, DEFAULT_SESSION_TITLE)
    }

    pub fn push(&mut self, who: Who, content: impl Into<String>) {
        self.messages.push(Message {
            who,
            content: content.into(),
        });
    }

    /// Number of user-authored messages, used for the local stats fallback.
    pub fn user_message_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.who == Who::User)
            .count()
    }
}
