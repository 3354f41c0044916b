//! Built-in persona and canned prompt strings
//!
//! These mirror what the assistant shows in its chat surface: a fixed
//! persona label on every bot message, a small set of suggested prompts,
//! and the two fallback texts used when a round trip goes wrong.

/// Label prefixed to every bot message.
pub const PERSONA: &str = "Dr. Medika";

/// Shown when the backend answered but carried no answer field.
pub const NO_ANSWER_FALLBACK: &str = "Sorry, I could not generate a response.";

/// Shown when the round trip itself failed.
pub const TRANSPORT_ERROR: &str = "There was an error talking to the server.";

/// A suggested prompt rendered at the top of a fresh transcript.
#[derive(Debug, Clone, Copy)]
pub struct QuickReply {
    pub label: &'static str,
    pub query: &'static str,
}

pub const QUICK_REPLIES: &[QuickReply] = &[
    QuickReply {
        label: "Dengue symptoms",
        query: "What are dengue symptoms?",
    },
    QuickReply {
        label: "Asthma treatment",
        query: "Asthma treatment options",
    },
    QuickReply {
        label: "COVID prevention",
        query: "COVID prevention tips",
    },
];
