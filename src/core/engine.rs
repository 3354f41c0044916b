//! Conversation engine
//!
//! Runs the full lifecycle of one user submission: validate, append the
//! user message optimistically, show a typing indicator, call the
//! answering service, and resolve with either the answer or a fixed
//! fallback. Submissions are not serialized; several round trips may be in
//! flight at once, each paired with exactly one indicator.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::prompts;
use crate::conversation::Who;
use crate::core::sessions::SessionManager;
use crate::remote::AnswerService;

/// Notifications for the presentation side. The engine never blocks on the
/// receiver; a dropped receiver just means nobody is watching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    MessageAppended {
        session_id: String,
        who: Who,
        content: String,
    },
    /// A round trip is outstanding; `token` pairs this with its `TypingDone`.
    Typing { session_id: String, token: u64 },
    TypingDone { token: u64 },
    StatsRefreshed { queries_today: u64 },
}

pub struct ConversationEngine {
    sessions: SessionManager,
    api: Arc<dyn AnswerService>,
    events: mpsc::UnboundedSender<UiEvent>,
    submissions: AtomicU64,
}

impl ConversationEngine {
    pub fn new(
        sessions: SessionManager,
        api: Arc<dyn AnswerService>,
        events: mpsc::UnboundedSender<UiEvent>,
    ) -> Self {
        Self {
            sessions,
            api,
            events,
            submissions: AtomicU64::new(0),
        }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Submit one question on the active session.
    ///
    /// Whitespace-only input is rejected silently with no side effect of
    /// any kind. Otherwise the user message is appended before any network
    /// activity, so it survives a failed round trip, and the answer is
    /// resolved against the session that was active at submission time,
    /// even if the user switches sessions while the request is in flight.
    pub async fn submit(&self, raw: &str) {
        let question = raw.trim();
        if question.is_empty() {
            return;
        }

        let session_id = self.sessions.active_id();
        self.sessions.append(&session_id, Who::User, question);
        self.emit(UiEvent::MessageAppended {
            session_id: session_id.clone(),
            who: Who::User,
            content: question.to_string(),
        });

        let token = self.submissions.fetch_add(1, Ordering::Relaxed);
        self.emit(UiEvent::Typing {
            session_id: session_id.clone(),
            token,
        });

        let content = match self.api.ask(question).await {
            Ok(Some(answer)) => format!("{} — {}", prompts::PERSONA, answer),
            Ok(None) => format!("{} — {}", prompts::PERSONA, prompts::NO_ANSWER_FALLBACK),
            Err(err) => {
                tracing::warn!(%err, "answer request failed");
                format!("{} — {}", prompts::PERSONA, prompts::TRANSPORT_ERROR)
            }
        };

        self.emit(UiEvent::TypingDone { token });
        self.sessions.append(&session_id, Who::Bot, content.clone());
        self.emit(UiEvent::MessageAppended {
            session_id,
            who: Who::Bot,
            content,
        });

        self.refresh_stats().await;
    }

    /// Feed one of the built-in suggested prompts through the normal
    /// submission path. Out-of-range indexes are ignored.
    pub async fn quick_reply(&self, index: usize) {
        if let Some(reply) = prompts::QUICK_REPLIES.get(index) {
            self.submit(reply.query).await;
        }
    }

    /// Recompute the "queries today" figure: the dashboard endpoint when it
    /// answers, the local user-message count when it does not.
    pub async fn refresh_stats(&self) {
        let queries_today = match self.api.stats().await {
            Ok(stats) => stats.queries_today.unwrap_or(0),
            Err(err) => {
                tracing::debug!(%err, "stats endpoint unavailable, using local count");
                self.sessions.user_message_count() as u64
            }
        };
        self.emit(UiEvent::StatsRefreshed { queries_today });
    }

    fn emit(&self, event: UiEvent) {
        let _ = self.events.send(event);
    }
}
