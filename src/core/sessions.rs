//! Session selection and enumeration
//!
//! Thin coordination layer over [`ChatStore`]: tracks which session is
//! active and hands the presentation side everything it needs to render,
//! without ever exposing the store lock across an await point.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::conversation::{Session, Who};
use crate::core::store::{ChatStore, Theme};

#[derive(Clone)]
pub struct SessionManager {
    store: Arc<Mutex<ChatStore>>,
}

impl SessionManager {
    pub fn new(store: ChatStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Mutations are synchronous and never held across an await, so a
    /// poisoned lock can only mean a panic mid-read; the data is still
    /// consistent and we keep going with it.
    fn store(&self) -> MutexGuard<'_, ChatStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `(id, title)` pairs in store enumeration order, recomputed from the
    /// store on every call so it can never be stale.
    pub fn list_sessions(&self) -> Vec<(String, String)> {
        self.store()
            .sessions()
            .iter()
            .map(|s| (s.id.clone(), s.title.clone()))
            .collect()
    }

    /// Switch the active session. Unknown ids are a no-op; re-rendering the
    /// transcript is the caller's responsibility.
    pub fn set_active(&self, id: &str) -> bool {
        self.store().set_active(id)
    }

    pub fn active_id(&self) -> String {
        self.store().active_id().to_string()
    }

    /// Snapshot of the active session for rendering.
    pub fn active_session(&self) -> Option<Session> {
        let store = self.store();
        store.get_session(store.active_id()).cloned()
    }

    pub fn get_session(&self, id: &str) -> Option<Session> {
        self.store().get_session(id).cloned()
    }

    /// Create a session, activate it, and return its id.
    pub fn new_session(&self, title: Option<&str>) -> String {
        let mut store = self.store();
        let id = store.create_session(title);
        store.set_active(&id);
        id
    }

    pub fn append(&self, session_id: &str, who: Who, content: impl Into<String>) {
        self.store().append_message(session_id, who, content);
    }

    /// Empty the active session's transcript, keeping the session itself.
    pub fn clear_active(&self) {
        let mut store = self.store();
        let id = store.active_id().to_string();
        store.clear_messages(&id);
    }

    pub fn mark_quick_replies_shown(&self, session_id: &str) {
        self.store().mark_quick_replies_shown(session_id);
    }

    /// User messages across every session, the local fallback for the
    /// dashboard's "queries today" figure.
    pub fn user_message_count(&self) -> usize {
        self.store()
            .sessions()
            .iter()
            .map(|s| s.user_message_count())
            .sum()
    }

    pub fn theme(&self) -> Theme {
        self.store().theme()
    }

    pub fn toggle_theme(&self) -> Theme {
        let mut store = self.store();
        let next = store.theme().toggled();
        store.set_theme(next);
        next
    }
}
