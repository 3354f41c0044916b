//! Session persistence
//!
//! All sessions live in memory and are written through to a single JSON
//! blob after every mutation. Persistence is best effort: a failed write is
//! logged and swallowed, and the in-memory state stays authoritative for
//! the rest of the process lifetime.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conversation::{Session, Who, DEFAULT_SESSION_TITLE};

const CHATS_FILE: &str = "chats.json";
const THEME_FILE: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    fn from_str(raw: &str) -> Option<Self> {
        match raw.trim() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// On-disk shape of the chat blob.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedState {
    sessions: Vec<Session>,
    active: String,
}

/// Owns the session list and the active-session pointer.
///
/// Invariants held after every call: the session list is never empty and
/// the active id always names a member of it.
pub struct ChatStore {
    sessions: Vec<Session>,
    active: String,
    theme: Theme,
    data_dir: Option<PathBuf>,
}

impl ChatStore {
    /// Load the store from `data_dir`, falling back to a single seed
    /// session when the blob is missing or unreadable. Never fails outward.
    pub fn load(data_dir: &Path) -> Self {
        let mut store = match fs::read_to_string(data_dir.join(CHATS_FILE)) {
            Ok(raw) => match serde_json::from_str::<PersistedState>(&raw) {
                Ok(state) => Self::from_persisted(state, data_dir),
                Err(err) => {
                    tracing::warn!(%err, "chat blob is malformed, starting fresh");
                    Self::fresh(Some(data_dir.to_path_buf()))
                }
            },
            Err(err) => {
                tracing::debug!(%err, "no chat blob found, starting fresh");
                Self::fresh(Some(data_dir.to_path_buf()))
            }
        };

        store.theme = fs::read_to_string(data_dir.join(THEME_FILE))
            .ok()
            .and_then(|raw| Theme::from_str(&raw))
            .unwrap_or(Theme::Dark);
        store
    }

    /// Store that never touches disk, for tests.
    pub fn new_in_memory() -> Self {
        Self::fresh(None)
    }

    fn fresh(data_dir: Option<PathBuf>) -> Self {
        let seed = Session::seed();
        let active = seed.id.clone();
        Self {
            sessions: vec![seed],
            active,
            theme: Theme::Dark,
            data_dir,
        }
    }

    fn from_persisted(state: PersistedState, data_dir: &Path) -> Self {
        if state.sessions.is_empty() {
            return Self::fresh(Some(data_dir.to_path_buf()));
        }
        let active = if state.sessions.iter().any(|s| s.id == state.active) {
            state.active
        } else {
            state.sessions[0].id.clone()
        };
        Self {
            sessions: state.sessions,
            active,
            theme: Theme::Dark,
            data_dir: Some(data_dir.to_path_buf()),
        }
    }

    /// Write the full store to disk. Best effort: failures are logged, the
    /// caller is never failed.
    pub fn persist(&self) {
        let Some(dir) = &self.data_dir else {
            return;
        };
        let state = PersistedState {
            sessions: self.sessions.clone(),
            active: self.active.clone(),
        };
        let blob = match serde_json::to_string(&state) {
            Ok(blob) => blob,
            Err(err) => {
                tracing::warn!(%err, "failed to serialize chat blob");
                return;
            }
        };
        if let Err(err) = fs::create_dir_all(dir) {
            tracing::warn!(%err, dir = %dir.display(), "failed to create data dir");
            return;
        }
        if let Err(err) = fs::write(dir.join(CHATS_FILE), blob) {
            tracing::warn!(%err, "failed to persist chat blob");
        }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn active_id(&self) -> &str {
        &self.active
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        if let Some(dir) = &self.data_dir {
            if let Err(err) = fs::create_dir_all(dir)
                .and_then(|_| fs::write(dir.join(THEME_FILE), theme.as_str()))
            {
                tracing::warn!(%err, "failed to persist theme");
            }
        }
    }

    pub fn get_session(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Point the store at an existing session. Unknown ids are ignored.
    pub fn set_active(&mut self, id: &str) -> bool {
        if self.get_session(id).is_none() {
            return false;
        }
        self.active = id.to_string();
        self.persist();
        true
    }

    /// Append a message to the named session and write through. A missing
    /// session is a silent no-op so a stale id never fails the caller.
    pub fn append_message(&mut self, session_id: &str, who: Who, content: impl Into<String>) {
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == session_id) else {
            tracing::debug!(session_id, "append to unknown session ignored");
            return;
        };
        session.push(who, content);
        self.persist();
    }

    /// Empty a session's transcript. The session itself stays.
    pub fn clear_messages(&mut self, session_id: &str) {
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == session_id) else {
            return;
        };
        session.messages.clear();
        self.persist();
    }

    pub fn mark_quick_replies_shown(&mut self, session_id: &str) {
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == session_id) else {
            return;
        };
        if !session.quick_replies_shown {
            session.quick_replies_shown = true;
            self.persist();
        }
    }

    /// Allocate a new session at the front of the enumeration order and
    /// return its id. The caller decides whether to activate it.
    pub fn create_session(&mut self, title: Option<&str>) -> String {
        let id = allocate_session_id();
        let session = Session::new(&id, title.unwrap_or(DEFAULT_SESSION_TITLE));
        self.sessions.insert(0, session);
        self.persist();
        id
    }
}

/// Time-derived session id; the random suffix keeps rapid creation unique.
fn allocate_session_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("chat_{}_{}", millis, &suffix[..4])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::DEFAULT_SESSION_ID;

    #[test]
    fn fresh_store_is_seeded_with_one_session() {
        let store = ChatStore::new_in_memory();
        assert_eq!(store.sessions().len(), 1);
        assert_eq!(store.active_id(), DEFAULT_SESSION_ID);
    }

    #[test]
    fn appends_keep_call_order() {
        let mut store = ChatStore::new_in_memory();
        store.append_message(DEFAULT_SESSION_ID, Who::User, "first");
        store.append_message(DEFAULT_SESSION_ID, Who::Bot, "second");
        store.append_message(DEFAULT_SESSION_ID, Who::User, "third");

        let session = store.get_session(DEFAULT_SESSION_ID).unwrap();
        assert_eq!(session.messages.len(), 3);
        let contents: Vec<&str> = session.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["first", "second", "third"]);
    }

    #[test]
    fn append_to_unknown_session_is_a_no_op() {
        let mut store = ChatStore::new_in_memory();
        store.append_message("nope", Who::User, "lost");
        assert_eq!(store.sessions().len(), 1);
        assert!(store.get_session(DEFAULT_SESSION_ID).unwrap().messages.is_empty());
    }

    #[test]
    fn create_session_inserts_at_front_and_leaves_active_alone() {
        let mut store = ChatStore::new_in_memory();
        let id = store.create_session(None);
        assert_eq!(store.sessions()[0].id, id);
        assert_eq!(store.active_id(), DEFAULT_SESSION_ID);

        let session = store.get_session(&id).unwrap();
        assert!(session.messages.is_empty());
        assert_eq!(session.title, DEFAULT_SESSION_TITLE);
    }

    #[test]
    fn created_ids_are_unique_under_rapid_creation() {
        let mut store = ChatStore::new_in_memory();
        let a = store.create_session(None);
        let b = store.create_session(None);
        let c = store.create_session(None);
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn set_active_ignores_unknown_ids() {
        let mut store = ChatStore::new_in_memory();
        assert!(!store.set_active("ghost"));
        assert_eq!(store.active_id(), DEFAULT_SESSION_ID);

        let id = store.create_session(Some("second"));
        assert!(store.set_active(&id));
        assert_eq!(store.active_id(), id);
    }

    #[test]
    fn clear_messages_empties_only_the_named_session() {
        let mut store = ChatStore::new_in_memory();
        let other = store.create_session(None);
        store.append_message(DEFAULT_SESSION_ID, Who::User, "keep me out");
        store.append_message(&other, Who::User, "gone soon");

        store.clear_messages(&other);

        assert!(store.get_session(&other).unwrap().messages.is_empty());
        assert_eq!(store.get_session(DEFAULT_SESSION_ID).unwrap().messages.len(), 1);
        assert_eq!(store.sessions().len(), 2);
    }

    #[test]
    fn load_from_empty_dir_falls_back_to_seed() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChatStore::load(dir.path());
        assert_eq!(store.sessions().len(), 1);
        assert_eq!(store.active_id(), DEFAULT_SESSION_ID);
    }

    #[test]
    fn malformed_blob_falls_back_to_seed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CHATS_FILE), "{not json").unwrap();
        let store = ChatStore::load(dir.path());
        assert_eq!(store.sessions().len(), 1);
        assert_eq!(store.active_id(), DEFAULT_SESSION_ID);
    }

    #[test]
    fn persist_then_load_round_trips_sessions_and_active_id() {
        let dir = tempfile::tempdir().unwrap();

        let (new_id, expected) = {
            let mut store = ChatStore::load(dir.path());
            store.append_message(DEFAULT_SESSION_ID, Who::User, "hello");
            store.append_message(DEFAULT_SESSION_ID, Who::Bot, "hi there");
            let new_id = store.create_session(Some("follow-up"));
            store.set_active(&new_id);
            let ids: Vec<String> = store.sessions().iter().map(|s| s.id.clone()).collect();
            (new_id, ids)
        };

        // Repeated load/persist with no mutation must be idempotent.
        for _ in 0..2 {
            let store = ChatStore::load(dir.path());
            let ids: Vec<String> = store.sessions().iter().map(|s| s.id.clone()).collect();
            assert_eq!(ids, expected);
            assert_eq!(store.active_id(), new_id);
            let default = store.get_session(DEFAULT_SESSION_ID).unwrap();
            assert_eq!(default.messages.len(), 2);
            assert_eq!(default.messages[0].content, "hello");
            assert_eq!(default.messages[1].content, "hi there");
            store.persist();
        }
    }

    #[test]
    fn theme_round_trips_through_its_own_file() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = ChatStore::load(dir.path());
            assert_eq!(store.theme(), Theme::Dark);
            store.set_theme(store.theme().toggled());
        }
        let store = ChatStore::load(dir.path());
        assert_eq!(store.theme(), Theme::Light);
    }

    #[test]
    fn stale_active_id_in_blob_is_repaired_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let blob = r#"{"sessions":[{"id":"a","title":"A","messages":[]}],"active":"gone"}"#;
        fs::write(dir.path().join(CHATS_FILE), blob).unwrap();
        let store = ChatStore::load(dir.path());
        assert_eq!(store.active_id(), "a");
    }
}
