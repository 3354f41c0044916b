//! Core chat components
//!
//! The session store, the session manager, and the conversation engine.

pub mod engine;
pub mod sessions;
pub mod store;

pub use engine::{ConversationEngine, UiEvent};
pub use sessions::SessionManager;
pub use store::{ChatStore, Theme};
