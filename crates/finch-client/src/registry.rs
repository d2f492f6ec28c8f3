//! In-memory registry of known sessions.
//!
//! The registry owns the session list and the current selection. It is the
//! only writer of session metadata; the conversation machine asks it to
//! record exchanges and inferred titles but never touches the list itself.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use finch_core::{FinchError, RemoteApi, Result, Session, title};
use finch_store::ProfileStore;

struct RegistryState {
    sessions: Vec<Session>,
    current: Option<i64>,
}

/// Session list and selection, shared behind a read-write lock.
pub struct SessionRegistry {
    profile: Arc<ProfileStore>,
    remote: Arc<dyn RemoteApi>,
    state: RwLock<RegistryState>,
}

impl SessionRegistry {
    pub fn new(profile: Arc<ProfileStore>, remote: Arc<dyn RemoteApi>) -> Self {
        Self {
            profile,
            remote,
            state: RwLock::new(RegistryState {
                sessions: Vec::new(),
                current: None,
            }),
        }
    }

    /// Loads the session list and restores or establishes a selection.
    ///
    /// The persisted last-active session wins when it still exists; otherwise
    /// the first listed session; otherwise a fresh one is created. The final
    /// choice is persisted.
    pub async fn boot(&self) -> Result<Session> {
        let page = self.remote.list_sessions().await?;
        let mut sessions = page.items;

        let remembered = self.profile.last_session();
        let selected = remembered
            .and_then(|id| sessions.iter().find(|s| s.id == id))
            .or_else(|| sessions.first())
            .cloned();

        let selected = match selected {
            Some(session) => session,
            None => {
                info!("No sessions found, creating a fresh one");
                let created = self.remote.create_session(None).await?;
                sessions.insert(0, created.clone());
                created
            }
        };

        {
            let mut state = self.state.write().await;
            state.sessions = sessions;
            state.current = Some(selected.id);
        }
        self.profile.set_last_session(selected.id);
        debug!("Booted with session {}", selected.id);
        Ok(selected)
    }

    /// Creates a fresh session, prepends it, and selects it.
    pub async fn create_new(&self) -> Result<Session> {
        let created = self.remote.create_session(None).await?;
        {
            let mut state = self.state.write().await;
            state.sessions.insert(0, created.clone());
            state.current = Some(created.id);
        }
        self.profile.set_last_session(created.id);
        Ok(created)
    }

    /// Selects a known session by id.
    pub async fn select(&self, id: i64) -> Result<Session> {
        let selected = {
            let mut state = self.state.write().await;
            let session = state
                .sessions
                .iter()
                .find(|s| s.id == id)
                .cloned()
                .ok_or_else(|| {
                    FinchError::precondition(format!("Unknown session id: {}", id))
                })?;
            state.current = Some(id);
            session
        };
        self.profile.set_last_session(id);
        Ok(selected)
    }

    /// Optimistically updates a cached session title without waiting for
    /// server confirmation. Cosmetic only; never rolled back.
    pub async fn rename_locally(&self, id: i64, title: impl Into<String>) {
        let mut state = self.state.write().await;
        if let Some(session) = state.sessions.iter_mut().find(|s| s.id == id) {
            session.title = Some(title.into());
        }
    }

    /// Applies an inferred title to a session whose title is still a
    /// placeholder.
    ///
    /// Returns the applied title, or `None` when nothing changed.
    pub async fn apply_inferred_title(&self, id: i64, first_message: &str) -> Option<String> {
        let inferred = title::infer_title(first_message)?;
        {
            let state = self.state.read().await;
            let session = state.sessions.iter().find(|s| s.id == id)?;
            if !title::is_placeholder(session.title.as_deref()) {
                return None;
            }
        }
        debug!("Inferred title for session {}: {}", id, inferred);
        self.rename_locally(id, inferred.clone()).await;
        Some(inferred)
    }

    /// Records one completed exchange against the cached counters so the
    /// session list reflects recency without a refresh.
    pub async fn note_exchange(&self, id: i64) {
        let mut state = self.state.write().await;
        if let Some(session) = state.sessions.iter_mut().find(|s| s.id == id) {
            session.message_count += 2;
            session.assistant_message_count += 1;
            session.last_message_at = Some(chrono::Utc::now().to_rfc3339());
        }
    }

    pub async fn sessions(&self) -> Vec<Session> {
        self.state.read().await.sessions.clone()
    }

    pub async fn current(&self) -> Option<Session> {
        let state = self.state.read().await;
        let id = state.current?;
        state.sessions.iter().find(|s| s.id == id).cloned()
    }

    pub async fn current_id(&self) -> Option<i64> {
        self.state.read().await.current
    }
}
