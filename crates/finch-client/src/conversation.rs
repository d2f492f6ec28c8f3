//! Conversation state machine and the optimistic send pipeline.
//!
//! The machine owns the transcript for the currently selected session.
//! States run `Booting -> Ready <-> Switching -> Ready`; both transitional
//! states resolve to `Ready` whether their fetch succeeds or fails, so the
//! UI is never stuck loading. Readers only ever see immutable snapshots;
//! every transcript swap happens under one write lock.
//!
//! Late results from a superseded boot or switch are neutralized by an
//! epoch counter rather than cancellation: each transition bumps the epoch,
//! and a completing fetch whose captured epoch no longer matches is
//! discarded without touching the transcript.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use finch_core::{
    EnrichedTurn, FinchError, MinimalTurn, RemoteApi, Result, Role, Turn, TurnId,
};

use crate::registry::SessionRegistry;

/// How many stored messages to replay when entering a session.
const HISTORY_FETCH_LIMIT: u32 = 50;

/// History window hint sent with each message.
const HISTORY_WINDOW: u32 = 10;

/// Shown in place of an answer when an exchange fails.
const SEND_FALLBACK_TEXT: &str =
    "Sorry, I encountered an error while processing your message. Please try again.";

/// Lifecycle state of the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    /// Initial load in progress; transcript not yet trustworthy
    Booting,
    /// A session change is in flight; the prior transcript is retained
    /// on screen but stale
    Switching,
    /// Transcript matches the current session
    Ready,
}

/// An immutable view of the conversation, cloned out under the read lock.
#[derive(Debug, Clone)]
pub struct ConversationSnapshot {
    pub state: ConversationState,
    pub session_id: Option<i64>,
    pub turns: Vec<Turn>,
    /// Most recent error, cleared by the next successful operation
    pub error: Option<String>,
    pub sending: bool,
}

/// Result of a send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The assistant answered and the transcript was extended
    Delivered,
    /// The exchange failed; an error turn was appended
    Failed,
    /// Precondition not met (blank text, no session, send in flight,
    /// or the conversation moved on mid-flight)
    Ignored,
}

struct Inner {
    state: ConversationState,
    session_id: Option<i64>,
    turns: Vec<Turn>,
    error: Option<String>,
    sending: bool,
    epoch: u64,
}

/// The conversation machine. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct Conversation {
    remote: Arc<dyn RemoteApi>,
    registry: Arc<SessionRegistry>,
    inner: Arc<RwLock<Inner>>,
}

impl Conversation {
    pub fn new(remote: Arc<dyn RemoteApi>, registry: Arc<SessionRegistry>) -> Self {
        Self {
            remote,
            registry,
            inner: Arc::new(RwLock::new(Inner {
                state: ConversationState::Booting,
                session_id: None,
                turns: Vec::new(),
                error: None,
                sending: false,
                epoch: 0,
            })),
        }
    }

    pub async fn snapshot(&self) -> ConversationSnapshot {
        let inner = self.inner.read().await;
        ConversationSnapshot {
            state: inner.state,
            session_id: inner.session_id,
            turns: inner.turns.clone(),
            error: inner.error.clone(),
            sending: inner.sending,
        }
    }

    /// Boots the registry and loads the selected session's transcript.
    ///
    /// Always resolves to `Ready`; a failed boot leaves an empty transcript
    /// and a surfaced error instead of a stuck `Booting` state.
    pub async fn boot(&self) {
        let epoch = {
            let mut inner = self.inner.write().await;
            inner.state = ConversationState::Booting;
            inner.error = None;
            inner.epoch += 1;
            inner.epoch
        };

        match self.registry.boot().await {
            Ok(session) => self.load_transcript(session.id, epoch).await,
            Err(e) => {
                warn!("Boot failed: {}", e);
                let mut inner = self.inner.write().await;
                if inner.epoch != epoch {
                    return;
                }
                inner.state = ConversationState::Ready;
                inner.session_id = None;
                inner.turns = Vec::new();
                inner.error = Some(e.user_message());
            }
        }
    }

    /// Switches to another known session.
    ///
    /// Idempotent for the current session. Unknown ids are a silent no-op.
    /// The prior transcript stays visible (marked stale via `Switching`)
    /// until the new history resolves, then is swapped atomically.
    pub async fn switch_to(&self, id: i64) -> Result<()> {
        {
            let inner = self.inner.read().await;
            if inner.session_id == Some(id) && inner.state == ConversationState::Ready {
                return Ok(());
            }
        }

        let session = match self.registry.select(id).await {
            Ok(session) => session,
            Err(e) if e.is_precondition() => {
                debug!("Ignoring switch to unknown session {}", id);
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let epoch = {
            let mut inner = self.inner.write().await;
            inner.state = ConversationState::Switching;
            inner.epoch += 1;
            inner.epoch
        };
        self.load_transcript(session.id, epoch).await;
        Ok(())
    }

    /// Sends a user message through the optimistic pipeline.
    ///
    /// The user turn is appended before any network round-trip and is never
    /// rolled back. At most one send is in flight per conversation.
    pub async fn send(&self, text: &str) -> SendOutcome {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return SendOutcome::Ignored;
        }

        let (session_id, epoch, first_user_turn) = {
            let mut inner = self.inner.write().await;
            if inner.sending || inner.state != ConversationState::Ready {
                return SendOutcome::Ignored;
            }
            let Some(session_id) = inner.session_id else {
                return SendOutcome::Ignored;
            };
            let first_user_turn = !inner.turns.iter().any(|t| t.role() == Role::User);
            inner.sending = true;
            inner.turns.push(Turn::Minimal(MinimalTurn {
                id: TurnId::fresh(),
                role: Role::User,
                content: trimmed.to_string(),
                created_at: Utc::now().to_rfc3339(),
            }));
            (session_id, inner.epoch, first_user_turn)
        };

        // Cosmetic title, applied before the round-trip and kept on failure
        if first_user_turn {
            self.registry.apply_inferred_title(session_id, trimmed).await;
        }

        let result = self
            .remote
            .send_message(session_id, trimmed, HISTORY_WINDOW)
            .await;

        let outcome = {
            let mut inner = self.inner.write().await;
            inner.sending = false;
            if inner.epoch != epoch {
                debug!("Discarding send result for superseded session {}", session_id);
                return SendOutcome::Ignored;
            }
            match result {
                Ok(reply) => {
                    let id = reply
                        .message_id
                        .map(TurnId::Remote)
                        .unwrap_or_else(TurnId::fresh);
                    inner.turns.push(Turn::Enriched(EnrichedTurn {
                        id,
                        role: Role::Assistant,
                        content: reply.answer,
                        created_at: Utc::now().to_rfc3339(),
                        answer_type: Some(reply.answer_type),
                        sources: reply.sources,
                        metrics: reply.metrics,
                        error_type: None,
                        user_feedback: None,
                    }));
                    inner.error = None;
                    SendOutcome::Delivered
                }
                Err(e) => {
                    warn!("Send failed for session {}: {}", session_id, e);
                    inner.turns.push(Turn::Enriched(EnrichedTurn {
                        id: TurnId::fresh(),
                        role: Role::Assistant,
                        content: SEND_FALLBACK_TEXT.to_string(),
                        created_at: Utc::now().to_rfc3339(),
                        answer_type: None,
                        sources: Vec::new(),
                        metrics: None,
                        error_type: Some(error_kind(&e)),
                        user_feedback: None,
                    }));
                    inner.error = Some(e.user_message());
                    SendOutcome::Failed
                }
            }
        };

        if outcome == SendOutcome::Delivered {
            self.registry.note_exchange(session_id).await;
        }
        outcome
    }

    /// Updates the displayed feedback of a stored assistant turn.
    ///
    /// Called by the feedback controller after the server confirms; the
    /// transcript is never mutated optimistically for feedback.
    pub(crate) async fn set_feedback(&self, message_id: i64, value: Option<i8>) {
        let mut inner = self.inner.write().await;
        for turn in inner.turns.iter_mut() {
            if let Turn::Enriched(t) = turn
                && t.id == TurnId::Remote(message_id)
            {
                t.user_feedback = value;
                return;
            }
        }
    }

    /// Looks up a turn by server message id.
    pub async fn find_turn(&self, message_id: i64) -> Option<Turn> {
        let inner = self.inner.read().await;
        inner
            .turns
            .iter()
            .find(|t| t.id() == TurnId::Remote(message_id))
            .cloned()
    }

    async fn load_transcript(&self, session_id: i64, epoch: u64) {
        let result = self.remote.history(session_id, HISTORY_FETCH_LIMIT).await;

        let mut inner = self.inner.write().await;
        if inner.epoch != epoch {
            debug!("Discarding superseded history fetch for session {}", session_id);
            return;
        }
        inner.state = ConversationState::Ready;
        inner.session_id = Some(session_id);
        match result {
            Ok(history) => {
                inner.turns = history.into_iter().map(Turn::Minimal).collect();
                inner.error = None;
            }
            Err(e) => {
                warn!("History fetch failed for session {}: {}", session_id, e);
                inner.turns = Vec::new();
                inner.error = Some(e.user_message());
            }
        }
    }
}

fn error_kind(e: &FinchError) -> String {
    if e.is_remote() {
        "remote_error".to_string()
    } else if e.is_transport() {
        "transport_error".to_string()
    } else {
        "client_error".to_string()
    }
}
