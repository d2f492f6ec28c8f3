//! The remote service seam.
//!
//! `RemoteApi` is the trait boundary between the client engine and the
//! assistant backend. The production implementation lives in the gateway
//! crate; tests substitute hand-rolled mocks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::session::Session;
use crate::source::{ChatMetrics, SourceRef};
use crate::turn::{AnswerType, MinimalTurn};

/// One page of the session list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPage {
    pub items: Vec<Session>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Aggregate statistics over the caller's sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionsSummary {
    pub total_sessions: i64,
    pub active_sessions: i64,
    pub total_messages: i64,
    pub average_messages_per_session: f64,
}

/// The answer envelope returned by a send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub answer: String,
    pub answer_type: AnswerType,
    /// Server id of the stored assistant message, when persistence succeeded
    #[serde(default)]
    pub message_id: Option<i64>,
    #[serde(default)]
    pub session_id: Option<i64>,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
    #[serde(default)]
    pub metrics: Option<ChatMetrics>,
}

/// Result of registering a new account.
///
/// The returned `session_id` is the server's authoritative binding for the
/// upgraded anonymous history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user_id: i64,
    pub access_token: String,
    pub token_type: String,
    pub session_id: String,
}

/// Result of logging in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub user_id: i64,
    pub access_token: String,
    pub token_type: String,
}

/// The identity the server currently sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub user_id: i64,
    #[serde(default)]
    pub email: Option<String>,
    pub is_authenticated: bool,
}

/// Operations offered by the assistant backend.
///
/// Implementations attach identity headers on every call and map failures
/// to [`crate::FinchError::Remote`] (non-2xx) or
/// [`crate::FinchError::Transport`] (unreachable, timeout). No operation
/// retries.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Liveness probe.
    async fn health(&self) -> crate::Result<()>;

    /// Creates a session, optionally titled.
    async fn create_session(&self, title: Option<&str>) -> crate::Result<Session>;

    /// Lists the caller's sessions, most relevant first. Only the first
    /// page is consumed.
    async fn list_sessions(&self) -> crate::Result<SessionPage>;

    /// Aggregate statistics over the caller's sessions.
    async fn sessions_summary(&self) -> crate::Result<SessionsSummary>;

    /// Fetches a session transcript, oldest first.
    async fn history(&self, session_id: i64, limit: u32) -> crate::Result<Vec<MinimalTurn>>;

    /// Sends a user message and waits for the complete answer.
    async fn send_message(
        &self,
        session_id: i64,
        text: &str,
        history_size: u32,
    ) -> crate::Result<ChatReply>;

    /// Rates a stored assistant message. `value` is 1, -1, or 0 to clear.
    async fn submit_feedback(&self, message_id: i64, value: i8) -> crate::Result<()>;

    /// Registers a new account, upgrading the anonymous history in place.
    async fn register(&self, email: &str, password: &str) -> crate::Result<AuthSession>;

    /// Exchanges credentials for a bearer token.
    async fn login(&self, email: &str, password: &str) -> crate::Result<AuthTokens>;

    /// Who the server thinks the caller is.
    async fn me(&self) -> crate::Result<CurrentUser>;
}
