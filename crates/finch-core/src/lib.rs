//! Core domain layer for the Finch client engine.
//!
//! Defines the session and transcript models, the title inference rules,
//! the shared error type, and the [`RemoteApi`] seam that the gateway crate
//! implements over HTTP.

pub mod error;
pub mod remote;
pub mod session;
pub mod source;
pub mod title;
pub mod turn;

pub use error::{FinchError, Result};
pub use remote::{
    AuthSession, AuthTokens, ChatReply, CurrentUser, RemoteApi, SessionPage, SessionsSummary,
};
pub use session::{Session, UNTITLED_SESSION};
pub use source::{ChatMetrics, ConfidenceBucket, SourceRef};
pub use turn::{AnswerType, EnrichedTurn, MinimalTurn, Role, Turn, TurnId};
