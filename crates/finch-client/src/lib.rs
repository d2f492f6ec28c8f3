//! Application layer of the Finch client engine.
//!
//! Binds the session registry, the conversation state machine, the
//! optimistic send pipeline, feedback submission, and the auth flow into
//! one explicit [`ChatContext`].

pub mod auth;
pub mod context;
pub mod conversation;
pub mod feedback;
pub mod registry;

pub use auth::AuthFlow;
pub use context::ChatContext;
pub use conversation::{Conversation, ConversationSnapshot, ConversationState, SendOutcome};
pub use feedback::{FeedbackController, FeedbackOutcome};
pub use registry::SessionRegistry;
