//! Per-message feedback submission.
//!
//! Ratings are confirmed-then-displayed: the transcript is only updated
//! after the server accepts the value, so a failed submission leaves the
//! displayed rating untouched. At most one submission per message id is in
//! flight; concurrent attempts are ignored rather than queued.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::debug;

use finch_core::{RemoteApi, Result};

use crate::conversation::Conversation;

/// Result of a feedback attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackOutcome {
    /// The server accepted the value and the transcript was updated
    Applied,
    /// Precondition not met; nothing was sent or changed
    Ignored,
}

pub struct FeedbackController {
    remote: Arc<dyn RemoteApi>,
    conversation: Conversation,
    in_flight: Mutex<HashSet<i64>>,
}

impl FeedbackController {
    pub fn new(remote: Arc<dyn RemoteApi>, conversation: Conversation) -> Self {
        Self {
            remote,
            conversation,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Submits a rating for a stored assistant message.
    ///
    /// `value` is 1 (helpful), -1 (unhelpful), or 0 (clear). Anything else,
    /// a target that is not a rateable assistant turn, or a submission
    /// already in flight for the same message is a silent no-op.
    ///
    /// # Errors
    ///
    /// Returns the remote failure unchanged; the displayed value is not
    /// modified in that case.
    pub async fn submit(&self, message_id: i64, value: i8) -> Result<FeedbackOutcome> {
        if !matches!(value, -1 | 0 | 1) {
            debug!("Ignoring out-of-range feedback value {}", value);
            return Ok(FeedbackOutcome::Ignored);
        }

        let rateable = self
            .conversation
            .find_turn(message_id)
            .await
            .is_some_and(|t| t.accepts_feedback());
        if !rateable {
            debug!("Ignoring feedback for non-rateable message {}", message_id);
            return Ok(FeedbackOutcome::Ignored);
        }

        {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
            if !in_flight.insert(message_id) {
                debug!("Feedback already in flight for message {}", message_id);
                return Ok(FeedbackOutcome::Ignored);
            }
        }

        let result = self.remote.submit_feedback(message_id, value).await;

        {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
            in_flight.remove(&message_id);
        }

        result?;

        let displayed = if value == 0 { None } else { Some(value) };
        self.conversation.set_feedback(message_id, displayed).await;
        Ok(FeedbackOutcome::Applied)
    }
}
