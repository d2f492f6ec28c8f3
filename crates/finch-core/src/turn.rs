//! Transcript turn models.
//!
//! A transcript entry is either a `MinimalTurn` replayed from the history
//! endpoint (id, role, content, timestamp only) or an `EnrichedTurn` produced
//! by a fresh send (carrying sources, metrics and feedback). Both satisfy the
//! same display contract through the accessors on [`Turn`]; optional fields
//! are never silently assumed present.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::source::{ChatMetrics, SourceRef};

/// Identifier of a transcript turn.
///
/// `Local` ids exist only between the optimistic append and reconciliation
/// with the server response; they are never sent to the remote service as if
/// they were authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnId {
    /// Locally generated, provisional
    Local(Uuid),
    /// Server-assigned message id
    Remote(i64),
}

impl TurnId {
    /// Generates a fresh provisional id.
    pub fn fresh() -> Self {
        Self::Local(Uuid::new_v4())
    }

    /// Returns the server-assigned id, if this turn has been reconciled.
    pub fn remote(&self) -> Option<i64> {
        match self {
            Self::Remote(id) => Some(*id),
            Self::Local(_) => None,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }
}

/// Author of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Classification of an assistant answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerType {
    /// Answered from retrieved evidence
    Grounded,
    /// The service declined to answer
    Abstained,
    /// Canned or degraded response
    Fallback,
}

/// A turn replayed from the history endpoint.
///
/// History replay deliberately omits sources and metrics; citations are not
/// re-rendered with full fidelity after a reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimalTurn {
    pub id: TurnId,
    pub role: Role,
    pub content: String,
    pub created_at: String,
}

/// A turn produced by a fresh exchange, carrying the full answer envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedTurn {
    pub id: TurnId,
    pub role: Role,
    pub content: String,
    pub created_at: String,
    pub answer_type: Option<AnswerType>,
    pub sources: Vec<SourceRef>,
    pub metrics: Option<ChatMetrics>,
    /// Client-side error marker when the exchange failed
    pub error_type: Option<String>,
    /// Last confirmed rating: 1, -1, or absent
    pub user_feedback: Option<i8>,
}

/// A transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Turn {
    Minimal(MinimalTurn),
    Enriched(EnrichedTurn),
}

impl Turn {
    pub fn id(&self) -> TurnId {
        match self {
            Self::Minimal(t) => t.id,
            Self::Enriched(t) => t.id,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Self::Minimal(t) => t.role,
            Self::Enriched(t) => t.role,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::Minimal(t) => &t.content,
            Self::Enriched(t) => &t.content,
        }
    }

    pub fn created_at(&self) -> &str {
        match self {
            Self::Minimal(t) => &t.created_at,
            Self::Enriched(t) => &t.created_at,
        }
    }

    /// Sources attached to this turn (empty for minimal turns).
    pub fn sources(&self) -> &[SourceRef] {
        match self {
            Self::Minimal(_) => &[],
            Self::Enriched(t) => &t.sources,
        }
    }

    /// The displayed feedback value, if any (minimal turns carry none).
    pub fn feedback(&self) -> Option<i8> {
        match self {
            Self::Minimal(_) => None,
            Self::Enriched(t) => t.user_feedback,
        }
    }

    /// Whether this turn marks a failed exchange.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Enriched(t) if t.error_type.is_some())
    }

    /// Whether feedback may be submitted for this turn: it must be an
    /// assistant turn with a server-assigned id.
    pub fn accepts_feedback(&self) -> bool {
        self.role() == Role::Assistant && self.id().remote().is_some() && !self.is_error()
    }
}
