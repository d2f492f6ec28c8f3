//! Session domain model.
//!
//! A session is one conversation thread owned by a user (anonymous or
//! authenticated). Sessions are created server-side and cached client-side;
//! the client never deletes them.

use serde::{Deserialize, Serialize};

/// Title shown for sessions that have no server-assigned title yet.
pub const UNTITLED_SESSION: &str = "New chat";

/// A conversation session as returned by the remote service.
///
/// Timestamps travel as ISO-8601 strings; the client orders by them but
/// never parses them beyond comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Server-assigned unique id
    pub id: i64,
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub is_active: bool,
    /// Owning user id (server-side; anonymous users get one too)
    pub user_id: i64,
    #[serde(default)]
    pub message_count: i64,
    #[serde(default)]
    pub assistant_message_count: i64,
    #[serde(default)]
    pub last_message_at: Option<String>,
    #[serde(default)]
    pub ended_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Session {
    /// The title to display for this session.
    ///
    /// Empty or absent titles display as the "New chat" placeholder.
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => UNTITLED_SESSION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_title(title: Option<&str>) -> Session {
        Session {
            id: 1,
            title: title.map(str::to_string),
            description: None,
            is_active: true,
            user_id: 7,
            message_count: 0,
            assistant_message_count: 0,
            last_message_at: None,
            ended_at: None,
            created_at: "2025-01-01T00:00:00".to_string(),
            updated_at: "2025-01-01T00:00:00".to_string(),
        }
    }

    #[test]
    fn test_display_title_placeholder() {
        assert_eq!(session_with_title(None).display_title(), "New chat");
        assert_eq!(session_with_title(Some("")).display_title(), "New chat");
        assert_eq!(session_with_title(Some("   ")).display_title(), "New chat");
    }

    #[test]
    fn test_display_title_present() {
        assert_eq!(
            session_with_title(Some("Transfer limits")).display_title(),
            "Transfer limits"
        );
    }

    #[test]
    fn test_session_deserializes_without_counters() {
        // The server may omit counters on freshly created sessions.
        let json = r#"{
            "id": 42,
            "title": null,
            "is_active": true,
            "user_id": 3,
            "created_at": "2025-03-01T10:00:00",
            "updated_at": "2025-03-01T10:00:00"
        }"#;
        let s: Session = serde_json::from_str(json).unwrap();
        assert_eq!(s.id, 42);
        assert_eq!(s.message_count, 0);
        assert!(s.last_message_at.is_none());
    }
}
