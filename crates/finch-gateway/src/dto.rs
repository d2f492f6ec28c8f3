//! Wire DTOs for the assistant backend.

use serde::{Deserialize, Serialize};

use finch_core::{MinimalTurn, Role, TurnId};

#[derive(Debug, Serialize)]
pub(crate) struct CreateSessionRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub session_id: i64,
    pub message: &'a str,
    pub stream: bool,
    pub history_size: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct FeedbackRequest {
    pub value: i8,
}

#[derive(Debug, Serialize)]
pub(crate) struct CredentialsRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HealthResponse {
    pub status: String,
}

/// A stored message as the history endpoint reports it.
#[derive(Debug, Deserialize)]
pub(crate) struct WireMessage {
    pub id: i64,
    pub role: Role,
    pub content: String,
    pub created_at: String,
}

impl From<WireMessage> for MinimalTurn {
    fn from(msg: WireMessage) -> Self {
        Self {
            id: TurnId::Remote(msg.id),
            role: msg.role,
            content: msg.content,
            created_at: msg.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryResponse {
    #[allow(dead_code)]
    pub session_id: i64,
    pub messages: Vec<WireMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_shape() {
        let req = ChatRequest {
            session_id: 7,
            message: "hello",
            stream: false,
            history_size: 10,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["session_id"], 7);
        assert_eq!(json["stream"], false);
        assert_eq!(json["history_size"], 10);
    }

    #[test]
    fn test_create_session_omits_absent_title() {
        let req = CreateSessionRequest { title: None };
        assert_eq!(serde_json::to_string(&req).unwrap(), "{}");
    }

    #[test]
    fn test_history_message_maps_to_minimal_turn() {
        let json = r#"{
            "session_id": 3,
            "messages": [
                {"id": 1, "role": "user", "content": "hi", "created_at": "2025-04-01T09:00:00"},
                {"id": 2, "role": "assistant", "content": "hello", "created_at": "2025-04-01T09:00:02"}
            ]
        }"#;
        let resp: HistoryResponse = serde_json::from_str(json).unwrap();
        let turns: Vec<MinimalTurn> = resp.messages.into_iter().map(Into::into).collect();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].id, TurnId::Remote(1));
        assert_eq!(turns[1].role, Role::Assistant);
    }
}
