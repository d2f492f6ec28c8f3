//! HTTP implementation of the remote service seam.
//!
//! Every request carries the anonymous token in `X-Session-Id` and, when a
//! credential is stored, a bearer `Authorization` header. Non-2xx responses
//! map to `FinchError::Remote` with the server's `detail` field when it
//! provides one; network failures and timeouts map to
//! `FinchError::Transport`. No request is retried.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;

use finch_core::{
    AuthSession, AuthTokens, ChatReply, CurrentUser, FinchError, MinimalTurn, RemoteApi, Result,
    Session, SessionPage, SessionsSummary,
};
use finch_store::ProfileStore;

use crate::config::GatewayConfig;
use crate::dto::{
    ChatRequest, CreateSessionRequest, CredentialsRequest, FeedbackRequest, HealthResponse,
    HistoryResponse,
};

/// Typed HTTP client for the assistant backend.
#[derive(Clone)]
pub struct RemoteGateway {
    client: Client,
    config: GatewayConfig,
    profile: Arc<ProfileStore>,
}

impl RemoteGateway {
    pub fn new(config: GatewayConfig, profile: Arc<ProfileStore>) -> Self {
        Self {
            client: Client::new(),
            config,
            profile,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.normalized_base_url(), path)
    }

    /// Attaches the timeout and identity headers shared by every request.
    fn prepare(&self, request: RequestBuilder) -> RequestBuilder {
        let mut request = request.timeout(self.config.timeout);
        if let Some(token) = self.profile.anonymous_token() {
            request = request.header("X-Session-Id", token);
        }
        if let Some(credential) = self.profile.credential() {
            request = request.header("Authorization", format!("Bearer {}", credential));
        }
        request
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self
            .prepare(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("Remote call failed with status {}: {}", status, body);
            return Err(FinchError::remote(status.as_u16(), parse_detail(&body)));
        }
        Ok(response)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(self.client.get(self.url(path))).await?;
        response.json::<T>().await.map_err(decode_error)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: serde::Serialize,
        T: serde::de::DeserializeOwned,
    {
        let response = self.send(self.client.post(self.url(path)).json(body)).await?;
        response.json::<T>().await.map_err(decode_error)
    }
}

#[async_trait]
impl RemoteApi for RemoteGateway {
    async fn health(&self) -> Result<()> {
        let health: HealthResponse = self.get_json("/healthz").await?;
        if health.status != "ok" {
            return Err(FinchError::internal(format!(
                "Service reported status: {}",
                health.status
            )));
        }
        Ok(())
    }

    async fn create_session(&self, title: Option<&str>) -> Result<Session> {
        self.post_json("/sessions", &CreateSessionRequest { title })
            .await
    }

    async fn list_sessions(&self) -> Result<SessionPage> {
        self.get_json("/sessions").await
    }

    async fn sessions_summary(&self) -> Result<SessionsSummary> {
        self.get_json("/sessions/summary").await
    }

    async fn history(&self, session_id: i64, limit: u32) -> Result<Vec<MinimalTurn>> {
        let path = format!("/chat/history?session_id={}&limit={}", session_id, limit);
        let response: HistoryResponse = self.get_json(&path).await?;
        Ok(response.messages.into_iter().map(Into::into).collect())
    }

    async fn send_message(
        &self,
        session_id: i64,
        text: &str,
        history_size: u32,
    ) -> Result<ChatReply> {
        let body = ChatRequest {
            session_id,
            message: text,
            stream: false,
            history_size,
        };
        self.post_json("/chat", &body).await
    }

    async fn submit_feedback(&self, message_id: i64, value: i8) -> Result<()> {
        let path = format!("/messages/{}/feedback", message_id);
        let body = FeedbackRequest { value };
        // 204 No Content on success
        self.send(self.client.post(self.url(&path)).json(&body))
            .await?;
        Ok(())
    }

    async fn register(&self, email: &str, password: &str) -> Result<AuthSession> {
        self.post_json("/auth/register", &CredentialsRequest { email, password })
            .await
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthTokens> {
        self.post_json("/auth/login", &CredentialsRequest { email, password })
            .await
    }

    async fn me(&self) -> Result<CurrentUser> {
        self.get_json("/auth/me").await
    }
}

fn transport_error(err: reqwest::Error) -> FinchError {
    if err.is_timeout() {
        FinchError::transport(format!("Request timed out: {}", err))
    } else {
        FinchError::transport(format!("Request failed: {}", err))
    }
}

fn decode_error(err: reqwest::Error) -> FinchError {
    FinchError::Serialization {
        format: "JSON".to_string(),
        message: format!("Failed to decode response body: {}", err),
    }
}

/// Extracts the `detail` field from an error body, when present.
///
/// The backend wraps errors as `{"detail": "..."}`; `detail` may also be a
/// structured value, which is kept as compact JSON.
fn parse_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
