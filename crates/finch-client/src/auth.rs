//! Account registration, login, and the local logout.

use std::sync::Arc;

use tracing::info;

use finch_core::{AuthSession, AuthTokens, CurrentUser, RemoteApi, Result};
use finch_store::ProfileStore;

pub struct AuthFlow {
    remote: Arc<dyn RemoteApi>,
    profile: Arc<ProfileStore>,
}

impl AuthFlow {
    pub fn new(remote: Arc<dyn RemoteApi>, profile: Arc<ProfileStore>) -> Self {
        Self { remote, profile }
    }

    /// Registers a new account.
    ///
    /// The request carries the anonymous token, so the server upgrades the
    /// anonymous history in place. The returned `session_id` is treated as
    /// the authoritative binding identity and replaces the local token
    /// unconditionally.
    pub async fn register(&self, email: &str, password: &str) -> Result<AuthSession> {
        let auth = self.remote.register(email, password).await?;
        self.profile.set_credential(auth.access_token.as_str());
        self.profile.set_anonymous_token(auth.session_id.as_str());
        info!("Registered account for user {}", auth.user_id);
        Ok(auth)
    }

    /// Exchanges credentials for a bearer token and stores it.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthTokens> {
        let tokens = self.remote.login(email, password).await?;
        self.profile.set_credential(tokens.access_token.as_str());
        info!("Logged in as user {}", tokens.user_id);
        Ok(tokens)
    }

    /// The identity the server currently sees.
    pub async fn me(&self) -> Result<CurrentUser> {
        self.remote.me().await
    }

    /// Clears the stored credential. Purely local; the anonymous token is
    /// retained so history keyed to it stays visible.
    pub fn logout(&self) {
        self.profile.clear_credential();
        info!("Logged out");
    }

    pub fn is_authenticated(&self) -> bool {
        self.profile.credential().is_some()
    }
}
