//! Explicit wiring of the client engine.
//!
//! All components hang off one `ChatContext`; there are no ambient globals.
//! The context lives for the lifetime of the hosting surface (a terminal
//! session here) and has no teardown.

use std::path::PathBuf;
use std::sync::Arc;

use finch_core::{RemoteApi, Result};
use finch_gateway::{GatewayConfig, RemoteGateway};
use finch_store::ProfileStore;

use crate::auth::AuthFlow;
use crate::conversation::Conversation;
use crate::feedback::FeedbackController;
use crate::registry::SessionRegistry;

pub struct ChatContext {
    pub profile: Arc<ProfileStore>,
    pub remote: Arc<dyn RemoteApi>,
    pub registry: Arc<SessionRegistry>,
    pub conversation: Conversation,
    pub feedback: FeedbackController,
    pub auth: AuthFlow,
}

impl ChatContext {
    /// Builds the full stack against the HTTP gateway.
    ///
    /// `profile_dir` overrides the default profile location (used by tests
    /// and the `--profile-dir` flag). The anonymous identity is established
    /// before the first request.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile store cannot be opened.
    pub fn init(profile_dir: Option<PathBuf>, config: GatewayConfig) -> Result<Self> {
        let base_dir = match profile_dir {
            Some(dir) => dir,
            None => ProfileStore::default_location()?,
        };
        let profile = Arc::new(ProfileStore::new(base_dir)?);
        profile.ensure_identity();

        let remote: Arc<dyn RemoteApi> = Arc::new(RemoteGateway::new(config, profile.clone()));
        Ok(Self::with_remote(profile, remote))
    }

    /// Wires the stack against an arbitrary `RemoteApi` implementation.
    pub fn with_remote(profile: Arc<ProfileStore>, remote: Arc<dyn RemoteApi>) -> Self {
        let registry = Arc::new(SessionRegistry::new(profile.clone(), remote.clone()));
        let conversation = Conversation::new(remote.clone(), registry.clone());
        let feedback = FeedbackController::new(remote.clone(), conversation.clone());
        let auth = AuthFlow::new(remote.clone(), profile.clone());
        Self {
            profile,
            remote,
            registry,
            conversation,
            feedback,
            auth,
        }
    }

    /// Boots the registry and the conversation machine.
    pub async fn boot(&self) {
        self.conversation.boot().await;
    }
}
