//! Durable client profile.
//!
//! The profile carries the anonymous session token, the bearer credential
//! once authenticated, and the last-active session id. It is loaded once at
//! startup into an in-memory cache; mutators write `profile.json` back
//! best-effort, so a read-only disk degrades to a session-scoped identity
//! instead of an error.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use finch_core::{FinchError, Result};

const PROFILE_FILE: &str = "profile.json";

/// The persisted profile record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Anonymous session token. Empty until first `ensure_identity`.
    #[serde(default)]
    pub anonymous_token: String,
    /// Bearer credential, present only while authenticated
    #[serde(default)]
    pub access_token: Option<String>,
    /// Last selected session, restored on the next boot
    #[serde(default)]
    pub last_session_id: Option<i64>,
}

/// File-backed profile store with an in-memory cache.
///
/// Reads never touch the disk after construction. All mutators persist
/// immediately; persistence failures are logged and tolerated.
pub struct ProfileStore {
    base_dir: PathBuf,
    cached: Mutex<Profile>,
}

impl ProfileStore {
    /// Opens (or initializes) the store rooted at `base_dir`.
    ///
    /// An unreadable or unparseable profile file degrades to a fresh
    /// default (logged), mirroring the best-effort write policy: local
    /// storage trouble must never prevent startup.
    ///
    /// # Errors
    ///
    /// Returns an error only if the directory cannot be created.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;

        let profile = Self::load_or_default(&base_dir.join(PROFILE_FILE));
        debug!("Loaded profile from {:?}", base_dir);

        Ok(Self {
            base_dir,
            cached: Mutex::new(profile),
        })
    }

    fn load_or_default(path: &Path) -> Profile {
        if !path.exists() {
            return Profile::default();
        }
        let loaded = fs::read_to_string(path)
            .map_err(FinchError::from)
            .and_then(|content| serde_json::from_str(&content).map_err(FinchError::from));
        match loaded {
            Ok(profile) => profile,
            Err(e) => {
                warn!("Ignoring unreadable profile at {:?}: {}", path, e);
                Profile::default()
            }
        }
    }

    /// The conventional profile directory for the current user.
    pub fn default_location() -> Result<PathBuf> {
        if let Some(config) = dirs::config_dir() {
            return Ok(config.join("finch"));
        }
        dirs::home_dir()
            .map(|home| home.join(".finch"))
            .ok_or_else(|| FinchError::config("Could not determine a home directory"))
    }

    /// Returns the anonymous token, generating and persisting one on first
    /// use. The token is never regenerated once set.
    pub fn ensure_identity(&self) -> String {
        let mut profile = self.cached.lock().unwrap_or_else(|e| e.into_inner());
        if profile.anonymous_token.is_empty() {
            profile.anonymous_token = generate_token();
            debug!("Generated anonymous token");
            self.persist(&profile);
        }
        profile.anonymous_token.clone()
    }

    /// The current anonymous token, or `None` before `ensure_identity`.
    pub fn anonymous_token(&self) -> Option<String> {
        let profile = self.cached.lock().unwrap_or_else(|e| e.into_inner());
        if profile.anonymous_token.is_empty() {
            None
        } else {
            Some(profile.anonymous_token.clone())
        }
    }

    /// Replaces the anonymous token. Used only when the server returns an
    /// authoritative binding during registration.
    pub fn set_anonymous_token(&self, token: impl Into<String>) {
        let mut profile = self.cached.lock().unwrap_or_else(|e| e.into_inner());
        profile.anonymous_token = token.into();
        self.persist(&profile);
    }

    pub fn credential(&self) -> Option<String> {
        self.cached
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .access_token
            .clone()
    }

    pub fn set_credential(&self, token: impl Into<String>) {
        let mut profile = self.cached.lock().unwrap_or_else(|e| e.into_inner());
        profile.access_token = Some(token.into());
        self.persist(&profile);
    }

    /// Clears the bearer credential. The anonymous token is retained so
    /// history keyed to it stays visible.
    pub fn clear_credential(&self) {
        let mut profile = self.cached.lock().unwrap_or_else(|e| e.into_inner());
        profile.access_token = None;
        self.persist(&profile);
    }

    pub fn last_session(&self) -> Option<i64> {
        self.cached
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last_session_id
    }

    pub fn set_last_session(&self, id: i64) {
        let mut profile = self.cached.lock().unwrap_or_else(|e| e.into_inner());
        profile.last_session_id = Some(id);
        self.persist(&profile);
    }

    fn persist(&self, profile: &Profile) {
        let path = self.base_dir.join(PROFILE_FILE);
        let result = serde_json::to_string_pretty(profile)
            .map_err(FinchError::from)
            .and_then(|json| fs::write(&path, json).map_err(FinchError::from));
        if let Err(e) = result {
            warn!("Failed to persist profile to {:?}: {}", path, e);
        }
    }
}

/// Time-seeded random token in the `anon-<millis>-<rand>` shape.
fn generate_token() -> String {
    format!(
        "anon-{}-{:08x}",
        Utc::now().timestamp_millis(),
        rand::random::<u32>()
    )
}

impl std::fmt::Debug for ProfileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileStore")
            .field("base_dir", &self.base_dir)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_identity_survives_reopen() {
        let dir = TempDir::new().unwrap();

        let first = {
            let store = ProfileStore::new(dir.path()).unwrap();
            store.ensure_identity()
        };
        let second = {
            let store = ProfileStore::new(dir.path()).unwrap();
            store.ensure_identity()
        };

        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_identity_generated_once() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path()).unwrap();

        assert!(store.anonymous_token().is_none());
        let token = store.ensure_identity();
        assert!(token.starts_with("anon-"));
        assert_eq!(store.ensure_identity(), token);
        assert_eq!(store.anonymous_token(), Some(token));
    }

    #[test]
    fn test_logout_keeps_anonymous_token() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path()).unwrap();

        let token = store.ensure_identity();
        store.set_credential("bearer-abc");
        assert_eq!(store.credential().as_deref(), Some("bearer-abc"));

        store.clear_credential();
        assert!(store.credential().is_none());
        assert_eq!(store.anonymous_token(), Some(token));
    }

    #[test]
    fn test_last_session_round_trips_through_disk() {
        let dir = TempDir::new().unwrap();
        {
            let store = ProfileStore::new(dir.path()).unwrap();
            store.set_last_session(42);
        }
        let store = ProfileStore::new(dir.path()).unwrap();
        assert_eq!(store.last_session(), Some(42));
    }

    #[test]
    fn test_corrupt_profile_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(PROFILE_FILE), "{ not json").unwrap();

        let store = ProfileStore::new(dir.path()).unwrap();
        assert!(store.anonymous_token().is_none());
        assert!(store.credential().is_none());

        // A fresh identity is established and the file heals on write.
        let token = store.ensure_identity();
        let reopened = ProfileStore::new(dir.path()).unwrap();
        assert_eq!(reopened.anonymous_token(), Some(token));
    }
}
