//! On-disk persistence of the login session.
//!
//! `session.json` in the per-user config directory holds the tokens, the
//! user record, and the API URL they were issued by, so a restarted client
//! can resume without re-prompting for credentials. The file is owner-only:
//! it contains bearer tokens.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::User;

const SESSION_FILE: &str = "session.json";

/// Persisted login session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
    /// The backend these tokens belong to. A client pointed elsewhere must
    /// not reuse them.
    pub api_url: String,
}

/// Reads and writes `session.json` in a config directory.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store rooted at the given config directory.
    pub fn new(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join(SESSION_FILE),
        }
    }

    /// Store rooted at the default `~/.volant` directory.
    pub fn default_location() -> Result<Self, ApiError> {
        let home = dirs::home_dir()
            .ok_or_else(|| ApiError::Config("cannot determine home directory".into()))?;
        Ok(Self::new(&home.join(".volant")))
    }

    /// Persist a session, creating the config directory if needed.
    pub fn save(&self, session: &SessionData) -> Result<(), ApiError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        let data = serde_json::to_vec_pretty(session)?;
        fs::write(&self.path, data)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!("saved session: {}", self.path.display());
        Ok(())
    }

    /// Load the saved session, or `None` when no session file exists.
    pub fn load(&self) -> Result<Option<SessionData>, ApiError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&data)?))
    }

    /// Remove the saved session. Absence is not an error.
    pub fn delete(&self) -> Result<(), ApiError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
