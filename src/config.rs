//! Top-level application configuration.
//!
//! Configuration is stored as YAML in the platform config directory and
//! covers:
//! - The backend API URL and request timeout
//! - The acting user (opaque id + role, supplied by the session layer)
//! - The data directory for the durable draft/queue store
//! - The session token
//!
//! Environment variables override the file: `CIVICLINK_API_URL`,
//! `CIVICLINK_ACTOR_ID`, `CIVICLINK_ROLE`, `CIVICLINK_TOKEN`,
//! `CIVICLINK_DATA_DIR`, `CIVICLINK_CONFIG`.

use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::{CivicError, Result};
use crate::types::Role;

fn default_remote_timeout() -> u64 {
    30
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the complaint backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Acting user id, as issued by the session collaborator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,

    /// Acting user role (default: citizen)
    #[serde(default)]
    pub role: Role,

    /// Where the durable draft/queue documents live
    /// (default: platform data dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Remote operation timeout in seconds (default: 30)
    #[serde(default = "default_remote_timeout")]
    pub remote_timeout: u64,

    /// Authentication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: None,
            actor_id: None,
            role: Role::default(),
            data_dir: None,
            remote_timeout: default_remote_timeout(),
            auth: None,
        }
    }
}

/// Session token storage
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub token: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Default location of the config file.
pub fn config_path() -> PathBuf {
    if let Ok(path) = env::var("CIVICLINK_CONFIG") {
        return PathBuf::from(path);
    }
    directories::ProjectDirs::from("org", "civiclink", "civiclink")
        .map(|dirs| dirs.config_dir().join("config.yaml"))
        .unwrap_or_else(|| PathBuf::from("civiclink.yaml"))
}

impl Config {
    /// Load the config file (missing file means defaults), then apply
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let path = config_path();
        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_yaml_ng::from_str(&content)?
        } else {
            Config::default()
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(url) = env::var("CIVICLINK_API_URL") {
            self.api_url = Some(url);
        }
        if let Ok(actor) = env::var("CIVICLINK_ACTOR_ID") {
            self.actor_id = Some(actor);
        }
        if let Ok(role) = env::var("CIVICLINK_ROLE") {
            self.role = role.parse()?;
        }
        if let Ok(dir) = env::var("CIVICLINK_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Ok(token) = env::var("CIVICLINK_TOKEN") {
            self.auth = Some(AuthConfig { token });
        }
        Ok(())
    }

    /// Persist the config to its default location.
    pub fn save(&self) -> Result<()> {
        let path = config_path();
        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_yaml_ng::to_string(self)?)?;
        Ok(())
    }

    /// The backend URL, required for any remote operation.
    pub fn require_api_url(&self) -> Result<&str> {
        self.api_url.as_deref().ok_or_else(|| {
            CivicError::Config(
                "no API URL configured; set api_url or CIVICLINK_API_URL".to_string(),
            )
        })
    }

    /// The acting user id, required for mutations.
    pub fn require_actor_id(&self) -> Result<&str> {
        self.actor_id.as_deref().ok_or_else(|| {
            CivicError::Config(
                "no actor configured; set actor_id or CIVICLINK_ACTOR_ID".to_string(),
            )
        })
    }

    /// The resolved data directory for durable storage.
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        directories::ProjectDirs::from("org", "civiclink", "civiclink")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".civiclink"))
    }

    /// The session token, if any, for the gateway's auth header.
    pub fn token(&self) -> Option<SecretString> {
        self.auth
            .as_ref()
            .map(|auth| SecretString::from(auth.token.clone()))
    }
}
