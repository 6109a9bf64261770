//! Registry credentials
//!
//! [`Credentials`] is the live object listing sources authenticate with. It is
//! shared as `Arc<Credentials>` between a listing and whatever pulls and pushes
//! images against the same registry, so a refresh through one holder is seen
//! by all of them. [`Credentials::clone_basic`] derives an unshared copy for
//! APIs whose tokens live in a separate domain.
//!
//! [`CredentialSource`] is the configuration side: where credentials come
//! from (inline, environment variables, Docker's `config.json`).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{ListError, Result};

/// Tokens are renewed this long before they actually expire
const EXPIRY_SKEW_SECS: i64 = 30;

/// Docker Hub's key in `config.json`
const DOCKER_HUB_AUTH_KEY: &str = "https://index.docker.io/v1/";

/// A freshly issued password or token
#[derive(Debug, Clone)]
pub struct RefreshedToken {
    pub password: String,
    /// `None` for tokens that do not expire
    pub expires_at: Option<DateTime<Utc>>,
}

/// Issues new passwords for short-lived registry tokens
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, username: &str) -> Result<RefreshedToken>;
}

#[derive(Debug, Clone, Default)]
struct CredentialState {
    username: String,
    password: String,
    expires_at: Option<DateTime<Utc>>,
    refreshed: bool,
}

/// Username and password (or token) for one registry
pub struct Credentials {
    state: RwLock<CredentialState>,
    refresher: Option<Arc<dyn TokenRefresher>>,
    refresh_gate: tokio::sync::Mutex<()>,
}

impl Credentials {
    /// Static username/password credentials
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::from_state(
            CredentialState {
                username: username.into(),
                password: password.into(),
                ..Default::default()
            },
            None,
        )
    }

    /// No credentials at all
    pub fn anonymous() -> Self {
        Self::basic("", "")
    }

    /// Credentials whose password is issued (and re-issued) by `refresher`
    pub fn with_refresher(username: impl Into<String>, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self::from_state(
            CredentialState {
                username: username.into(),
                ..Default::default()
            },
            Some(refresher),
        )
    }

    fn from_state(state: CredentialState, refresher: Option<Arc<dyn TokenRefresher>>) -> Self {
        Self {
            state: RwLock::new(state),
            refresher,
            refresh_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Independent basic copy of the current username and password
    ///
    /// The copy has no refresher; changes to either side never reach the other.
    pub fn clone_basic(&self) -> Self {
        let state = self.read();
        Self::basic(state.username.clone(), state.password.clone())
    }

    pub fn username(&self) -> String {
        self.read().username.clone()
    }

    pub fn password(&self) -> String {
        self.read().password.clone()
    }

    /// Replace the password (or token) in place
    pub fn set_password(&self, password: impl Into<String>) {
        self.write().password = password.into();
    }

    /// Whether there is nothing to authenticate with
    pub fn is_anonymous(&self) -> bool {
        let state = self.read();
        state.username.is_empty() && state.password.is_empty()
    }

    /// Whether the password needs to be (re-)issued before use
    pub fn is_expired(&self) -> bool {
        if self.refresher.is_none() {
            return false;
        }
        let state = self.read();
        if !state.refreshed {
            return true;
        }
        match state.expires_at {
            Some(at) => Utc::now() + chrono::Duration::seconds(EXPIRY_SKEW_SECS) >= at,
            None => false,
        }
    }

    /// Refresh the password if it is expired
    ///
    /// A no-op for static credentials. Concurrent callers on the same object
    /// wait for one another, so only one refresh runs per expiry.
    pub async fn refresh(&self) -> Result<()> {
        let Some(refresher) = &self.refresher else {
            return Ok(());
        };

        let _gate = self.refresh_gate.lock().await;
        if !self.is_expired() {
            return Ok(());
        }

        let username = self.username();
        tracing::debug!("Refreshing credentials for user '{}'", username);

        let token = refresher.refresh(&username).await.map_err(|e| match e {
            ListError::Credentials { .. } => e,
            other => ListError::Credentials {
                message: other.to_string(),
            },
        })?;

        let mut state = self.write();
        state.password = token.password;
        state.expires_at = token.expires_at;
        state.refreshed = true;
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, CredentialState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CredentialState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("Credentials")
            .field("username", &state.username)
            .field("password", &"<redacted>")
            .field("expires_at", &state.expires_at)
            .field("refreshable", &self.refresher.is_some())
            .finish()
    }
}

/// Where credentials for a registry come from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CredentialSource {
    /// No authentication
    #[default]
    Anonymous,

    /// Inline username/password
    Basic { username: String, password: String },

    /// Environment variable references (CI/CD friendly)
    Env {
        username_var: String,
        password_var: String,
    },

    /// Docker config.json reference
    DockerConfig { path: Option<PathBuf> },
}

impl CredentialSource {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        CredentialSource::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn from_env(username_var: impl Into<String>, password_var: impl Into<String>) -> Self {
        CredentialSource::Env {
            username_var: username_var.into(),
            password_var: password_var.into(),
        }
    }

    /// Resolve to live credentials for `host`
    pub fn resolve(&self, host: &str) -> Result<Credentials> {
        match self {
            CredentialSource::Anonymous => Ok(Credentials::anonymous()),
            CredentialSource::Basic { username, password } => {
                Ok(Credentials::basic(username.clone(), password.clone()))
            }
            CredentialSource::Env {
                username_var,
                password_var,
            } => {
                let username = read_env(username_var)?;
                let password = read_env(password_var)?;
                Ok(Credentials::basic(username, password))
            }
            CredentialSource::DockerConfig { path } => {
                let config = DockerConfig::load(path.as_deref())?;
                match config.credentials_for_host(host)? {
                    Some((username, password)) => Ok(Credentials::basic(username, password)),
                    None => {
                        tracing::debug!("No entry for {} in Docker config, using anonymous", host);
                        Ok(Credentials::anonymous())
                    }
                }
            }
        }
    }
}

fn read_env(var: &str) -> Result<String> {
    std::env::var(var).map_err(|_| ListError::Credentials {
        message: format!("Environment variable {} not set", var),
    })
}

/// Docker config.json format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DockerConfig {
    #[serde(default)]
    pub auths: HashMap<String, DockerAuth>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockerAuth {
    #[serde(default)]
    pub auth: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl DockerConfig {
    /// Load Docker config from default or specified path
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let home = dirs::home_dir().ok_or_else(|| ListError::Credentials {
                    message: "Could not determine home directory".to_string(),
                })?;
                home.join(".docker").join("config.json")
            }
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: DockerConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Username and password stored for a registry host
    pub fn credentials_for_host(&self, host: &str) -> Result<Option<(String, String)>> {
        let mut candidates = vec![
            host.to_string(),
            format!("https://{}", host),
            format!("http://{}", host),
        ];
        if host == crate::source::DOCKER_HUB_SERVER || host == "docker.io" {
            candidates.push(DOCKER_HUB_AUTH_KEY.to_string());
        }

        for candidate in &candidates {
            let Some(auth) = self.auths.get(candidate) else {
                continue;
            };
            if let Some(encoded) = &auth.auth {
                return decode_auth(encoded).map(Some);
            }
            if let (Some(u), Some(p)) = (&auth.username, &auth.password) {
                return Ok(Some((u.clone(), p.clone())));
            }
        }
        Ok(None)
    }
}

fn decode_auth(encoded: &str) -> Result<(String, String)> {
    let invalid = |reason: &str| ListError::Credentials {
        message: format!("Invalid auth entry in Docker config: {}", reason),
    };

    let decoded = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, encoded)
        .map_err(|_| invalid("not base64"))?;
    let decoded = String::from_utf8(decoded).map_err(|_| invalid("not UTF-8"))?;
    let (user, pass) = decoded
        .split_once(':')
        .ok_or_else(|| invalid("missing ':' separator"))?;
    Ok((user.to_string(), pass.to_string()))
}
