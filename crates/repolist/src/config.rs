//! Listing configuration
//!
//! Stored in `~/.config/repolist/config.yaml`. Every field has a default, so
//! an absent file or an empty document is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ListError, Result};

/// Default time a filtered listing stays valid
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// Default page size requested from the catalog API
///
/// Registries holding more repositories than this return a truncated list.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Default deadline for a single outbound request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default base URL of the Docker Hub index API
pub const DEFAULT_INDEX_URL: &str = "https://hub.docker.com";

/// Tunables for repository listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListConfig {
    /// How long a retrieved listing is served from cache
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,

    /// Maximum number of entries requested from the catalog API
    pub page_size: u32,

    /// Deadline for each outbound request
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Base URL of the index API used for Docker Hub
    pub index_url: String,

    /// Catalog authentication scheme (detected from the host if unset)
    pub auth_mode: Option<AuthMode>,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            page_size: DEFAULT_PAGE_SIZE,
            timeout: DEFAULT_TIMEOUT,
            index_url: DEFAULT_INDEX_URL.to_string(),
            auth_mode: None,
        }
    }
}

impl ListConfig {
    /// Load configuration from default location
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Option<Self> = serde_yaml::from_str(&content)?;
        let config = config.unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default configuration path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| ListError::InvalidConfig {
            message: "Could not determine config directory".to_string(),
        })?;
        Ok(config_dir.join("repolist").join("config.yaml"))
    }

    /// Reject values that would make listing meaningless
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(ListError::InvalidConfig {
                message: "pageSize must be greater than 0".to_string(),
            });
        }
        if self.timeout.is_zero() {
            return Err(ListError::InvalidConfig {
                message: "timeout must be greater than 0".to_string(),
            });
        }
        if url::Url::parse(&self.index_url).is_err() {
            return Err(ListError::InvalidConfig {
                message: format!("indexUrl is not a valid URL: {}", self.index_url),
            });
        }
        Ok(())
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_index_url(mut self, index_url: impl Into<String>) -> Self {
        self.index_url = index_url.into();
        self
    }

    pub fn with_auth_mode(mut self, mode: AuthMode) -> Self {
        self.auth_mode = Some(mode);
        self
    }
}

/// Authorization scheme used against the catalog API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// `Authorization: Basic base64(username:password)`
    Basic,
    /// `Authorization: Bearer <password>`
    Bearer,
}

impl AuthMode {
    /// Pick the scheme for a registry server name
    ///
    /// Google registries hand out OAuth access tokens as pull/push passwords,
    /// which they only accept as bearer tokens.
    pub fn detect(server: &str) -> Self {
        if server == "gcr.io" || server.ends_with(".gcr.io") || server.ends_with("-docker.pkg.dev")
        {
            AuthMode::Bearer
        } else {
            AuthMode::Basic
        }
    }
}

impl std::str::FromStr for AuthMode {
    type Err = ListError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(AuthMode::Basic),
            "bearer" => Ok(AuthMode::Bearer),
            other => Err(ListError::InvalidConfig {
                message: format!("Unknown auth mode '{}', expected basic or bearer", other),
            }),
        }
    }
}
