//! Registry addresses
//!
//! Accepted forms are `host`, `host:port`, and either of those behind an
//! `http://` or `https://` scheme. `http://` marks the registry as insecure,
//! meaning listing calls go out over plain HTTP.

use url::Url;

use crate::error::{ListError, Result};

/// A registry address split into the parts listing needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryAddress {
    /// Address as given by the caller
    raw: String,
    /// `host[:port]` with the scheme removed
    host: String,
    /// Everything before the first `:` of `host`
    server: String,
    /// Registry was given with `http://`
    insecure: bool,
}

impl RegistryAddress {
    /// Split an address; validation is deferred to [`RegistryAddress::base_url`]
    pub fn parse(raw: &str) -> Self {
        let (insecure, host) = if let Some(rest) = raw.strip_prefix("http://") {
            (true, rest)
        } else if let Some(rest) = raw.strip_prefix("https://") {
            (false, rest)
        } else {
            (false, raw)
        };

        let server = host.split(':').next().unwrap_or_default();

        Self {
            raw: raw.to_string(),
            host: host.to_string(),
            server: server.to_string(),
            insecure,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn is_insecure(&self) -> bool {
        self.insecure
    }

    pub fn scheme(&self) -> &'static str {
        if self.insecure { "http" } else { "https" }
    }

    /// Protocol-qualified root URL of the registry
    pub fn base_url(&self) -> Result<Url> {
        let invalid = |reason: &str| ListError::InvalidRegistry {
            registry: self.raw.clone(),
            reason: reason.to_string(),
        };

        if self.host.is_empty() {
            return Err(invalid("missing host"));
        }
        if self.host.contains('/') {
            return Err(invalid("a registry address must not contain a path"));
        }
        if self.host.contains('@') {
            return Err(invalid("credentials must not be part of the address"));
        }
        if self.host.chars().any(char::is_whitespace) {
            return Err(invalid("address contains whitespace"));
        }

        let url = Url::parse(&format!("{}://{}", self.scheme(), self.host))
            .map_err(|e| invalid(&e.to_string()))?;
        if url.host_str().is_none_or(str::is_empty) {
            return Err(invalid("missing host"));
        }
        Ok(url)
    }

    /// Absolute URL of `path` on this registry
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self.base_url()?;
        base.join(path).map_err(|e| ListError::InvalidRegistry {
            registry: self.raw.clone(),
            reason: e.to_string(),
        })
    }
}

impl std::fmt::Display for RegistryAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
