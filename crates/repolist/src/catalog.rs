//! Catalog API listing source
//!
//! Lists repositories through `GET /v2/_catalog`, the listing endpoint of the
//! Docker registry HTTP API. Only a single page is requested; registries with
//! more repositories than `page_size` yield a truncated list.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;

use crate::config::{AuthMode, ListConfig};
use crate::credentials::Credentials;
use crate::error::{ListError, Result};
use crate::http::{self, Authorization};
use crate::registry::RegistryAddress;
use crate::source::{ListSource, SourceKind};

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    #[serde(default)]
    repositories: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
}

/// Listing source for registries exposing the catalog API
pub struct CatalogSource {
    address: RegistryAddress,
    auth_mode: AuthMode,
    /// Shared with image pull/push
    credentials: Arc<Credentials>,
    client: Client,
    page_size: u32,
    token_url: String,
}

impl CatalogSource {
    /// Create a catalog source
    ///
    /// The auth mode comes from `config`, or from the registry's server name
    /// when the config leaves it open.
    pub fn new(
        address: RegistryAddress,
        credentials: Arc<Credentials>,
        config: &ListConfig,
    ) -> Result<Self> {
        let auth_mode = config
            .auth_mode
            .unwrap_or_else(|| AuthMode::detect(address.server()));
        let token_url = format!("https://{}/token", address.host());

        Ok(Self {
            address,
            auth_mode,
            credentials,
            client: http::build_client(config.timeout)?,
            page_size: config.page_size,
            token_url,
        })
    }

    /// Use a different password-grant endpoint for [`ListSource::ping`]
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn auth_mode(&self) -> AuthMode {
        self.auth_mode
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Authorization from the current credentials
    fn authorization(&self) -> Authorization {
        if self.credentials.is_anonymous() {
            return Authorization::Anonymous;
        }
        match self.auth_mode {
            AuthMode::Bearer => Authorization::Bearer {
                token: self.credentials.password(),
            },
            AuthMode::Basic => Authorization::Basic {
                username: self.credentials.username(),
                password: self.credentials.password(),
            },
        }
    }
}

#[async_trait]
impl ListSource for CatalogSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Catalog
    }

    fn address(&self) -> &RegistryAddress {
        &self.address
    }

    fn credentials(&self) -> &Arc<Credentials> {
        &self.credentials
    }

    async fn ping(&self) -> Result<()> {
        let username = self.credentials.username();
        let password = self.credentials.password();
        let form = [
            ("grant_type", "password"),
            ("username", username.as_str()),
            ("password", password.as_str()),
            ("client_id", username.as_str()),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| ListError::token_exchange(&self.token_url, e))?;
        let response = http::ensure_success(response)
            .await
            .map_err(|e| ListError::token_exchange(&self.token_url, e))?;

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ListError::token_exchange(&self.token_url, e))?;
        if token.access_token.is_empty() {
            return Err(ListError::token_exchange(
                &self.token_url,
                "server returned no access token",
            ));
        }

        // TODO: hand the token to image transfer instead of discarding it
        tracing::debug!("Token exchange with {} succeeded", self.token_url);
        Ok(())
    }

    async fn retrieve(&self) -> Result<Vec<String>> {
        let url = self.address.endpoint("/v2/_catalog")?;
        let registry = self.address.raw();

        self.credentials.refresh().await?;
        let auth = self.authorization();
        tracing::debug!("Requesting catalog of {} ({:?} auth)", registry, auth);

        let request = self
            .client
            .get(url)
            .query(&[("n", self.page_size.to_string())]);
        let response = auth
            .apply(request)
            .send()
            .await
            .map_err(|e| ListError::retrieval_caused(registry, "", e))?;
        let response = http::ensure_success(response)
            .await
            .map_err(|e| ListError::retrieval(registry, e))?;

        let catalog: CatalogResponse = response
            .json()
            .await
            .map_err(|e| ListError::retrieval_caused(registry, "invalid catalog response", e))?;
        let repositories = catalog.repositories.unwrap_or_default();

        if repositories.len() >= self.page_size as usize {
            tracing::warn!(
                "Catalog of {} filled a whole page of {} entries, the list may be truncated",
                registry,
                self.page_size
            );
        }
        tracing::info!("Retrieved {} repositories from {}", repositories.len(), registry);

        Ok(repositories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(raw: &str, creds: Credentials, config: &ListConfig) -> CatalogSource {
        CatalogSource::new(RegistryAddress::parse(raw), Arc::new(creds), config).unwrap()
    }

    #[test]
    fn test_token_url_uses_https() {
        let s = source(
            "http://registry.example.com:5000",
            Credentials::anonymous(),
            &ListConfig::default(),
        );
        assert_eq!(s.token_url(), "https://registry.example.com:5000/token");
    }

    #[test]
    fn test_auth_mode_detection_and_override() {
        let config = ListConfig::default();
        let s = source("eu.gcr.io", Credentials::basic("oauth2accesstoken", "tok"), &config);
        assert_eq!(s.auth_mode(), AuthMode::Bearer);
        assert_eq!(
            s.authorization(),
            Authorization::Bearer {
                token: "tok".to_string()
            }
        );

        let s = source("registry.example.com", Credentials::basic("u", "p"), &config);
        assert_eq!(s.auth_mode(), AuthMode::Basic);
        assert_eq!(
            s.authorization(),
            Authorization::Basic {
                username: "u".to_string(),
                password: "p".to_string()
            }
        );

        let config = ListConfig::default().with_auth_mode(AuthMode::Bearer);
        let s = source("registry.example.com", Credentials::basic("u", "p"), &config);
        assert_eq!(s.auth_mode(), AuthMode::Bearer);
    }

    #[test]
    fn test_anonymous_sends_no_header() {
        let s = source(
            "registry.example.com",
            Credentials::anonymous(),
            &ListConfig::default(),
        );
        assert_eq!(s.authorization(), Authorization::Anonymous);
    }

    #[tokio::test]
    async fn test_invalid_registry_fails_before_network() {
        let s = source(
            "registry.example.com/some/path",
            Credentials::anonymous(),
            &ListConfig::default(),
        );
        let err = s.retrieve().await.unwrap_err();
        assert!(matches!(err, ListError::InvalidRegistry { .. }));
    }
}
