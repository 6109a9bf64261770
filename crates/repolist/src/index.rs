//! Docker Hub index API listing source
//!
//! Docker Hub does not serve the catalog API. Repositories are listed per
//! namespace through the Hub's own API, which issues its own tokens via
//! `POST /v2/users/login`. Those tokens are unrelated to pull/push tokens, so
//! this source always works on a private copy of the credentials.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

use crate::config::ListConfig;
use crate::credentials::Credentials;
use crate::error::{ListError, Result};
use crate::http::{self, Authorization};
use crate::registry::RegistryAddress;
use crate::source::{ListSource, SourceKind};

/// Upper bound on followed `next` links, guards against a looping API
const MAX_PAGES: usize = 1000;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryPage {
    #[serde(default)]
    next: Option<String>,
    #[serde(default)]
    results: Vec<RepositoryEntry>,
}

#[derive(Debug, Deserialize)]
struct RepositoryEntry {
    name: String,
    #[serde(default)]
    namespace: Option<String>,
}

/// Listing source for Docker Hub
pub struct IndexSource {
    address: RegistryAddress,
    /// Private copy, never shared with image pull/push
    credentials: Arc<Credentials>,
    client: Client,
    index_url: Url,
    page_size: u32,
}

impl IndexSource {
    pub fn new(
        address: RegistryAddress,
        credentials: Arc<Credentials>,
        config: &ListConfig,
    ) -> Result<Self> {
        let mut index_url = Url::parse(&config.index_url).map_err(|e| ListError::InvalidConfig {
            message: format!("Invalid index URL '{}': {}", config.index_url, e),
        })?;
        // endpoints are joined relative to the index URL, keep any path prefix
        if !index_url.path().ends_with('/') {
            let path = format!("{}/", index_url.path());
            index_url.set_path(&path);
        }

        Ok(Self {
            address,
            credentials,
            client: http::build_client(config.timeout)?,
            index_url,
            page_size: config.page_size,
        })
    }

    pub fn index_url(&self) -> &Url {
        &self.index_url
    }

    /// `path` is relative to the index URL and must not start with `/`
    fn endpoint(&self, path: &str) -> Result<Url> {
        self.index_url
            .join(path)
            .map_err(|e| ListError::InvalidConfig {
                message: format!("Invalid index URL '{}': {}", self.index_url, e),
            })
    }

    /// Exchange username and password for an index token
    async fn login(&self) -> Result<String> {
        let url = self.endpoint("v2/users/login")?;
        let username = self.credentials.username();
        let password = self.credentials.password();

        if username.is_empty() {
            return Err(ListError::Credentials {
                message: "Docker Hub listing requires a username".to_string(),
            });
        }

        let response = self
            .client
            .post(url.clone())
            .json(&LoginRequest {
                username: &username,
                password: &password,
            })
            .send()
            .await
            .map_err(|e| ListError::token_exchange(url.as_str(), e))?;
        let response = http::ensure_success(response)
            .await
            .map_err(|e| ListError::token_exchange(url.as_str(), e))?;

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| ListError::token_exchange(url.as_str(), e))?;
        if login.token.is_empty() {
            return Err(ListError::token_exchange(
                url.as_str(),
                "server returned no token",
            ));
        }
        Ok(login.token)
    }

    async fn fetch_page(&self, url: Url, auth: &Authorization) -> Result<RepositoryPage> {
        let registry = self.address.raw();
        let response = auth
            .apply(self.client.get(url))
            .send()
            .await
            .map_err(|e| ListError::retrieval_caused(registry, "", e))?;
        let response = http::ensure_success(response)
            .await
            .map_err(|e| ListError::retrieval(registry, e))?;

        response
            .json()
            .await
            .map_err(|e| ListError::retrieval_caused(registry, "invalid index response", e))
    }
}

#[async_trait]
impl ListSource for IndexSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Index
    }

    fn address(&self) -> &RegistryAddress {
        &self.address
    }

    fn credentials(&self) -> &Arc<Credentials> {
        &self.credentials
    }

    async fn ping(&self) -> Result<()> {
        self.login().await.map(|_| ())
    }

    async fn retrieve(&self) -> Result<Vec<String>> {
        self.credentials.refresh().await?;

        let namespace = self.credentials.username();
        let auth = Authorization::Bearer {
            token: self.login().await?,
        };

        let mut url = self.endpoint(&format!("v2/repositories/{}/", namespace))?;
        url.query_pairs_mut()
            .append_pair("page_size", &self.page_size.to_string());

        let mut repositories = Vec::new();
        for _ in 0..MAX_PAGES {
            let page = self.fetch_page(url, &auth).await?;
            repositories.extend(page.results.into_iter().map(|entry| {
                let ns = entry.namespace.as_deref().unwrap_or(namespace.as_str());
                format!("{}/{}", ns, entry.name)
            }));

            match page.next.filter(|next| !next.is_empty()) {
                Some(next) => {
                    let next = self.index_url.join(&next).map_err(|e| {
                        ListError::retrieval_caused(self.address.raw(), "invalid next link", e)
                    })?;
                    // the index token must not leave the index origin
                    if !http::same_origin(&self.index_url, &next) {
                        return Err(ListError::retrieval(
                            self.address.raw(),
                            format!("next link {} leaves the index origin {}", next, self.index_url),
                        ));
                    }
                    url = next;
                }
                None => {
                    tracing::info!(
                        "Retrieved {} repositories of '{}' from {}",
                        repositories.len(),
                        namespace,
                        self.address
                    );
                    return Ok(repositories);
                }
            }
        }

        Err(ListError::retrieval(
            self.address.raw(),
            format!("index listing did not end after {} pages", MAX_PAGES),
        ))
    }
}
