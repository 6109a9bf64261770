//! Listing sources
//!
//! A registry exposes its repository names through exactly one of two APIs:
//! the generic catalog API, or Docker Hub's own index API. Which one is a
//! matter of the registry's server name and is decided once, when the
//! source is built.

use async_trait::async_trait;
use std::sync::Arc;

use crate::catalog::CatalogSource;
use crate::config::ListConfig;
use crate::credentials::Credentials;
use crate::error::Result;
use crate::index::IndexSource;
use crate::registry::RegistryAddress;

/// Server name of Docker Hub's registry endpoint
pub const DOCKER_HUB_SERVER: &str = "registry.hub.docker.com";

/// The listing protocol behind a source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Generic `/v2/_catalog` API
    Catalog,
    /// Docker Hub index API
    Index,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Catalog => f.write_str("catalog"),
            SourceKind::Index => f.write_str("index"),
        }
    }
}

/// Something that can list all repositories of one registry
#[async_trait]
pub trait ListSource: Send + Sync {
    /// Which protocol this source speaks
    fn kind(&self) -> SourceKind;

    /// Registry this source lists, including its insecure flag
    fn address(&self) -> &RegistryAddress;

    /// Credentials this source authenticates with
    fn credentials(&self) -> &Arc<Credentials>;

    /// Check that the credentials are accepted
    async fn ping(&self) -> Result<()>;

    /// Retrieve all repository names, unfiltered, in registry order
    async fn retrieve(&self) -> Result<Vec<String>>;
}

/// Build the source for a registry
///
/// Docker Hub gets an [`IndexSource`] holding its own copy of the
/// credentials, since index tokens are a different domain than pull/push
/// tokens. Everything else gets a [`CatalogSource`] sharing `credentials`.
pub fn select_source(
    address: &RegistryAddress,
    credentials: Arc<Credentials>,
    config: &ListConfig,
) -> Result<Box<dyn ListSource>> {
    match address.server() {
        DOCKER_HUB_SERVER => {
            let copy = Arc::new(credentials.clone_basic());
            tracing::debug!("Listing {} through the Docker Hub index API", address);
            Ok(Box::new(IndexSource::new(address.clone(), copy, config)?))
        }
        _ => {
            tracing::debug!("Listing {} through the catalog API", address);
            Ok(Box::new(CatalogSource::new(
                address.clone(),
                credentials,
                config,
            )?))
        }
    }
}
