//! Cached, filtered repository listing
//!
//! A [`RepoList`] binds one registry, one filter and one listing source for
//! its whole lifetime. [`RepoList::get`] serves the last filtered result until
//! its time-to-live runs out, then retrieves and filters anew. A failed
//! retrieval returns the error and leaves the cache as it was.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::ListConfig;
use crate::credentials::Credentials;
use crate::error::Result;
use crate::filter::RepoFilter;
use crate::registry::RegistryAddress;
use crate::source::{ListSource, SourceKind, select_source};

/// A [`RepoList`] shared between tasks
///
/// Holding the lock across [`RepoList::get`] makes check, retrieve and store
/// one step, so concurrent callers never retrieve twice for one expiry.
pub type SharedRepoList = Arc<Mutex<RepoList>>;

/// Repository listing for one registry and filter
pub struct RepoList {
    registry: String,
    filter: RepoFilter,
    source: Box<dyn ListSource>,
    ttl: Duration,
    repos: Vec<String>,
    /// Unset until the first successful retrieval
    expiry: Option<Instant>,
}

impl RepoList {
    /// Create a listing for `registry`, keeping names matching `filter`
    ///
    /// `credentials` are the ones used for image pull/push against the same
    /// registry.
    pub fn new(
        registry: &str,
        filter: &str,
        credentials: Arc<Credentials>,
        config: &ListConfig,
    ) -> Result<Self> {
        let filter = RepoFilter::compile(filter)?;
        let address = RegistryAddress::parse(registry);
        let source = select_source(&address, credentials, config)?;
        Ok(Self::from_parts(registry, filter, source, config.ttl))
    }

    /// Create a listing on top of an already built source
    pub fn with_source(
        registry: &str,
        filter: &str,
        source: Box<dyn ListSource>,
        ttl: Duration,
    ) -> Result<Self> {
        let filter = RepoFilter::compile(filter)?;
        Ok(Self::from_parts(registry, filter, source, ttl))
    }

    fn from_parts(
        registry: &str,
        filter: RepoFilter,
        source: Box<dyn ListSource>,
        ttl: Duration,
    ) -> Self {
        Self {
            registry: registry.to_string(),
            filter,
            source,
            ttl,
            repos: Vec::new(),
            expiry: None,
        }
    }

    /// Wrap into a [`SharedRepoList`]
    pub fn shared(self) -> SharedRepoList {
        Arc::new(Mutex::new(self))
    }

    /// Registry address as given at construction
    pub fn registry(&self) -> &str {
        &self.registry
    }

    pub fn filter(&self) -> &RepoFilter {
        &self.filter
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn source(&self) -> &dyn ListSource {
        self.source.as_ref()
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source.kind()
    }

    /// Whether [`RepoList::get`] would answer from cache right now
    pub fn is_fresh(&self) -> bool {
        self.expiry.is_some_and(|expiry| Instant::now() < expiry)
    }

    /// Check the source's credentials without touching the cache
    pub async fn ping(&self) -> Result<()> {
        self.source.ping().await
    }

    /// Filtered repository names, from cache while it is valid
    pub async fn get(&mut self) -> Result<&[String]> {
        if self.is_fresh() {
            tracing::debug!("Repository list of {} still valid, reusing", self.registry);
            return Ok(&self.repos);
        }

        tracing::debug!("Retrieving repository list of {}", self.registry);
        let raw = self.source.retrieve().await.inspect_err(|e| {
            tracing::warn!("Listing {} failed: {}", self.registry, e);
        })?;

        self.expiry = Some(Instant::now() + self.ttl);
        self.repos = self.filter.apply(&raw);
        tracing::debug!(
            "{} of {} repositories in {} match {}",
            self.repos.len(),
            raw.len(),
            self.registry,
            self.filter.as_str()
        );

        Ok(&self.repos)
    }
}

impl std::fmt::Debug for RepoList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepoList")
            .field("registry", &self.registry)
            .field("filter", &self.filter.as_str())
            .field("source", &self.source.kind())
            .field("cached", &self.repos.len())
            .field("expiry", &self.expiry)
            .finish()
    }
}
