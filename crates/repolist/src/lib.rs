//! Repository listings for container registries
//!
//! This crate answers one question for a registry sync pipeline: which
//! repositories does this registry hold that match my filter?
//!
//! - **Two listing protocols**: the generic catalog API, and Docker Hub's
//!   index API for `registry.hub.docker.com`, picked from the registry address
//! - **Credential aware**: catalog listing shares the pull/push credentials,
//!   Docker Hub listing works on its own copy
//! - **Anchored filters**: a filter always matches whole repository names
//! - **TTL cache**: results are reused until they expire, failures never
//!   poison the cache
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use repolist::{Credentials, ListConfig, RepoList};
//!
//! # async fn example() -> repolist::Result<()> {
//! let creds = Arc::new(Credentials::basic("user", "secret"));
//! let mut list = RepoList::new(
//!     "https://registry.example.com:5000",
//!     "library/.*",
//!     creds,
//!     &ListConfig::default(),
//! )?;
//!
//! for repo in list.get().await? {
//!     println!("{}", repo);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Limitations
//!
//! - The catalog API is read as a single page of `pageSize` entries (100 by
//!   default); larger registries yield a truncated list
//! - Nothing is persisted; the cache lives as long as the [`RepoList`]

pub mod error;
pub mod config;
pub mod credentials;
pub mod filter;
pub mod registry;
pub mod http;
pub mod source;
pub mod catalog;
pub mod index;
pub mod list;

// Re-exports for convenience
pub use error::{BoxError, ListError, Result};
pub use config::{AuthMode, ListConfig};
pub use credentials::{CredentialSource, Credentials, DockerConfig, RefreshedToken, TokenRefresher};
pub use filter::RepoFilter;
pub use registry::RegistryAddress;
pub use source::{DOCKER_HUB_SERVER, ListSource, SourceKind, select_source};
pub use catalog::CatalogSource;
pub use index::IndexSource;
pub use list::{RepoList, SharedRepoList};
