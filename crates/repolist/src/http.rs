//! HTTP plumbing shared by the listing sources
//!
//! Key security features:
//! - Redirects are only followed within the original origin, so an
//!   Authorization header never travels to another host. Pagination links
//!   returned in response bodies are checked with [`same_origin`] by the
//!   sources that follow them
//! - Every request carries a deadline

use reqwest::{Client, RequestBuilder, Response, redirect};
use std::time::Duration;
use url::Url;

use crate::error::{ListError, Result};

const MAX_REDIRECTS: usize = 10;

/// Longest error body excerpt carried into error messages
const ERROR_BODY_LIMIT: usize = 200;

/// Authorization attached to an outbound request
#[derive(Clone, PartialEq, Eq)]
pub enum Authorization {
    /// No header
    Anonymous,
    /// Basic authentication (username/password)
    Basic { username: String, password: String },
    /// Bearer token authentication
    Bearer { token: String },
}

impl Authorization {
    /// Header value, if any
    pub fn header_value(&self) -> Option<String> {
        match self {
            Authorization::Anonymous => None,
            Authorization::Basic { username, password } => {
                let encoded = base64::Engine::encode(
                    &base64::engine::general_purpose::STANDARD,
                    format!("{}:{}", username, password),
                );
                Some(format!("Basic {}", encoded))
            }
            Authorization::Bearer { token } => Some(format!("Bearer {}", token)),
        }
    }

    /// Attach the header to a request
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self.header_value() {
            Some(value) => request.header(reqwest::header::AUTHORIZATION, value),
            None => request,
        }
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            Authorization::Anonymous => "anonymous",
            Authorization::Basic { .. } => "basic",
            Authorization::Bearer { .. } => "bearer",
        }
    }
}

impl std::fmt::Debug for Authorization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.scheme())
    }
}

/// Build the HTTP client used by a listing source
pub fn build_client(timeout: Duration) -> Result<Client> {
    let policy = redirect::Policy::custom(|attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }
        let same = attempt
            .previous()
            .first()
            .is_some_and(|origin| same_origin(origin, attempt.url()));
        if same {
            attempt.follow()
        } else {
            tracing::warn!(
                "Not following cross-origin redirect to {} - credentials would leak",
                attempt.url()
            );
            attempt.stop()
        }
    });

    Client::builder()
        .redirect(policy)
        .timeout(timeout)
        .user_agent(concat!("repolist/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ListError::InvalidConfig {
            message: format!("Could not build HTTP client: {}", e),
        })
}

/// Check if two URLs are same-origin (for redirect safety)
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host() == b.host()
        && a.port_or_known_default() == b.port_or_known_default()
}

/// Pass a successful response through, describe any other
///
/// The description holds the status line and the start of the body, which is
/// where registries put their error JSON.
pub async fn ensure_success(response: Response) -> std::result::Result<Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().clone();
    let body = response.text().await.unwrap_or_default();
    let body = body.trim();
    let excerpt: String = body.chars().take(ERROR_BODY_LIMIT).collect();

    if excerpt.is_empty() {
        Err(format!("{} returned HTTP {}", url, status))
    } else {
        Err(format!("{} returned HTTP {}: {}", url, status, excerpt))
    }
}
