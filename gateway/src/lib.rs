//! Remote gateway for the HoosStudying backend.
//!
//! # Architecture
//!
//! All HTTP in the application lives in this crate, split by backend surface:
//!
//! - [`session`] - identity provider (sign-in/up/out, refresh) and the
//!   explicit [`Session`] credential threaded to every authenticated call
//! - [`auth`] - principal verification and the one-time name update
//! - [`pipelines`], [`tags`], [`conversations`], [`chat`], [`documents`] -
//!   the REST endpoints backing each entity
//! - [`storage`] - object-storage locator resolution
//!
//! # Error Handling
//!
//! Every operation returns `Result<_, GatewayError>`. There is no automatic
//! retry: a failure surfaces to the caller, stores stay untouched, and a new
//! user action is required. Authentication rejections are a distinct variant
//! so the application can force the unauthenticated view.

mod auth;
mod chat;
mod conversations;
mod documents;
mod pipelines;
pub mod session;
mod storage;
mod tags;

pub use documents::UploadOutcome;
pub use session::{AuthState, Identity, Session};
pub use storage::ResolvedUrl;

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

use hoos_config::Config;

const CONNECT_TIMEOUT_SECS: u64 = 30;
const REQUEST_TIMEOUT_SECS: u64 = 60;
const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_MAX_IDLE_PER_HOST: usize = 8;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

const MAX_ERROR_BODY_BYTES: usize = 4 * 1024;

pub type Result<T> = std::result::Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never completed (connect, timeout, protocol).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The backend rejected the session credential.
    #[error("session rejected ({status})")]
    Auth { status: StatusCode },
    /// Any other non-success response.
    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    /// The identity provider refused a sign-in/up/refresh.
    #[error("identity provider: {0}")]
    Identity(String),
}

impl GatewayError {
    /// Whether this failure should force the unauthenticated view.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, GatewayError::Auth { .. })
    }
}

/// Shared hardened HTTP client: bounded timeouts, keepalive, no redirects.
fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap_or_else(|e| {
            tracing::error!("Failed to build hardened HTTP client: {e}. Using minimal fallback.");
            reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .expect("minimal HTTP client must build")
        })
}

/// Client for the backend REST surface.
///
/// Cheap to clone: the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct Gateway {
    http: reqwest::Client,
    api_url: String,
    storage_endpoint: String,
}

impl Gateway {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            http: build_client(),
            api_url: config.api_url.clone(),
            storage_endpoint: config.storage_url_endpoint.clone(),
        }
    }

    /// Client pointed at an arbitrary origin; used by tests against a mock
    /// server and by the identity module, which shares the pool.
    #[must_use]
    pub fn with_origin(origin: impl Into<String>) -> Self {
        let origin = origin.into();
        let storage_endpoint = format!("{origin}/api/document/get-download-url");
        Self {
            http: build_client(),
            api_url: origin,
            storage_endpoint,
        }
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }

    pub(crate) fn storage_endpoint(&self) -> &str {
        &self.storage_endpoint
    }
}

/// Map a response to our error taxonomy, draining a bounded body snippet for
/// diagnostics on failure.
pub(crate) async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(GatewayError::Auth { status });
    }
    let body = response.text().await.unwrap_or_default();
    let body = truncated(&body, MAX_ERROR_BODY_BYTES);
    tracing::warn!(%status, "Gateway call failed");
    Err(GatewayError::Status { status, body })
}

fn truncated(body: &str, max: usize) -> String {
    if body.len() <= max {
        return body.to_string();
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::truncated;

    #[test]
    fn truncation_respects_char_boundaries() {
        let body = "héllo".repeat(1024);
        let cut = truncated(&body, 7);
        assert!(cut.ends_with('…'));
        assert!(cut.chars().count() <= 8);
        assert_eq!(truncated("short", 64), "short");
    }
}
