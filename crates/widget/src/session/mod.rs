//! Storefront context token manager.
//!
//! # Lifecycle
//!
//! The token is fetched when the widget activates, again every time the
//! panel opens, and again immediately before every outbound message. A
//! shopper who logs in or out between opening the panel and typing is
//! therefore always sent with their current session.
//!
//! # Failure Policy
//!
//! Fetch failures are soft: they are logged at `warn` and the previously
//! held token stays in place. Nothing here returns an error to the caller.
//!
//! # Concurrency
//!
//! Overlapping refreshes are allowed. Each successful one replaces the whole
//! value, so the last response to arrive wins.

pub mod mirror;

use std::sync::{Arc, PoisonError, RwLock};

use agentic_chat_core::ContextToken;
use reqwest::header::{ACCEPT, CACHE_CONTROL, HeaderValue, PRAGMA};
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;
use url::Url;

pub use mirror::{FileMirror, MemoryMirror, NoMirror, TokenMirror};

/// Reasons a token fetch can fail. Logged, never propagated.
#[derive(Debug, Error)]
pub enum TokenFetchError {
    /// The token endpoint answered with a non-success status.
    #[error("token endpoint returned status {0}")]
    Status(u16),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    /// Body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Body parsed but carried no token.
    #[error("response did not contain a token")]
    MissingToken,
}

/// Body of the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Option<String>,
}

/// Owner of the shopper's current context token.
///
/// Cheaply cloneable; clones share the same token.
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<SessionContextInner>,
}

struct SessionContextInner {
    client: reqwest::Client,
    endpoint: Url,
    token: RwLock<Option<ContextToken>>,
    mirror: Arc<dyn TokenMirror>,
}

impl SessionContext {
    /// Create a manager that fetches from `endpoint`. No request is made yet.
    #[must_use]
    pub fn new(client: reqwest::Client, endpoint: Url, mirror: Arc<dyn TokenMirror>) -> Self {
        Self {
            inner: Arc::new(SessionContextInner {
                client,
                endpoint,
                token: RwLock::new(None),
                mirror,
            }),
        }
    }

    /// Fetch the first token on activation.
    pub async fn initialize(&self) {
        self.refresh().await;
        if self.current().is_some() {
            tracing::info!("Context token initialized");
        }
    }

    /// Fetch the latest token and adopt it if the request succeeds.
    #[instrument(skip(self), fields(endpoint = %self.inner.endpoint))]
    pub async fn refresh(&self) {
        match self.fetch().await {
            Ok(token) => self.replace(token),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch context token");
            }
        }
    }

    /// The token currently held, if any.
    #[must_use]
    pub fn current(&self) -> Option<ContextToken> {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Make `token` current and write it to the diagnostic mirror.
    pub fn replace(&self, token: ContextToken) {
        self.inner.mirror.record(&token);
        *self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token);
        tracing::debug!("Context token updated");
    }

    /// The token endpoint this manager talks to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    async fn fetch(&self) -> Result<ContextToken, TokenFetchError> {
        let response = self
            .inner
            .client
            .get(self.inner.endpoint.clone())
            .header(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store"))
            .header(PRAGMA, HeaderValue::from_static("no-cache"))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TokenFetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let parsed: TokenResponse = serde_json::from_str(&body)?;

        parsed
            .token
            .filter(|token| !token.is_empty())
            .map(ContextToken::from)
            .ok_or(TokenFetchError::MissingToken)
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("has_token", &self.current().is_some())
            .finish_non_exhaustive()
    }
}
