//! Message dispatcher for the conversational backend.
//!
//! Every send first awaits a token refresh from the [`SessionContext`], then
//! posts the utterance together with the store identifiers. There is no
//! retry, no backoff and no request timeout: each failure is reported once
//! to the caller.

pub mod types;

use std::sync::Arc;

use agentic_chat_core::Utterance;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::WidgetConfig;
use crate::session::SessionContext;

pub use types::{ChatRequest, ResponseKind, ResponsePayload};

/// Errors surfaced by [`MessageClient::send`].
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The backend answered with a status outside 2xx.
    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    /// The request could not be sent or the body could not be read.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The body was not a valid response payload.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Client for the conversational backend.
#[derive(Clone)]
pub struct MessageClient {
    inner: Arc<MessageClientInner>,
}

struct MessageClientInner {
    client: reqwest::Client,
    endpoint: Url,
    access_key: String,
    shop_url: String,
    session: SessionContext,
}

impl MessageClient {
    /// Create a client that reads its token from `session`.
    #[must_use]
    pub fn new(config: &WidgetConfig, client: reqwest::Client, session: SessionContext) -> Self {
        Self {
            inner: Arc::new(MessageClientInner {
                client,
                endpoint: config.api_endpoint.clone(),
                access_key: config.access_key.clone(),
                shop_url: config.shop_url.clone(),
                session,
            }),
        }
    }

    /// Send an utterance and wait for the structured reply.
    ///
    /// The token refresh completes before the request body is built.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::Http` for a non-2xx status,
    /// `DispatchError::Network` for transport failures and
    /// `DispatchError::Decode` for a body that is not a response payload.
    #[instrument(skip(self, utterance), fields(endpoint = %self.inner.endpoint))]
    pub async fn send(&self, utterance: &Utterance) -> Result<ResponsePayload, DispatchError> {
        self.inner.session.refresh().await;
        let token = self.inner.session.current();

        let request = ChatRequest {
            message: utterance.as_str(),
            access_key: &self.inner.access_key,
            shop_url: &self.inner.shop_url,
            context_token: token.as_ref().map(|t| t.expose()),
        };

        tracing::debug!(has_token = token.is_some(), "Sending chat message");

        let response = self
            .inner
            .client
            .post(self.inner.endpoint.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Chat backend returned non-success status"
            );
            return Err(DispatchError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse chat response"
            );
            DispatchError::Decode(e)
        })
    }

    /// The session manager this client refreshes before every send.
    #[must_use]
    pub fn session(&self) -> &SessionContext {
        &self.inner.session
    }
}
