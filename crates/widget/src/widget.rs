//! Widget shell: panel state, typing indicator and the submit flow.
//!
//! # States
//!
//! The panel is `Closed` or `Open`. Opening focuses the input and refreshes
//! the context token in the background; closing performs no network action.
//!
//! A submission echoes the user's text, raises the typing indicator, sends
//! through the [`MessageClient`] and then either renders the reply or appends
//! a generic apology. The widget returns to idle either way.
//!
//! # Known Gaps
//!
//! - Submissions are not serialized. A second submit while one is in flight
//!   sends a second request, and whichever finishes first clears the typing
//!   indicator.
//! - Requests have no timeout. A request that never completes leaves the
//!   typing indicator raised.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use agentic_chat_core::{PanelState, Utterance};
use tokio::task::JoinHandle;
use tracing::instrument;

use crate::client::MessageClient;
use crate::config::{ConfigError, HostConfig, Theme, WidgetConfig};
use crate::log::{ChatMessage, MessageLog};
use crate::render::{self, MessageBody};
use crate::session::{FileMirror, NoMirror, SessionContext, TokenMirror};

/// Bot reply appended when a request fails for any reason.
pub const APOLOGY: &str = "Sorry, I encountered an error. Please try again.";

/// Result of [`ChatWidget::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Input was blank; nothing happened.
    Ignored,
    /// The reply was rendered into the log.
    Answered,
    /// The request failed and the apology was appended.
    Failed,
}

/// The chat widget.
///
/// Cheaply cloneable via `Arc`; clones drive the same log, token and panel.
#[derive(Clone)]
pub struct ChatWidget {
    inner: Arc<ChatWidgetInner>,
}

struct ChatWidgetInner {
    config: WidgetConfig,
    session: SessionContext,
    client: MessageClient,
    log: MessageLog,
    panel: Mutex<PanelState>,
    typing: AtomicBool,
    input_focused: AtomicBool,
}

impl ChatWidget {
    /// Validate the host settings, build the widget and fetch the first token.
    ///
    /// # Errors
    ///
    /// Returns the validation error when the widget is disabled or
    /// misconfigured. Nothing is sent over the network in that case.
    pub async fn activate(host: &HostConfig) -> Result<Self, ConfigError> {
        let config = match host.validate() {
            Ok(config) => config,
            Err(ConfigError::Disabled) => {
                tracing::debug!("Chat widget disabled, not initializing");
                return Err(ConfigError::Disabled);
            }
            Err(e) => {
                tracing::error!(error = %e, "Chat widget configuration invalid, not initializing");
                return Err(e);
            }
        };

        let widget = Self::new(config);
        widget.inner.session.initialize().await;
        Ok(widget)
    }

    /// Build a widget, mirroring tokens to the configured file if any.
    #[must_use]
    pub fn new(config: WidgetConfig) -> Self {
        let mirror: Arc<dyn TokenMirror> = match &config.token_mirror {
            Some(path) => Arc::new(FileMirror::new(path)),
            None => Arc::new(NoMirror),
        };
        Self::with_mirror(config, mirror)
    }

    /// Build a widget with an explicit token mirror. No request is made yet.
    #[must_use]
    pub fn with_mirror(config: WidgetConfig, mirror: Arc<dyn TokenMirror>) -> Self {
        let http = reqwest::Client::new();
        let session = SessionContext::new(http.clone(), config.context_endpoint.clone(), mirror);
        let client = MessageClient::new(&config, http, session.clone());

        Self {
            inner: Arc::new(ChatWidgetInner {
                config,
                session,
                client,
                log: MessageLog::default(),
                panel: Mutex::new(PanelState::Closed),
                typing: AtomicBool::new(false),
                input_focused: AtomicBool::new(false),
            }),
        }
    }

    /// Open the panel.
    ///
    /// On a `Closed → Open` transition the input is focused and a token
    /// refresh is spawned; its handle is returned so callers may await it.
    /// Opening an open panel does nothing.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn open(&self) -> Option<JoinHandle<()>> {
        {
            let mut panel = self.lock_panel();
            if *panel == PanelState::Open {
                return None;
            }
            *panel = PanelState::Open;
        }
        self.inner.input_focused.store(true, Ordering::SeqCst);

        let session = self.inner.session.clone();
        Some(tokio::spawn(async move { session.refresh().await }))
    }

    /// Close the panel. Returns whether it was open.
    pub fn close(&self) -> bool {
        let mut panel = self.lock_panel();
        let was_open = *panel == PanelState::Open;
        *panel = PanelState::Closed;
        self.inner.input_focused.store(false, Ordering::SeqCst);
        was_open
    }

    /// Flip the panel, as the toggle and close buttons do.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn toggle(&self) -> Option<JoinHandle<()>> {
        if self.panel() == PanelState::Open {
            self.close();
            None
        } else {
            self.open()
        }
    }

    /// Send the shopper's input and render the outcome into the log.
    #[instrument(skip(self, input))]
    pub async fn submit(&self, input: &str) -> SubmitOutcome {
        let Some(utterance) = Utterance::parse(input) else {
            return SubmitOutcome::Ignored;
        };

        self.inner
            .log
            .push(ChatMessage::user(MessageBody::Text(utterance.to_string())));
        self.inner.typing.store(true, Ordering::SeqCst);

        let result = self.inner.client.send(&utterance).await;
        self.inner.typing.store(false, Ordering::SeqCst);

        match result {
            Ok(payload) => {
                render::apply(&payload, &self.inner.session, &self.inner.log);
                SubmitOutcome::Answered
            }
            Err(e) => {
                tracing::error!(error = %e, "Chat error");
                self.inner
                    .log
                    .push(ChatMessage::bot(MessageBody::Text(APOLOGY.to_string())));
                SubmitOutcome::Failed
            }
        }
    }

    #[must_use]
    pub fn panel(&self) -> PanelState {
        *self.lock_panel()
    }

    /// Whether the typing indicator is shown.
    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.inner.typing.load(Ordering::SeqCst)
    }

    /// Whether the input should hold focus.
    #[must_use]
    pub fn is_input_focused(&self) -> bool {
        self.inner.input_focused.load(Ordering::SeqCst)
    }

    /// Copy of the chat thread.
    #[must_use]
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.inner.log.snapshot()
    }

    #[must_use]
    pub fn log(&self) -> &MessageLog {
        &self.inner.log
    }

    #[must_use]
    pub fn session(&self) -> &SessionContext {
        &self.inner.session
    }

    #[must_use]
    pub fn theme(&self) -> &Theme {
        &self.inner.config.theme
    }

    #[must_use]
    pub fn config(&self) -> &WidgetConfig {
        &self.inner.config
    }

    fn lock_panel(&self) -> std::sync::MutexGuard<'_, PanelState> {
        self.inner.panel.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_config() -> WidgetConfig {
        HostConfig {
            enabled: true,
            api_endpoint: Some("http://127.0.0.1:9/chat".to_string()),
            access_key: Some("SWSCTESTKEY".to_string()),
            shop_url: Some("http://127.0.0.1:9".to_string()),
            ..HostConfig::default()
        }
        .validate()
        .expect("config")
    }

    #[tokio::test]
    async fn test_blank_submit_is_ignored() {
        let widget = ChatWidget::new(unreachable_config());
        assert_eq!(widget.submit("   ").await, SubmitOutcome::Ignored);
        assert!(widget.messages().is_empty());
        assert!(!widget.is_typing());
    }

    #[tokio::test]
    async fn test_transport_failure_appends_apology() {
        let widget = ChatWidget::new(unreachable_config());
        let outcome = widget.submit("show me mugs").await;

        assert_eq!(outcome, SubmitOutcome::Failed);
        let messages = widget.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].body.as_text(), Some("show me mugs"));
        assert_eq!(messages[1].body.as_text(), Some(APOLOGY));
        assert!(!widget.is_typing());
        assert!(widget.session().current().is_none());
    }

    #[tokio::test]
    async fn test_panel_transitions() {
        let widget = ChatWidget::new(unreachable_config());
        assert_eq!(widget.panel(), PanelState::Closed);

        let refresh = widget.open().expect("refresh spawned on open");
        assert_eq!(widget.panel(), PanelState::Open);
        assert!(widget.is_input_focused());
        assert!(widget.open().is_none());
        refresh.await.expect("refresh task");

        assert!(widget.toggle().is_none());
        assert_eq!(widget.panel(), PanelState::Closed);
        assert!(!widget.close());
    }

    #[tokio::test]
    async fn test_activate_rejects_disabled() {
        let host = HostConfig::default();
        assert!(matches!(
            ChatWidget::activate(&host).await,
            Err(ConfigError::Disabled)
        ));
    }
}
