//! Integration tests for the Agentic Chat widget.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p agentic-chat-integration-tests
//! ```
//!
//! Each test starts a [`StubBackend`]: an `axum` server on `127.0.0.1:0`
//! that serves the context-token route and the chat route with scripted
//! replies, and records every request it sees in arrival order.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use agentic_chat_widget::HostConfig;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

/// Path of the chat route on the stub.
pub const CHAT_PATH: &str = "/chat";

/// Access key used by [`StubBackend::host_config`].
pub const ACCESS_KEY: &str = "SWSCTESTACCESSKEY";

// =============================================================================
// Scripted Replies
// =============================================================================

/// What the context-token route answers.
#[derive(Debug, Clone)]
pub enum TokenReply {
    /// `200 {"token": ...}`
    Token(String),
    /// Bare status with an empty body.
    Status(u16),
    /// `200` with an arbitrary body.
    Raw(String),
}

/// What the chat route answers.
#[derive(Debug, Clone)]
pub enum ChatReply {
    /// `200` with a JSON body.
    Json(Value),
    /// Error status with a text body.
    Status(u16, String),
    /// `200` with an arbitrary body.
    Raw(String),
}

impl ChatReply {
    /// `{type: "text", message}`.
    #[must_use]
    pub fn text(message: &str) -> Self {
        Self::Json(json!({"type": "text", "message": message}))
    }
}

/// A request observed by the stub.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// GET on the context-token route, with its `Cache-Control` header.
    TokenFetch { cache_control: Option<String> },
    /// POST on the chat route, with its JSON body.
    Chat(Value),
}

impl Event {
    #[must_use]
    pub const fn is_token_fetch(&self) -> bool {
        matches!(self, Self::TokenFetch { .. })
    }

    /// The chat request body, if this was a chat call.
    #[must_use]
    pub const fn chat_body(&self) -> Option<&Value> {
        match self {
            Self::Chat(body) => Some(body),
            Self::TokenFetch { .. } => None,
        }
    }
}

// =============================================================================
// Stub Backend
// =============================================================================

#[derive(Clone)]
struct StubState {
    events: Arc<Mutex<Vec<Event>>>,
    token: Arc<Mutex<TokenReply>>,
    chat: Arc<Mutex<ChatReply>>,
}

impl StubState {
    fn record(&self, event: Event) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

/// In-process stand-in for the storefront and the conversational backend.
pub struct StubBackend {
    addr: SocketAddr,
    state: StubState,
    server: JoinHandle<()>,
}

impl StubBackend {
    /// Start a stub that issues `initial_token` and answers chats with "Hello!".
    pub async fn start(initial_token: &str) -> Self {
        Self::start_with(
            TokenReply::Token(initial_token.to_string()),
            ChatReply::text("Hello!"),
        )
        .await
    }

    pub async fn start_with(token: TokenReply, chat: ChatReply) -> Self {
        let state = StubState {
            events: Arc::new(Mutex::new(Vec::new())),
            token: Arc::new(Mutex::new(token)),
            chat: Arc::new(Mutex::new(chat)),
        };

        let app = Router::new()
            .route("/agentic-ai/context", get(context_token))
            .route(CHAT_PATH, post(chat_message))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub backend");
        let addr = listener.local_addr().expect("stub address");

        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub backend");
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// `http://127.0.0.1:{port}`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Enabled host configuration pointing every endpoint at this stub.
    #[must_use]
    pub fn host_config(&self) -> HostConfig {
        HostConfig {
            enabled: true,
            api_endpoint: Some(format!("{}{CHAT_PATH}", self.base_url())),
            access_key: Some(ACCESS_KEY.to_string()),
            shop_url: Some(self.base_url()),
            ..HostConfig::default()
        }
    }

    pub fn set_token_reply(&self, reply: TokenReply) {
        *self
            .state
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = reply;
    }

    pub fn set_chat_reply(&self, reply: ChatReply) {
        *self
            .state
            .chat
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = reply;
    }

    /// Every request seen so far, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.state
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forget recorded requests.
    pub fn clear_events(&self) {
        self.state
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Bodies of every chat request seen so far.
    #[must_use]
    pub fn chat_bodies(&self) -> Vec<Value> {
        self.events()
            .iter()
            .filter_map(Event::chat_body)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn token_fetches(&self) -> usize {
        self.events().iter().filter(|e| e.is_token_fetch()).count()
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn context_token(State(state): State<StubState>, headers: HeaderMap) -> Response {
    let cache_control = headers
        .get(header::CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    state.record(Event::TokenFetch { cache_control });

    let reply = state
        .token
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    match reply {
        TokenReply::Token(token) => Json(json!({ "token": token })).into_response(),
        TokenReply::Status(code) => status(code).into_response(),
        TokenReply::Raw(body) => body.into_response(),
    }
}

async fn chat_message(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    state.record(Event::Chat(body));

    let reply = state
        .chat
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    match reply {
        ChatReply::Json(value) => Json(value).into_response(),
        ChatReply::Status(code, body) => (status(code), body).into_response(),
        ChatReply::Raw(body) => body.into_response(),
    }
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
