//! Diagnostic sinks for the current context token.
//!
//! A mirror only ever receives writes. The session manager never reads a
//! token back from one; the in-memory value is the single source of truth.

use std::path::PathBuf;
use std::sync::Mutex;

use agentic_chat_core::ContextToken;

/// Key the token is stored under, matching the storefront's session storage.
pub const MIRROR_KEY: &str = "agenticAiContext";

/// Write-only sink that receives every token the session manager adopts.
pub trait TokenMirror: Send + Sync {
    /// Record the token that just became current.
    fn record(&self, token: &ContextToken);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMirror;

impl TokenMirror for NoMirror {
    fn record(&self, _token: &ContextToken) {}
}

/// Writes `{"agenticAiContext": "<token>"}` to a file.
///
/// Failures are logged and otherwise ignored.
#[derive(Debug, Clone)]
pub struct FileMirror {
    path: PathBuf,
}

impl FileMirror {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenMirror for FileMirror {
    fn record(&self, token: &ContextToken) {
        let mut body = serde_json::Map::new();
        body.insert(
            MIRROR_KEY.to_string(),
            serde_json::Value::String(token.expose().to_string()),
        );
        let body = serde_json::Value::Object(body).to_string();
        if let Err(e) = std::fs::write(&self.path, body) {
            tracing::debug!(
                error = %e,
                path = %self.path.display(),
                "Failed to mirror context token"
            );
        }
    }
}

/// Keeps every recorded token in memory, for observers and tests.
#[derive(Debug, Default)]
pub struct MemoryMirror {
    records: Mutex<Vec<ContextToken>>,
}

impl MemoryMirror {
    /// Tokens recorded so far, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<ContextToken> {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl TokenMirror for MemoryMirror {
    fn record(&self, token: &ContextToken) {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(token.clone());
    }
}
