//! Integration tests for context-token handling across the widget lifecycle.
//!
//! Covers activation, refresh on open, refresh before every send, token
//! rotation from chat replies, and the diagnostic mirror.

use std::sync::Arc;

use agentic_chat_core::{ContextToken, PanelState};
use agentic_chat_integration_tests::{ChatReply, Event, StubBackend, TokenReply};
use agentic_chat_widget::session::MemoryMirror;
use agentic_chat_widget::{ChatWidget, ConfigError, HostConfig, SubmitOutcome};
use serde_json::json;

// =============================================================================
// Activation
// =============================================================================

#[tokio::test]
async fn test_activation_fetches_initial_token() {
    let stub = StubBackend::start("T1").await;
    let widget = ChatWidget::activate(&stub.host_config())
        .await
        .expect("activate");

    assert_eq!(widget.session().current(), Some(ContextToken::from("T1")));
    assert_eq!(
        stub.events(),
        vec![Event::TokenFetch {
            cache_control: Some("no-cache, no-store".to_string())
        }]
    );
}

#[tokio::test]
async fn test_missing_config_makes_no_network_calls() {
    let stub = StubBackend::start("T1").await;

    for host in [
        HostConfig {
            access_key: None,
            ..stub.host_config()
        },
        HostConfig {
            api_endpoint: Some("  ".to_string()),
            ..stub.host_config()
        },
        HostConfig {
            shop_url: None,
            ..stub.host_config()
        },
    ] {
        let result = ChatWidget::activate(&host).await;
        assert!(matches!(result, Err(ConfigError::MissingField(_))));
    }

    assert!(stub.events().is_empty());
}

#[tokio::test]
async fn test_disabled_widget_is_inert() {
    let stub = StubBackend::start("T1").await;
    let host = HostConfig {
        enabled: false,
        ..stub.host_config()
    };

    assert!(matches!(
        ChatWidget::activate(&host).await,
        Err(ConfigError::Disabled)
    ));
    assert!(stub.events().is_empty());
}

#[tokio::test]
async fn test_failed_initial_fetch_still_activates() {
    let stub = StubBackend::start_with(TokenReply::Status(503), ChatReply::text("Hi")).await;
    let widget = ChatWidget::activate(&stub.host_config())
        .await
        .expect("activate");

    assert!(widget.session().current().is_none());
    assert_eq!(stub.token_fetches(), 1);
}

// =============================================================================
// Refresh
// =============================================================================

#[tokio::test]
async fn test_refresh_is_idempotent() {
    let stub = StubBackend::start("T1").await;
    let widget = ChatWidget::activate(&stub.host_config())
        .await
        .expect("activate");

    widget.session().refresh().await;
    let once = widget.session().current();
    widget.session().refresh().await;

    assert_eq!(widget.session().current(), once);
    assert_eq!(once, Some(ContextToken::from("T1")));
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_token() {
    let stub = StubBackend::start("T1").await;
    let widget = ChatWidget::activate(&stub.host_config())
        .await
        .expect("activate");

    for reply in [
        TokenReply::Status(500),
        TokenReply::Raw("<html>oops</html>".to_string()),
        TokenReply::Raw("{}".to_string()),
        TokenReply::Token(String::new()),
    ] {
        stub.set_token_reply(reply);
        widget.session().refresh().await;
        assert_eq!(widget.session().current(), Some(ContextToken::from("T1")));
    }
}

#[tokio::test]
async fn test_later_refresh_wins() {
    let stub = StubBackend::start("T1").await;
    let widget = ChatWidget::activate(&stub.host_config())
        .await
        .expect("activate");

    stub.set_token_reply(TokenReply::Token("T9".to_string()));
    widget.session().refresh().await;

    assert_eq!(widget.session().current(), Some(ContextToken::from("T9")));
}

#[tokio::test]
async fn test_open_triggers_refresh() {
    let stub = StubBackend::start("T1").await;
    let widget = ChatWidget::activate(&stub.host_config())
        .await
        .expect("activate");
    stub.set_token_reply(TokenReply::Token("T2".to_string()));

    let refresh = widget.open().expect("closed to open spawns a refresh");
    refresh.await.expect("refresh task");

    assert_eq!(widget.panel(), PanelState::Open);
    assert_eq!(stub.token_fetches(), 2);
    assert_eq!(widget.session().current(), Some(ContextToken::from("T2")));

    // Closing performs no network action
    widget.close();
    assert_eq!(stub.token_fetches(), 2);
}

// =============================================================================
// Rotation
// =============================================================================

#[tokio::test]
async fn test_rotated_token_is_used_by_next_send() {
    let stub = StubBackend::start_with(
        TokenReply::Token("T1".to_string()),
        ChatReply::Json(json!({
            "type": "text",
            "message": "Rotated",
            "context": {"swContextToken": "T2"}
        })),
    )
    .await;
    let widget = ChatWidget::activate(&stub.host_config())
        .await
        .expect("activate");

    assert_eq!(widget.submit("first").await, SubmitOutcome::Answered);
    assert_eq!(widget.session().current(), Some(ContextToken::from("T2")));

    // The token route stops answering, so the refresh before the next send
    // leaves T2 in place.
    stub.set_token_reply(TokenReply::Status(500));
    stub.set_chat_reply(ChatReply::text("Ok"));
    assert_eq!(widget.submit("second").await, SubmitOutcome::Answered);

    let bodies = stub.chat_bodies();
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[0]["swContextToken"], "T1");
    assert_eq!(bodies[1]["swContextToken"], "T2");
}

#[tokio::test]
async fn test_refresh_before_send_overrides_rotated_token() {
    let stub = StubBackend::start_with(
        TokenReply::Token("T1".to_string()),
        ChatReply::Json(json!({"type": "text", "context": {"swContextToken": "T2"}})),
    )
    .await;
    let widget = ChatWidget::activate(&stub.host_config())
        .await
        .expect("activate");

    widget.submit("first").await;
    widget.submit("second").await;

    let bodies = stub.chat_bodies();
    assert_eq!(bodies[1]["swContextToken"], "T1");
}

// =============================================================================
// Mirror
// =============================================================================

#[tokio::test]
async fn test_mirror_records_every_adopted_token() {
    let stub = StubBackend::start_with(
        TokenReply::Token("T1".to_string()),
        ChatReply::Json(json!({"type": "text", "context": {"swContextToken": "T2"}})),
    )
    .await;
    let config = stub.host_config().validate().expect("config");
    let mirror = Arc::new(MemoryMirror::default());
    let widget = ChatWidget::with_mirror(config, mirror.clone());

    widget.session().initialize().await;
    stub.set_token_reply(TokenReply::Status(500));
    widget.submit("hello").await;

    assert_eq!(
        mirror.records(),
        vec![ContextToken::from("T1"), ContextToken::from("T2")]
    );
}

#[tokio::test]
async fn test_file_mirror_writes_latest_token() {
    let stub = StubBackend::start("T1").await;
    let path = std::env::temp_dir().join(format!(
        "agentic-chat-mirror-{}-{}.json",
        std::process::id(),
        stub.base_url().rsplit(':').next().unwrap_or("0")
    ));
    let host = HostConfig {
        token_mirror: Some(path.clone()),
        ..stub.host_config()
    };

    let widget = ChatWidget::activate(&host).await.expect("activate");
    assert!(widget.session().current().is_some());

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("mirror file")).expect("json");
    assert_eq!(written, json!({"agenticAiContext": "T1"}));

    let _ = std::fs::remove_file(&path);
}
