//! Integration tests for sending messages and handling backend failures.

use agentic_chat_core::{ContextToken, Sender};
use agentic_chat_integration_tests::{ACCESS_KEY, ChatReply, StubBackend, TokenReply};
use agentic_chat_widget::widget::APOLOGY;
use agentic_chat_widget::{ChatWidget, HostConfig, SubmitOutcome};
use serde_json::json;

async fn activated(stub: &StubBackend) -> ChatWidget {
    ChatWidget::activate(&stub.host_config())
        .await
        .expect("activate")
}

// =============================================================================
// Request Shape and Ordering
// =============================================================================

#[tokio::test]
async fn test_refresh_precedes_every_send() {
    let stub = StubBackend::start("T1").await;
    let widget = activated(&stub).await;
    stub.clear_events();

    widget.submit("first").await;
    widget.submit("second").await;

    let kinds: Vec<bool> = stub.events().iter().map(|e| e.is_token_fetch()).collect();
    assert_eq!(kinds, vec![true, false, true, false]);
}

#[tokio::test]
async fn test_request_body_fields() {
    let stub = StubBackend::start("T1").await;
    let widget = activated(&stub).await;

    widget.submit("  show me mugs  ").await;

    let bodies = stub.chat_bodies();
    assert_eq!(bodies.len(), 1);
    assert_eq!(
        bodies[0],
        json!({
            "message": "show me mugs",
            "swAccessKey": ACCESS_KEY,
            "shopUrl": stub.base_url(),
            "swContextToken": "T1"
        })
    );
}

#[tokio::test]
async fn test_token_omitted_when_none_held() {
    let stub = StubBackend::start_with(TokenReply::Status(404), ChatReply::text("Hi")).await;
    let widget = activated(&stub).await;

    assert_eq!(widget.submit("hello").await, SubmitOutcome::Answered);

    let bodies = stub.chat_bodies();
    assert!(bodies[0].get("swContextToken").is_none());
}

#[tokio::test]
async fn test_blank_input_sends_nothing() {
    let stub = StubBackend::start("T1").await;
    let widget = activated(&stub).await;
    stub.clear_events();

    assert_eq!(widget.submit(" \t\n").await, SubmitOutcome::Ignored);
    assert!(stub.events().is_empty());
    assert!(widget.messages().is_empty());
}

#[tokio::test]
async fn test_text_reply_is_logged_after_user_entry() {
    let stub = StubBackend::start("T1").await;
    let widget = activated(&stub).await;

    assert_eq!(widget.submit("hi").await, SubmitOutcome::Answered);
    assert!(!widget.is_typing());

    let messages = widget.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, Sender::User);
    assert_eq!(messages[0].body.as_text(), Some("hi"));
    assert_eq!(messages[1].sender, Sender::Bot);
    assert_eq!(messages[1].body.as_text(), Some("Hello!"));
}

// =============================================================================
// Failures
// =============================================================================

fn assert_single_apology(widget: &ChatWidget) {
    let messages = widget.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].sender, Sender::Bot);
    assert_eq!(messages[1].body.as_text(), Some(APOLOGY));
    assert!(messages.iter().all(|m| !m.body.is_structured()));
    assert!(!widget.is_typing());
}

#[tokio::test]
async fn test_network_failure_appends_one_apology() {
    let stub = StubBackend::start("T1").await;
    let host = HostConfig {
        api_endpoint: Some("http://127.0.0.1:9/chat".to_string()),
        ..stub.host_config()
    };
    let widget = ChatWidget::activate(&host).await.expect("activate");

    assert_eq!(widget.submit("hello").await, SubmitOutcome::Failed);

    assert_single_apology(&widget);
    assert_eq!(widget.session().current(), Some(ContextToken::from("T1")));
}

#[tokio::test]
async fn test_http_error_appends_one_apology() {
    let stub = StubBackend::start_with(
        TokenReply::Token("T1".to_string()),
        ChatReply::Status(502, "upstream unavailable".to_string()),
    )
    .await;
    let widget = activated(&stub).await;

    assert_eq!(widget.submit("hello").await, SubmitOutcome::Failed);
    assert_single_apology(&widget);
}

#[tokio::test]
async fn test_malformed_reply_appends_one_apology() {
    let stub = StubBackend::start_with(
        TokenReply::Token("T1".to_string()),
        ChatReply::Raw("<html>not json</html>".to_string()),
    )
    .await;
    let widget = activated(&stub).await;

    assert_eq!(widget.submit("hello").await, SubmitOutcome::Failed);
    assert_single_apology(&widget);
}

#[tokio::test]
async fn test_widget_recovers_after_failure() {
    let stub = StubBackend::start_with(
        TokenReply::Token("T1".to_string()),
        ChatReply::Status(500, String::new()),
    )
    .await;
    let widget = activated(&stub).await;

    assert_eq!(widget.submit("first").await, SubmitOutcome::Failed);
    stub.set_chat_reply(ChatReply::text("Back again"));
    assert_eq!(widget.submit("second").await, SubmitOutcome::Answered);

    let messages = widget.messages();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[3].body.as_text(), Some("Back again"));
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn test_concurrent_submissions_each_send() {
    let stub = StubBackend::start("T1").await;
    let widget = activated(&stub).await;

    let (a, b) = tokio::join!(widget.submit("one"), widget.submit("two"));

    assert_eq!(a, SubmitOutcome::Answered);
    assert_eq!(b, SubmitOutcome::Answered);
    assert_eq!(stub.chat_bodies().len(), 2);
    assert_eq!(widget.messages().len(), 4);
    assert!(!widget.is_typing());
}
