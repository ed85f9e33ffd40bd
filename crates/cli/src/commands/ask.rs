//! Send one message and print the assistant's replies.
//!
//! # Usage
//!
//! ```bash
//! agentic-chat ask "do you have this mug in blue?"
//! agentic-chat ask --html "show my orders"
//! ```

use agentic_chat_core::Sender;
use agentic_chat_widget::html;
use agentic_chat_widget::render::{CartView, OrderListView, ProductDetailView, ProductListView};
use agentic_chat_widget::{ChatMessage, ChatWidget, ConfigError, HostConfig, MessageBody, SubmitOutcome};
use thiserror::Error;

/// Errors that can occur while asking a question.
#[derive(Debug, Error)]
pub enum AskError {
    /// The widget could not be activated.
    #[error("Widget not activated: {0}")]
    Config(#[from] ConfigError),

    /// The message was empty after trimming.
    #[error("Message is empty")]
    EmptyMessage,

    /// HTML output failed.
    #[error("Failed to render HTML: {0}")]
    Render(#[from] askama::Error),
}

/// Activate the widget, send `message`, and print every entry it produced.
///
/// A failed request is not an error here: the apology is printed like any
/// other reply.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the message is blank, or
/// HTML rendering fails.
#[allow(clippy::print_stdout)]
pub async fn run(host: &HostConfig, message: &str, as_html: bool) -> Result<(), AskError> {
    let widget = ChatWidget::activate(host).await?;

    let start = widget.log().len();
    let outcome = widget.submit(message).await;
    if outcome == SubmitOutcome::Ignored {
        return Err(AskError::EmptyMessage);
    }

    for entry in widget.log().since(start) {
        if as_html {
            println!("{}", html::render_message(&entry)?);
        } else {
            println!("{}", format_entry(&entry));
        }
    }

    tracing::debug!(?outcome, "Ask finished");
    Ok(())
}

// =============================================================================
// Plain Text Formatting
// =============================================================================

fn format_entry(entry: &ChatMessage) -> String {
    let prefix = match entry.sender {
        Sender::User => "you",
        Sender::Bot => "assistant",
    };
    let body = format_body(&entry.body);
    body.lines()
        .map(|line| format!("{prefix}> {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_body(body: &MessageBody) -> String {
    match body {
        MessageBody::Text(text) => text.clone(),
        MessageBody::ProductList(view) => format_product_list(view),
        MessageBody::ProductDetail(view) => format_product_detail(view),
        MessageBody::OrderList(view) => format_orders(view),
        MessageBody::Cart(view) => format_cart(view),
    }
}

fn format_product_list(view: &ProductListView) -> String {
    let mut lines: Vec<String> = view
        .products
        .iter()
        .map(|card| {
            let mut line = format!("  * {} {}", card.name, card.price);
            if card.is_sold_out() {
                line.push_str(" [Out of Stock]");
            } else if let Some(stock) = card.stock_label() {
                line.push_str(&format!(" ({stock})"));
            }
            if !card.options.is_empty() {
                line.push_str(&format!(" [{}]", card.options.join(", ")));
            }
            line
        })
        .collect();
    if let Some(footer) = &view.pagination {
        lines.push(format!("  {footer}"));
    }
    lines.join("\n")
}

fn format_product_detail(view: &ProductDetailView) -> String {
    let mut lines = vec![format!("  {} {}", view.name, view.price)];
    if let Some(number) = &view.product_number {
        lines.push(format!("  {number}"));
    }
    if let Some(stock) = &view.stock {
        lines.push(format!("  {stock}"));
    }
    lines.extend(
        view.options
            .iter()
            .map(|option| format!("  {}: {}", option.group, option.option)),
    );
    lines.push(format!("  {}", view.url));
    lines.join("\n")
}

fn format_orders(view: &OrderListView) -> String {
    view.orders
        .iter()
        .map(|order| {
            let details: Vec<&str> = [
                order.date.as_deref(),
                order.total.as_deref(),
                order.items.as_deref(),
            ]
            .into_iter()
            .flatten()
            .collect();
            if details.is_empty() {
                format!("  * {} [{}]", order.title, order.status)
            } else {
                format!("  * {} [{}] {}", order.title, order.status, details.join(", "))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_cart(view: &CartView) -> String {
    let mut lines = vec![format!("  {}", view.header())];
    lines.extend(view.lines.iter().map(|line| {
        let mut text = format!("  * {} {} Total: {}", line.quantity_badge(), line.name, line.total);
        if let Some(unit) = line.unit_price_label() {
            text.push(' ');
            text.push_str(&unit);
        }
        text
    }));
    lines.join("\n")
}
