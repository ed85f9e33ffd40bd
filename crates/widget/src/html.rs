//! HTML fragments for embedding the widget in a page.
//!
//! Templates live under `templates/chat/`. Askama escapes every interpolated
//! value, so names, messages and URLs from the backend cannot inject markup.

use agentic_chat_core::Sender;
use askama::Template;

use crate::ChatWidget;
use crate::config::Theme;
use crate::log::ChatMessage;
use crate::render::{CartView, MessageBody, OrderListView, ProductDetailView, ProductListView};

// =============================================================================
// Templates
// =============================================================================

#[derive(Template)]
#[template(path = "chat/message.html")]
struct MessageTemplate<'a> {
    sender: Sender,
    content: &'a str,
}

#[derive(Template)]
#[template(path = "chat/text.html")]
struct TextTemplate<'a> {
    lines: Vec<&'a str>,
}

#[derive(Template)]
#[template(path = "chat/product_list.html")]
struct ProductListTemplate<'a> {
    view: &'a ProductListView,
}

#[derive(Template)]
#[template(path = "chat/product_detail.html")]
struct ProductDetailTemplate<'a> {
    view: &'a ProductDetailView,
}

#[derive(Template)]
#[template(path = "chat/order_list.html")]
struct OrderListTemplate<'a> {
    view: &'a OrderListView,
}

#[derive(Template)]
#[template(path = "chat/cart.html")]
struct CartTemplate<'a> {
    view: &'a CartView,
}

#[derive(Template)]
#[template(path = "chat/launcher.html")]
struct LauncherTemplate {
    position: String,
    style: String,
    open: bool,
    typing: bool,
    messages: Vec<String>,
}

// =============================================================================
// Rendering
// =============================================================================

/// Render one log entry wrapped in its sender's message container.
///
/// # Errors
///
/// Returns an error if a template fails to render.
pub fn render_message(message: &ChatMessage) -> Result<String, askama::Error> {
    let content = render_body(&message.body)?;
    MessageTemplate {
        sender: message.sender,
        content: &content,
    }
    .render()
}

/// Render a message body without the surrounding container.
///
/// # Errors
///
/// Returns an error if a template fails to render.
pub fn render_body(body: &MessageBody) -> Result<String, askama::Error> {
    match body {
        MessageBody::Text(text) => TextTemplate {
            lines: text.split('\n').collect(),
        }
        .render(),
        MessageBody::ProductList(view) => ProductListTemplate { view }.render(),
        MessageBody::ProductDetail(view) => ProductDetailTemplate { view }.render(),
        MessageBody::OrderList(view) => OrderListTemplate { view }.render(),
        MessageBody::Cart(view) => CartTemplate { view }.render(),
    }
}

/// Render the whole widget: toggle button, panel and current thread.
///
/// # Errors
///
/// Returns an error if a template fails to render.
pub fn render_widget(widget: &ChatWidget) -> Result<String, askama::Error> {
    let messages = widget
        .messages()
        .iter()
        .map(render_message)
        .collect::<Result<Vec<_>, _>>()?;

    LauncherTemplate {
        position: widget.theme().position.to_string(),
        style: style_attribute(widget.theme()),
        open: widget.panel() == agentic_chat_core::PanelState::Open,
        typing: widget.is_typing(),
        messages,
    }
    .render()
}

fn style_attribute(theme: &Theme) -> String {
    let placement = theme.placement();
    let mut declarations: Vec<String> = theme
        .css_variables()
        .into_iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect();
    declarations.push(format!("left: {}", placement.left));
    declarations.push(format!("right: {}", placement.right));
    declarations.join("; ")
}
