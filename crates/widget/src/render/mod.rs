//! Response renderer.
//!
//! [`apply`] folds one backend reply into the message log:
//!
//! 1. a rotated context token is handed to the [`SessionContext`],
//! 2. the reply's `message`, if any, becomes a bot text entry,
//! 3. the type selects exactly one strategy, which appends zero or one
//!    structured entries.
//!
//! Strategies are pure functions from raw `data` to a [`MessageBody`]. They
//! return `None` instead of producing an empty container, and substitute
//! defaults for every missing optional field.

pub mod cart;
pub mod orders;
pub mod products;
pub mod views;

use agentic_chat_core::{ContextToken, Price};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

use crate::client::{ResponseKind, ResponsePayload};
use crate::log::{ChatMessage, MessageLog};
use crate::session::SessionContext;

pub use views::{
    CartLineView, CartView, OptionView, OrderCardView, OrderListView, ProductCardView,
    ProductDetailView, ProductListView, StockLevel,
};

/// Grey 100x100 square shown when a product has no image.
pub const PLACEHOLDER_IMAGE: &str = "data:image/svg+xml,%3Csvg xmlns=\"http://www.w3.org/2000/svg\" width=\"100\" height=\"100\"%3E%3Crect fill=\"%23ddd\" width=\"100\" height=\"100\"/%3E%3C/svg%3E";

/// Link target for products without a URL.
pub const FALLBACK_URL: &str = "#";

/// Label for orders without a status.
pub const UNKNOWN_STATUS: &str = "Unknown";

/// Displayable content of one chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Text(String),
    ProductList(ProductListView),
    ProductDetail(ProductDetailView),
    OrderList(OrderListView),
    Cart(CartView),
}

impl MessageBody {
    /// The text, for plain text messages.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Whether this is a commerce block rather than text.
    #[must_use]
    pub const fn is_structured(&self) -> bool {
        !matches!(self, Self::Text(_))
    }
}

/// Fold a reply into the log.
pub fn apply(payload: &ResponsePayload, session: &SessionContext, log: &MessageLog) {
    if let Some(token) = payload.context_token() {
        session.replace(ContextToken::from(token));
    }

    if let Some(message) = &payload.message {
        log.push(ChatMessage::bot(MessageBody::Text(message.clone())));
    }

    if let Some(block) = render_block(payload.kind(), payload.data.as_ref()) {
        log.push(ChatMessage::bot(block));
    }
}

/// Select the strategy for `kind` and run it on `data`.
#[must_use]
pub fn render_block(kind: ResponseKind, data: Option<&serde_json::Value>) -> Option<MessageBody> {
    let data = data?;
    match kind {
        ResponseKind::Text => None,
        ResponseKind::ProductList => products::product_list(data).map(MessageBody::ProductList),
        ResponseKind::ProductDetail => {
            products::product_detail(data).map(MessageBody::ProductDetail)
        }
        ResponseKind::OrderList => orders::order_list(data).map(MessageBody::OrderList),
        ResponseKind::CartList => cart::cart_list(data).map(MessageBody::Cart),
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Format an amount the way every strategy shows money.
pub(crate) fn money(amount: Option<Decimal>) -> String {
    amount.map_or_else(Price::zero, Price::from_amount).display()
}

/// Treat blank strings as absent.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

pub(crate) fn image_or_placeholder(image_url: Option<&str>) -> String {
    non_empty(image_url).unwrap_or(PLACEHOLDER_IMAGE).to_string()
}

/// Parse each element of a result list, skipping (and logging) the ones that
/// do not fit `T`.
pub(crate) fn parse_items<T: DeserializeOwned>(
    items: &[serde_json::Value],
    what: &'static str,
) -> Vec<T> {
    items
        .iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!(error = %e, kind = what, "Skipping malformed result");
                None
            }
        })
        .collect()
}

/// Parse a strategy's `data` container, logging a mismatch.
pub(crate) fn parse_data<T: DeserializeOwned>(
    data: &serde_json::Value,
    what: &'static str,
) -> Option<T> {
    serde_json::from_value(data.clone())
        .map_err(|e| {
            tracing::warn!(error = %e, kind = what, "Response data has unexpected shape");
        })
        .ok()
}
