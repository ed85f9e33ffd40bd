//! Wire types for the conversational backend.
//!
//! The top-level reply is decoded strictly: a body that is not a JSON object
//! with the expected field types is a decode error. The type-dependent `data`
//! is kept as raw JSON and parsed by the rendering strategy that needs it, so
//! a malformed product never discards the accompanying text.
//!
//! Every commerce field is optional here. Defaults are applied by the
//! renderer, in one place.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// =============================================================================
// Request
// =============================================================================

/// Body of `POST <apiEndpoint>`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest<'a> {
    /// The shopper's trimmed message.
    pub message: &'a str,
    /// Store API access key.
    #[serde(rename = "swAccessKey")]
    pub access_key: &'a str,
    /// Storefront URL as configured.
    pub shop_url: &'a str,
    /// Current context token; omitted when none is held.
    #[serde(rename = "swContextToken", skip_serializing_if = "Option::is_none")]
    pub context_token: Option<&'a str>,
}

// =============================================================================
// Response
// =============================================================================

/// A reply from the conversational backend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponsePayload {
    /// Human-readable text, shown as its own bot message.
    pub message: Option<String>,
    /// Raw type discriminator; see [`ResponsePayload::kind`].
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Type-dependent structured data.
    pub data: Option<serde_json::Value>,
    /// Session information the backend wants the widget to adopt.
    pub context: Option<ResponseContext>,
}

impl ResponsePayload {
    /// Rendering strategy selected by the type discriminator.
    #[must_use]
    pub fn kind(&self) -> ResponseKind {
        self.kind
            .as_deref()
            .map_or(ResponseKind::Text, ResponseKind::from_tag)
    }

    /// New context token carried by the reply, if any.
    #[must_use]
    pub fn context_token(&self) -> Option<&str> {
        self.context
            .as_ref()
            .and_then(|context| context.token.as_deref())
            .filter(|token| !token.is_empty())
    }
}

/// The `context` object of a reply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseContext {
    /// Rotated context token.
    #[serde(rename = "swContextToken", alias = "token")]
    pub token: Option<String>,
}

/// Closed set of response shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    Text,
    ProductList,
    ProductDetail,
    OrderList,
    CartList,
}

impl ResponseKind {
    /// Map a wire tag to a kind. Unknown tags render as text.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "product_list" => Self::ProductList,
            "product_detail" => Self::ProductDetail,
            "order_list" => Self::OrderList,
            "cart_list" => Self::CartList,
            "text" => Self::Text,
            other => {
                tracing::debug!(kind = other, "Unknown response type, rendering as text");
                Self::Text
            }
        }
    }
}

// =============================================================================
// Commerce Data
// =============================================================================

/// `{results, pagination?, total?}` container used by list responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultSet {
    /// Items, parsed individually by the strategy.
    pub results: Option<Vec<serde_json::Value>>,
    /// Paging information for product searches. A malformed object is
    /// dropped on its own and never fails the result set.
    #[serde(default, deserialize_with = "lenient_pagination")]
    pub pagination: Option<Pagination>,
    /// Cart grand total.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total: Option<Decimal>,
}

/// Paging information.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Total number of matches on the server.
    #[serde(default, deserialize_with = "lenient_int")]
    pub total: Option<i64>,
    /// Whether more matches exist beyond this page.
    #[serde(default)]
    pub has_next_page: bool,
}

/// A product as returned by search and detail lookups.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub stock: Option<i64>,
    pub product_number: Option<String>,
    pub options: Option<Vec<ProductOption>>,
}

/// A selected variant option (e.g., group "Color", option "Red").
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductOption {
    pub group: Option<String>,
    pub option: Option<String>,
}

/// A line in the shopper's cart.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub name: Option<String>,
    /// Line total (unit price times quantity).
    pub price: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub quantity: Option<i64>,
    pub image_url: Option<String>,
    pub product_number: Option<String>,
}

/// An order from the shopper's history.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_number: Option<Identifier>,
    pub id: Option<Identifier>,
    pub status: Option<String>,
    pub date: Option<String>,
    pub total: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub items: Option<i64>,
}

/// Order numbers arrive as either strings or integers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Text(String),
    Number(i64),
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

// =============================================================================
// Lenient Field Decoding
// =============================================================================

/// Accept an integer, an integral float (`5.0`) or a numeric string.
/// Anything else decodes as `None` instead of failing the enclosing item.
fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(integer_value))
}

/// Accept a decimal number or numeric string; anything else is `None`.
fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

fn lenient_pagination<'de, D>(deserializer: D) -> Result<Option<Pagination>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(serde_json::from_value(value)
        .map_err(|e| tracing::warn!(error = %e, "Ignoring malformed pagination"))
        .ok())
}

fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().and_then(integral)),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn integral(value: f64) -> Option<i64> {
    // Beyond 2^53 floats no longer represent every integer
    const LIMIT: f64 = 9_007_199_254_740_992.0;
    (value.is_finite() && value.fract() == 0.0 && value.abs() <= LIMIT).then(|| value as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_omits_missing_token() {
        let request = ChatRequest {
            message: "hi",
            access_key: "SWSCKEY",
            shop_url: "https://shop.example.com",
            context_token: None,
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "message": "hi",
                "swAccessKey": "SWSCKEY",
                "shopUrl": "https://shop.example.com"
            })
        );
    }

    #[test]
    fn test_request_includes_token() {
        let request = ChatRequest {
            message: "hi",
            access_key: "SWSCKEY",
            shop_url: "https://shop.example.com",
            context_token: Some("T1"),
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["swContextToken"], "T1");
    }

    #[test]
    fn test_kind_from_tag() {
        assert_eq!(ResponseKind::from_tag("product_list"), ResponseKind::ProductList);
        assert_eq!(ResponseKind::from_tag("product_detail"), ResponseKind::ProductDetail);
        assert_eq!(ResponseKind::from_tag("order_list"), ResponseKind::OrderList);
        assert_eq!(ResponseKind::from_tag("cart_list"), ResponseKind::CartList);
        assert_eq!(ResponseKind::from_tag("text"), ResponseKind::Text);
        assert_eq!(ResponseKind::from_tag("wishlist"), ResponseKind::Text);
    }

    #[test]
    fn test_payload_absent_type_is_text() {
        let payload: ResponsePayload =
            serde_json::from_str(r#"{"message":"Hello!"}"#).expect("deserialize");
        assert_eq!(payload.kind(), ResponseKind::Text);
        assert_eq!(payload.message.as_deref(), Some("Hello!"));
    }

    #[test]
    fn test_payload_context_token() {
        let payload: ResponsePayload = serde_json::from_str(
            r#"{"type":"text","context":{"swContextToken":"T2"}}"#,
        )
        .expect("deserialize");
        assert_eq!(payload.context_token(), Some("T2"));

        let aliased: ResponsePayload =
            serde_json::from_str(r#"{"context":{"token":"T3"}}"#).expect("deserialize");
        assert_eq!(aliased.context_token(), Some("T3"));

        let empty: ResponsePayload =
            serde_json::from_str(r#"{"context":{"swContextToken":""}}"#).expect("deserialize");
        assert_eq!(empty.context_token(), None);
    }

    #[test]
    fn test_payload_rejects_non_object() {
        assert!(serde_json::from_str::<ResponsePayload>("[1,2,3]").is_err());
        assert!(serde_json::from_str::<ResponsePayload>(r#"{"message": 42}"#).is_err());
    }

    #[test]
    fn test_order_identifier_forms() {
        let order: Order =
            serde_json::from_str(r#"{"orderNumber": 10042, "status": "open"}"#).expect("order");
        assert_eq!(order.order_number, Some(Identifier::Number(10042)));

        let order: Order = serde_json::from_str(r#"{"id": "abc-1"}"#).expect("order");
        assert_eq!(order.id.map(|id| id.to_string()).as_deref(), Some("abc-1"));
    }

    #[test]
    fn test_integer_fields_accept_floats_and_strings() {
        let product: Product =
            serde_json::from_str(r#"{"name":"Mug","stock":5.0}"#).expect("product");
        assert_eq!(product.stock, Some(5));

        let line: CartLine = serde_json::from_str(r#"{"quantity":" 2 "}"#).expect("line");
        assert_eq!(line.quantity, Some(2));

        let order: Order = serde_json::from_str(r#"{"items":"3.0"}"#).expect("order");
        assert_eq!(order.items, Some(3));
    }

    #[test]
    fn test_unusable_integer_fields_become_none() {
        for stock in ["2.5", r#""many""#, "true", "[1]", "{}"] {
            let product: Product =
                serde_json::from_str(&format!(r#"{{"name":"Mug","stock":{stock}}}"#))
                    .expect("product");
            assert_eq!(product.name.as_deref(), Some("Mug"));
            assert!(product.stock.is_none(), "stock {stock} should be dropped");
        }
    }

    #[test]
    fn test_result_set_isolates_bad_pagination_and_total() {
        let set: ResultSet = serde_json::from_str(
            r#"{"results":[{"name":"Mug"}],"pagination":{"total":"14","hasNextPage":true},"total":"n/a"}"#,
        )
        .expect("result set");
        let pagination = set.pagination.expect("pagination");
        assert_eq!(pagination.total, Some(14));
        assert!(pagination.has_next_page);
        assert!(set.total.is_none());

        let set: ResultSet = serde_json::from_str(
            r#"{"results":[{"name":"Mug"}],"pagination":{"hasNextPage":"maybe"}}"#,
        )
        .expect("result set");
        assert!(set.pagination.is_none());
        assert_eq!(set.results.map(|r| r.len()), Some(1));
    }

    #[test]
    fn test_product_tolerates_nulls() {
        let product: Product = serde_json::from_str(
            r#"{"name":"Mug","price":19.99,"imageUrl":null,"stock":null,"options":null}"#,
        )
        .expect("product");
        assert_eq!(product.name.as_deref(), Some("Mug"));
        assert!(product.image_url.is_none());
        assert!(product.stock.is_none());
        assert!(product.options.is_none());
    }
}
