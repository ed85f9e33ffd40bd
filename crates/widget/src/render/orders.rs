//! Order history strategy.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::client::types::{Order, ResultSet};

use super::views::{OrderCardView, OrderListView};
use super::{UNKNOWN_STATUS, money, non_empty, parse_data, parse_items};

/// Render `{results: [Order]}` as order cards.
#[must_use]
pub fn order_list(data: &serde_json::Value) -> Option<OrderListView> {
    let set: ResultSet = parse_data(data, "order_list")?;
    let results = set.results.unwrap_or_default();
    if results.is_empty() {
        return None;
    }

    let orders: Vec<OrderCardView> = parse_items::<Order>(&results, "order")
        .iter()
        .map(order_card)
        .collect();
    if orders.is_empty() {
        return None;
    }

    Some(OrderListView { orders })
}

#[must_use]
pub fn order_card(order: &Order) -> OrderCardView {
    let title = order
        .order_number
        .as_ref()
        .or(order.id.as_ref())
        .map_or_else(|| "Order".to_string(), |number| format!("Order #{number}"));

    let status = non_empty(order.status.as_deref());

    OrderCardView {
        title,
        status: status.unwrap_or(UNKNOWN_STATUS).to_string(),
        status_slug: status.map(status_slug).unwrap_or_default(),
        date: non_empty(order.date.as_deref()).map(format_date),
        total: order
            .total
            .filter(|total| !total.is_zero())
            .map(|total| format!("Total: {}", money(Some(total)))),
        items: order
            .items
            .filter(|count| *count > 0)
            .map(|count| format!("{count} item(s)")),
    }
}

/// Lowercase, hyphen-separated form of a status for use in class names.
fn status_slug(status: &str) -> String {
    status
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

/// Show the calendar date of an ISO-8601 timestamp; anything else verbatim.
fn format_date(raw: &str) -> String {
    const DISPLAY: &str = "%Y-%m-%d";

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.date_naive().format(DISPLAY).to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return dt.date().format(DISPLAY).to_string();
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, DISPLAY) {
        return date.format(DISPLAY).to_string();
    }
    raw.to_string()
}
