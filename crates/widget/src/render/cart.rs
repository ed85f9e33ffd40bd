//! Cart contents strategy.

use crate::client::types::{CartLine, ResultSet};

use super::views::{CartLineView, CartView};
use super::{image_or_placeholder, money, non_empty, parse_data, parse_items};

/// Render `{results: [CartLine], total?}` as a cart block.
///
/// The header total comes from `data.total` and is never summed locally.
#[must_use]
pub fn cart_list(data: &serde_json::Value) -> Option<CartView> {
    let set: ResultSet = parse_data(data, "cart_list")?;
    let results = set.results.unwrap_or_default();
    if results.is_empty() {
        return None;
    }

    let lines: Vec<CartLineView> = parse_items::<CartLine>(&results, "cart_line")
        .iter()
        .map(cart_line)
        .collect();
    if lines.is_empty() {
        return None;
    }

    Some(CartView {
        total: money(set.total),
        lines,
    })
}

#[must_use]
pub fn cart_line(line: &CartLine) -> CartLineView {
    CartLineView {
        name: line.name.clone().unwrap_or_default(),
        image_url: image_or_placeholder(line.image_url.as_deref()),
        quantity: line.quantity.unwrap_or_default(),
        product_number: non_empty(line.product_number.as_deref()).map(ToString::to_string),
        total: money(line.price),
        unit_price: line.unit_price.map(|price| money(Some(price))),
    }
}
