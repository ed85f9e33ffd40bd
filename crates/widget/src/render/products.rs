//! Product list and product detail strategies.

use crate::client::types::{Product, ProductOption, ResultSet};

use super::views::{OptionView, ProductCardView, ProductDetailView, ProductListView, StockLevel};
use super::{FALLBACK_URL, image_or_placeholder, money, non_empty, parse_data, parse_items};

/// Render `{results, pagination?}` as a list of product cards.
#[must_use]
pub fn product_list(data: &serde_json::Value) -> Option<ProductListView> {
    let set: ResultSet = parse_data(data, "product_list")?;
    let results = set.results.unwrap_or_default();
    if results.is_empty() {
        return None;
    }

    let products: Vec<ProductCardView> = parse_items::<Product>(&results, "product")
        .iter()
        .map(product_card)
        .collect();
    if products.is_empty() {
        return None;
    }

    let pagination = set
        .pagination
        .filter(|p| p.has_next_page)
        .and_then(|p| p.total)
        .map(|total| format!("Showing {} of {total} products", products.len()));

    Some(ProductListView {
        products,
        pagination,
    })
}

/// Render a single product object.
#[must_use]
pub fn product_detail(data: &serde_json::Value) -> Option<ProductDetailView> {
    if !data.is_object() {
        return None;
    }
    let product: Product = parse_data(data, "product_detail")?;

    Some(ProductDetailView {
        name: product.name.clone().unwrap_or_default(),
        url: link(&product),
        image_url: image_or_placeholder(product.image_url.as_deref()),
        product_number: product_number(&product),
        price: money(product.price),
        stock: product.stock.map(|s| StockLevel::from_quantity(s).label()),
        options: product
            .options
            .iter()
            .flatten()
            .map(|opt| OptionView {
                group: opt.group.clone().unwrap_or_default(),
                option: opt.option.clone().unwrap_or_default(),
            })
            .collect(),
    })
}

/// Card used inside product lists.
#[must_use]
pub fn product_card(product: &Product) -> ProductCardView {
    ProductCardView {
        name: product.name.clone().unwrap_or_default(),
        url: link(product),
        image_url: image_or_placeholder(product.image_url.as_deref()),
        product_number: product_number(product),
        options: product
            .options
            .iter()
            .flatten()
            .filter_map(option_value)
            .collect(),
        price: money(product.price),
        stock: product.stock.map(StockLevel::from_quantity),
    }
}

fn link(product: &Product) -> String {
    non_empty(product.url.as_deref())
        .unwrap_or(FALLBACK_URL)
        .to_string()
}

fn product_number(product: &Product) -> Option<String> {
    non_empty(product.product_number.as_deref()).map(ToString::to_string)
}

fn option_value(option: &ProductOption) -> Option<String> {
    non_empty(option.option.as_deref()).map(ToString::to_string)
}
