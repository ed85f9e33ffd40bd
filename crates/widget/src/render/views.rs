//! View models produced by the rendering strategies.
//!
//! Every field is already formatted for display; adapters only lay them out.

/// Stock information shown on product cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockLevel {
    InStock(i64),
    OutOfStock,
}

impl StockLevel {
    #[must_use]
    pub const fn from_quantity(quantity: i64) -> Self {
        if quantity > 0 {
            Self::InStock(quantity)
        } else {
            Self::OutOfStock
        }
    }

    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::InStock(_))
    }

    /// "5 in stock" or "Out of stock".
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::InStock(quantity) => format!("{quantity} in stock"),
            Self::OutOfStock => "Out of stock".to_string(),
        }
    }
}

/// A product card in a search result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCardView {
    pub name: String,
    pub url: String,
    pub image_url: String,
    pub product_number: Option<String>,
    /// Option values shown as badges.
    pub options: Vec<String>,
    pub price: String,
    /// `None` when the backend did not report stock.
    pub stock: Option<StockLevel>,
}

impl ProductCardView {
    /// Whether the "Out of Stock" badge is shown.
    #[must_use]
    pub fn is_sold_out(&self) -> bool {
        matches!(self.stock, Some(StockLevel::OutOfStock))
    }

    /// "{n} in stock" for available products.
    #[must_use]
    pub fn stock_label(&self) -> Option<String> {
        self.stock
            .filter(StockLevel::is_available)
            .map(|stock| stock.label())
    }
}

/// Search results block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductListView {
    pub products: Vec<ProductCardView>,
    /// "Showing 3 of 12 products" when more pages exist.
    pub pagination: Option<String>,
}

/// An option pair on the detail card (e.g., "Color: Red").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub group: String,
    pub option: String,
}

/// Single product block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDetailView {
    pub name: String,
    pub url: String,
    pub image_url: String,
    pub product_number: Option<String>,
    pub price: String,
    /// "3 in stock" / "Out of stock", omitted when unknown.
    pub stock: Option<String>,
    pub options: Vec<OptionView>,
}

/// An order card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCardView {
    /// "Order #10042".
    pub title: String,
    /// Status label, `Unknown` when missing.
    pub status: String,
    /// Lowercase status for styling; empty when missing.
    pub status_slug: String,
    pub date: Option<String>,
    /// "Total: €12.00".
    pub total: Option<String>,
    /// "3 item(s)".
    pub items: Option<String>,
}

/// Order history block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderListView {
    pub orders: Vec<OrderCardView>,
}

/// A cart line card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineView {
    pub name: String,
    pub image_url: String,
    pub quantity: i64,
    pub product_number: Option<String>,
    /// Line total, e.g. "€19.99".
    pub total: String,
    /// Unit price, e.g. "€19.99"; the "/ each" suffix is omitted when `None`.
    pub unit_price: Option<String>,
}

impl CartLineView {
    /// "Qty: 2".
    #[must_use]
    pub fn quantity_badge(&self) -> String {
        format!("Qty: {}", self.quantity)
    }

    /// "@ €9.99 / each".
    #[must_use]
    pub fn unit_price_label(&self) -> Option<String> {
        self.unit_price.as_ref().map(|price| format!("@ {price} / each"))
    }
}

/// Cart contents block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    /// Formatted grand total.
    pub total: String,
    pub lines: Vec<CartLineView>,
}

impl CartView {
    /// "Cart Total: €49.98".
    #[must_use]
    pub fn header(&self) -> String {
        format!("Cart Total: {}", self.total)
    }
}
