//! Order input and priced output documents for `tally price`.
//!
//! ```json
//! {
//!   "code": "T-1001",
//!   "shipping_country": "GB",
//!   "coupon_codes": ["SAVE10"],
//!   "lines": [
//!     { "variant_id": "tee-red-m", "unit_price": 2500, "tax_category": "standard", "quantity": 2 }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use tally_core::validation::validate_quantity;
use tally_core::{CoreResult, Money, Order, OrderLine};

#[derive(Debug, Clone, Deserialize)]
pub struct LineRequest {
    pub variant_id: String,
    pub unit_price: Money,
    pub tax_category: String,
    pub quantity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderRequest {
    pub code: String,
    #[serde(default)]
    pub shipping_country: Option<String>,
    #[serde(default)]
    pub coupon_codes: Vec<String>,
    /// Previously chosen shipping method id, kept when still eligible.
    #[serde(default)]
    pub shipping_method: Option<String>,
    pub lines: Vec<LineRequest>,
}

impl OrderRequest {
    /// Builds an unpriced order, rejecting quantities before items are expanded.
    pub fn into_order(self) -> CoreResult<Order> {
        let mut order = Order::new(self.code);
        order.shipping_country = self.shipping_country;
        order.coupon_codes = self.coupon_codes;
        order.shipping_method = self.shipping_method;

        for line in self.lines {
            validate_quantity(line.quantity)?;
            order.lines.push(OrderLine::new(
                line.variant_id,
                line.unit_price,
                line.tax_category,
                line.quantity,
            ));
        }

        Ok(order)
    }
}

/// Priced order plus the derived amounts a caller usually wants.
#[derive(Debug, Serialize)]
pub struct PricedOrder<'a> {
    pub order: &'a Order,
    pub tax_total: Money,
    pub discount_total: Money,
    pub total: Money,
}

impl<'a> From<&'a Order> for PricedOrder<'a> {
    fn from(order: &'a Order) -> Self {
        PricedOrder {
            order,
            tax_total: order.sub_total - order.sub_total_before_tax,
            discount_total: order.discount_total(),
            total: order.total(),
        }
    }
}
