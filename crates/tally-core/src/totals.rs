//! # Totals Aggregator
//!
//! Derives order-level aggregates from the current line state.
//!
//! ```text
//! total_price          = Σ line.total_price()
//! total_tax            = Σ line.line_tax()
//! sub_total_before_tax = total_price − total_tax
//! sub_total            = total_price
//! ```
//!
//! The pipeline calls this after every step that changes an adjustment, so
//! eligibility tests evaluated mid-pass always see fresh totals. Nothing here
//! is cached; the aggregates are overwritten on every call.

use crate::money::Money;
use crate::order::Order;

/// Snapshot of the aggregates written to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderTotals {
    pub total_price: Money,
    pub total_tax: Money,
}

impl OrderTotals {
    /// Sums the current line state without touching the order.
    pub fn of(order: &Order) -> Self {
        order
            .lines
            .iter()
            .fold(OrderTotals::default(), |totals, line| OrderTotals {
                total_price: totals.total_price + line.total_price(),
                total_tax: totals.total_tax + line.line_tax(),
            })
    }

    pub fn sub_total_before_tax(&self) -> Money {
        self.total_price - self.total_tax
    }
}

/// Recomputes `sub_total` and `sub_total_before_tax` in place.
pub fn calculate_order_totals(order: &mut Order) -> OrderTotals {
    let totals = OrderTotals::of(order);
    order.sub_total = totals.total_price;
    order.sub_total_before_tax = totals.sub_total_before_tax();
    totals
}
