//! # Order Model
//!
//! The three-level structure the pricing pipeline mutates.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Order ──owns──► OrderLine ──owns──► OrderItem ──owns──► Adjustment    │
//! │    │                 │                   (one per unit)                 │
//! │    │                 └─ variant_id (reference only, never owned)        │
//! │    └─ order-level adjustments (whole-order promotions)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Adjustment Discipline
//! Every pass clears its own [`AdjustmentKind`] before re-applying, and
//! [`OrderItem::push_adjustment`] replaces an existing adjustment with the
//! same kind and source. Re-running the pipeline therefore never stacks
//! duplicates.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;
use crate::types::Rate;

// =============================================================================
// Adjustment
// =============================================================================

/// What produced an adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    Tax,
    Promotion,
}

/// A signed change to an item or order price. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Adjustment {
    pub kind: AdjustmentKind,
    /// `TAX:<rate id>` or `PROMOTION:<promotion id>`.
    pub source: String,
    pub description: String,
    pub amount: Money,
}

impl Adjustment {
    pub fn tax(source: impl Into<String>, description: impl Into<String>, amount: Money) -> Self {
        Adjustment {
            kind: AdjustmentKind::Tax,
            source: source.into(),
            description: description.into(),
            amount,
        }
    }

    pub fn promotion(
        source: impl Into<String>,
        description: impl Into<String>,
        amount: Money,
    ) -> Self {
        Adjustment {
            kind: AdjustmentKind::Promotion,
            source: source.into(),
            description: description.into(),
            amount,
        }
    }
}

/// Replaces an adjustment with the same kind and source, or appends.
fn upsert(adjustments: &mut Vec<Adjustment>, adjustment: Adjustment) {
    match adjustments
        .iter_mut()
        .find(|a| a.kind == adjustment.kind && a.source == adjustment.source)
    {
        Some(existing) => *existing = adjustment,
        None => adjustments.push(adjustment),
    }
}

fn total_of(adjustments: &[Adjustment], kind: AdjustmentKind) -> Money {
    adjustments
        .iter()
        .filter(|a| a.kind == kind)
        .map(|a| a.amount)
        .sum()
}

// =============================================================================
// Order Item
// =============================================================================

/// One unit of a line; the smallest adjustable thing in an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    /// Price the item's tax and discounts are based on. Starts as the line's
    /// price; the tax pass sets it to the net price when tax is added on top.
    pub unit_price: Money,
    #[serde(default)]
    adjustments: Vec<Adjustment>,
}

impl OrderItem {
    pub fn new(unit_price: Money) -> Self {
        OrderItem {
            id: Uuid::new_v4().to_string(),
            unit_price,
            adjustments: Vec::new(),
        }
    }

    /// Pending adjustments in application order.
    pub fn adjustments(&self) -> &[Adjustment] {
        &self.adjustments
    }

    /// Removes every adjustment of one kind.
    pub fn clear_adjustments(&mut self, kind: AdjustmentKind) {
        self.adjustments.retain(|a| a.kind != kind);
    }

    /// Adds an adjustment, replacing one with the same kind and source.
    pub fn push_adjustment(&mut self, adjustment: Adjustment) {
        upsert(&mut self.adjustments, adjustment);
    }

    /// Sum of adjustment amounts of one kind.
    pub fn adjustment_total(&self, kind: AdjustmentKind) -> Money {
        total_of(&self.adjustments, kind)
    }

    /// Unit price after item-level promotions; the base tax is computed on.
    pub fn unit_price_with_promotions(&self) -> Money {
        self.unit_price + self.adjustment_total(AdjustmentKind::Promotion)
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// A variant ordered in some quantity, expanded into one item per unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLine {
    pub id: String,
    pub variant_id: String,
    pub unit_price: Money,
    /// Tax category id.
    pub tax_category: String,

    // Written by the tax pass.
    #[serde(default)]
    pub price_includes_tax: bool,
    #[serde(default)]
    pub tax_rate: Rate,
    #[serde(default)]
    pub unit_price_with_tax: Money,
    #[serde(default)]
    pub unit_price_without_tax: Money,

    pub items: Vec<OrderItem>,
}

impl OrderLine {
    /// Creates a line with `quantity` items priced at `unit_price`.
    pub fn new(
        variant_id: impl Into<String>,
        unit_price: Money,
        tax_category: impl Into<String>,
        quantity: usize,
    ) -> Self {
        OrderLine {
            id: Uuid::new_v4().to_string(),
            variant_id: variant_id.into(),
            unit_price,
            tax_category: tax_category.into(),
            price_includes_tax: false,
            tax_rate: Rate::zero(),
            unit_price_with_tax: unit_price,
            unit_price_without_tax: unit_price,
            items: (0..quantity).map(|_| OrderItem::new(unit_price)).collect(),
        }
    }

    pub fn quantity(&self) -> usize {
        self.items.len()
    }

    /// Clears one adjustment kind on every item of the line.
    pub fn clear_adjustments(&mut self, kind: AdjustmentKind) {
        for item in &mut self.items {
            item.clear_adjustments(kind);
        }
    }

    /// Tax carried by one item of this line.
    ///
    /// Tax-inclusive prices already contain their tax, so it is extracted
    /// from the promoted price rather than read from TAX adjustments.
    pub fn unit_tax(&self, item: &OrderItem) -> Money {
        if self.price_includes_tax {
            item.unit_price_with_promotions().tax_included(self.tax_rate)
        } else {
            item.adjustment_total(AdjustmentKind::Tax)
        }
    }

    /// Price of one item after promotions, including tax.
    pub fn item_total(&self, item: &OrderItem) -> Money {
        if self.price_includes_tax {
            item.unit_price_with_promotions()
        } else {
            item.unit_price_with_promotions() + self.unit_tax(item)
        }
    }

    /// Sum of item totals (promotions and tax included).
    pub fn total_price(&self) -> Money {
        self.items.iter().map(|item| self.item_total(item)).sum()
    }

    /// Sum of item taxes.
    pub fn line_tax(&self) -> Money {
        self.items.iter().map(|item| self.unit_tax(item)).sum()
    }

    /// Sum of item-level promotion adjustments (zero or negative).
    pub fn discount_total(&self) -> Money {
        self.items
            .iter()
            .map(|item| item.adjustment_total(AdjustmentKind::Promotion))
            .sum()
    }
}

// =============================================================================
// Order
// =============================================================================

/// A customer order being priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub code: String,
    pub lines: Vec<OrderLine>,
    #[serde(default)]
    pub coupon_codes: Vec<String>,
    #[serde(default)]
    pub shipping_country: Option<String>,

    // Aggregates, owned by the totals aggregator.
    #[serde(default)]
    pub sub_total: Money,
    #[serde(default)]
    pub sub_total_before_tax: Money,
    #[serde(default)]
    pub shipping_cost: Money,
    /// Id of the selected shipping method.
    #[serde(default)]
    pub shipping_method: Option<String>,

    #[serde(default)]
    adjustments: Vec<Adjustment>,
}

impl Order {
    pub fn new(code: impl Into<String>) -> Self {
        Order {
            id: Uuid::new_v4().to_string(),
            code: code.into(),
            lines: Vec::new(),
            coupon_codes: Vec::new(),
            shipping_country: None,
            sub_total: Money::zero(),
            sub_total_before_tax: Money::zero(),
            shipping_cost: Money::zero(),
            shipping_method: None,
            adjustments: Vec::new(),
        }
    }

    /// Builder-style line append.
    pub fn with_line(mut self, line: OrderLine) -> Self {
        self.lines.push(line);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Order-level pending adjustments.
    pub fn adjustments(&self) -> &[Adjustment] {
        &self.adjustments
    }

    /// Removes every order-level adjustment.
    pub fn clear_all_adjustments(&mut self) {
        self.adjustments.clear();
    }

    /// Removes order-level adjustments of one kind.
    pub fn clear_adjustments(&mut self, kind: AdjustmentKind) {
        self.adjustments.retain(|a| a.kind != kind);
    }

    /// Adds an order-level adjustment, replacing one with the same kind and source.
    pub fn push_adjustment(&mut self, adjustment: Adjustment) {
        upsert(&mut self.adjustments, adjustment);
    }

    /// Sum of order-level adjustments of one kind.
    pub fn adjustment_total(&self, kind: AdjustmentKind) -> Money {
        total_of(&self.adjustments, kind)
    }

    /// Case-insensitive coupon lookup.
    pub fn has_coupon(&self, code: &str) -> bool {
        self.coupon_codes
            .iter()
            .any(|applied| applied.eq_ignore_ascii_case(code))
    }

    /// Item-level plus order-level promotion adjustments.
    pub fn discount_total(&self) -> Money {
        self.lines.iter().map(OrderLine::discount_total).sum::<Money>()
            + self.adjustment_total(AdjustmentKind::Promotion)
    }

    /// Amount the customer pays: sub total, order-level adjustments and shipping.
    pub fn total(&self) -> Money {
        self.sub_total + self.adjustments.iter().map(|a| a.amount).sum::<Money>() + self.shipping_cost
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
