//! # Promotion Rules
//!
//! Promotions are a closed set of serializable rules: a list of
//! [`PromotionCondition`]s deciding *whether* a promotion is eligible and a
//! list of [`PromotionAction`]s deciding *what* it does.
//!
//! ## Capabilities
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  test(order, oracle)  → bool          async, lives in tally-pricing     │
//! │  apply_to_item(item, line) → Option<Adjustment>   item actions only     │
//! │  apply_to_order(order)     → Option<Adjustment>   order actions only    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Applying is pure: everything an action needs is on the item, line or
//! order. Conditions that need catalog data (facet tags) are evaluated by
//! the pricing crate through its eligibility oracle.
//!
//! ## Wire Format
//! ```json
//! {
//!   "id": "summer",
//!   "name": "Summer sale",
//!   "conditions": [{ "type": "minimum_order_amount", "amount": 5000 }],
//!   "actions": [{ "type": "item_percentage_discount", "percent": 1000 }]
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::order::{Adjustment, Order, OrderItem, OrderLine};
use crate::types::Rate;

// =============================================================================
// Conditions
// =============================================================================

/// An eligibility rule. All conditions of a promotion must hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromotionCondition {
    /// Order sub total (with or without tax) reaches `amount`.
    MinimumOrderAmount {
        amount: Money,
        #[serde(default)]
        tax_inclusive: bool,
    },
    /// At least `minimum` units sit on lines whose product carries every facet.
    HasFacetValues { facets: Vec<String>, minimum: usize },
    /// At least `minimum` units of the listed variants are ordered.
    ContainsVariants {
        variant_ids: Vec<String>,
        minimum: usize,
    },
}

// =============================================================================
// Actions
// =============================================================================

/// Whether an action adjusts items or the order as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionScope {
    Item,
    Order,
}

/// A discount rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromotionAction {
    /// Percentage off each unit's list price. An empty `variant_ids` means all lines.
    ItemPercentageDiscount {
        percent: Rate,
        #[serde(default)]
        variant_ids: Vec<String>,
    },
    /// Fixed amount off each unit, never below zero.
    ItemFixedDiscount {
        amount: Money,
        #[serde(default)]
        variant_ids: Vec<String>,
    },
    /// Percentage off the order sub total.
    OrderPercentageDiscount { percent: Rate },
    /// Fixed amount off the order, capped at the sub total.
    OrderFixedDiscount { amount: Money },
}

impl PromotionAction {
    pub fn scope(&self) -> ActionScope {
        match self {
            PromotionAction::ItemPercentageDiscount { .. }
            | PromotionAction::ItemFixedDiscount { .. } => ActionScope::Item,
            PromotionAction::OrderPercentageDiscount { .. }
            | PromotionAction::OrderFixedDiscount { .. } => ActionScope::Order,
        }
    }

    /// Discount for one item, or `None` for order actions and filtered-out lines.
    fn item_discount(&self, item: &OrderItem, line: &OrderLine, so_far: Money) -> Option<Money> {
        match self {
            PromotionAction::ItemPercentageDiscount { percent, variant_ids } => {
                targets(variant_ids, line).then(|| -item.unit_price.portion(*percent))
            }
            PromotionAction::ItemFixedDiscount { amount, variant_ids } => {
                targets(variant_ids, line).then(|| {
                    let remaining = item.unit_price_with_promotions() + so_far;
                    -(*amount).min(remaining).max(Money::zero())
                })
            }
            PromotionAction::OrderPercentageDiscount { .. }
            | PromotionAction::OrderFixedDiscount { .. } => None,
        }
    }

    fn order_discount(&self, order: &Order, so_far: Money) -> Option<Money> {
        match self {
            PromotionAction::OrderPercentageDiscount { percent } => {
                Some(-order.sub_total.portion(*percent))
            }
            PromotionAction::OrderFixedDiscount { amount } => {
                let remaining = order.sub_total + so_far;
                Some(-(*amount).min(remaining).max(Money::zero()))
            }
            PromotionAction::ItemPercentageDiscount { .. }
            | PromotionAction::ItemFixedDiscount { .. } => None,
        }
    }
}

fn targets(variant_ids: &[String], line: &OrderLine) -> bool {
    variant_ids.is_empty() || variant_ids.iter().any(|id| *id == line.variant_id)
}

// =============================================================================
// Promotion
// =============================================================================

fn enabled_by_default() -> bool {
    true
}

/// A discount rule set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    pub id: String,
    pub name: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// When set, the order must carry this coupon code.
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub conditions: Vec<PromotionCondition>,
    pub actions: Vec<PromotionAction>,
}

impl Promotion {
    /// Adjustment source tag for adjustments produced by this promotion.
    pub fn source_id(&self) -> String {
        format!("PROMOTION:{}", self.id)
    }

    /// Enabled and inside its validity window at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.enabled
            && self.starts_at.map_or(true, |starts| starts <= now)
            && self.ends_at.map_or(true, |ends| now < ends)
    }

    /// No coupon required, or the order carries it.
    pub fn coupon_satisfied(&self, order: &Order) -> bool {
        self.coupon_code
            .as_deref()
            .map_or(true, |code| order.has_coupon(code))
    }

    pub fn has_item_actions(&self) -> bool {
        self.actions.iter().any(|a| a.scope() == ActionScope::Item)
    }

    pub fn has_order_actions(&self) -> bool {
        self.actions.iter().any(|a| a.scope() == ActionScope::Order)
    }

    /// Combined item-level discount for one item.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    /// use tally_core::order::OrderLine;
    /// use tally_core::promotion::{Promotion, PromotionAction};
    ///
    /// let promotion = Promotion {
    ///     id: "ten-off".into(),
    ///     name: "$10 off".into(),
    ///     enabled: true,
    ///     coupon_code: None,
    ///     starts_at: None,
    ///     ends_at: None,
    ///     conditions: vec![],
    ///     actions: vec![PromotionAction::ItemFixedDiscount {
    ///         amount: Money::from_cents(1000),
    ///         variant_ids: vec![],
    ///     }],
    /// };
    ///
    /// let line = OrderLine::new("variant", Money::from_cents(10000), "standard", 1);
    /// let adjustment = promotion.apply_to_item(&line.items[0], &line).unwrap();
    /// assert_eq!(adjustment.amount.cents(), -1000);
    /// ```
    pub fn apply_to_item(&self, item: &OrderItem, line: &OrderLine) -> Option<Adjustment> {
        let mut amount = None;
        for action in &self.actions {
            let so_far = amount.unwrap_or_default();
            if let Some(discount) = action.item_discount(item, line, so_far) {
                amount = Some(so_far + discount);
            }
        }
        amount.map(|amount| Adjustment::promotion(self.source_id(), self.name.clone(), amount))
    }

    /// Combined order-level discount.
    pub fn apply_to_order(&self, order: &Order) -> Option<Adjustment> {
        let mut amount = None;
        for action in &self.actions {
            let so_far = amount.unwrap_or_default();
            if let Some(discount) = action.order_discount(order, so_far) {
                amount = Some(so_far + discount);
            }
        }
        amount.map(|amount| Adjustment::promotion(self.source_id(), self.name.clone(), amount))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn promotion(actions: Vec<PromotionAction>) -> Promotion {
        Promotion {
            id: "p1".to_string(),
            name: "Promo".to_string(),
            enabled: true,
            coupon_code: None,
            starts_at: None,
            ends_at: None,
            conditions: vec![],
            actions,
        }
    }

    #[test]
    fn test_item_percentage_uses_list_price() {
        let promo = promotion(vec![PromotionAction::ItemPercentageDiscount {
            percent: Rate::from_percent(10),
            variant_ids: vec![],
        }]);
        let line = OrderLine::new("v", Money::from_cents(2500), "standard", 1);

        let adjustment = promo.apply_to_item(&line.items[0], &line).unwrap();

        assert_eq!(adjustment.amount.cents(), -250);
        assert_eq!(adjustment.source, "PROMOTION:p1");
    }

    #[test]
    fn test_item_fixed_discount_never_goes_below_zero() {
        let promo = promotion(vec![PromotionAction::ItemFixedDiscount {
            amount: Money::from_cents(1500),
            variant_ids: vec![],
        }]);
        let line = OrderLine::new("v", Money::from_cents(1000), "standard", 1);

        let adjustment = promo.apply_to_item(&line.items[0], &line).unwrap();

        assert_eq!(adjustment.amount.cents(), -1000);
    }

    #[test]
    fn test_variant_filter_skips_other_lines() {
        let promo = promotion(vec![PromotionAction::ItemPercentageDiscount {
            percent: Rate::from_percent(50),
            variant_ids: vec!["shoes".to_string()],
        }]);
        let line = OrderLine::new("hats", Money::from_cents(1000), "standard", 1);

        assert!(promo.apply_to_item(&line.items[0], &line).is_none());
    }

    #[test]
    fn test_order_actions_ignored_at_item_level() {
        let promo = promotion(vec![PromotionAction::OrderFixedDiscount {
            amount: Money::from_cents(500),
        }]);
        let line = OrderLine::new("v", Money::from_cents(1000), "standard", 1);

        assert!(promo.apply_to_item(&line.items[0], &line).is_none());
        assert!(promo.has_order_actions());
        assert!(!promo.has_item_actions());
    }

    #[test]
    fn test_order_fixed_discount_capped_at_sub_total() {
        let promo = promotion(vec![PromotionAction::OrderFixedDiscount {
            amount: Money::from_cents(5000),
        }]);
        let mut order = Order::new("T-1");
        order.sub_total = Money::from_cents(3000);

        let adjustment = promo.apply_to_order(&order).unwrap();

        assert_eq!(adjustment.amount.cents(), -3000);
    }

    #[test]
    fn test_validity_window() {
        let now = Utc.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).unwrap();
        let mut promo = promotion(vec![]);
        promo.starts_at = Some(now - Duration::days(1));
        promo.ends_at = Some(now + Duration::days(1));
        assert!(promo.is_active_at(now));
        assert!(!promo.is_active_at(now + Duration::days(2)));

        promo.enabled = false;
        assert!(!promo.is_active_at(now));
    }

    #[test]
    fn test_coupon_requirement() {
        let mut promo = promotion(vec![]);
        promo.coupon_code = Some("WELCOME".to_string());
        let mut order = Order::new("T-1");
        assert!(!promo.coupon_satisfied(&order));

        order.coupon_codes.push("welcome".to_string());
        assert!(promo.coupon_satisfied(&order));
    }

    #[test]
    fn test_rule_definitions_deserialize() {
        let json = r#"{
            "id": "bundle",
            "name": "Bundle",
            "conditions": [
                { "type": "has_facet_values", "facets": ["brand:acme"], "minimum": 2 },
                { "type": "minimum_order_amount", "amount": 5000, "tax_inclusive": true }
            ],
            "actions": [{ "type": "order_percentage_discount", "percent": 1500 }]
        }"#;

        let promo: Promotion = serde_json::from_str(json).unwrap();

        assert!(promo.enabled);
        assert_eq!(promo.conditions.len(), 2);
        assert_eq!(
            promo.actions[0],
            PromotionAction::OrderPercentageDiscount {
                percent: Rate::from_bps(1500)
            }
        );
    }
}
