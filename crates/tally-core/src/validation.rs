//! # Validation Module
//!
//! Checks run on orders and promotion definitions before the pipeline
//! touches them. A rule that slips through here would surface as a
//! silently wrong total, so these fail loudly instead.
//!
//! ## Usage
//! ```rust
//! use tally_core::money::Money;
//! use tally_core::order::{Order, OrderLine};
//! use tally_core::validation::validate_order;
//!
//! let order = Order::new("T-1")
//!     .with_line(OrderLine::new("variant", Money::from_cents(500), "standard", 2));
//! assert!(validate_order(&order).is_ok());
//! ```

use std::collections::HashSet;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::order::{Order, OrderLine};
use crate::promotion::{Promotion, PromotionAction, PromotionCondition};
use crate::types::Rate;
use crate::{MAX_ITEM_QUANTITY, MAX_ORDER_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates an identifier or code.
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
pub fn validate_code(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.len() > 64 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 64,
        });
    }

    Ok(())
}

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: usize) -> CoreResult<()> {
    if qty == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .into());
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(CoreError::QuantityTooLarge {
            requested: qty,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is allowed (free items).
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a rate: 0 to 10000 bps (0% to 100%).
pub fn validate_rate(field: &str, rate: Rate) -> ValidationResult<()> {
    if rate > Rate::full() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: Rate::full().bps() as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Order Validators
// =============================================================================

/// Validates a single line.
pub fn validate_line(line: &OrderLine) -> CoreResult<()> {
    validate_code("variant_id", &line.variant_id)?;
    validate_code("tax_category", &line.tax_category)?;
    validate_price_cents("unit_price", line.unit_price.cents())?;
    validate_quantity(line.quantity())?;
    Ok(())
}

/// Validates an order before pricing.
///
/// Empty orders are valid; they price to zero.
pub fn validate_order(order: &Order) -> CoreResult<()> {
    if order.lines.len() > MAX_ORDER_LINES {
        return Err(CoreError::OrderTooLarge {
            max: MAX_ORDER_LINES,
        });
    }

    for line in &order.lines {
        validate_line(line)?;
    }

    Ok(())
}

// =============================================================================
// Promotion Validators
// =============================================================================

/// Validates one promotion definition.
pub fn validate_promotion(promotion: &Promotion) -> ValidationResult<()> {
    validate_code("promotion id", &promotion.id)?;

    if promotion.actions.is_empty() {
        return Err(ValidationError::required("promotion actions"));
    }

    if let (Some(starts), Some(ends)) = (promotion.starts_at, promotion.ends_at) {
        if ends <= starts {
            return Err(ValidationError::InvalidFormat {
                field: "ends_at".to_string(),
                reason: "must be after starts_at".to_string(),
            });
        }
    }

    for condition in &promotion.conditions {
        match condition {
            PromotionCondition::MinimumOrderAmount { amount, .. } => {
                validate_price_cents("minimum order amount", amount.cents())?;
            }
            PromotionCondition::HasFacetValues { facets, minimum } => {
                if facets.is_empty() {
                    return Err(ValidationError::required("facets"));
                }
                if *minimum == 0 {
                    return Err(ValidationError::MustBePositive {
                        field: "minimum".to_string(),
                    });
                }
            }
            PromotionCondition::ContainsVariants {
                variant_ids,
                minimum,
            } => {
                if variant_ids.is_empty() {
                    return Err(ValidationError::required("variant_ids"));
                }
                if *minimum == 0 {
                    return Err(ValidationError::MustBePositive {
                        field: "minimum".to_string(),
                    });
                }
            }
        }
    }

    for action in &promotion.actions {
        match action {
            PromotionAction::ItemPercentageDiscount { percent, .. }
            | PromotionAction::OrderPercentageDiscount { percent } => {
                validate_rate("percent", *percent)?;
            }
            PromotionAction::ItemFixedDiscount { amount, .. }
            | PromotionAction::OrderFixedDiscount { amount } => {
                validate_price_cents("discount amount", amount.cents())?;
            }
        }
    }

    Ok(())
}

/// Validates a promotion set: each definition, and unique ids.
pub fn validate_promotions(promotions: &[Promotion]) -> CoreResult<()> {
    let mut seen = HashSet::new();
    for promotion in promotions {
        validate_promotion(promotion)?;
        if !seen.insert(promotion.id.as_str()) {
            return Err(CoreError::DuplicatePromotion(promotion.id.clone()));
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use chrono::{TimeZone, Utc};

    fn fixed(amount: i64) -> Promotion {
        Promotion {
            id: "fixed".to_string(),
            name: "Fixed".to_string(),
            enabled: true,
            coupon_code: None,
            starts_at: None,
            ends_at: None,
            conditions: vec![],
            actions: vec![PromotionAction::OrderFixedDiscount {
                amount: Money::from_cents(amount),
            }],
        }
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(matches!(
            validate_quantity(1000),
            Err(CoreError::QuantityTooLarge { .. })
        ));
    }

    #[test]
    fn test_validate_code() {
        assert!(validate_code("id", "standard").is_ok());
        assert!(validate_code("id", "   ").is_err());
        assert!(validate_code("id", &"A".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_rate() {
        assert!(validate_rate("percent", Rate::from_bps(10_000)).is_ok());
        assert!(validate_rate("percent", Rate::from_bps(10_001)).is_err());
    }

    #[test]
    fn test_validate_order_rejects_negative_price() {
        let order = Order::new("T-1").with_line(OrderLine::new(
            "v",
            Money::from_cents(-1),
            "standard",
            1,
        ));
        assert!(validate_order(&order).is_err());
        assert!(validate_order(&Order::new("EMPTY")).is_ok());
    }

    #[test]
    fn test_validate_promotion_rules() {
        assert!(validate_promotion(&fixed(500)).is_ok());
        assert!(validate_promotion(&fixed(-500)).is_err());

        let mut no_actions = fixed(500);
        no_actions.actions.clear();
        assert!(validate_promotion(&no_actions).is_err());

        let mut bad_window = fixed(500);
        bad_window.starts_at = Some(Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap());
        bad_window.ends_at = Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        assert!(validate_promotion(&bad_window).is_err());

        let mut no_facets = fixed(500);
        no_facets.conditions.push(PromotionCondition::HasFacetValues {
            facets: vec![],
            minimum: 1,
        });
        assert!(validate_promotion(&no_facets).is_err());
    }

    #[test]
    fn test_validate_promotions_rejects_duplicate_ids() {
        let result = validate_promotions(&[fixed(100), fixed(200)]);
        assert!(matches!(result, Err(CoreError::DuplicatePromotion(id)) if id == "fixed"));
    }
}
