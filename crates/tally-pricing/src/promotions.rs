//! # Promotion Pass
//!
//! Applies item-level promotions line by line, then order-level promotions.
//!
//! ## Ordering
//! ```text
//! for each line (in order):
//!     eligible = filter_eligible(item promotions)     ← concurrent tests
//!     clear PROMOTION adjustments on the line, calculate_order_totals
//!     for each eligible promotion (input order):
//!         re-test ── no longer eligible ──► skip
//!         compute adjustments per slot (immutable borrow)
//!         write them to line.items[slot]
//!         calculate_order_totals
//!
//! clear order PROMOTION adjustments
//! eligible = filter_eligible(order promotions)
//! for each eligible promotion:
//!     re-test, apply_to_order, calculate_order_totals
//! ```
//!
//! Filtering is a snapshot. Each application moves the totals, so every
//! promotion is tested again right before it is applied.

use tally_core::{calculate_order_totals, Adjustment, AdjustmentKind, Order, Promotion};
use tracing::debug;

use crate::context::RequestContext;
use crate::eligibility::{filter_eligible, PromotionTest};
use crate::error::PricingResult;
use crate::oracle::EligibilityOracle;

/// Runs the full promotion pass.
pub async fn apply_promotions(
    order: &mut Order,
    promotions: &[Promotion],
    oracle: &dyn EligibilityOracle,
    ctx: &RequestContext,
) -> PricingResult<()> {
    apply_item_promotions(order, promotions, oracle, ctx).await?;
    apply_order_promotions(order, promotions, oracle, ctx).await?;
    Ok(())
}

async fn apply_item_promotions(
    order: &mut Order,
    promotions: &[Promotion],
    oracle: &dyn EligibilityOracle,
    ctx: &RequestContext,
) -> PricingResult<()> {
    let candidates: Vec<&Promotion> = promotions.iter().filter(|p| p.has_item_actions()).collect();

    for index in 0..order.lines.len() {
        let eligible = filter_eligible(candidates.iter().copied(), order, oracle, ctx).await?;
        order.lines[index].clear_adjustments(AdjustmentKind::Promotion);
        calculate_order_totals(order);

        for promotion in eligible {
            if !promotion.test(order, oracle, ctx).await? {
                debug!(promotion = %promotion.id, "No longer eligible, skipped");
                continue;
            }

            let line = &order.lines[index];
            let pending: Vec<(usize, Adjustment)> = line
                .items
                .iter()
                .enumerate()
                .filter_map(|(slot, item)| {
                    promotion
                        .apply_to_item(item, line)
                        .map(|adjustment| (slot, adjustment))
                })
                .collect();

            if pending.is_empty() {
                continue;
            }

            debug!(
                promotion = %promotion.id,
                line = %line.id,
                items = pending.len(),
                "Applied item promotion"
            );

            let line = &mut order.lines[index];
            for (slot, adjustment) in pending {
                line.items[slot].push_adjustment(adjustment);
            }

            calculate_order_totals(order);
        }
    }

    Ok(())
}

/// Applies order-level promotions in input order.
///
/// Order adjustments sit outside `sub_total`, and no condition reads them,
/// so with the current condition set an order promotion that passed the
/// filter always passes its re-test. The re-test is kept so a condition on
/// order adjustments would be honoured without changing this pass.
async fn apply_order_promotions(
    order: &mut Order,
    promotions: &[Promotion],
    oracle: &dyn EligibilityOracle,
    ctx: &RequestContext,
) -> PricingResult<()> {
    order.clear_adjustments(AdjustmentKind::Promotion);

    let candidates = promotions.iter().filter(|p| p.has_order_actions());
    let eligible = filter_eligible(candidates, order, oracle, ctx).await?;

    for promotion in eligible {
        if !promotion.test(order, oracle, ctx).await? {
            debug!(promotion = %promotion.id, "No longer eligible, skipped");
            continue;
        }

        if let Some(adjustment) = promotion.apply_to_order(order) {
            debug!(
                promotion = %promotion.id,
                amount = %adjustment.amount,
                "Applied order promotion"
            );
            order.push_adjustment(adjustment);
        }

        calculate_order_totals(order);
    }

    Ok(())
}
