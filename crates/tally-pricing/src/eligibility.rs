//! # Promotion Eligibility
//!
//! The asynchronous half of a promotion: `test(order, oracle, ctx)`.
//!
//! A promotion is eligible when it is active at the request instant, its
//! coupon (if any) is on the order, and every condition holds against the
//! order's *current* totals. Because totals move while passes run, callers
//! re-test immediately before applying.

use async_trait::async_trait;
use futures::future::try_join_all;
use tally_core::{Money, Order, Promotion, PromotionCondition};

use crate::context::RequestContext;
use crate::error::PricingResult;
use crate::oracle::EligibilityOracle;

/// Asynchronous eligibility predicate.
#[async_trait]
pub trait PromotionTest {
    async fn test(
        &self,
        order: &Order,
        oracle: &dyn EligibilityOracle,
        ctx: &RequestContext,
    ) -> PricingResult<bool>;
}

#[async_trait]
impl PromotionTest for Promotion {
    async fn test(
        &self,
        order: &Order,
        oracle: &dyn EligibilityOracle,
        ctx: &RequestContext,
    ) -> PricingResult<bool> {
        if !self.is_active_at(ctx.now) || !self.coupon_satisfied(order) {
            return Ok(false);
        }

        for condition in &self.conditions {
            if !condition_holds(condition, order, oracle).await? {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

async fn condition_holds(
    condition: &PromotionCondition,
    order: &Order,
    oracle: &dyn EligibilityOracle,
) -> PricingResult<bool> {
    match condition {
        PromotionCondition::MinimumOrderAmount {
            amount,
            tax_inclusive,
        } => {
            let base: Money = if *tax_inclusive {
                order.sub_total
            } else {
                order.sub_total_before_tax
            };
            Ok(base >= *amount)
        }
        PromotionCondition::HasFacetValues { facets, minimum } => {
            let mut matched = 0;
            for line in &order.lines {
                if oracle.has_facet_values(line, facets).await? {
                    matched += line.quantity();
                }
            }
            Ok(matched >= *minimum)
        }
        PromotionCondition::ContainsVariants {
            variant_ids,
            minimum,
        } => {
            let matched: usize = order
                .lines
                .iter()
                .filter(|line| variant_ids.contains(&line.variant_id))
                .map(|line| line.quantity())
                .sum();
            Ok(matched >= *minimum)
        }
    }
}

/// Promotions from `candidates` that are eligible right now, in input order.
///
/// Tests run concurrently; the first failing lookup aborts the batch.
pub async fn filter_eligible<'p>(
    candidates: impl IntoIterator<Item = &'p Promotion>,
    order: &Order,
    oracle: &dyn EligibilityOracle,
    ctx: &RequestContext,
) -> PricingResult<Vec<&'p Promotion>> {
    let candidates: Vec<&Promotion> = candidates.into_iter().collect();
    let verdicts = try_join_all(
        candidates
            .iter()
            .map(|promotion| promotion.test(order, oracle, ctx)),
    )
    .await?;

    Ok(candidates
        .into_iter()
        .zip(verdicts)
        .filter_map(|(promotion, eligible)| eligible.then_some(promotion))
        .collect())
}
