//! # Pricing Pipeline
//!
//! Entry point that prices an order in place.
//!
//! ## Sequence
//! ```text
//! ┌────────────┐   ┌─────────┐   ┌────────────┐   ┌─────────┐   ┌──────────┐
//! │zone + reset│──►│ Tax Pass│──►│ Promotions │──►│ Tax Pass│──►│ Shipping │
//! └────────────┘   └─────────┘   └────────────┘   └─────────┘   └──────────┘
//!                        └──────────── totals recomputed throughout ───────┘
//! ```
//!
//! The first tax pass seeds tax-inclusive totals for promotion conditions;
//! the second taxes the promoted prices. Running the pipeline again over a
//! settled order yields the same adjustments and totals.

use std::sync::Arc;

use tally_core::validation::{validate_order, validate_promotions};
use tally_core::{calculate_order_totals, AdjustmentKind, Order, Promotion};
use tracing::{debug, info};

use crate::collaborators::{
    ShippingQuoter, TaxCalculator, TaxRateResolver, ZoneProvider, ZoneStrategy,
};
use crate::context::RequestContext;
use crate::error::PricingResult;
use crate::oracle::EligibilityOracle;
use crate::promotions::apply_promotions;
use crate::shipping::apply_shipping;
use crate::tax::{apply_taxes, DefaultTaxCalculator};
use crate::zone::ChannelDefaultZoneStrategy;

/// Orchestrates the tax, promotion and shipping passes.
///
/// Collaborators are shared trait objects, so one pipeline can price many
/// orders concurrently; each call borrows its own order exclusively.
#[derive(Clone)]
pub struct PricingPipeline {
    zones: Arc<dyn ZoneProvider>,
    zone_strategy: Arc<dyn ZoneStrategy>,
    tax_rates: Arc<dyn TaxRateResolver>,
    tax_calculator: Arc<dyn TaxCalculator>,
    shipping: Arc<dyn ShippingQuoter>,
    oracle: Arc<dyn EligibilityOracle>,
}

impl PricingPipeline {
    /// Pipeline with the channel-default zone strategy and the default
    /// tax calculator over `tax_rates`.
    pub fn new(
        zones: Arc<dyn ZoneProvider>,
        tax_rates: Arc<dyn TaxRateResolver>,
        shipping: Arc<dyn ShippingQuoter>,
        oracle: Arc<dyn EligibilityOracle>,
    ) -> Self {
        PricingPipeline {
            zones,
            zone_strategy: Arc::new(ChannelDefaultZoneStrategy),
            tax_calculator: Arc::new(DefaultTaxCalculator::new(tax_rates.clone())),
            tax_rates,
            shipping,
            oracle,
        }
    }

    pub fn with_zone_strategy(mut self, strategy: Arc<dyn ZoneStrategy>) -> Self {
        self.zone_strategy = strategy;
        self
    }

    pub fn with_tax_calculator(mut self, calculator: Arc<dyn TaxCalculator>) -> Self {
        self.tax_calculator = calculator;
        self
    }

    /// Prices `order` in place and returns it for chaining.
    ///
    /// On a collaborator failure the error is returned and the order keeps
    /// whatever state the passes had reached.
    pub async fn apply_price_adjustments<'o>(
        &self,
        ctx: &RequestContext,
        order: &'o mut Order,
        promotions: &[Promotion],
    ) -> PricingResult<&'o mut Order> {
        validate_order(order)?;
        validate_promotions(promotions)?;

        let zones = self.zones.zones(ctx).await?;
        let zone = self
            .zone_strategy
            .determine_tax_zone(&zones, &ctx.channel, order);
        debug!(order = %order.code, zone = %zone.id, "Resolved tax zone");

        // Item promotions from an earlier run would skew the first tax pass.
        order.clear_all_adjustments();
        for line in &mut order.lines {
            line.clear_adjustments(AdjustmentKind::Promotion);
        }

        if order.is_empty() {
            calculate_order_totals(order);
            debug!(order = %order.code, "Empty order, totals reset");
            return Ok(order);
        }

        let rates = self.tax_rates.as_ref();
        let calculator = self.tax_calculator.as_ref();
        let oracle = self.oracle.as_ref();

        apply_taxes(order, &zone, rates, calculator, ctx).await?;
        apply_promotions(order, promotions, oracle, ctx).await?;
        apply_taxes(order, &zone, rates, calculator, ctx).await?;
        apply_shipping(order, self.shipping.as_ref(), ctx).await?;

        info!(
            order = %order.code,
            lines = order.lines.len(),
            sub_total = %order.sub_total,
            shipping = %order.shipping_cost,
            total = %order.total(),
            "Priced order"
        );

        Ok(order)
    }
}
