//! # Tax Pass
//!
//! Recomputes TAX adjustments for every line against the active zone.
//!
//! ## Flow (per line)
//! ```text
//! clear TAX adjustments on every item
//!      │
//!      ▼
//! resolve TaxRate (zone, category) ── miss ──► zero rate, no adjustment
//!      │
//!      ▼
//! TaxCalculator.calculate(unit_price, category, zone, ctx)
//!      │  price_includes_tax / with / without tax
//!      ▼
//! items[i].unit_price = included ? catalog price : price without tax
//!      │
//!      ▼
//! exclusive price? ── yes ──► items[i] += rate.apply(unit_price_with_promotions)
//!      │
//!      ▼
//! calculate_order_totals
//! ```
//!
//! The pass runs twice per pipeline run: once to seed totals for promotion
//! conditions and once to tax the promoted prices.

use std::sync::Arc;

use async_trait::async_trait;
use tally_core::{calculate_order_totals, AdjustmentKind, Money, Order, TaxRate, Zone};
use tracing::{debug, warn};

use crate::collaborators::{TaxCalculator, TaxRateResolver, TaxedPrice};
use crate::context::RequestContext;
use crate::error::PricingResult;

// =============================================================================
// Default Calculator
// =============================================================================

/// Channel-aware tax calculator.
///
/// | Channel prices   | Active zone       | Result                                   |
/// |------------------|-------------------|------------------------------------------|
/// | exclusive        | any               | net = price, gross = net + zone tax      |
/// | include tax      | channel default   | gross = price, net extracted             |
/// | include tax      | other zone        | net via default rate, re-grossed by zone |
///
/// A missing rate counts as zero: the price passes through unchanged.
#[derive(Clone)]
pub struct DefaultTaxCalculator {
    rates: Arc<dyn TaxRateResolver>,
}

impl DefaultTaxCalculator {
    pub fn new(rates: Arc<dyn TaxRateResolver>) -> Self {
        DefaultTaxCalculator { rates }
    }

}

fn net_of(rate: Option<&TaxRate>, gross: Money) -> Money {
    rate.map_or(gross, |rate| rate.net_price_of(gross))
}

fn gross_of(rate: Option<&TaxRate>, net: Money) -> Money {
    rate.map_or(net, |rate| rate.gross_price_of(net))
}

#[async_trait]
impl TaxCalculator for DefaultTaxCalculator {
    async fn calculate(
        &self,
        unit_price: Money,
        category: &str,
        zone: &Zone,
        ctx: &RequestContext,
    ) -> PricingResult<TaxedPrice> {
        let zone_rate = self.rates.applicable_rate(zone, category).await?;

        if !ctx.channel.prices_include_tax {
            return Ok(TaxedPrice {
                price_includes_tax: false,
                price_with_tax: gross_of(zone_rate.as_ref(), unit_price),
                price_without_tax: unit_price,
            });
        }

        let default_zone = &ctx.channel.default_tax_zone;
        if zone.id == default_zone.id {
            return Ok(TaxedPrice {
                price_includes_tax: true,
                price_with_tax: unit_price,
                price_without_tax: net_of(zone_rate.as_ref(), unit_price),
            });
        }

        // Strip the default zone's tax, then charge the active zone's on top.
        let default_rate = self.rates.applicable_rate(default_zone, category).await?;
        let net = net_of(default_rate.as_ref(), unit_price);
        Ok(TaxedPrice {
            price_includes_tax: false,
            price_with_tax: gross_of(zone_rate.as_ref(), net),
            price_without_tax: net,
        })
    }
}

// =============================================================================
// Pass
// =============================================================================

/// Runs the tax pass over every line of `order`.
pub async fn apply_taxes(
    order: &mut Order,
    zone: &Zone,
    rates: &dyn TaxRateResolver,
    calculator: &dyn TaxCalculator,
    ctx: &RequestContext,
) -> PricingResult<()> {
    for index in 0..order.lines.len() {
        let line = &mut order.lines[index];
        line.clear_adjustments(AdjustmentKind::Tax);

        let tax_rate = rates.applicable_rate(zone, &line.tax_category).await?;
        if tax_rate.is_none() {
            warn!(
                zone = %zone.id,
                category = %line.tax_category,
                "No tax rate for category, taxing at zero"
            );
        }

        let taxed = calculator
            .calculate(line.unit_price, &line.tax_category, zone, ctx)
            .await?;

        line.price_includes_tax = taxed.price_includes_tax;
        line.tax_rate = tax_rate.as_ref().map(|t| t.rate).unwrap_or_default();
        line.unit_price_with_tax = taxed.price_with_tax;
        line.unit_price_without_tax = taxed.price_without_tax;

        // Derived from the line's catalog price on every run, so re-pricing
        // never compounds.
        let base_price = if taxed.price_includes_tax {
            line.unit_price
        } else {
            taxed.price_without_tax
        };
        let added_rate = tax_rate.as_ref().filter(|_| !taxed.price_includes_tax);

        for item in &mut line.items {
            item.unit_price = base_price;
            if let Some(tax_rate) = added_rate {
                let adjustment = tax_rate.apply(item.unit_price_with_promotions());
                item.push_adjustment(adjustment);
            }
        }

        debug!(
            line = %line.id,
            rate = line.tax_rate.bps(),
            includes_tax = line.price_includes_tax,
            tax = %line.line_tax(),
            "Taxed line"
        );

        calculate_order_totals(order);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PricingError;
    use tally_core::{Adjustment, Channel, OrderLine, Rate};

    struct FlatRate(Option<Rate>);

    #[async_trait]
    impl TaxRateResolver for FlatRate {
        async fn applicable_rate(
            &self,
            zone: &Zone,
            category: &str,
        ) -> PricingResult<Option<TaxRate>> {
            Ok(self.0.map(|rate| TaxRate {
                id: format!("{}-{}", zone.id, category),
                name: "Standard".to_string(),
                zone_id: zone.id.clone(),
                category_id: category.to_string(),
                rate,
            }))
        }
    }

    /// 20% in the UK, 10% elsewhere.
    struct ByZone;

    #[async_trait]
    impl TaxRateResolver for ByZone {
        async fn applicable_rate(
            &self,
            zone: &Zone,
            category: &str,
        ) -> PricingResult<Option<TaxRate>> {
            let percent = if zone.id == "uk" { 20 } else { 10 };
            FlatRate(Some(Rate::from_percent(percent)))
                .applicable_rate(zone, category)
                .await
        }
    }

    struct Failing;

    #[async_trait]
    impl TaxRateResolver for Failing {
        async fn applicable_rate(
            &self,
            _zone: &Zone,
            _category: &str,
        ) -> PricingResult<Option<TaxRate>> {
            Err(PricingError::collaborator("tax rates", "timeout"))
        }
    }

    fn zone(id: &str) -> Zone {
        Zone {
            id: id.to_string(),
            name: id.to_uppercase(),
            members: vec![],
        }
    }

    fn ctx(prices_include_tax: bool) -> RequestContext {
        RequestContext::new(Channel {
            code: "web".to_string(),
            default_tax_zone: zone("uk"),
            prices_include_tax,
        })
    }

    #[tokio::test]
    async fn test_exclusive_prices_get_tax_adjustments() {
        let rates = Arc::new(FlatRate(Some(Rate::from_percent(20))));
        let calculator = DefaultTaxCalculator::new(rates.clone());
        let mut order =
            Order::new("T-1").with_line(OrderLine::new("a", Money::from_cents(5000), "standard", 2));

        apply_taxes(&mut order, &zone("uk"), rates.as_ref(), &calculator, &ctx(false))
            .await
            .unwrap();

        let line = &order.lines[0];
        assert_eq!(line.line_tax().cents(), 2000);
        assert_eq!(line.unit_price_with_tax.cents(), 6000);
        assert_eq!(order.sub_total.cents(), 12000);
        assert_eq!(order.sub_total_before_tax.cents(), 10000);
    }

    #[tokio::test]
    async fn test_tax_is_on_promoted_price() {
        let rates = Arc::new(FlatRate(Some(Rate::from_percent(20))));
        let calculator = DefaultTaxCalculator::new(rates.clone());
        let mut order =
            Order::new("T-1").with_line(OrderLine::new("a", Money::from_cents(10000), "standard", 1));
        order.lines[0].items[0].push_adjustment(Adjustment::promotion(
            "PROMOTION:p",
            "10 off",
            Money::from_cents(-1000),
        ));

        apply_taxes(&mut order, &zone("uk"), rates.as_ref(), &calculator, &ctx(false))
            .await
            .unwrap();

        assert_eq!(order.lines[0].line_tax().cents(), 1800);
    }

    #[tokio::test]
    async fn test_rerun_replaces_tax() {
        let rates = Arc::new(FlatRate(Some(Rate::from_percent(20))));
        let calculator = DefaultTaxCalculator::new(rates.clone());
        let mut order =
            Order::new("T-1").with_line(OrderLine::new("a", Money::from_cents(5000), "standard", 1));

        for _ in 0..2 {
            apply_taxes(&mut order, &zone("uk"), rates.as_ref(), &calculator, &ctx(false))
                .await
                .unwrap();
        }

        assert_eq!(order.lines[0].items[0].adjustments().len(), 1);
        assert_eq!(order.sub_total.cents(), 6000);
    }

    #[tokio::test]
    async fn test_missing_rate_is_zero() {
        let rates = Arc::new(FlatRate(None));
        let calculator = DefaultTaxCalculator::new(rates.clone());
        let mut order =
            Order::new("T-1").with_line(OrderLine::new("a", Money::from_cents(5000), "exempt", 1));

        apply_taxes(&mut order, &zone("uk"), rates.as_ref(), &calculator, &ctx(false))
            .await
            .unwrap();

        assert!(order.lines[0].items[0].adjustments().is_empty());
        assert!(order.lines[0].tax_rate.is_zero());
        assert_eq!(order.sub_total.cents(), 5000);
    }

    #[tokio::test]
    async fn test_inclusive_channel_extracts_tax() {
        let rates = Arc::new(FlatRate(Some(Rate::from_percent(20))));
        let calculator = DefaultTaxCalculator::new(rates.clone());
        let mut order =
            Order::new("T-1").with_line(OrderLine::new("a", Money::from_cents(1200), "standard", 1));

        apply_taxes(&mut order, &zone("uk"), rates.as_ref(), &calculator, &ctx(true))
            .await
            .unwrap();

        let line = &order.lines[0];
        assert!(line.price_includes_tax);
        assert_eq!(line.unit_price_without_tax.cents(), 1000);
        assert!(line.items[0].adjustments().is_empty());
        assert_eq!(order.sub_total.cents(), 1200);
        assert_eq!(order.sub_total_before_tax.cents(), 1000);
    }

    #[tokio::test]
    async fn test_inclusive_channel_foreign_zone_regrosses() {
        let calculator = DefaultTaxCalculator::new(Arc::new(ByZone));

        let taxed = calculator
            .calculate(Money::from_cents(1200), "standard", &zone("eu"), &ctx(true))
            .await
            .unwrap();

        assert!(!taxed.price_includes_tax);
        assert_eq!(taxed.price_without_tax.cents(), 1000);
        assert_eq!(taxed.price_with_tax.cents(), 1100);
    }

    #[tokio::test]
    async fn test_foreign_zone_taxes_net_price() {
        let calculator = DefaultTaxCalculator::new(Arc::new(ByZone));
        let mut order =
            Order::new("T-1").with_line(OrderLine::new("a", Money::from_cents(1200), "standard", 1));

        for _ in 0..2 {
            apply_taxes(&mut order, &zone("eu"), &ByZone, &calculator, &ctx(true))
                .await
                .unwrap();
        }

        let line = &order.lines[0];
        assert_eq!(line.unit_price.cents(), 1200);
        assert_eq!(line.items[0].unit_price.cents(), 1000);
        assert_eq!(line.line_tax().cents(), 100);
        assert_eq!(order.sub_total.cents(), 1100);
        assert_eq!(order.sub_total_before_tax.cents(), 1000);
    }

    #[tokio::test]
    async fn test_resolver_failure_propagates() {
        let calculator = DefaultTaxCalculator::new(Arc::new(Failing));
        let mut order =
            Order::new("T-1").with_line(OrderLine::new("a", Money::from_cents(5000), "standard", 1));

        let result = apply_taxes(&mut order, &zone("uk"), &Failing, &calculator, &ctx(false)).await;

        assert!(matches!(result, Err(PricingError::Collaborator { .. })));
    }
}
