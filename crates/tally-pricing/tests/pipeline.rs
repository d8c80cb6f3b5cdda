//! End-to-end pipeline behavior over in-memory collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tally_core::{
    AdjustmentKind, Channel, CoreError, Money, Order, OrderLine, Promotion, PromotionAction,
    PromotionCondition, Rate, ShippingMethod, ShippingQuote, TaxRate, VariantClassification, Zone,
};
use tally_pricing::{
    CatalogOracle, PricingError, PricingPipeline, PricingResult, RequestContext,
    ShippingCountryZoneStrategy, ShippingQuoter, TaxRateResolver, VariantLookup, ZoneProvider,
};

// =============================================================================
// Fakes
// =============================================================================

struct StaticZones(Vec<Zone>);

#[async_trait]
impl ZoneProvider for StaticZones {
    async fn zones(&self, _ctx: &RequestContext) -> PricingResult<Vec<Zone>> {
        Ok(self.0.clone())
    }
}

/// Rates keyed by (zone id, category).
struct RateTable(HashMap<(String, String), Rate>);

#[async_trait]
impl TaxRateResolver for RateTable {
    async fn applicable_rate(&self, zone: &Zone, category: &str) -> PricingResult<Option<TaxRate>> {
        let key = (zone.id.clone(), category.to_string());
        Ok(self.0.get(&key).map(|rate| TaxRate {
            id: format!("{}-{}", zone.id, category),
            name: format!("{} {}", zone.name, category),
            zone_id: zone.id.clone(),
            category_id: category.to_string(),
            rate: *rate,
        }))
    }
}

struct Quotes {
    quotes: Vec<ShippingQuote>,
    fail: AtomicBool,
}

#[async_trait]
impl ShippingQuoter for Quotes {
    async fn eligible_quotes(
        &self,
        _ctx: &RequestContext,
        _order: &Order,
    ) -> PricingResult<Vec<ShippingQuote>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PricingError::collaborator("shipping quotes", "carrier offline"));
        }
        Ok(self.quotes.clone())
    }
}

struct Catalog(HashMap<String, VariantClassification>);

#[async_trait]
impl VariantLookup for Catalog {
    async fn classification(
        &self,
        variant_id: &str,
    ) -> PricingResult<Option<VariantClassification>> {
        Ok(self.0.get(variant_id).cloned())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

fn zone(id: &str, members: &[&str]) -> Zone {
    Zone {
        id: id.to_string(),
        name: id.to_uppercase(),
        members: members.iter().map(|m| m.to_string()).collect(),
    }
}

fn channel() -> Channel {
    Channel {
        code: "web".to_string(),
        default_tax_zone: zone("uk", &["GB"]),
        prices_include_tax: false,
    }
}

fn quote(id: &str, cents: i64) -> ShippingQuote {
    ShippingQuote {
        method: ShippingMethod {
            id: id.to_string(),
            code: id.to_string(),
            name: id.to_uppercase(),
        },
        price: Money::from_cents(cents),
    }
}

struct Harness {
    pipeline: PricingPipeline,
    shipping: Arc<Quotes>,
}

fn harness() -> Harness {
    let zones = Arc::new(StaticZones(vec![zone("uk", &["GB"]), zone("eu", &["DE", "FR"])]));

    let mut rates = HashMap::new();
    rates.insert(("uk".to_string(), "standard".to_string()), Rate::from_percent(20));
    rates.insert(("eu".to_string(), "standard".to_string()), Rate::from_percent(10));
    let rates = Arc::new(RateTable(rates));

    let shipping = Arc::new(Quotes {
        quotes: vec![quote("standard", 500), quote("express", 1500)],
        fail: AtomicBool::new(false),
    });

    let mut catalog = HashMap::new();
    catalog.insert(
        "tee".to_string(),
        VariantClassification {
            product_facets: vec!["apparel".to_string()],
            variant_facets: vec!["red".to_string()],
        },
    );
    let oracle = Arc::new(CatalogOracle::new(Arc::new(Catalog(catalog))));

    let pipeline = PricingPipeline::new(zones, rates, shipping.clone(), oracle);
    Harness { pipeline, shipping }
}

fn promotion(
    id: &str,
    conditions: Vec<PromotionCondition>,
    actions: Vec<PromotionAction>,
) -> Promotion {
    Promotion {
        id: id.to_string(),
        name: id.to_string(),
        enabled: true,
        coupon_code: None,
        starts_at: None,
        ends_at: None,
        conditions,
        actions,
    }
}

fn fixed_item(cents: i64) -> PromotionAction {
    PromotionAction::ItemFixedDiscount {
        amount: Money::from_cents(cents),
        variant_ids: vec![],
    }
}

fn single_line(variant: &str, cents: i64, quantity: usize) -> Order {
    Order::new("T-1").with_line(OrderLine::new(
        variant,
        Money::from_cents(cents),
        "standard",
        quantity,
    ))
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_empty_order_prices_to_zero() {
    let h = harness();
    let ctx = RequestContext::new(channel());
    let mut order = Order::new("EMPTY");
    order.sub_total = Money::from_cents(4200);
    order.shipping_cost = Money::from_cents(700);

    h.pipeline
        .apply_price_adjustments(&ctx, &mut order, &[])
        .await
        .unwrap();

    assert!(order.sub_total.is_zero());
    assert!(order.sub_total_before_tax.is_zero());
    assert_eq!(order.shipping_cost.cents(), 700);
}

#[tokio::test]
async fn test_single_line_scenario() {
    let h = harness();
    let ctx = RequestContext::new(channel());
    let mut order = single_line("mug", 5000, 2);

    let priced = h
        .pipeline
        .apply_price_adjustments(&ctx, &mut order, &[])
        .await
        .unwrap();

    assert_eq!(priced.lines[0].line_tax().cents(), 2000);
    assert_eq!(priced.sub_total.cents(), 12000);
    assert_eq!(priced.sub_total_before_tax.cents(), 10000);
    assert_eq!(priced.shipping_cost.cents(), 500);
    assert_eq!(priced.total().cents(), 12500);
}

#[tokio::test]
async fn test_tax_is_charged_on_promoted_price() {
    let h = harness();
    let ctx = RequestContext::new(channel());
    let mut order = single_line("mug", 10000, 1);
    let promotions = vec![promotion("ten-off", vec![], vec![fixed_item(1000)])];

    h.pipeline
        .apply_price_adjustments(&ctx, &mut order, &promotions)
        .await
        .unwrap();

    let item = &order.lines[0].items[0];
    assert_eq!(item.adjustment_total(AdjustmentKind::Tax).cents(), 1800);
    assert_eq!(order.sub_total.cents(), 10800);
}

#[tokio::test]
async fn test_promotion_rechecked_before_apply() {
    let h = harness();
    let ctx = RequestContext::new(channel());
    // 55.00 net, 66.00 with tax; the 10.00 discount drops the net below 50.00.
    let mut order = single_line("mug", 5500, 1);
    let promotions = vec![
        promotion("ten-off", vec![], vec![fixed_item(1000)]),
        promotion(
            "over-50",
            vec![PromotionCondition::MinimumOrderAmount {
                amount: Money::from_cents(5000),
                tax_inclusive: false,
            }],
            vec![fixed_item(500)],
        ),
    ];

    h.pipeline
        .apply_price_adjustments(&ctx, &mut order, &promotions)
        .await
        .unwrap();

    let sources: Vec<&str> = order.lines[0].items[0]
        .adjustments()
        .iter()
        .filter(|a| a.kind == AdjustmentKind::Promotion)
        .map(|a| a.source.as_str())
        .collect();
    assert_eq!(sources, vec!["PROMOTION:ten-off"]);
    assert_eq!(order.sub_total_before_tax.cents(), 4500);
}

#[tokio::test]
async fn test_pricing_is_idempotent() {
    let h = harness();
    let ctx = RequestContext::new(channel());
    let mut order = single_line("tee", 2500, 3);
    let promotions = vec![
        promotion(
            "apparel",
            vec![PromotionCondition::HasFacetValues {
                facets: vec!["apparel".to_string()],
                minimum: 2,
            }],
            vec![PromotionAction::ItemPercentageDiscount {
                percent: Rate::from_percent(10),
                variant_ids: vec![],
            }],
        ),
        promotion(
            "order-five",
            vec![],
            vec![PromotionAction::OrderFixedDiscount {
                amount: Money::from_cents(500),
            }],
        ),
    ];

    h.pipeline
        .apply_price_adjustments(&ctx, &mut order, &promotions)
        .await
        .unwrap();
    let first = order.clone();

    h.pipeline
        .apply_price_adjustments(&ctx, &mut order, &promotions)
        .await
        .unwrap();

    assert_eq!(order, first);
    assert_eq!(order.lines[0].discount_total().cents(), -750);
    assert_eq!(order.adjustment_total(AdjustmentKind::Promotion).cents(), -500);
}

#[tokio::test]
async fn test_facet_promotion_skips_unknown_variant() {
    let h = harness();
    let ctx = RequestContext::new(channel());
    let mut order = single_line("ghost", 2000, 1);
    let promotions = vec![promotion(
        "apparel",
        vec![PromotionCondition::HasFacetValues {
            facets: vec!["apparel".to_string()],
            minimum: 1,
        }],
        vec![fixed_item(500)],
    )];

    h.pipeline
        .apply_price_adjustments(&ctx, &mut order, &promotions)
        .await
        .unwrap();

    assert!(order.lines[0].discount_total().is_zero());
    assert_eq!(order.sub_total.cents(), 2400);
}

#[tokio::test]
async fn test_shipping_keeps_selected_method() {
    let h = harness();
    let ctx = RequestContext::new(channel());
    let mut order = single_line("mug", 1000, 1);
    order.shipping_method = Some("express".to_string());
    order.shipping_cost = Money::from_cents(900);

    h.pipeline
        .apply_price_adjustments(&ctx, &mut order, &[])
        .await
        .unwrap();

    assert_eq!(order.shipping_method.as_deref(), Some("express"));
    assert_eq!(order.shipping_cost.cents(), 1500);
}

#[tokio::test]
async fn test_shipping_country_zone_strategy() {
    let h = harness();
    let pipeline = h
        .pipeline
        .with_zone_strategy(Arc::new(ShippingCountryZoneStrategy));
    let ctx = RequestContext::new(channel());
    let mut order = single_line("mug", 10000, 1);
    order.shipping_country = Some("DE".to_string());

    pipeline
        .apply_price_adjustments(&ctx, &mut order, &[])
        .await
        .unwrap();

    assert_eq!(order.lines[0].tax_rate, Rate::from_percent(10));
    assert_eq!(order.sub_total.cents(), 11000);
}

#[tokio::test]
async fn test_inclusive_prices_regrossed_for_foreign_zone() {
    let h = harness();
    let pipeline = h
        .pipeline
        .with_zone_strategy(Arc::new(ShippingCountryZoneStrategy));
    let mut inclusive = channel();
    inclusive.prices_include_tax = true;
    let ctx = RequestContext::new(inclusive);
    // 12.00 includes UK 20%; shipped to DE it becomes 10.00 + 10%.
    let mut order = single_line("mug", 1200, 1);
    order.shipping_country = Some("DE".to_string());

    pipeline
        .apply_price_adjustments(&ctx, &mut order, &[])
        .await
        .unwrap();
    let first = order.clone();
    pipeline
        .apply_price_adjustments(&ctx, &mut order, &[])
        .await
        .unwrap();

    let line = &order.lines[0];
    assert!(!line.price_includes_tax);
    assert_eq!(line.unit_price_without_tax.cents(), 1000);
    assert_eq!(line.unit_price_with_tax.cents(), 1100);
    assert_eq!(line.line_tax().cents(), 100);
    assert_eq!(order.sub_total.cents(), 1100);
    assert_eq!(order.sub_total_before_tax.cents(), 1000);
    assert_eq!(order, first);
}

#[tokio::test]
async fn test_collaborator_failure_propagates() {
    let h = harness();
    h.shipping.fail.store(true, Ordering::SeqCst);
    let ctx = RequestContext::new(channel());
    let mut order = single_line("mug", 1000, 1);

    let result = h
        .pipeline
        .apply_price_adjustments(&ctx, &mut order, &[])
        .await;

    assert!(matches!(
        result,
        Err(PricingError::Collaborator {
            collaborator: "shipping quotes",
            ..
        })
    ));
    // Passes before shipping already ran.
    assert_eq!(order.sub_total.cents(), 1200);
}

#[tokio::test]
async fn test_invalid_promotions_rejected() {
    let h = harness();
    let ctx = RequestContext::new(channel());
    let mut order = single_line("mug", 1000, 1);
    let promotions = vec![
        promotion("dup", vec![], vec![fixed_item(100)]),
        promotion("dup", vec![], vec![fixed_item(200)]),
    ];

    let result = h
        .pipeline
        .apply_price_adjustments(&ctx, &mut order, &promotions)
        .await;

    assert!(matches!(
        result,
        Err(PricingError::Core(CoreError::DuplicatePromotion(_)))
    ));
    assert!(order.sub_total.is_zero());
}
