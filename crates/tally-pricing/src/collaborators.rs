//! # Collaborator Traits
//!
//! Everything the pipeline needs from outside the order, expressed as the
//! narrowest interface the passes consume.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Trait              Called by            Cadence                        │
//! │  ─────────────────  ───────────────────  ─────────────────────────────  │
//! │  ZoneProvider       pipeline             once per run                   │
//! │  ZoneStrategy       pipeline             once per run (sync)            │
//! │  TaxRateResolver    tax pass             once per line per tax pass     │
//! │  TaxCalculator      tax pass             once per line per tax pass     │
//! │  ShippingQuoter     shipping pass        once per run                   │
//! │  VariantLookup      CatalogOracle        per facet condition per line   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Implementations return `Ok(None)` / an empty list for a *miss* and `Err`
//! only for a genuine failure; the passes rely on that distinction.

use async_trait::async_trait;
use tally_core::{Channel, Money, Order, ShippingQuote, TaxRate, VariantClassification, Zone};

use crate::context::RequestContext;
use crate::error::PricingResult;

/// Source of every known zone.
#[async_trait]
pub trait ZoneProvider: Send + Sync {
    async fn zones(&self, ctx: &RequestContext) -> PricingResult<Vec<Zone>>;
}

/// Picks the active tax zone for an order.
pub trait ZoneStrategy: Send + Sync {
    fn determine_tax_zone(&self, zones: &[Zone], channel: &Channel, order: &Order) -> Zone;
}

/// Finds the tax rate for a (zone, tax category) pair.
#[async_trait]
pub trait TaxRateResolver: Send + Sync {
    async fn applicable_rate(&self, zone: &Zone, category: &str) -> PricingResult<Option<TaxRate>>;
}

/// Price variants produced by a [`TaxCalculator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxedPrice {
    /// The stored unit price already contains tax for the active zone.
    pub price_includes_tax: bool,
    pub price_with_tax: Money,
    pub price_without_tax: Money,
}

/// Interprets a catalog price for the active zone.
#[async_trait]
pub trait TaxCalculator: Send + Sync {
    async fn calculate(
        &self,
        unit_price: Money,
        category: &str,
        zone: &Zone,
        ctx: &RequestContext,
    ) -> PricingResult<TaxedPrice>;
}

/// Quotes every shipping method currently eligible for an order.
///
/// The returned order is the provider's priority order.
#[async_trait]
pub trait ShippingQuoter: Send + Sync {
    async fn eligible_quotes(
        &self,
        ctx: &RequestContext,
        order: &Order,
    ) -> PricingResult<Vec<ShippingQuote>>;
}

/// Catalog classification lookup used by the eligibility oracle.
#[async_trait]
pub trait VariantLookup: Send + Sync {
    async fn classification(&self, variant_id: &str)
        -> PricingResult<Option<VariantClassification>>;
}
