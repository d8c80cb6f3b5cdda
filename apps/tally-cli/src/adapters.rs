//! # Catalog Adapters
//!
//! Implements the pricing collaborator traits over the SQLite catalog.
//!
//! ```text
//! PricingPipeline ──► ZoneProvider     ──► db.zones().all()
//!                 ──► TaxRateResolver  ──► db.tax_rates().applicable(zone, category)
//!                 ──► ShippingQuoter   ──► db.shipping().eligible_quotes(zone, sub_total)
//!                 ──► CatalogOracle ─► VariantLookup ──► db.variants().classification(id)
//! ```
//!
//! Database errors become `PricingError::Collaborator`; misses stay misses.

use std::sync::Arc;

use async_trait::async_trait;
use tally_core::{Order, ShippingQuote, TaxRate, VariantClassification, Zone};
use tally_db::Database;
use tally_pricing::{
    PricingError, PricingResult, RequestContext, ShippingQuoter, TaxRateResolver, VariantLookup,
    ZoneProvider, ZoneStrategy,
};

/// The catalog database seen through the pricing traits.
#[derive(Clone)]
pub struct DbCatalog {
    db: Database,
    /// Shipping eligibility is zone-dependent; quotes use the same zone the
    /// pipeline taxes in.
    zone_strategy: Arc<dyn ZoneStrategy>,
}

impl DbCatalog {
    pub fn new(db: Database, zone_strategy: Arc<dyn ZoneStrategy>) -> Self {
        DbCatalog { db, zone_strategy }
    }
}

#[async_trait]
impl ZoneProvider for DbCatalog {
    async fn zones(&self, _ctx: &RequestContext) -> PricingResult<Vec<Zone>> {
        self.db
            .zones()
            .all()
            .await
            .map_err(|e| PricingError::collaborator("zones", e))
    }
}

#[async_trait]
impl TaxRateResolver for DbCatalog {
    async fn applicable_rate(&self, zone: &Zone, category: &str) -> PricingResult<Option<TaxRate>> {
        self.db
            .tax_rates()
            .applicable(&zone.id, category)
            .await
            .map_err(|e| PricingError::collaborator("tax rates", e))
    }
}

#[async_trait]
impl ShippingQuoter for DbCatalog {
    async fn eligible_quotes(
        &self,
        ctx: &RequestContext,
        order: &Order,
    ) -> PricingResult<Vec<ShippingQuote>> {
        let zones = self.zones(ctx).await?;
        let zone = self
            .zone_strategy
            .determine_tax_zone(&zones, &ctx.channel, order);

        self.db
            .shipping()
            .eligible_quotes(&zone.id, order.sub_total)
            .await
            .map_err(|e| PricingError::collaborator("shipping quotes", e))
    }
}

#[async_trait]
impl VariantLookup for DbCatalog {
    async fn classification(
        &self,
        variant_id: &str,
    ) -> PricingResult<Option<VariantClassification>> {
        self.db
            .variants()
            .classification(variant_id)
            .await
            .map_err(|e| PricingError::collaborator("variants", e))
    }
}
