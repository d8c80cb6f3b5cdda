//! # tally-pricing: Order Pricing Pipeline
//!
//! Prices a [`tally_core::Order`] in place: taxes, promotions, taxes again on
//! the promoted prices, then shipping. Totals are refreshed after every
//! mutation so eligibility tests always see the current state.
//!
//! ## Modules
//!
//! - [`pipeline`] - `PricingPipeline::apply_price_adjustments`
//! - [`tax`] - Tax pass and the default tax calculator
//! - [`promotions`] - Item and order promotion pass
//! - [`eligibility`] - Async `test(order, oracle, ctx)` for promotions
//! - [`oracle`] - Eligibility oracle over the catalog
//! - [`shipping`] - Shipping method selection
//! - [`zone`] - Active tax zone strategies
//! - [`collaborators`] - Traits implemented by storage / service adapters
//!
//! ## Wiring
//!
//! ```rust,ignore
//! let pipeline = PricingPipeline::new(zones, tax_rates, shipping, Arc::new(CatalogOracle::new(variants)))
//!     .with_zone_strategy(Arc::new(ShippingCountryZoneStrategy));
//!
//! let ctx = RequestContext::new(channel);
//! pipeline.apply_price_adjustments(&ctx, &mut order, &promotions).await?;
//! ```

pub mod collaborators;
pub mod context;
pub mod eligibility;
pub mod error;
pub mod oracle;
pub mod pipeline;
pub mod promotions;
pub mod shipping;
pub mod tax;
pub mod zone;

pub use collaborators::{
    ShippingQuoter, TaxCalculator, TaxRateResolver, TaxedPrice, VariantLookup, ZoneProvider,
    ZoneStrategy,
};
pub use context::RequestContext;
pub use eligibility::{filter_eligible, PromotionTest};
pub use error::{PricingError, PricingResult};
pub use oracle::{CatalogOracle, EligibilityOracle};
pub use pipeline::PricingPipeline;
pub use tax::DefaultTaxCalculator;
pub use zone::{ChannelDefaultZoneStrategy, ShippingCountryZoneStrategy};
