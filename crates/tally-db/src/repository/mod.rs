//! # Repository Module
//!
//! One repository per catalog concern. Each wraps a pooled `SqlitePool`
//! handle and returns tally-core types; row structs stay private.
//!
//! ## Available Repositories
//!
//! - [`zone::ZoneRepository`] - Zones and their member countries
//! - [`tax_rate::TaxRateRepository`] - Tax categories and (zone, category) rates
//! - [`shipping::ShippingRepository`] - Shipping methods and eligibility
//! - [`variant::VariantRepository`] - Products, variants and facet tags

pub mod shipping;
pub mod tax_rate;
pub mod variant;
pub mod zone;
