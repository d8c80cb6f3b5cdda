//! # Domain Types
//!
//! Reference data the pricing pipeline reads but never mutates.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Reference Types                                 │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Rate       │   │      Zone       │   │    Channel      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  id             │   │  code           │       │
//! │  │  2000 = 20%     │   │  members (ISO)  │   │  default zone   │       │
//! │  └─────────────────┘   └─────────────────┘   │  incl. tax flag │       │
//! │                                              └─────────────────┘       │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │ ShippingMethod  │   │ ShippingQuote   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  zone × category│   │  id, code, name │   │  method + price │       │
//! │  │  apply(amount)  │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::order::Adjustment;

// =============================================================================
// Rate
// =============================================================================

/// A proportional rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000. Used for tax rates and percentage
/// discounts alike, so neither ever touches floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a whole percentage (`20` → 20%).
    #[inline]
    pub const fn from_percent(percent: u32) -> Self {
        Rate(percent * 100)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    /// The full amount (100%).
    #[inline]
    pub const fn full() -> Self {
        Rate(10_000)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

// =============================================================================
// Tax Category / Tax Rate
// =============================================================================

/// Classification that selects which tax rate applies to a line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxCategory {
    pub id: String,
    pub name: String,
}

/// A tax rate for one (zone, tax category) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate {
    pub id: String,
    pub name: String,
    pub zone_id: String,
    pub category_id: String,
    pub rate: Rate,
}

impl TaxRate {
    /// Adjustment source tag for adjustments produced by this rate.
    pub fn source_id(&self) -> String {
        format!("TAX:{}", self.id)
    }

    /// Tax payable on a net amount.
    #[inline]
    pub fn tax_payable_on(&self, net: Money) -> Money {
        net.calculate_tax(self.rate)
    }

    /// Net amount contained in a gross amount.
    #[inline]
    pub fn net_price_of(&self, gross: Money) -> Money {
        gross.net_of(self.rate)
    }

    /// Gross amount for a net amount.
    #[inline]
    pub fn gross_price_of(&self, net: Money) -> Money {
        net + self.tax_payable_on(net)
    }

    /// Builds the TAX adjustment for a net amount.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    /// use tally_core::order::AdjustmentKind;
    /// use tally_core::types::{Rate, TaxRate};
    ///
    /// let standard = TaxRate {
    ///     id: "uk-standard".into(),
    ///     name: "Standard rate".into(),
    ///     zone_id: "uk".into(),
    ///     category_id: "standard".into(),
    ///     rate: Rate::from_percent(20),
    /// };
    ///
    /// let adjustment = standard.apply(Money::from_cents(9000));
    /// assert_eq!(adjustment.kind, AdjustmentKind::Tax);
    /// assert_eq!(adjustment.amount.cents(), 1800);
    /// ```
    pub fn apply(&self, net: Money) -> Adjustment {
        Adjustment::tax(self.source_id(), self.name.clone(), self.tax_payable_on(net))
    }
}

// =============================================================================
// Zone / Channel
// =============================================================================

/// A tax and shipping jurisdiction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Zone {
    pub id: String,
    pub name: String,
    /// ISO 3166-1 alpha-2 country codes belonging to this zone.
    #[serde(default)]
    pub members: Vec<String>,
}

impl Zone {
    /// Checks whether a country code belongs to this zone.
    pub fn contains_country(&self, country: &str) -> bool {
        self.members
            .iter()
            .any(|member| member.eq_ignore_ascii_case(country))
    }
}

/// The sales channel an order is placed through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Channel {
    pub code: String,
    pub default_tax_zone: Zone,
    /// Catalog prices already include the default zone's tax (EU/UK model).
    pub prices_include_tax: bool,
}

// =============================================================================
// Shipping
// =============================================================================

/// A way of delivering an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShippingMethod {
    pub id: String,
    pub code: String,
    pub name: String,
}

/// An eligible shipping method together with its price for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShippingQuote {
    pub method: ShippingMethod,
    pub price: Money,
}

// =============================================================================
// Catalog Classification
// =============================================================================

/// Facet tags attached to a product variant and to its parent product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantClassification {
    pub product_facets: Vec<String>,
    pub variant_facets: Vec<String>,
}

impl VariantClassification {
    /// True when the variant and its product together carry every tag.
    pub fn has_all(&self, facets: &[String]) -> bool {
        facets.iter().all(|facet| {
            self.variant_facets.iter().any(|tag| tag == facet)
                || self.product_facets.iter().any(|tag| tag == facet)
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
