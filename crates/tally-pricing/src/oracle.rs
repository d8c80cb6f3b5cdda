//! # Promotion Eligibility Oracle
//!
//! Answers the catalog questions a promotion condition cannot answer from
//! the order alone. The oracle is passed explicitly to every eligibility
//! test; nothing is looked up through ambient state.

use std::sync::Arc;

use async_trait::async_trait;
use tally_core::OrderLine;
use tracing::warn;

use crate::collaborators::VariantLookup;
use crate::error::PricingResult;

/// Data-dependent questions asked while testing promotions.
#[async_trait]
pub trait EligibilityOracle: Send + Sync {
    /// True when the line's variant and its product together carry every
    /// listed facet. An unknown variant is `false`, not an error.
    async fn has_facet_values(&self, line: &OrderLine, facets: &[String]) -> PricingResult<bool>;
}

/// Oracle backed by a catalog variant lookup.
#[derive(Clone)]
pub struct CatalogOracle {
    variants: Arc<dyn VariantLookup>,
}

impl CatalogOracle {
    pub fn new(variants: Arc<dyn VariantLookup>) -> Self {
        CatalogOracle { variants }
    }
}

#[async_trait]
impl EligibilityOracle for CatalogOracle {
    async fn has_facet_values(&self, line: &OrderLine, facets: &[String]) -> PricingResult<bool> {
        match self.variants.classification(&line.variant_id).await? {
            Some(classification) => Ok(classification.has_all(facets)),
            None => {
                warn!(variant = %line.variant_id, "Variant not found, facet check fails");
                Ok(false)
            }
        }
    }
}
