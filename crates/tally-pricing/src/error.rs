//! # Pricing Error Types
//!
//! Only *failures* become errors. Resolution misses (no tax rate, no
//! eligible shipping method, unknown variant) are policy and degrade to a
//! zero contribution inside the passes.
//!
//! ## Error Flow
//! ```text
//! Collaborator (db, http, ...) error
//!      │  PricingError::collaborator("tax rates", err)
//!      ▼
//! PricingError ──► pipeline aborts, order keeps its last consistent state
//!      │
//!      ▼
//! Caller re-runs from a clean snapshot (no partial totals are final)
//! ```

use tally_core::{CoreError, ValidationError};
use thiserror::Error;

/// Errors raised while pricing an order.
#[derive(Debug, Error)]
pub enum PricingError {
    /// An external collaborator failed (lookup threw, provider unreachable).
    #[error("{collaborator} failed: {message}")]
    Collaborator {
        collaborator: &'static str,
        message: String,
    },

    /// The order or promotion set was rejected before pricing started.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl PricingError {
    /// Wraps any displayable collaborator failure.
    pub fn collaborator(collaborator: &'static str, err: impl std::fmt::Display) -> Self {
        PricingError::Collaborator {
            collaborator,
            message: err.to_string(),
        }
    }
}

impl From<ValidationError> for PricingError {
    fn from(err: ValidationError) -> Self {
        PricingError::Core(CoreError::Validation(err))
    }
}

/// Result type for pricing operations.
pub type PricingResult<T> = Result<T, PricingError>;
