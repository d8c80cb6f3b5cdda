//! # tally-core: Pure Pricing Domain for Tally
//!
//! The data the pricing pipeline works on, and every computation that can be
//! done without asking anyone else.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    tally CLI (apps/tally-cli)                    │   │
//! │  │    config ──► tracing ──► adapters over tally-db ──► price      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          tally-pricing (async pipeline, collaborator traits)    │   │
//! │  │    Tax Pass ─► Promotion Pass ─► Tax Pass ─► Shipping Pass      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   order   │  │   money   │  │ promotion │  │  totals   │  │   │
//! │  │   │ Order     │  │  Money    │  │ conditions│  │ aggregator│  │   │
//! │  │   │ Line/Item │  │  Rate     │  │ actions   │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO ASYNC • NO CLOCK • PURE FUNCTIONS                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`order`] - Order, OrderLine, OrderItem, Adjustment
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`types`] - Rates, zones, channels, shipping reference data
//! - [`promotion`] - Closed set of promotion conditions and actions
//! - [`totals`] - Totals aggregator
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::money::Money;
//! use tally_core::order::{Order, OrderLine};
//! use tally_core::totals::calculate_order_totals;
//!
//! let mut order = Order::new("T-1001")
//!     .with_line(OrderLine::new("mug-blue", Money::from_cents(1250), "standard", 2));
//!
//! calculate_order_totals(&mut order);
//! assert_eq!(order.sub_total.cents(), 2500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod order;
pub mod promotion;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order::{Adjustment, AdjustmentKind, Order, OrderItem, OrderLine};
pub use promotion::{Promotion, PromotionAction, PromotionCondition};
pub use totals::{calculate_order_totals, OrderTotals};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines accepted in a single order.
pub const MAX_ORDER_LINES: usize = 250;

/// Maximum quantity of a single line.
///
/// Each unit becomes an [`OrderItem`], so this also bounds per-line work in
/// every pass.
pub const MAX_ITEM_QUANTITY: usize = 999;
