//! # tally-db: Catalog Storage for Tally
//!
//! SQLite reference data behind the pricing collaborators: zones, tax
//! rates, shipping methods, and the facet tags of products and variants.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  tally CLI adapters (ZoneProvider, TaxRateResolver, ShippingQuoter,    │
//! │                      VariantLookup)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tally-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ Zone TaxRate   │    │  (embedded)  │  │   │
//! │  │   │  SqlitePool   │    │ Shipping       │    │ 001_catalog  │  │   │
//! │  │   │               │    │ Variant        │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("tally.db")).await?;
//! let zones = db.zones().all().await?;
//! let rate = db.tax_rates().applicable("uk", "standard").await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::shipping::{ShippingMethodRecord, ShippingRepository};
pub use repository::tax_rate::TaxRateRepository;
pub use repository::variant::VariantRepository;
pub use repository::zone::ZoneRepository;
