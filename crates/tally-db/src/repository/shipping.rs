//! # Shipping Repository
//!
//! Flat-rate shipping methods with optional eligibility limits.
//!
//! ## Eligibility
//! ```text
//! enabled = 1
//! AND (zone_id IS NULL OR zone_id = active zone)
//! AND (min_order_cents IS NULL OR min_order_cents <= order sub total)
//! ORDER BY priority, code        ← first row is the default choice
//! ```

use sqlx::{FromRow, SqlitePool};
use tally_core::{Money, ShippingMethod, ShippingQuote};
use tracing::debug;

use crate::error::DbResult;

/// A stored shipping method with its price and limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingMethodRecord {
    pub method: ShippingMethod,
    pub price: Money,
    /// Minimum order sub total; `None` for no minimum.
    pub min_order_amount: Option<Money>,
    /// Zone restriction; `None` for every zone.
    pub zone_id: Option<String>,
    /// Lower sorts first.
    pub priority: i64,
    pub enabled: bool,
}

impl ShippingMethodRecord {
    /// Enabled, unrestricted method at priority 0.
    pub fn new(code: impl Into<String>, name: impl Into<String>, price: Money) -> Self {
        let code = code.into();
        ShippingMethodRecord {
            method: ShippingMethod {
                id: code.clone(),
                code,
                name: name.into(),
            },
            price,
            min_order_amount: None,
            zone_id: None,
            priority: 0,
            enabled: true,
        }
    }
}

#[derive(Debug, FromRow)]
struct QuoteRow {
    id: String,
    code: String,
    name: String,
    price_cents: i64,
}

impl From<QuoteRow> for ShippingQuote {
    fn from(row: QuoteRow) -> Self {
        ShippingQuote {
            method: ShippingMethod {
                id: row.id,
                code: row.code,
                name: row.name,
            },
            price: Money::from_cents(row.price_cents),
        }
    }
}

/// Repository for shipping methods.
#[derive(Debug, Clone)]
pub struct ShippingRepository {
    pool: SqlitePool,
}

impl ShippingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ShippingRepository { pool }
    }

    /// Quotes for every method eligible in `zone_id` at `sub_total`, in
    /// priority order.
    pub async fn eligible_quotes(
        &self,
        zone_id: &str,
        sub_total: Money,
    ) -> DbResult<Vec<ShippingQuote>> {
        let rows: Vec<QuoteRow> = sqlx::query_as(
            r#"
            SELECT id, code, name, price_cents
            FROM shipping_methods
            WHERE enabled = 1
              AND (zone_id IS NULL OR zone_id = ?1)
              AND (min_order_cents IS NULL OR min_order_cents <= ?2)
            ORDER BY priority, code
            "#,
        )
        .bind(zone_id)
        .bind(sub_total.cents())
        .fetch_all(&self.pool)
        .await?;

        debug!(zone = %zone_id, sub_total = %sub_total, count = rows.len(), "Eligible shipping methods");

        Ok(rows.into_iter().map(ShippingQuote::from).collect())
    }

    pub async fn insert(&self, record: &ShippingMethodRecord) -> DbResult<()> {
        debug!(code = %record.method.code, "Inserting shipping method");

        sqlx::query(
            r#"
            INSERT INTO shipping_methods (
                id, code, name, price_cents, min_order_cents, zone_id, priority, enabled
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&record.method.id)
        .bind(&record.method.code)
        .bind(&record.method.name)
        .bind(record.price.cents())
        .bind(record.min_order_amount.map(|m| m.cents()))
        .bind(record.zone_id.as_deref())
        .bind(record.priority)
        .bind(record.enabled)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shipping_methods")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
