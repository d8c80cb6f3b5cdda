//! # Tax Rate Repository
//!
//! Tax categories and the rate each zone charges for them.
//!
//! ```text
//! (zone_id, category_id) ──► tax_rates (UNIQUE) ──► TaxRate { rate: Rate(bps) }
//!                                 │
//!                                 └── enabled = 0 → treated as no rate
//! ```

use sqlx::{FromRow, SqlitePool};
use tally_core::{Rate, TaxCategory, TaxRate};
use tracing::debug;

use crate::error::{DbError, DbResult};

#[derive(Debug, FromRow)]
struct TaxRateRow {
    id: String,
    name: String,
    zone_id: String,
    category_id: String,
    rate_bps: i64,
}

impl TryFrom<TaxRateRow> for TaxRate {
    type Error = DbError;

    fn try_from(row: TaxRateRow) -> DbResult<Self> {
        let bps = u32::try_from(row.rate_bps)
            .map_err(|_| DbError::invalid_data("rate_bps", row.rate_bps))?;
        Ok(TaxRate {
            id: row.id,
            name: row.name,
            zone_id: row.zone_id,
            category_id: row.category_id,
            rate: Rate::from_bps(bps),
        })
    }
}

/// Repository for tax categories and rates.
#[derive(Debug, Clone)]
pub struct TaxRateRepository {
    pool: SqlitePool,
}

impl TaxRateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TaxRateRepository { pool }
    }

    /// The enabled rate for a zone and category, if any.
    pub async fn applicable(&self, zone_id: &str, category_id: &str) -> DbResult<Option<TaxRate>> {
        let row: Option<TaxRateRow> = sqlx::query_as(
            r#"
            SELECT id, name, zone_id, category_id, rate_bps
            FROM tax_rates
            WHERE zone_id = ?1 AND category_id = ?2 AND enabled = 1
            "#,
        )
        .bind(zone_id)
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await?;

        debug!(zone = %zone_id, category = %category_id, found = row.is_some(), "Tax rate lookup");

        row.map(TaxRate::try_from).transpose()
    }

    pub async fn insert_category(&self, category: &TaxCategory) -> DbResult<()> {
        sqlx::query("INSERT INTO tax_categories (id, name) VALUES (?1, ?2)")
            .bind(&category.id)
            .bind(&category.name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn insert(&self, rate: &TaxRate) -> DbResult<()> {
        debug!(id = %rate.id, bps = rate.rate.bps(), "Inserting tax rate");

        sqlx::query(
            r#"
            INSERT INTO tax_rates (id, name, zone_id, category_id, rate_bps)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&rate.id)
        .bind(&rate.name)
        .bind(&rate.zone_id)
        .bind(&rate.category_id)
        .bind(i64::from(rate.rate.bps()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use tally_core::Zone;

    async fn seeded() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.zones()
            .insert(&Zone {
                id: "uk".to_string(),
                name: "United Kingdom".to_string(),
                members: vec!["GB".to_string()],
            })
            .await
            .unwrap();
        db.tax_rates()
            .insert_category(&TaxCategory {
                id: "standard".to_string(),
                name: "Standard".to_string(),
            })
            .await
            .unwrap();
        db
    }

    fn rate(id: &str, bps: u32) -> TaxRate {
        TaxRate {
            id: id.to_string(),
            name: "UK standard".to_string(),
            zone_id: "uk".to_string(),
            category_id: "standard".to_string(),
            rate: Rate::from_bps(bps),
        }
    }

    #[tokio::test]
    async fn test_applicable_rate() {
        let db = seeded().await;
        let repo = db.tax_rates();
        repo.insert(&rate("uk-standard", 2000)).await.unwrap();

        let found = repo.applicable("uk", "standard").await.unwrap().unwrap();
        assert_eq!(found.rate, Rate::from_percent(20));
        assert!(repo.applicable("uk", "reduced").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_disabled_rate_is_not_applicable() {
        let db = seeded().await;
        let repo = db.tax_rates();
        repo.insert(&rate("uk-standard", 2000)).await.unwrap();

        sqlx::query("UPDATE tax_rates SET enabled = 0 WHERE id = ?1")
            .bind("uk-standard")
            .execute(db.pool())
            .await
            .unwrap();

        assert!(repo.applicable("uk", "standard").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rate_above_full_rejected() {
        let db = seeded().await;

        let result = db.tax_rates().insert(&rate("uk-bad", 10_001)).await;

        assert!(matches!(result, Err(DbError::CheckViolation { .. })));
    }

    #[tokio::test]
    async fn test_rate_for_unknown_zone_rejected() {
        let db = seeded().await;
        let mut orphan = rate("xx-standard", 500);
        orphan.zone_id = "xx".to_string();

        let result = db.tax_rates().insert(&orphan).await;

        assert!(matches!(result, Err(DbError::ForeignKeyViolation { .. })));
    }
}
