//! Variant repository: products, variants and their facet tags.

use sqlx::SqlitePool;
use tally_core::VariantClassification;
use tracing::debug;

use crate::error::DbResult;

/// Repository for products and variants.
#[derive(Debug, Clone)]
pub struct VariantRepository {
    pool: SqlitePool,
}

impl VariantRepository {
    pub fn new(pool: SqlitePool) -> Self {
        VariantRepository { pool }
    }

    /// Facet tags of a variant and of its product, or `None` for an unknown
    /// variant.
    pub async fn classification(&self, variant_id: &str) -> DbResult<Option<VariantClassification>> {
        let product_id: Option<String> =
            sqlx::query_scalar("SELECT product_id FROM variants WHERE id = ?1")
                .bind(variant_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(product_id) = product_id else {
            debug!(variant = %variant_id, "Variant not found");
            return Ok(None);
        };

        let product_facets: Vec<String> = sqlx::query_scalar(
            "SELECT facet FROM product_facets WHERE product_id = ?1 ORDER BY facet",
        )
        .bind(&product_id)
        .fetch_all(&self.pool)
        .await?;

        let variant_facets: Vec<String> = sqlx::query_scalar(
            "SELECT facet FROM variant_facets WHERE variant_id = ?1 ORDER BY facet",
        )
        .bind(variant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(VariantClassification {
            product_facets,
            variant_facets,
        }))
    }

    /// Inserts a product with its facet tags.
    pub async fn insert_product(&self, id: &str, name: &str, facets: &[&str]) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO products (id, name) VALUES (?1, ?2)")
            .bind(id)
            .bind(name)
            .execute(&mut *tx)
            .await?;

        for facet in facets {
            sqlx::query("INSERT INTO product_facets (product_id, facet) VALUES (?1, ?2)")
                .bind(id)
                .bind(*facet)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Inserts a variant of an existing product with its own facet tags.
    pub async fn insert_variant(
        &self,
        id: &str,
        product_id: &str,
        sku: &str,
        name: &str,
        facets: &[&str],
    ) -> DbResult<()> {
        debug!(id = %id, sku = %sku, "Inserting variant");

        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO variants (id, product_id, sku, name) VALUES (?1, ?2, ?3, ?4)")
            .bind(id)
            .bind(product_id)
            .bind(sku)
            .bind(name)
            .execute(&mut *tx)
            .await?;

        for facet in facets {
            sqlx::query("INSERT INTO variant_facets (variant_id, facet) VALUES (?1, ?2)")
                .bind(id)
                .bind(*facet)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM variants")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
