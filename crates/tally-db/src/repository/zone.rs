//! Zone repository: zones and the countries they contain.

use std::collections::HashMap;

use sqlx::{FromRow, SqlitePool};
use tally_core::Zone;
use tracing::debug;

use crate::error::DbResult;

#[derive(Debug, FromRow)]
struct ZoneRow {
    id: String,
    name: String,
}

#[derive(Debug, FromRow)]
struct MemberRow {
    zone_id: String,
    country_code: String,
}

/// Repository for zones.
#[derive(Debug, Clone)]
pub struct ZoneRepository {
    pool: SqlitePool,
}

impl ZoneRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ZoneRepository { pool }
    }

    /// Every zone with its members, ordered by name.
    pub async fn all(&self) -> DbResult<Vec<Zone>> {
        let zones: Vec<ZoneRow> = sqlx::query_as("SELECT id, name FROM zones ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        let members: Vec<MemberRow> = sqlx::query_as(
            "SELECT zone_id, country_code FROM zone_members ORDER BY country_code",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_zone: HashMap<String, Vec<String>> = HashMap::new();
        for member in members {
            by_zone
                .entry(member.zone_id)
                .or_default()
                .push(member.country_code);
        }

        debug!(count = zones.len(), "Loaded zones");

        Ok(zones
            .into_iter()
            .map(|row| Zone {
                members: by_zone.remove(&row.id).unwrap_or_default(),
                id: row.id,
                name: row.name,
            })
            .collect())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Zone>> {
        let row: Option<ZoneRow> = sqlx::query_as("SELECT id, name FROM zones WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let members: Vec<String> = sqlx::query_scalar(
            "SELECT country_code FROM zone_members WHERE zone_id = ?1 ORDER BY country_code",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Zone {
            id: row.id,
            name: row.name,
            members,
        }))
    }

    /// Inserts a zone and its members in one transaction.
    pub async fn insert(&self, zone: &Zone) -> DbResult<()> {
        debug!(id = %zone.id, members = zone.members.len(), "Inserting zone");

        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO zones (id, name) VALUES (?1, ?2)")
            .bind(&zone.id)
            .bind(&zone.name)
            .execute(&mut *tx)
            .await?;

        for country in &zone.members {
            sqlx::query("INSERT INTO zone_members (zone_id, country_code) VALUES (?1, ?2)")
                .bind(&zone.id)
                .bind(country.to_uppercase())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM zones")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
