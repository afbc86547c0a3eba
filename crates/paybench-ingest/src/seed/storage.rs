//! Storage for reference seeding

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use super::data::{CrosswalkEntry, SocReference};

/// Rows inserted vs. already present for one table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedCounts {
    pub inserted: u64,
    pub skipped: u64,
}

impl SeedCounts {
    fn record(&mut self, rows_affected: u64) {
        if rows_affected == 1 {
            self.inserted += 1;
        } else {
            self.skipped += 1;
        }
    }
}

/// Insert-if-absent persistence for the reference tables.
///
/// Each call runs in its own transaction.
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    async fn insert_soc_codes(&self, rows: &[SocReference]) -> Result<SeedCounts>;

    async fn insert_crosswalk(&self, rows: &[CrosswalkEntry]) -> Result<SeedCounts>;
}

#[async_trait]
impl<T: ReferenceStore + ?Sized> ReferenceStore for Arc<T> {
    async fn insert_soc_codes(&self, rows: &[SocReference]) -> Result<SeedCounts> {
        (**self).insert_soc_codes(rows).await
    }

    async fn insert_crosswalk(&self, rows: &[CrosswalkEntry]) -> Result<SeedCounts> {
        (**self).insert_crosswalk(rows).await
    }
}

#[derive(Clone)]
pub struct PgReferenceStore {
    db: PgPool,
}

impl PgReferenceStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReferenceStore for PgReferenceStore {
    async fn insert_soc_codes(&self, rows: &[SocReference]) -> Result<SeedCounts> {
        let mut tx = self.db.begin().await.context("Failed to begin transaction")?;
        let mut counts = SeedCounts::default();

        for row in rows {
            let result = sqlx::query(
                r#"
                INSERT INTO soc_code_reference (
                    soc_code, soc_title, soc_major_group, used_by_families
                )
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (soc_code) DO NOTHING
                "#,
            )
            .bind(&row.soc_code)
            .bind(&row.soc_title)
            .bind(&row.soc_major_group)
            .bind(&row.used_by_families)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to insert SOC code {}", row.soc_code))?;

            counts.record(result.rows_affected());
        }

        tx.commit().await.context("Failed to commit soc_code_reference")?;
        Ok(counts)
    }

    async fn insert_crosswalk(&self, rows: &[CrosswalkEntry]) -> Result<SeedCounts> {
        let mut tx = self.db.begin().await.context("Failed to begin transaction")?;
        let mut counts = SeedCounts::default();

        for row in rows {
            let result = sqlx::query(
                r#"
                INSERT INTO job_soc_crosswalk (
                    crosswalk_id, job_family, technova_role_title,
                    job_level_applicability, soc_code, soc_title,
                    match_quality, match_notes,
                    pipeline_query_flag, naics_filter_recommended
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ON CONFLICT (crosswalk_id) DO NOTHING
                "#,
            )
            .bind(&row.crosswalk_id)
            .bind(&row.job_family)
            .bind(&row.technova_role_title)
            .bind(&row.job_level_applicability)
            .bind(&row.soc_code)
            .bind(&row.soc_title)
            .bind(row.match_quality.as_str())
            .bind(&row.match_notes)
            .bind(&row.pipeline_query_flag)
            .bind(row.naics_filter_recommended.as_deref())
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to insert crosswalk row {}", row.crosswalk_id))?;

            counts.record(result.rows_affected());
        }

        tx.commit().await.context("Failed to commit job_soc_crosswalk")?;
        Ok(counts)
    }
}
