//! Storage for the wage pull: catalog reads and `bls_wage_data` inserts

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use super::models::{OccupationCode, WageRecord};

/// `data_source` tag for rows loaded by this pipeline
pub const BLS_DATA_SOURCE: &str = "BLS_OEWS";

#[async_trait]
pub trait WageStore: Send + Sync {
    /// Occupation catalog ordered by SOC code
    async fn fetch_catalog(&self) -> Result<Vec<OccupationCode>>;

    /// Insert records in one transaction, skipping existing keys.
    ///
    /// Returns the number of rows actually inserted. Any error rolls back
    /// the whole load.
    async fn insert_wage_records(&self, records: &[WageRecord]) -> Result<u64>;
}

#[async_trait]
impl<T: WageStore + ?Sized> WageStore for Arc<T> {
    async fn fetch_catalog(&self) -> Result<Vec<OccupationCode>> {
        (**self).fetch_catalog().await
    }

    async fn insert_wage_records(&self, records: &[WageRecord]) -> Result<u64> {
        (**self).insert_wage_records(records).await
    }
}

#[derive(Clone)]
pub struct PgWageStore {
    db: PgPool,
}

impl PgWageStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl WageStore for PgWageStore {
    async fn fetch_catalog(&self) -> Result<Vec<OccupationCode>> {
        let catalog = sqlx::query_as::<_, OccupationCode>(
            "SELECT soc_code, soc_title, used_by_families FROM soc_code_reference ORDER BY soc_code",
        )
        .fetch_all(&self.db)
        .await
        .context("Failed to read soc_code_reference")?;

        info!(count = catalog.len(), "Fetched SOC codes from soc_code_reference");
        Ok(catalog)
    }

    async fn insert_wage_records(&self, records: &[WageRecord]) -> Result<u64> {
        let mut tx = self.db.begin().await.context("Failed to begin transaction")?;
        let mut written = 0;

        for record in records {
            let result = sqlx::query(
                r#"
                INSERT INTO bls_wage_data (
                    soc_code, soc_title, msa_code, msa_name, reference_year,
                    annual_mean, pct_10, pct_25, pct_50, pct_75, pct_90,
                    data_source, pipeline_run_id
                )
                VALUES (
                    $1, $2, $3, $4, $5,
                    $6::numeric, $7::numeric, $8::numeric,
                    $9::numeric, $10::numeric, $11::numeric,
                    $12, NULL
                )
                ON CONFLICT (soc_code, msa_code, reference_year) DO NOTHING
                "#,
            )
            .bind(&record.soc_code)
            .bind(&record.soc_title)
            .bind(&record.msa_code)
            .bind(&record.msa_name)
            .bind(record.reference_year)
            .bind(record.annual_mean)
            .bind(record.pct_10)
            .bind(record.pct_25)
            .bind(record.pct_50)
            .bind(record.pct_75)
            .bind(record.pct_90)
            .bind(BLS_DATA_SOURCE)
            .execute(&mut *tx)
            .await
            .with_context(|| {
                format!(
                    "Failed to insert wage row ({}, {}, {})",
                    record.soc_code, record.msa_code, record.reference_year
                )
            })?;

            if result.rows_affected() == 1 {
                written += 1;
            }
        }

        tx.commit().await.context("Failed to commit wage load")?;

        Ok(written)
    }
}
