//! Pipeline run audit log
//!
//! Every job writes exactly one `pipeline_run_log` row per invocation through
//! [`RunLogger`]. A failed audit write is logged and swallowed so it can never
//! change the outcome of the run it describes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use paybench_common::types::PipelineRunRecord;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};

/// Persistence for audit rows
#[async_trait]
pub trait RunLogStore: Send + Sync {
    /// Insert one audit row and return its id
    async fn insert_run(&self, run: &PipelineRunRecord) -> Result<i64>;
}

#[async_trait]
impl<T: RunLogStore + ?Sized> RunLogStore for Arc<T> {
    async fn insert_run(&self, run: &PipelineRunRecord) -> Result<i64> {
        (**self).insert_run(run).await
    }
}

/// `pipeline_run_log` in Postgres
#[derive(Clone)]
pub struct PgRunLogStore {
    db: PgPool,
}

impl PgRunLogStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RunLogStore for PgRunLogStore {
    async fn insert_run(&self, run: &PipelineRunRecord) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO pipeline_run_log (
                pipeline_type, status,
                records_requested, records_received, records_written,
                discrepancy_flag, error_message,
                run_duration_seconds, run_timestamp
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8::numeric, $9)
            RETURNING run_id
            "#,
        )
        .bind(run.pipeline_type.as_str())
        .bind(run.status.as_str())
        .bind(run.records_requested)
        .bind(run.records_received)
        .bind(run.records_written)
        .bind(run.discrepancy_flag())
        .bind(run.error_message.as_deref())
        .bind(run.run_duration_seconds)
        .bind(run.run_timestamp)
        .fetch_one(&self.db)
        .await
        .context("Failed to insert pipeline_run_log row")?;

        Ok(id)
    }
}

/// Writes audit rows and never fails
pub struct RunLogger<S> {
    store: S,
}

impl<S: RunLogStore> RunLogger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Attempt to persist `run`; returns the new row id when the write succeeded.
    pub async fn record(&self, run: &PipelineRunRecord) -> Option<i64> {
        match self.store.insert_run(run).await {
            Ok(id) => {
                info!(
                    run_id = id,
                    pipeline_type = %run.pipeline_type,
                    status = %run.status,
                    requested = run.records_requested,
                    received = run.records_received,
                    written = run.records_written,
                    discrepancy = run.discrepancy_flag(),
                    "Pipeline run logged"
                );
                Some(id)
            },
            Err(e) => {
                warn!(
                    error = %format!("{:#}", e),
                    pipeline_type = %run.pipeline_type,
                    "Could not write to pipeline_run_log"
                );
                None
            },
        }
    }
}
