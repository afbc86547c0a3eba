//! Reference seeding job

use anyhow::{Context, Result};
use paybench_common::types::{PipelineRunRecord, PipelineType, RunStatus};
use std::time::Instant;
use tracing::{error, info};

use super::data::ReferenceData;
use super::storage::{ReferenceStore, SeedCounts};
use crate::run_log::{RunLogStore, RunLogger};

#[derive(Debug, Clone)]
pub struct SeedReport {
    pub run: PipelineRunRecord,
    pub soc_codes: SeedCounts,
    pub crosswalk: SeedCounts,
    pub soc_codes_defined: usize,
    pub crosswalk_defined: usize,
}

impl SeedReport {
    pub fn is_success(&self) -> bool {
        self.run.status.is_success()
    }

    pub fn log_summary(&self) {
        info!("SEED SUMMARY");
        info!(
            "  soc_code_reference  : {:>3} inserted | {:>3} skipped | {:>3} total defined",
            self.soc_codes.inserted, self.soc_codes.skipped, self.soc_codes_defined
        );
        info!(
            "  job_soc_crosswalk   : {:>3} inserted | {:>3} skipped | {:>3} total defined",
            self.crosswalk.inserted, self.crosswalk.skipped, self.crosswalk_defined
        );
        info!("  Total rows inserted : {}", self.run.records_written);
        info!("  Duration            : {:.2}s", self.run.run_duration_seconds);
        info!("  Status              : {}", self.run.status);
        if let Some(message) = &self.run.error_message {
            error!("  Error               : {}", message);
        }
    }
}

/// Seeds `soc_code_reference`, then `job_soc_crosswalk`
pub struct SeedPipeline<R, L> {
    data: ReferenceData,
    store: R,
    run_log: RunLogger<L>,
}

impl<R: ReferenceStore, L: RunLogStore> SeedPipeline<R, L> {
    /// Pipeline over the embedded reference data
    pub fn new(store: R, run_log: L) -> Result<Self> {
        Ok(Self::with_data(ReferenceData::embedded()?, store, run_log))
    }

    pub fn with_data(data: ReferenceData, store: R, run_log: L) -> Self {
        Self {
            data,
            store,
            run_log: RunLogger::new(run_log),
        }
    }

    pub async fn run(&self) -> SeedReport {
        let started = Instant::now();
        info!("Starting reference data seeding");

        let mut soc_codes = SeedCounts::default();
        let mut crosswalk = SeedCounts::default();
        let outcome = self.execute(&mut soc_codes, &mut crosswalk).await;

        let requested = self.data.total_rows() as i64;
        let written = (soc_codes.inserted + crosswalk.inserted) as i64;

        let mut run = PipelineRunRecord::new(
            PipelineType::SeedReference,
            if outcome.is_ok() {
                RunStatus::Success
            } else {
                RunStatus::Failed
            },
        )
        .with_counts(requested, requested, written)
        .with_duration(started.elapsed());

        if let Err(e) = outcome {
            error!(error = %format!("{:#}", e), "Seeding failed");
            run = run.with_error(format!("{:#}", e));
        }

        self.run_log.record(&run).await;

        let report = SeedReport {
            run,
            soc_codes,
            crosswalk,
            soc_codes_defined: self.data.soc_codes.len(),
            crosswalk_defined: self.data.crosswalk.len(),
        };
        report.log_summary();
        report
    }

    async fn execute(&self, soc_codes: &mut SeedCounts, crosswalk: &mut SeedCounts) -> Result<()> {
        info!(rows = self.data.soc_codes.len(), "Seeding soc_code_reference");
        *soc_codes = self
            .store
            .insert_soc_codes(&self.data.soc_codes)
            .await
            .context("Failed to seed soc_code_reference")?;
        info!(
            inserted = soc_codes.inserted,
            skipped = soc_codes.skipped,
            "soc_code_reference seeded"
        );

        info!(rows = self.data.crosswalk.len(), "Seeding job_soc_crosswalk");
        *crosswalk = self
            .store
            .insert_crosswalk(&self.data.crosswalk)
            .await
            .context("Failed to seed job_soc_crosswalk")?;
        info!(
            inserted = crosswalk.inserted,
            skipped = crosswalk.skipped,
            "job_soc_crosswalk seeded"
        );

        Ok(())
    }
}
