//! BLS OEWS wage pull
//!
//! Runs INIT -> FETCHING -> AGGREGATING -> LOADING and ends in SUCCESS or
//! FAILED. Batch failures only create gaps; catalog, load and other run-fatal
//! errors end the run as FAILED. Either way exactly one audit row is written.

use anyhow::{Context, Result};
use futures::StreamExt;
use paybench_common::types::{PipelineRunRecord, PipelineType, RunStatus};
use paybench_common::PaybenchError;
use std::time::Instant;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::aggregator::{index_descriptors, WageAggregation};
use super::client::BlsApi;
use super::fetcher::BatchFetcher;
use super::models::{Geography, StatisticKind};
use super::series::build_all_series;
use super::storage::WageStore;
use crate::config::BlsConfig;
use crate::run_log::{RunLogStore, RunLogger};

/// How many gapped series ids the summary lists before truncating
pub const GAP_PREVIEW_LIMIT: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Init,
    Fetching,
    Aggregating,
    Loading,
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunPhase::Init => "INIT",
            RunPhase::Fetching => "FETCHING",
            RunPhase::Aggregating => "AGGREGATING",
            RunPhase::Loading => "LOADING",
        };
        f.write_str(s)
    }
}

/// Counters that stay valid when the run fails part way
#[derive(Debug, Clone)]
struct RunProgress {
    phase: RunPhase,
    requested: usize,
    batches_total: usize,
    batches_sent: usize,
    batches_failed: usize,
    series_with_data: usize,
    received: usize,
    written: u64,
    gaps: Vec<String>,
}

impl Default for RunProgress {
    fn default() -> Self {
        Self {
            phase: RunPhase::Init,
            requested: 0,
            batches_total: 0,
            batches_sent: 0,
            batches_failed: 0,
            series_with_data: 0,
            received: 0,
            written: 0,
            gaps: Vec::new(),
        }
    }
}

/// Final report of one wage pull
#[derive(Debug, Clone)]
pub struct BlsRunReport {
    pub run: PipelineRunRecord,
    pub survey_year: i32,
    pub batches_sent: usize,
    pub batches_failed: usize,
    pub series_with_data: usize,
    pub gaps: Vec<String>,
    /// Id of the audit row, when it could be written
    pub run_log_id: Option<i64>,
}

impl BlsRunReport {
    pub fn is_success(&self) -> bool {
        self.run.status.is_success()
    }

    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Survey year         : {}", self.survey_year),
            format!("Batches sent        : {}", self.batches_sent),
            format!("Batches failed      : {}", self.batches_failed),
            format!("Series requested    : {}", self.run.records_requested),
            format!("Series with data    : {}", self.series_with_data),
            format!("Series gaps         : {}", self.gaps.len()),
            format!("Unique rows received: {}", self.run.records_received),
            format!("Rows written        : {}", self.run.records_written),
            format!("Duration            : {:.2}s", self.run.run_duration_seconds),
            format!("Status              : {}", self.run.status),
        ];

        if let Some(message) = &self.run.error_message {
            lines.push(format!("Error               : {}", message));
        }

        if !self.gaps.is_empty() {
            lines.push(format!(
                "Gapped series (first {}):",
                GAP_PREVIEW_LIMIT.min(self.gaps.len())
            ));
            lines.extend(
                self.gaps
                    .iter()
                    .take(GAP_PREVIEW_LIMIT)
                    .map(|id| format!("  {}", id)),
            );
            if self.gaps.len() > GAP_PREVIEW_LIMIT {
                lines.push(format!("  ... and {} more", self.gaps.len() - GAP_PREVIEW_LIMIT));
            }
        }

        lines
    }

    pub fn log_summary(&self) {
        info!("PIPELINE SUMMARY");
        for line in self.summary_lines() {
            info!("{}", line);
        }
        if self.run.discrepancy_flag() {
            warn!(
                received = self.run.records_received,
                written = self.run.records_written,
                "Rows received and rows written differ"
            );
        }
    }
}

/// Wage pull over a catalog store, an API client and an audit store
pub struct BlsPipeline<W, A, L> {
    config: BlsConfig,
    store: W,
    fetcher: BatchFetcher<A>,
    run_log: RunLogger<L>,
}

impl<W, A, L> BlsPipeline<W, A, L>
where
    W: WageStore,
    A: BlsApi,
    L: RunLogStore,
{
    pub fn new(config: BlsConfig, store: W, api: A, run_log: L) -> Self {
        let fetcher = BatchFetcher::new(api, config.batch_size(), config.inter_batch_delay);
        Self {
            config,
            store,
            fetcher,
            run_log: RunLogger::new(run_log),
        }
    }

    /// Execute one full run and write its audit row
    pub async fn run(&self) -> BlsRunReport {
        let run_id = Uuid::new_v4();
        let span = info_span!("bls_pipeline", %run_id, survey_year = self.config.survey_year);
        self.run_inner().instrument(span).await
    }

    async fn run_inner(&self) -> BlsRunReport {
        let started = Instant::now();
        info!(
            survey_year = self.config.survey_year,
            batch_size = self.config.batch_size(),
            registration_key = if self.config.registration_key.is_some() {
                "provided"
            } else {
                "not set (public tier)"
            },
            "Starting BLS OEWS wage pipeline"
        );

        let mut progress = RunProgress::default();
        let outcome = self.execute(&mut progress).await;

        let (status, error_message) = match outcome {
            Ok(()) => (RunStatus::Success, None),
            Err(e) => {
                error!(phase = %progress.phase, error = %format!("{:#}", e), "Pipeline failed");
                (RunStatus::Failed, Some(format!("{:#}", e)))
            },
        };

        let mut run = PipelineRunRecord::new(PipelineType::BlsOews, status)
            .with_counts(
                progress.requested as i64,
                progress.received as i64,
                progress.written as i64,
            )
            .with_duration(started.elapsed());
        if let Some(message) = error_message {
            run = run.with_error(message);
        }

        let run_log_id = self.run_log.record(&run).await;

        let report = BlsRunReport {
            run,
            survey_year: self.config.survey_year,
            batches_sent: progress.batches_sent,
            batches_failed: progress.batches_failed,
            series_with_data: progress.series_with_data,
            gaps: progress.gaps,
            run_log_id,
        };
        report.log_summary();
        report
    }

    async fn execute(&self, progress: &mut RunProgress) -> Result<()> {
        let year = self.config.survey_year;

        info!("Phase 1: Reading occupation catalog");
        let catalog = self.store.fetch_catalog().await?;
        if catalog.is_empty() {
            return Err(PaybenchError::precondition(
                "soc_code_reference is empty, run the seed job first",
            )
            .into());
        }

        info!("Phase 2: Building series identifiers");
        let descriptors = build_all_series(&catalog, &Geography::ALL, &StatisticKind::ALL);
        progress.requested = descriptors.len();
        progress.batches_total = self.fetcher.batch_count(descriptors.len());
        info!(
            series = descriptors.len(),
            geographies = Geography::ALL.len(),
            occupations = catalog.len(),
            statistics = StatisticKind::ALL.len(),
            batches = progress.batches_total,
            "Series to request"
        );

        info!("Phase 3: Fetching batches");
        progress.phase = RunPhase::Fetching;
        let index = index_descriptors(&descriptors);
        let mut aggregation = WageAggregation::new();

        let mut batches = std::pin::pin!(self.fetcher.fetch_all(&descriptors, year));
        while let Some(batch) = batches.next().await {
            progress.batches_sent += 1;
            match &batch.result {
                Ok(response) => {
                    let contributed = aggregation.absorb(response, &index, year);
                    info!(
                        batch = batch.number,
                        total = batch.total,
                        with_data = contributed,
                        empty = batch.series_ids.len().saturating_sub(contributed),
                        "Batch complete"
                    );
                },
                Err(e) => {
                    progress.batches_failed += 1;
                    warn!(
                        batch = batch.number,
                        total = batch.total,
                        series = batch.series_ids.len(),
                        error = %e,
                        "Batch returned no usable response, skipping"
                    );
                },
            }
        }

        progress.phase = RunPhase::Aggregating;
        progress.series_with_data = aggregation.series_with_data();
        progress.gaps = aggregation.gaps(&descriptors);
        progress.received = aggregation.received();
        info!(
            rows = progress.received,
            series_with_data = progress.series_with_data,
            gaps = progress.gaps.len(),
            "Aggregated wage rows"
        );

        info!("Phase 4: Loading bls_wage_data");
        progress.phase = RunPhase::Loading;
        let records = aggregation.into_records();
        progress.written = self
            .store
            .insert_wage_records(&records)
            .await
            .context("Failed to load bls_wage_data")?;
        info!(written = progress.written, "Wage rows written");

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn report_with_gaps(count: usize) -> BlsRunReport {
        BlsRunReport {
            run: PipelineRunRecord::new(PipelineType::BlsOews, RunStatus::Success)
                .with_counts(600, 90, 90),
            survey_year: 2024,
            batches_sent: 24,
            batches_failed: 0,
            series_with_data: 600 - count,
            gaps: (0..count).map(|i| format!("SERIES{:03}", i)).collect(),
            run_log_id: Some(1),
        }
    }

    #[test]
    fn test_summary_truncates_gap_list() {
        let lines = report_with_gaps(45).summary_lines();

        assert!(lines.contains(&"Series gaps         : 45".to_string()));
        assert!(lines.contains(&"  SERIES029".to_string()));
        assert!(!lines.contains(&"  SERIES030".to_string()));
        assert_eq!(lines.last().unwrap(), "  ... and 15 more");
    }

    #[test]
    fn test_summary_without_gaps() {
        let lines = report_with_gaps(0).summary_lines();
        assert!(lines.iter().all(|l| !l.contains("Gapped series")));
        assert_eq!(lines.last().unwrap(), "Status              : SUCCESS");
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(RunPhase::Fetching.to_string(), "FETCHING");
        assert_eq!(RunPhase::Loading.to_string(), "LOADING");
    }
}
