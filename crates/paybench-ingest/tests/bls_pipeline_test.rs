//! Whole-run tests for the BLS wage pull
//!
//! The catalog, wage table and audit log are in-memory stores and the API is
//! scripted per series, so every run is deterministic and needs no network.

use anyhow::Result;
use async_trait::async_trait;
use paybench_common::types::{PipelineRunRecord, PipelineType, RunStatus};
use paybench_ingest::bls::series::build_series_id;
use paybench_ingest::bls::{
    BlsApi, BlsPipeline, BlsResponse, FetchError, Geography, OccupationCode, StatisticKind,
    WageKey, WageRecord, WageStore,
};
use paybench_ingest::config::BlsConfig;
use paybench_ingest::run_log::RunLogStore;
use serde_json::json;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Test Doubles
// ============================================================================

#[derive(Default)]
struct MemoryWageStore {
    catalog: Vec<OccupationCode>,
    rows: Mutex<BTreeMap<WageKey, WageRecord>>,
    fail_load: bool,
}

impl MemoryWageStore {
    fn with_catalog(codes: &[(&str, &str)]) -> Self {
        Self {
            catalog: codes
                .iter()
                .map(|(code, title)| OccupationCode::new(*code, *title))
                .collect(),
            ..Default::default()
        }
    }

    fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl WageStore for MemoryWageStore {
    async fn fetch_catalog(&self) -> Result<Vec<OccupationCode>> {
        Ok(self.catalog.clone())
    }

    async fn insert_wage_records(&self, records: &[WageRecord]) -> Result<u64> {
        if self.fail_load {
            anyhow::bail!("connection reset by peer");
        }
        let mut rows = self.rows.lock().unwrap();
        let mut written = 0;
        for record in records {
            if !rows.contains_key(&record.key()) {
                rows.insert(record.key(), record.clone());
                written += 1;
            }
        }
        Ok(written)
    }
}

/// Answers each requested series from a fixed value table; series without a
/// value come back with empty data. Calls listed in `failing_calls` (1-based)
/// fail with HTTP 500.
#[derive(Default)]
struct ScriptedApi {
    values: HashMap<String, String>,
    failing_calls: HashSet<usize>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedApi {
    fn with_values(values: HashMap<String, String>) -> Self {
        Self {
            values,
            ..Default::default()
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl BlsApi for ScriptedApi {
    async fn fetch_batch(
        &self,
        series_ids: &[String],
        year: i32,
    ) -> Result<BlsResponse, FetchError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(series_ids.to_vec());
            calls.len()
        };
        if self.failing_calls.contains(&call) {
            return Err(FetchError::Status(500));
        }

        let series: Vec<_> = series_ids
            .iter()
            .map(|id| match self.values.get(id) {
                Some(value) => json!({
                    "seriesID": id,
                    "data": [{"year": year.to_string(), "period": "A01", "value": value}]
                }),
                None => json!({"seriesID": id, "data": []}),
            })
            .collect();

        Ok(serde_json::from_value(json!({
            "status": "REQUEST_SUCCEEDED",
            "message": [],
            "Results": {"series": series}
        }))
        .unwrap())
    }
}

#[derive(Default)]
struct MemoryRunLog {
    runs: Mutex<Vec<PipelineRunRecord>>,
}

impl MemoryRunLog {
    fn runs(&self) -> Vec<PipelineRunRecord> {
        self.runs.lock().unwrap().clone()
    }
}

#[async_trait]
impl RunLogStore for MemoryRunLog {
    async fn insert_run(&self, run: &PipelineRunRecord) -> Result<i64> {
        let mut runs = self.runs.lock().unwrap();
        runs.push(run.clone());
        Ok(runs.len() as i64)
    }
}

struct UnavailableRunLog;

#[async_trait]
impl RunLogStore for UnavailableRunLog {
    async fn insert_run(&self, _run: &PipelineRunRecord) -> Result<i64> {
        anyhow::bail!("pipeline_run_log is not writable")
    }
}

// ============================================================================
// Helpers
// ============================================================================

const SOFTWARE_DEVELOPERS: (&str, &str) = ("15-1252", "Software Developers");
const DATA_SCIENTISTS: (&str, &str) = ("15-2051", "Data Scientists");
const HR_SPECIALISTS: (&str, &str) = ("13-1071", "Human Resources Specialists");

fn config() -> BlsConfig {
    BlsConfig::default().with_inter_batch_delay(Duration::ZERO)
}

fn series_id(geography: Geography, soc_code: &str, statistic: StatisticKind) -> String {
    build_series_id(geography.area_code(), soc_code, statistic)
}

/// Values for every statistic of one occupation in one metro area
fn full_profile(geography: Geography, soc_code: &str) -> HashMap<String, String> {
    StatisticKind::ALL
        .iter()
        .zip(["145000", "98000", "118000", "141000", "170000", "205000"])
        .map(|(statistic, value)| (series_id(geography, soc_code, *statistic), value.to_string()))
        .collect()
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_single_area_produces_one_record() {
    let store = Arc::new(MemoryWageStore::with_catalog(&[SOFTWARE_DEVELOPERS]));
    let api = Arc::new(ScriptedApi::with_values(full_profile(
        Geography::Austin,
        SOFTWARE_DEVELOPERS.0,
    )));
    let run_log = Arc::new(MemoryRunLog::default());

    let report = BlsPipeline::new(config(), store.clone(), api.clone(), run_log.clone())
        .run()
        .await;

    assert!(report.is_success());
    assert_eq!(report.run.records_requested, 30);
    assert_eq!(report.run.records_received, 1);
    assert_eq!(report.run.records_written, 1);
    assert!(!report.run.discrepancy_flag());
    assert_eq!(report.series_with_data, 6);
    assert_eq!(report.gaps.len(), 24);
    // 30 series at the public-tier limit of 25
    assert_eq!(report.batches_sent, 2);
    assert_eq!(api.call_count(), 2);

    let rows = store.rows.lock().unwrap();
    let record = rows.values().next().unwrap();
    assert_eq!(record.msa_code, "12420");
    assert_eq!(record.msa_name, "Austin TX");
    assert_eq!(record.reference_year, 2024);
    assert_eq!(record.annual_mean, Some(145000.0));
    assert_eq!(record.pct_50, Some(141000.0));
    assert_eq!(record.populated(), 6);

    let runs = run_log.runs();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].pipeline_type, PipelineType::BlsOews);
    assert_eq!(runs[0].status, RunStatus::Success);
}

#[tokio::test]
async fn test_values_across_areas_yield_one_record_per_area() {
    let mut values = full_profile(Geography::Austin, SOFTWARE_DEVELOPERS.0);
    values.extend(full_profile(Geography::Denver, SOFTWARE_DEVELOPERS.0));
    values.insert(
        series_id(Geography::NewYork, SOFTWARE_DEVELOPERS.0, StatisticKind::Median),
        "165000".to_string(),
    );

    let store = Arc::new(MemoryWageStore::with_catalog(&[SOFTWARE_DEVELOPERS]));
    let report = BlsPipeline::new(
        config(),
        store.clone(),
        ScriptedApi::with_values(values),
        MemoryRunLog::default(),
    )
    .run()
    .await;

    assert!(report.is_success());
    assert_eq!(report.series_with_data, 13);
    assert_eq!(report.run.records_received, 3);
    assert_eq!(report.run.records_written, 3);

    let rows = store.rows.lock().unwrap();
    let new_york = rows
        .values()
        .find(|r| r.msa_code == "35620")
        .unwrap();
    assert_eq!(new_york.populated(), 1);
    assert_eq!(new_york.pct_50, Some(165000.0));
    assert_eq!(new_york.annual_mean, None);
}

#[tokio::test]
async fn test_failed_batch_becomes_gaps() {
    let catalog = [SOFTWARE_DEVELOPERS, DATA_SCIENTISTS, HR_SPECIALISTS];
    let mut values = HashMap::new();
    for geography in Geography::ALL {
        for (code, _) in catalog {
            values.extend(full_profile(geography, code));
        }
    }

    let api = Arc::new(ScriptedApi {
        values,
        failing_calls: HashSet::from([2]),
        ..Default::default()
    });
    let run_log = Arc::new(MemoryRunLog::default());
    let report = BlsPipeline::new(
        config().with_public_batch_size(30),
        MemoryWageStore::with_catalog(&catalog),
        api.clone(),
        run_log.clone(),
    )
    .run()
    .await;

    assert!(report.is_success());
    assert_eq!(report.batches_sent, 3);
    assert_eq!(report.batches_failed, 1);
    assert_eq!(report.run.records_requested, 90);
    assert_eq!(report.series_with_data, 60);

    let second_batch = api.calls.lock().unwrap()[1].clone();
    assert_eq!(report.gaps, second_batch);

    // Geography-major order: batch 2 covers the last occupation in New York,
    // all of San Francisco and the first occupation in Washington.
    assert_eq!(report.run.records_received, 10);
    assert_eq!(report.run.records_written, 10);
    assert_eq!(run_log.runs()[0].status, RunStatus::Success);
}

#[tokio::test]
async fn test_suppressed_values_are_gaps_not_errors() {
    let mut values = HashMap::new();
    values.insert(
        series_id(Geography::Austin, DATA_SCIENTISTS.0, StatisticKind::AnnualMean),
        "131200".to_string(),
    );
    values.insert(
        series_id(Geography::Austin, DATA_SCIENTISTS.0, StatisticKind::Pct90),
        "**".to_string(),
    );
    values.insert(
        series_id(Geography::Austin, DATA_SCIENTISTS.0, StatisticKind::Pct10),
        "-".to_string(),
    );

    let store = Arc::new(MemoryWageStore::with_catalog(&[DATA_SCIENTISTS]));
    let report = BlsPipeline::new(
        config(),
        store.clone(),
        ScriptedApi::with_values(values),
        MemoryRunLog::default(),
    )
    .run()
    .await;

    assert!(report.is_success());
    assert_eq!(report.series_with_data, 1);
    assert_eq!(report.gaps.len(), 29);
    assert!(report.gaps.contains(&series_id(
        Geography::Austin,
        DATA_SCIENTISTS.0,
        StatisticKind::Pct90
    )));

    let rows = store.rows.lock().unwrap();
    let record = rows.values().next().unwrap();
    assert_eq!(record.annual_mean, Some(131200.0));
    assert_eq!(record.pct_90, None);
    assert_eq!(record.pct_10, None);
}

#[tokio::test]
async fn test_empty_catalog_fails_before_any_request() {
    let api = Arc::new(ScriptedApi::default());
    let run_log = Arc::new(MemoryRunLog::default());

    let report = BlsPipeline::new(
        config(),
        MemoryWageStore::default(),
        api.clone(),
        run_log.clone(),
    )
    .run()
    .await;

    assert!(!report.is_success());
    assert_eq!(api.call_count(), 0);
    assert_eq!(report.batches_sent, 0);

    let runs = run_log.runs();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, RunStatus::Failed);
    assert_eq!(runs[0].records_requested, 0);
    assert!(runs[0]
        .error_message
        .as_deref()
        .unwrap()
        .contains("soc_code_reference is empty"));
}

#[tokio::test]
async fn test_load_failure_keeps_received_count() {
    let store = MemoryWageStore {
        fail_load: true,
        ..MemoryWageStore::with_catalog(&[SOFTWARE_DEVELOPERS])
    };
    let run_log = Arc::new(MemoryRunLog::default());

    let report = BlsPipeline::new(
        config(),
        store,
        ScriptedApi::with_values(full_profile(Geography::Washington, SOFTWARE_DEVELOPERS.0)),
        run_log.clone(),
    )
    .run()
    .await;

    assert!(!report.is_success());
    assert_eq!(report.run.records_requested, 30);
    assert_eq!(report.run.records_received, 1);
    assert_eq!(report.run.records_written, 0);
    assert!(report.run.discrepancy_flag());

    let message = report.run.error_message.as_deref().unwrap();
    assert!(message.contains("Failed to load bls_wage_data"));
    assert!(message.contains("connection reset by peer"));
    assert_eq!(run_log.runs()[0].status, RunStatus::Failed);
}

#[tokio::test]
async fn test_rerun_writes_nothing_new() {
    let store = Arc::new(MemoryWageStore::with_catalog(&[SOFTWARE_DEVELOPERS]));
    let api = Arc::new(ScriptedApi::with_values(full_profile(
        Geography::SanFrancisco,
        SOFTWARE_DEVELOPERS.0,
    )));
    let run_log = Arc::new(MemoryRunLog::default());
    let pipeline = BlsPipeline::new(config(), store.clone(), api, run_log.clone());

    let first = pipeline.run().await;
    let second = pipeline.run().await;

    assert_eq!(first.run.records_written, 1);
    assert!(second.is_success());
    assert_eq!(second.run.records_received, 1);
    assert_eq!(second.run.records_written, 0);
    assert!(second.run.discrepancy_flag());
    assert_eq!(store.row_count(), 1);
    assert_eq!(run_log.runs().len(), 2);
}

#[tokio::test]
async fn test_audit_failure_does_not_change_outcome() {
    let report = BlsPipeline::new(
        config(),
        MemoryWageStore::with_catalog(&[SOFTWARE_DEVELOPERS]),
        ScriptedApi::with_values(full_profile(Geography::Austin, SOFTWARE_DEVELOPERS.0)),
        UnavailableRunLog,
    )
    .run()
    .await;

    assert!(report.is_success());
    assert_eq!(report.run_log_id, None);
    assert_eq!(report.run.records_written, 1);
}

#[tokio::test]
async fn test_registered_tier_uses_its_batch_size() {
    let api = Arc::new(ScriptedApi::with_values(full_profile(
        Geography::Denver,
        SOFTWARE_DEVELOPERS.0,
    )));

    let report = BlsPipeline::new(
        config()
            .with_registration_key("registered-key")
            .with_registered_batch_size(10)
            .with_public_batch_size(25),
        MemoryWageStore::with_catalog(&[SOFTWARE_DEVELOPERS]),
        api.clone(),
        MemoryRunLog::default(),
    )
    .run()
    .await;

    assert!(report.is_success());
    assert_eq!(report.batches_sent, 3);
    let calls = api.calls.lock().unwrap();
    assert!(calls.iter().all(|batch| batch.len() == 10));
    assert_eq!(report.run.records_written, 1);
}

#[tokio::test(start_paused = true)]
async fn test_pause_between_batches() {
    let started = tokio::time::Instant::now();

    let report = BlsPipeline::new(
        BlsConfig::default().with_inter_batch_delay(Duration::from_millis(500)),
        MemoryWageStore::with_catalog(&[SOFTWARE_DEVELOPERS, DATA_SCIENTISTS]),
        ScriptedApi::default(),
        MemoryRunLog::default(),
    )
    .run()
    .await;

    // 60 series in 3 batches: two pauses, none after the last batch
    assert_eq!(report.batches_sent, 3);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(1000));
    assert!(elapsed < Duration::from_millis(1500));
    assert_eq!(report.series_with_data, 0);
    assert_eq!(report.run.records_received, 0);
}
