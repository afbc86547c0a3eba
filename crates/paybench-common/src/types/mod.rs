//! Common types used across paybench pipelines

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::PaybenchError;

// ============================================================================
// Pipeline Audit Types
// ============================================================================

/// Identifies which batch job produced a `pipeline_run_log` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineType {
    /// BLS OEWS wage pull
    BlsOews,
    /// Employee roster CSV ingestion
    CsvEmployees,
    /// Internal job grade CSV ingestion
    CsvGrades,
    /// SOC reference and crosswalk seeding
    SeedReference,
}

impl PipelineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineType::BlsOews => "BLS_OEWS",
            PipelineType::CsvEmployees => "CSV_EMPLOYEES",
            PipelineType::CsvGrades => "CSV_GRADES",
            PipelineType::SeedReference => "SEED_REFERENCE",
        }
    }
}

impl std::fmt::Display for PipelineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PipelineType {
    type Err = PaybenchError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "BLS_OEWS" => Ok(PipelineType::BlsOews),
            "CSV_EMPLOYEES" => Ok(PipelineType::CsvEmployees),
            "CSV_GRADES" => Ok(PipelineType::CsvGrades),
            "SEED_REFERENCE" => Ok(PipelineType::SeedReference),
            other => Err(PaybenchError::UnknownPipelineType(other.to_string())),
        }
    }
}

/// Terminal status of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Success,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "SUCCESS",
            RunStatus::Failed => "FAILED",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunStatus::Success)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit row in `pipeline_run_log`.
///
/// Created exactly once per pipeline invocation, at the very end of the run.
/// The discrepancy flag is derived, never stored independently of the counts.
///
/// # Examples
///
/// ```
/// use paybench_common::types::{PipelineRunRecord, PipelineType, RunStatus};
///
/// let run = PipelineRunRecord::new(PipelineType::BlsOews, RunStatus::Success)
///     .with_counts(600, 10, 7);
/// assert!(run.discrepancy_flag());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRunRecord {
    pub pipeline_type: PipelineType,
    pub status: RunStatus,
    pub records_requested: i64,
    pub records_received: i64,
    pub records_written: i64,
    pub error_message: Option<String>,
    /// Wall-clock duration in seconds, rounded to milliseconds
    pub run_duration_seconds: f64,
    pub run_timestamp: DateTime<Utc>,
}

impl PipelineRunRecord {
    pub fn new(pipeline_type: PipelineType, status: RunStatus) -> Self {
        Self {
            pipeline_type,
            status,
            records_requested: 0,
            records_received: 0,
            records_written: 0,
            error_message: None,
            run_duration_seconds: 0.0,
            run_timestamp: Utc::now(),
        }
    }

    pub fn with_counts(mut self, requested: i64, received: i64, written: i64) -> Self {
        self.records_requested = requested;
        self.records_received = received;
        self.records_written = written;
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.run_duration_seconds = (duration.as_secs_f64() * 1000.0).round() / 1000.0;
        self
    }

    /// True when the number of records received differs from the number written
    pub fn discrepancy_flag(&self) -> bool {
        self.records_received != self.records_written
    }
}
