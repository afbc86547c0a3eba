//! Roster and grade-structure ingestion job
//!
//! Each file is read, validated as a whole and upserted in one transaction.
//! The files are independent: a failure in one never stops the other, and
//! each gets its own audit row.

use anyhow::{anyhow, Context, Result};
use paybench_common::types::{PipelineRunRecord, PipelineType, RunStatus};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, warn};

use super::models::{EmployeeRecord, JobGradeRecord};
use super::storage::RosterStore;
use super::table::CsvTable;
use super::validation::{validate_employees, validate_job_grades};
use crate::config::CsvConfig;
use crate::run_log::{RunLogStore, RunLogger};

/// The two input files, in processing order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterFile {
    Employees,
    JobGrades,
}

impl RosterFile {
    pub const ALL: [RosterFile; 2] = [RosterFile::Employees, RosterFile::JobGrades];

    pub fn pipeline_type(&self) -> PipelineType {
        match self {
            RosterFile::Employees => PipelineType::CsvEmployees,
            RosterFile::JobGrades => PipelineType::CsvGrades,
        }
    }

    pub fn table_name(&self) -> &'static str {
        match self {
            RosterFile::Employees => "employees",
            RosterFile::JobGrades => "internal_job_grades",
        }
    }

    fn path(&self, config: &CsvConfig) -> PathBuf {
        match self {
            RosterFile::Employees => config.employees_path(),
            RosterFile::JobGrades => config.job_grades_path(),
        }
    }

    fn validate(&self, table: &CsvTable) -> Vec<String> {
        match self {
            RosterFile::Employees => validate_employees(table),
            RosterFile::JobGrades => validate_job_grades(table),
        }
    }
}

/// Outcome of one file
#[derive(Debug, Clone)]
pub struct FileReport {
    pub file: RosterFile,
    pub path: PathBuf,
    pub run: PipelineRunRecord,
    pub run_log_id: Option<i64>,
}

impl FileReport {
    /// Succeeded and every row of the file was written
    pub fn is_complete(&self) -> bool {
        self.run.status.is_success() && self.run.records_written == self.run.records_requested
    }
}

#[derive(Debug, Clone)]
pub struct CsvIngestionReport {
    pub files: Vec<FileReport>,
}

impl CsvIngestionReport {
    pub fn is_success(&self) -> bool {
        self.files.iter().all(FileReport::is_complete)
    }

    pub fn file(&self, file: RosterFile) -> Option<&FileReport> {
        self.files.iter().find(|r| r.file == file)
    }

    pub fn log_summary(&self) {
        info!("CSV INGESTION SUMMARY");
        for report in &self.files {
            let run = &report.run;
            info!("  {}", report.path.display());
            info!("    Status  : {}", run.status);
            info!(
                "    Loaded  : {} / {} records",
                run.records_written, run.records_requested
            );
            if run.discrepancy_flag() {
                warn!(
                    "    DISCREPANCY: {} received but {} written",
                    run.records_received, run.records_written
                );
            }
            if let Some(message) = &run.error_message {
                error!("    Error   : {}", message);
            }
            info!("    Runtime : {:.2}s", run.run_duration_seconds);
        }
    }
}

/// Row counts known at the point a file stops
#[derive(Debug, Clone, Copy, Default)]
struct FileCounts {
    requested: i64,
    written: i64,
}

pub struct CsvIngestion<S, L> {
    config: CsvConfig,
    store: S,
    run_log: RunLogger<L>,
}

impl<S: RosterStore, L: RunLogStore> CsvIngestion<S, L> {
    pub fn new(config: CsvConfig, store: S, run_log: L) -> Self {
        Self {
            config,
            store,
            run_log: RunLogger::new(run_log),
        }
    }

    /// Process both files; always attempts each one
    pub async fn run(&self) -> CsvIngestionReport {
        info!(data_dir = %self.config.data_dir.display(), "Starting CSV ingestion");

        let mut files = Vec::with_capacity(RosterFile::ALL.len());
        for file in RosterFile::ALL {
            files.push(self.ingest_file(file).await);
        }

        let report = CsvIngestionReport { files };
        report.log_summary();
        report
    }

    pub async fn ingest_file(&self, file: RosterFile) -> FileReport {
        let started = Instant::now();
        let path = file.path(&self.config);
        info!(path = %path.display(), table = file.table_name(), "Processing file");

        let mut counts = FileCounts::default();
        let outcome = self.load_file(file, &path, &mut counts).await;

        let mut run = PipelineRunRecord::new(
            file.pipeline_type(),
            if outcome.is_ok() {
                RunStatus::Success
            } else {
                RunStatus::Failed
            },
        )
        .with_counts(counts.requested, counts.requested, counts.written)
        .with_duration(started.elapsed());

        if let Err(e) = outcome {
            error!(path = %path.display(), error = %format!("{:#}", e), "File ingestion failed");
            run = run.with_error(format!("{:#}", e));
        }

        let run_log_id = self.run_log.record(&run).await;

        FileReport {
            file,
            path,
            run,
            run_log_id,
        }
    }

    async fn load_file(
        &self,
        file: RosterFile,
        path: &std::path::Path,
        counts: &mut FileCounts,
    ) -> Result<()> {
        let table = CsvTable::read_path(path)?;
        counts.requested = table.len() as i64;
        info!(rows = table.len(), "Read {}", path.display());

        let issues = file.validate(&table);
        if !issues.is_empty() {
            for issue in &issues {
                warn!(path = %path.display(), "{}", issue);
            }
            return Err(anyhow!("Validation failed: {}", issues.join(" | ")));
        }
        info!("Validation passed");

        let written = match file {
            RosterFile::Employees => {
                let rows = table
                    .rows()
                    .map(|row| EmployeeRecord::from_row(&row))
                    .collect::<Result<Vec<_>>>()?;
                self.store.upsert_employees(&rows).await
            },
            RosterFile::JobGrades => {
                let rows = table
                    .rows()
                    .map(|row| JobGradeRecord::from_row(&row))
                    .collect::<Result<Vec<_>>>()?;
                self.store.upsert_job_grades(&rows).await
            },
        }
        .with_context(|| format!("DB insert failed for {}", file.table_name()))?;

        counts.written = written as i64;
        info!(written, table = file.table_name(), "Upsert committed");
        Ok(())
    }
}
