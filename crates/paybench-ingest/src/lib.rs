//! Paybench Ingest Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Batch jobs that populate the compensation-benchmarking database.
//!
//! # Jobs
//!
//! - **BLS wage pull** ([`bls`]): OEWS wage percentiles per occupation and
//!   metro area from the BLS public API
//! - **CSV ingestion** ([`csv_ingest`]): employee roster and grade bands
//! - **Reference seeding** ([`seed`]): SOC catalog and role crosswalk
//!
//! Every job writes one row per run (per file for CSV) to
//! `pipeline_run_log` through [`run_log::RunLogger`].

pub mod bls;
pub mod config;
pub mod csv_ingest;
pub mod db;
pub mod run_log;
pub mod seed;
