//! BLS OEWS wage data acquisition
//!
//! Pulls Occupational Employment and Wage Statistics for every occupation in
//! `soc_code_reference` across the five tracked metro areas, and loads one
//! `bls_wage_data` row per (occupation, area, year).
//!
//! # Example
//! ```no_run
//! use paybench_ingest::bls::{BlsClient, BlsPipeline, PgWageStore};
//! use paybench_ingest::config::BlsConfig;
//! use paybench_ingest::run_log::PgRunLogStore;
//! use sqlx::PgPool;
//!
//! # async fn example(pool: PgPool) -> anyhow::Result<()> {
//! let config = BlsConfig::from_env()?;
//! let client = BlsClient::new(&config)?;
//! let pipeline = BlsPipeline::new(
//!     config,
//!     PgWageStore::new(pool.clone()),
//!     client,
//!     PgRunLogStore::new(pool),
//! );
//!
//! let report = pipeline.run().await;
//! assert_eq!(report.run.records_requested, 30 * 20);
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod client;
pub mod fetcher;
pub mod models;
pub mod pipeline;
pub mod response;
pub mod series;
pub mod storage;

pub use aggregator::WageAggregation;
pub use client::{BlsApi, BlsClient, FetchError};
pub use fetcher::{BatchFetcher, BatchResult};
pub use models::{Geography, OccupationCode, SeriesDescriptor, StatisticKind, WageKey, WageRecord};
pub use pipeline::{BlsPipeline, BlsRunReport};
pub use response::BlsResponse;
pub use storage::{PgWageStore, WageStore};
