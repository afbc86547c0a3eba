//! Paybench Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging, and error handling for the paybench workspace.
//!
//! # Overview
//!
//! - **Error Handling**: [`PaybenchError`] and the [`Result`] alias
//! - **Logging**: console/file tracing setup shared by every pipeline binary
//! - **Types**: pipeline audit vocabulary (`PipelineType`, `RunStatus`,
//!   `PipelineRunRecord`) shared by the wage pull, CSV ingestion and seeding
//!
//! # Example
//!
//! ```no_run
//! use paybench_common::logging::{init_logging, LogConfig};
//! use paybench_common::types::{PipelineRunRecord, PipelineType, RunStatus};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_logging(&LogConfig::from_env()?)?;
//!
//!     let run = PipelineRunRecord::new(PipelineType::BlsOews, RunStatus::Success)
//!         .with_counts(30, 1, 1);
//!     assert!(!run.discrepancy_flag());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{PaybenchError, Result};
