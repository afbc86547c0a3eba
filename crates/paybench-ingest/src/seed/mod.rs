//! Reference data seeding
//!
//! Loads the SOC occupation catalog and the internal role crosswalk. Rows
//! already present are left untouched, so the job is safe to re-run.

pub mod data;
pub mod pipeline;
pub mod storage;

pub use data::{CrosswalkEntry, MatchQuality, ReferenceData, SocReference};
pub use pipeline::{SeedPipeline, SeedReport};
pub use storage::{PgReferenceStore, ReferenceStore, SeedCounts};
