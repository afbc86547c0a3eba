//! HR roster and grade-structure ingestion
//!
//! Loads `technova_employees.csv` into `employees` and
//! `technova_job_grades.csv` into `internal_job_grades`. Re-running with the
//! same files replaces rows in place.

pub mod models;
pub mod pipeline;
pub mod storage;
pub mod table;
pub mod validation;

pub use models::{EmployeeRecord, JobGradeRecord};
pub use pipeline::{CsvIngestion, CsvIngestionReport, FileReport, RosterFile};
pub use storage::{PgRosterStore, RosterStore};
pub use table::{CsvRow, CsvTable, TableError};
pub use validation::{validate_employees, validate_job_grades};
