//! Roster and grade-structure records

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::table::{parse_number, CsvRow};

/// Columns `technova_employees.csv` must carry
pub const EMPLOYEE_COLUMNS: [&str; 15] = [
    "employee_id",
    "first_name",
    "last_name",
    "gender",
    "hire_date",
    "job_family",
    "role_title",
    "job_level",
    "department",
    "office_location",
    "msa_name",
    "msa_code",
    "annual_base_salary",
    "salary_currency",
    "data_as_of_date",
];

/// Employee columns that may not hold blanks
pub const EMPLOYEE_NOT_NULL_COLUMNS: [&str; 6] = [
    "employee_id",
    "job_family",
    "role_title",
    "job_level",
    "office_location",
    "annual_base_salary",
];

/// Columns `technova_job_grades.csv` must carry
pub const GRADE_COLUMNS: [&str; 12] = [
    "grade_code",
    "job_family",
    "role_title",
    "job_level",
    "band_minimum",
    "band_midpoint",
    "band_maximum",
    "salary_currency",
    "geo_scope",
    "below_market_flag",
    "effective_date",
    "last_reviewed_date",
];

/// Grade columns that may not hold blanks
pub const GRADE_NOT_NULL_COLUMNS: [&str; 7] = [
    "grade_code",
    "job_family",
    "role_title",
    "job_level",
    "band_minimum",
    "band_midpoint",
    "band_maximum",
];

/// One row of `employees`. Dates stay as text and are cast by the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub employee_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub hire_date: Option<String>,
    pub job_family: String,
    pub role_title: String,
    pub job_level: String,
    pub department: Option<String>,
    pub office_location: String,
    pub msa_name: Option<String>,
    pub msa_code: Option<String>,
    pub annual_base_salary: f64,
    pub salary_currency: Option<String>,
    pub data_as_of_date: Option<String>,
}

fn required(row: &CsvRow<'_>, column: &str) -> Result<String> {
    row.text(column)
        .with_context(|| format!("'{}' is blank", column))
}

fn required_number(row: &CsvRow<'_>, column: &str) -> Result<f64> {
    parse_number(row.get(column)).with_context(|| format!("'{}' is not numeric", column))
}

impl EmployeeRecord {
    pub fn from_row(row: &CsvRow<'_>) -> Result<Self> {
        Ok(Self {
            employee_id: required(row, "employee_id")?,
            first_name: row.text("first_name"),
            last_name: row.text("last_name"),
            gender: row.text("gender"),
            hire_date: row.text("hire_date"),
            job_family: required(row, "job_family")?,
            role_title: required(row, "role_title")?,
            job_level: required(row, "job_level")?,
            department: row.text("department"),
            office_location: required(row, "office_location")?,
            msa_name: row.text("msa_name"),
            msa_code: row.text("msa_code"),
            annual_base_salary: required_number(row, "annual_base_salary")?,
            salary_currency: row.text("salary_currency"),
            data_as_of_date: row.text("data_as_of_date"),
        })
    }
}

/// One row of `internal_job_grades`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobGradeRecord {
    pub grade_code: String,
    pub job_family: String,
    pub role_title: String,
    pub job_level: String,
    pub band_minimum: f64,
    pub band_midpoint: f64,
    pub band_maximum: f64,
    pub salary_currency: Option<String>,
    pub geo_scope: Option<String>,
    pub below_market_flag: Option<String>,
    pub effective_date: Option<String>,
    pub last_reviewed_date: Option<String>,
}

impl JobGradeRecord {
    pub fn from_row(row: &CsvRow<'_>) -> Result<Self> {
        Ok(Self {
            grade_code: required(row, "grade_code")?,
            job_family: required(row, "job_family")?,
            role_title: required(row, "role_title")?,
            job_level: required(row, "job_level")?,
            band_minimum: required_number(row, "band_minimum")?,
            band_midpoint: required_number(row, "band_midpoint")?,
            band_maximum: required_number(row, "band_maximum")?,
            salary_currency: row.text("salary_currency"),
            geo_scope: row.text("geo_scope"),
            below_market_flag: row.text("below_market_flag"),
            effective_date: row.text("effective_date"),
            last_reviewed_date: row.text("last_reviewed_date"),
        })
    }
}
