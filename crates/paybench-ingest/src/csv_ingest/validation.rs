//! Whole-file data quality checks
//!
//! Each check returns human-readable issues; an empty list means the file is
//! accepted. A file with any issue is rejected as a whole.

use super::models::{EMPLOYEE_COLUMNS, EMPLOYEE_NOT_NULL_COLUMNS, GRADE_COLUMNS, GRADE_NOT_NULL_COLUMNS};
use super::table::{parse_number, CsvTable};

fn check_columns(table: &CsvTable, required: &[&str]) -> Option<String> {
    let missing = table.missing_columns(required);
    if missing.is_empty() {
        None
    } else {
        Some(format!("Missing required columns: {:?}", missing))
    }
}

fn check_nulls(table: &CsvTable, columns: &[&str], errors: &mut Vec<String>) {
    for column in columns {
        let nulls = table.null_count(column);
        if nulls > 0 {
            errors.push(format!("'{}': {} null value(s)", column, nulls));
        }
    }
}

/// Parsed values of a numeric column; `None` where blank or non-numeric
fn numeric_column(table: &CsvTable, column: &str) -> Vec<Option<f64>> {
    table.column(column).map(parse_number).collect()
}

fn check_numeric(column: &str, values: &[Option<f64>], errors: &mut Vec<String>) {
    let bad = values.iter().filter(|v| v.is_none()).count();
    if bad > 0 {
        errors.push(format!("'{}': {} non-numeric value(s)", column, bad));
    }
}

pub fn validate_employees(table: &CsvTable) -> Vec<String> {
    // Without the full schema no further check is meaningful
    if let Some(issue) = check_columns(table, &EMPLOYEE_COLUMNS) {
        return vec![issue];
    }

    let mut errors = Vec::new();
    check_nulls(table, &EMPLOYEE_NOT_NULL_COLUMNS, &mut errors);

    let salary = numeric_column(table, "annual_base_salary");
    check_numeric("annual_base_salary", &salary, &mut errors);

    let non_positive = salary.iter().flatten().filter(|v| **v <= 0.0).count();
    if non_positive > 0 {
        errors.push(format!(
            "'annual_base_salary': {} non-positive value(s)",
            non_positive
        ));
    }

    errors
}

pub fn validate_job_grades(table: &CsvTable) -> Vec<String> {
    if let Some(issue) = check_columns(table, &GRADE_COLUMNS) {
        return vec![issue];
    }

    let mut errors = Vec::new();
    check_nulls(table, &GRADE_NOT_NULL_COLUMNS, &mut errors);

    let minimum = numeric_column(table, "band_minimum");
    let midpoint = numeric_column(table, "band_midpoint");
    let maximum = numeric_column(table, "band_maximum");

    check_numeric("band_minimum", &minimum, &mut errors);
    check_numeric("band_midpoint", &midpoint, &mut errors);
    check_numeric("band_maximum", &maximum, &mut errors);

    // Ordering is only judged on rows where all three bands parsed
    let complete: Vec<(f64, f64, f64)> = minimum
        .iter()
        .zip(&midpoint)
        .zip(&maximum)
        .filter_map(|((min, mid), max)| Some(((*min)?, (*mid)?, (*max)?)))
        .collect();

    let min_over_mid = complete.iter().filter(|(min, mid, _)| min >= mid).count();
    if min_over_mid > 0 {
        errors.push(format!("{} row(s) have band_minimum >= band_midpoint", min_over_mid));
    }

    let mid_over_max = complete.iter().filter(|(_, mid, max)| mid >= max).count();
    if mid_over_max > 0 {
        errors.push(format!("{} row(s) have band_midpoint >= band_maximum", mid_over_max));
    }

    errors
}
