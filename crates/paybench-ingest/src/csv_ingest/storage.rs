//! Upsert storage for the roster and grade tables

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use super::models::{EmployeeRecord, JobGradeRecord};

/// Insert-or-replace persistence keyed on the natural id of each file.
///
/// A call is all-or-nothing: on error no row of that file is kept.
#[async_trait]
pub trait RosterStore: Send + Sync {
    async fn upsert_employees(&self, rows: &[EmployeeRecord]) -> Result<u64>;

    async fn upsert_job_grades(&self, rows: &[JobGradeRecord]) -> Result<u64>;
}

#[async_trait]
impl<T: RosterStore + ?Sized> RosterStore for Arc<T> {
    async fn upsert_employees(&self, rows: &[EmployeeRecord]) -> Result<u64> {
        (**self).upsert_employees(rows).await
    }

    async fn upsert_job_grades(&self, rows: &[JobGradeRecord]) -> Result<u64> {
        (**self).upsert_job_grades(rows).await
    }
}

#[derive(Clone)]
pub struct PgRosterStore {
    db: PgPool,
}

impl PgRosterStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RosterStore for PgRosterStore {
    async fn upsert_employees(&self, rows: &[EmployeeRecord]) -> Result<u64> {
        let mut tx = self.db.begin().await.context("Failed to begin transaction")?;
        let mut written = 0;

        for row in rows {
            let result = sqlx::query(
                r#"
                INSERT INTO employees (
                    employee_id, first_name, last_name, gender, hire_date,
                    job_family, role_title, job_level, department,
                    office_location, msa_name, msa_code,
                    annual_base_salary, salary_currency, data_as_of_date
                )
                VALUES (
                    $1, $2, $3, $4, $5::date,
                    $6, $7, $8, $9,
                    $10, $11, $12,
                    $13::numeric, $14, $15::date
                )
                ON CONFLICT (employee_id) DO UPDATE SET
                    first_name = EXCLUDED.first_name,
                    last_name = EXCLUDED.last_name,
                    gender = EXCLUDED.gender,
                    hire_date = EXCLUDED.hire_date,
                    job_family = EXCLUDED.job_family,
                    role_title = EXCLUDED.role_title,
                    job_level = EXCLUDED.job_level,
                    department = EXCLUDED.department,
                    office_location = EXCLUDED.office_location,
                    msa_name = EXCLUDED.msa_name,
                    msa_code = EXCLUDED.msa_code,
                    annual_base_salary = EXCLUDED.annual_base_salary,
                    salary_currency = EXCLUDED.salary_currency,
                    data_as_of_date = EXCLUDED.data_as_of_date
                "#,
            )
            .bind(&row.employee_id)
            .bind(&row.first_name)
            .bind(&row.last_name)
            .bind(&row.gender)
            .bind(&row.hire_date)
            .bind(&row.job_family)
            .bind(&row.role_title)
            .bind(&row.job_level)
            .bind(&row.department)
            .bind(&row.office_location)
            .bind(&row.msa_name)
            .bind(&row.msa_code)
            .bind(row.annual_base_salary)
            .bind(&row.salary_currency)
            .bind(&row.data_as_of_date)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to upsert employee {}", row.employee_id))?;

            written += result.rows_affected();
        }

        tx.commit().await.context("Failed to commit employees")?;
        Ok(written)
    }

    async fn upsert_job_grades(&self, rows: &[JobGradeRecord]) -> Result<u64> {
        let mut tx = self.db.begin().await.context("Failed to begin transaction")?;
        let mut written = 0;

        for row in rows {
            let result = sqlx::query(
                r#"
                INSERT INTO internal_job_grades (
                    grade_code, job_family, role_title, job_level,
                    band_minimum, band_midpoint, band_maximum,
                    salary_currency, geo_scope, below_market_flag,
                    effective_date, last_reviewed_date
                )
                VALUES (
                    $1, $2, $3, $4,
                    $5::numeric, $6::numeric, $7::numeric,
                    $8, $9, $10,
                    $11::date, $12::date
                )
                ON CONFLICT (grade_code) DO UPDATE SET
                    job_family = EXCLUDED.job_family,
                    role_title = EXCLUDED.role_title,
                    job_level = EXCLUDED.job_level,
                    band_minimum = EXCLUDED.band_minimum,
                    band_midpoint = EXCLUDED.band_midpoint,
                    band_maximum = EXCLUDED.band_maximum,
                    salary_currency = EXCLUDED.salary_currency,
                    geo_scope = EXCLUDED.geo_scope,
                    below_market_flag = EXCLUDED.below_market_flag,
                    effective_date = EXCLUDED.effective_date,
                    last_reviewed_date = EXCLUDED.last_reviewed_date
                "#,
            )
            .bind(&row.grade_code)
            .bind(&row.job_family)
            .bind(&row.role_title)
            .bind(&row.job_level)
            .bind(row.band_minimum)
            .bind(row.band_midpoint)
            .bind(row.band_maximum)
            .bind(&row.salary_currency)
            .bind(&row.geo_scope)
            .bind(&row.below_market_flag)
            .bind(&row.effective_date)
            .bind(&row.last_reviewed_date)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to upsert job grade {}", row.grade_code))?;

            written += result.rows_affected();
        }

        tx.commit().await.context("Failed to commit internal_job_grades")?;
        Ok(written)
    }
}
