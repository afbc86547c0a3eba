//! Job configuration
//!
//! Every setting has a `DEFAULT_*` constant and an environment override. The
//! CLI applies its own overrides on top through the `with_*` methods.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// BLS API Constants
// ============================================================================

/// Default BLS public API v2 base URL.
pub const DEFAULT_BLS_API_BASE_URL: &str = "https://api.bls.gov/publicAPI/v2";

/// Default OEWS survey year. OEWS data for year N is published in April of N+1.
pub const DEFAULT_SURVEY_YEAR: i32 = 2024;

/// Series per request when a registration key is configured.
pub const DEFAULT_REGISTERED_BATCH_SIZE: usize = 50;

/// Series per request on the unregistered public tier.
pub const DEFAULT_PUBLIC_BATCH_SIZE: usize = 25;

/// Pause between consecutive API calls in milliseconds.
pub const DEFAULT_INTER_BATCH_DELAY_MS: u64 = 500;

/// Per-request HTTP timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// CSV Constants
// ============================================================================

/// Default directory holding the roster and grade CSV files.
pub const DEFAULT_DATA_DIR: &str = "./data";

pub const EMPLOYEES_FILE_NAME: &str = "technova_employees.csv";

pub const JOB_GRADES_FILE_NAME: &str = "technova_job_grades.csv";

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Configuration for the BLS OEWS wage pull
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlsConfig {
    /// API base URL; the series endpoint is `{base_url}/timeseries/data/`
    pub base_url: String,
    /// Registration key; `None` selects the public tier
    pub registration_key: Option<String>,
    pub survey_year: i32,
    pub registered_batch_size: usize,
    pub public_batch_size: usize,
    pub inter_batch_delay: Duration,
    pub request_timeout: Duration,
}

impl Default for BlsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BLS_API_BASE_URL.to_string(),
            registration_key: None,
            survey_year: DEFAULT_SURVEY_YEAR,
            registered_batch_size: DEFAULT_REGISTERED_BATCH_SIZE,
            public_batch_size: DEFAULT_PUBLIC_BATCH_SIZE,
            inter_batch_delay: Duration::from_millis(DEFAULT_INTER_BATCH_DELAY_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl BlsConfig {
    /// Load from `BLS_*` environment variables, falling back to defaults.
    ///
    /// A blank `BLS_REGISTRATION_KEY` counts as unset.
    pub fn from_env() -> anyhow::Result<Self> {
        let survey_year = match std::env::var("BLS_SURVEY_YEAR") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("BLS_SURVEY_YEAR is not a year: {:?}", raw))?,
            Err(_) => DEFAULT_SURVEY_YEAR,
        };

        let config = Self {
            base_url: std::env::var("BLS_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BLS_API_BASE_URL.to_string()),
            registration_key: std::env::var("BLS_REGISTRATION_KEY")
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            survey_year,
            registered_batch_size: env_or(
                "BLS_BATCH_SIZE_REGISTERED",
                DEFAULT_REGISTERED_BATCH_SIZE,
            ),
            public_batch_size: env_or("BLS_BATCH_SIZE_PUBLIC", DEFAULT_PUBLIC_BATCH_SIZE),
            inter_batch_delay: Duration::from_millis(env_or(
                "BLS_INTER_BATCH_DELAY_MS",
                DEFAULT_INTER_BATCH_DELAY_MS,
            )),
            request_timeout: Duration::from_secs(env_or(
                "BLS_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
        };

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.base_url.trim().is_empty() {
            anyhow::bail!("BLS API base URL cannot be empty");
        }

        if self.registered_batch_size == 0 || self.public_batch_size == 0 {
            anyhow::bail!("BLS batch sizes must be greater than 0");
        }

        if !(1997..=2100).contains(&self.survey_year) {
            anyhow::bail!("Survey year {} is outside the OEWS range", self.survey_year);
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("BLS request timeout must be greater than 0");
        }

        Ok(())
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_registration_key(mut self, key: impl Into<String>) -> Self {
        self.registration_key = Some(key.into());
        self
    }

    pub fn with_survey_year(mut self, year: i32) -> Self {
        self.survey_year = year;
        self
    }

    pub fn with_public_batch_size(mut self, size: usize) -> Self {
        self.public_batch_size = size;
        self
    }

    pub fn with_registered_batch_size(mut self, size: usize) -> Self {
        self.registered_batch_size = size;
        self
    }

    pub fn with_inter_batch_delay(mut self, delay: Duration) -> Self {
        self.inter_batch_delay = delay;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Series per request for the configured credential tier
    pub fn batch_size(&self) -> usize {
        if self.registration_key.is_some() {
            self.registered_batch_size
        } else {
            self.public_batch_size
        }
    }

    pub fn series_url(&self) -> String {
        format!("{}/timeseries/data/", self.base_url.trim_end_matches('/'))
    }
}

/// Configuration for CSV ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvConfig {
    pub data_dir: PathBuf,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl CsvConfig {
    pub fn from_env() -> Self {
        Self {
            data_dir: std::env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR)),
        }
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn employees_path(&self) -> PathBuf {
        self.data_dir.join(EMPLOYEES_FILE_NAME)
    }

    pub fn job_grades_path(&self) -> PathBuf {
        self.data_dir.join(JOB_GRADES_FILE_NAME)
    }
}
