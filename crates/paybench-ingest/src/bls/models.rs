//! BLS OEWS domain models

use serde::{Deserialize, Serialize};

/// Metro areas covered by the wage pull
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Geography {
    Austin,
    NewYork,
    SanFrancisco,
    Washington,
    Denver,
}

impl Geography {
    pub const ALL: [Geography; 5] = [
        Geography::Austin,
        Geography::NewYork,
        Geography::SanFrancisco,
        Geography::Washington,
        Geography::Denver,
    ];

    /// Display name as stored in `bls_wage_data.msa_name`
    pub fn name(&self) -> &'static str {
        match self {
            Geography::Austin => "Austin TX",
            Geography::NewYork => "New York NY",
            Geography::SanFrancisco => "San Francisco CA",
            Geography::Washington => "Washington DC",
            Geography::Denver => "Denver CO",
        }
    }

    /// 5-digit MSA code
    pub fn area_code(&self) -> &'static str {
        match self {
            Geography::Austin => "12420",
            Geography::NewYork => "35620",
            Geography::SanFrancisco => "41860",
            Geography::Washington => "47900",
            Geography::Denver => "19740",
        }
    }
}

/// Wage statistics published per occupation and area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatisticKind {
    AnnualMean,
    Pct10,
    Pct25,
    Median,
    Pct75,
    Pct90,
}

impl StatisticKind {
    pub const ALL: [StatisticKind; 6] = [
        StatisticKind::AnnualMean,
        StatisticKind::Pct10,
        StatisticKind::Pct25,
        StatisticKind::Median,
        StatisticKind::Pct75,
        StatisticKind::Pct90,
    ];

    /// OEWS data type code, the last two characters of a series id
    pub fn type_code(&self) -> &'static str {
        match self {
            StatisticKind::AnnualMean => "03",
            StatisticKind::Pct10 => "11",
            StatisticKind::Pct25 => "12",
            StatisticKind::Median => "13",
            StatisticKind::Pct75 => "14",
            StatisticKind::Pct90 => "15",
        }
    }

    /// Target column in `bls_wage_data`
    pub fn column(&self) -> &'static str {
        match self {
            StatisticKind::AnnualMean => "annual_mean",
            StatisticKind::Pct10 => "pct_10",
            StatisticKind::Pct25 => "pct_25",
            StatisticKind::Median => "pct_50",
            StatisticKind::Pct75 => "pct_75",
            StatisticKind::Pct90 => "pct_90",
        }
    }
}

/// One row of `soc_code_reference`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OccupationCode {
    /// SOC code, `XX-XXXX`
    pub soc_code: String,
    pub soc_title: String,
    /// Internal job families mapped to this code
    pub used_by_families: Option<String>,
}

impl OccupationCode {
    pub fn new(soc_code: impl Into<String>, soc_title: impl Into<String>) -> Self {
        Self {
            soc_code: soc_code.into(),
            soc_title: soc_title.into(),
            used_by_families: None,
        }
    }
}

/// A single requestable series with the metadata needed to place its value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesDescriptor {
    pub series_id: String,
    pub geography: Geography,
    pub soc_code: String,
    pub soc_title: String,
    pub statistic: StatisticKind,
}

impl SeriesDescriptor {
    pub fn msa_name(&self) -> &'static str {
        self.geography.name()
    }

    pub fn msa_code(&self) -> &'static str {
        self.geography.area_code()
    }

    pub fn column(&self) -> &'static str {
        self.statistic.column()
    }
}

/// Natural key of `bls_wage_data`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WageKey {
    pub soc_code: String,
    pub msa_code: String,
    pub reference_year: i32,
}

/// One `bls_wage_data` row; each statistic is independently optional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WageRecord {
    pub soc_code: String,
    pub soc_title: String,
    pub msa_code: String,
    pub msa_name: String,
    pub reference_year: i32,
    pub annual_mean: Option<f64>,
    pub pct_10: Option<f64>,
    pub pct_25: Option<f64>,
    pub pct_50: Option<f64>,
    pub pct_75: Option<f64>,
    pub pct_90: Option<f64>,
}

impl WageRecord {
    /// Empty record for the descriptor's occupation and area
    pub fn for_descriptor(descriptor: &SeriesDescriptor, reference_year: i32) -> Self {
        Self {
            soc_code: descriptor.soc_code.clone(),
            soc_title: descriptor.soc_title.clone(),
            msa_code: descriptor.msa_code().to_string(),
            msa_name: descriptor.msa_name().to_string(),
            reference_year,
            annual_mean: None,
            pct_10: None,
            pct_25: None,
            pct_50: None,
            pct_75: None,
            pct_90: None,
        }
    }

    pub fn key(&self) -> WageKey {
        WageKey {
            soc_code: self.soc_code.clone(),
            msa_code: self.msa_code.clone(),
            reference_year: self.reference_year,
        }
    }

    fn slot(&mut self, statistic: StatisticKind) -> &mut Option<f64> {
        match statistic {
            StatisticKind::AnnualMean => &mut self.annual_mean,
            StatisticKind::Pct10 => &mut self.pct_10,
            StatisticKind::Pct25 => &mut self.pct_25,
            StatisticKind::Median => &mut self.pct_50,
            StatisticKind::Pct75 => &mut self.pct_75,
            StatisticKind::Pct90 => &mut self.pct_90,
        }
    }

    pub fn set(&mut self, statistic: StatisticKind, value: f64) {
        *self.slot(statistic) = Some(value);
    }

    pub fn get(&self, statistic: StatisticKind) -> Option<f64> {
        match statistic {
            StatisticKind::AnnualMean => self.annual_mean,
            StatisticKind::Pct10 => self.pct_10,
            StatisticKind::Pct25 => self.pct_25,
            StatisticKind::Median => self.pct_50,
            StatisticKind::Pct75 => self.pct_75,
            StatisticKind::Pct90 => self.pct_90,
        }
    }

    /// Number of statistic columns holding a value
    pub fn populated(&self) -> usize {
        StatisticKind::ALL
            .iter()
            .filter(|s| self.get(**s).is_some())
            .count()
    }
}

/// Sentinels BLS uses for suppressed or unpublished estimates
pub const SUPPRESSION_SENTINELS: [&str; 5] = ["-", "**", "N/A", "NA", ""];

/// Parse a published wage string; suppressed or malformed values are absent.
///
/// ```
/// use paybench_ingest::bls::models::parse_wage_value;
///
/// assert_eq!(parse_wage_value("125000"), Some(125000.0));
/// assert_eq!(parse_wage_value("**"), None);
/// assert_eq!(parse_wage_value("12x"), None);
/// ```
pub fn parse_wage_value(raw: &str) -> Option<f64> {
    let value = raw.trim();
    if SUPPRESSION_SENTINELS.contains(&value) {
        return None;
    }
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}
