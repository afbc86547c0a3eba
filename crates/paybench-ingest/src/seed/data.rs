//! Embedded SOC reference data and role crosswalk

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const REFERENCE_SEED_JSON: &str = include_str!("../../data/reference_seed.json");

/// One row of `soc_code_reference`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocReference {
    pub soc_code: String,
    pub soc_title: String,
    pub soc_major_group: String,
    pub used_by_families: String,
}

/// How closely a SOC code matches an internal role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchQuality {
    Exact,
    Close,
    BestAvailable,
    KnownGap,
}

impl MatchQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchQuality::Exact => "EXACT",
            MatchQuality::Close => "CLOSE",
            MatchQuality::BestAvailable => "BEST_AVAILABLE",
            MatchQuality::KnownGap => "KNOWN_GAP",
        }
    }
}

/// One row of `job_soc_crosswalk`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrosswalkEntry {
    pub crosswalk_id: String,
    pub job_family: String,
    pub technova_role_title: String,
    pub job_level_applicability: String,
    pub soc_code: String,
    pub soc_title: String,
    pub match_quality: MatchQuality,
    pub match_notes: String,
    /// `YES` when the wage pull should query this code for the role
    pub pipeline_query_flag: String,
    pub naics_filter_recommended: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReferenceData {
    pub soc_codes: Vec<SocReference>,
    pub crosswalk: Vec<CrosswalkEntry>,
}

impl ReferenceData {
    /// The reference set compiled into the binary
    pub fn embedded() -> Result<Self> {
        serde_json::from_str(REFERENCE_SEED_JSON).context("Failed to parse embedded reference data")
    }

    /// Rows across both tables
    pub fn total_rows(&self) -> usize {
        self.soc_codes.len() + self.crosswalk.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_embedded_counts() {
        let data = ReferenceData::embedded().unwrap();
        assert_eq!(data.soc_codes.len(), 20);
        assert_eq!(data.crosswalk.len(), 38);
        assert_eq!(data.total_rows(), 58);
    }

    #[test]
    fn test_keys_are_unique() {
        let data = ReferenceData::embedded().unwrap();

        let codes: HashSet<_> = data.soc_codes.iter().map(|s| &s.soc_code).collect();
        assert_eq!(codes.len(), data.soc_codes.len());

        let ids: HashSet<_> = data.crosswalk.iter().map(|c| &c.crosswalk_id).collect();
        assert_eq!(ids.len(), data.crosswalk.len());
    }

    #[test]
    fn test_crosswalk_references_known_codes() {
        let data = ReferenceData::embedded().unwrap();
        let codes: HashSet<_> = data.soc_codes.iter().map(|s| s.soc_code.as_str()).collect();

        for entry in &data.crosswalk {
            assert!(
                codes.contains(entry.soc_code.as_str()),
                "{} maps to unknown SOC code {}",
                entry.crosswalk_id,
                entry.soc_code
            );
        }
    }

    #[test]
    fn test_soc_codes_are_well_formed() {
        let data = ReferenceData::embedded().unwrap();
        for soc in &data.soc_codes {
            let (major, minor) = soc.soc_code.split_once('-').unwrap();
            assert_eq!(major.len(), 2, "{}", soc.soc_code);
            assert_eq!(minor.len(), 4, "{}", soc.soc_code);
            assert!(major.chars().chain(minor.chars()).all(|c| c.is_ascii_digit()));
        }
    }
}
