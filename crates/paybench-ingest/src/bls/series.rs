//! OEWS series identifier construction

use super::models::{Geography, OccupationCode, SeriesDescriptor, StatisticKind};

/// OEWS industry code for cross-industry estimates
pub const CROSS_INDUSTRY_CODE: &str = "000000";

/// Build an MSA-level OEWS series id.
///
/// Layout: `OE` prefix, `U` (unadjusted), `M` (MSA), 7-digit area code,
/// 6-digit industry, 6-digit SOC without the dash, 2-digit data type.
///
/// ```
/// use paybench_ingest::bls::models::StatisticKind;
/// use paybench_ingest::bls::series::build_series_id;
///
/// let id = build_series_id("19740", "15-1252", StatisticKind::AnnualMean);
/// assert_eq!(id, "OEUM001974000000015125203");
/// ```
pub fn build_series_id(area_code: &str, soc_code: &str, statistic: StatisticKind) -> String {
    let soc_digits = soc_code.replace('-', "");
    format!(
        "OEUM{:0>7}{}{:0>6}{}",
        area_code,
        CROSS_INDUSTRY_CODE,
        soc_digits,
        statistic.type_code()
    )
}

/// Every (geography, occupation, statistic) combination, geography-major.
pub fn build_all_series(
    catalog: &[OccupationCode],
    geographies: &[Geography],
    statistics: &[StatisticKind],
) -> Vec<SeriesDescriptor> {
    let mut descriptors =
        Vec::with_capacity(geographies.len() * catalog.len() * statistics.len());

    for geography in geographies {
        for occupation in catalog {
            for statistic in statistics {
                descriptors.push(SeriesDescriptor {
                    series_id: build_series_id(
                        geography.area_code(),
                        &occupation.soc_code,
                        *statistic,
                    ),
                    geography: *geography,
                    soc_code: occupation.soc_code.clone(),
                    soc_title: occupation.soc_title.clone(),
                    statistic: *statistic,
                });
            }
        }
    }

    descriptors
}
