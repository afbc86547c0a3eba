//! Merges per-series values into per-(occupation, area, year) records

use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

use super::models::{parse_wage_value, SeriesDescriptor, WageKey, WageRecord};
use super::response::BlsResponse;

/// Accumulator threaded through the batch loop.
///
/// A record exists only once at least one of its series produced a present
/// value. The result does not depend on batch order or batch boundaries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WageAggregation {
    records: BTreeMap<WageKey, WageRecord>,
    resolved: HashSet<String>,
}

impl WageAggregation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one response into the aggregation.
    ///
    /// Only the first data point of each series is read. Returns how many
    /// series contributed a present value.
    pub fn absorb(
        &mut self,
        response: &BlsResponse,
        descriptors: &HashMap<String, SeriesDescriptor>,
        fallback_year: i32,
    ) -> usize {
        let mut contributed = 0;

        for series in response.series() {
            let series_id = series.series_id.as_deref().unwrap_or_default();
            let Some(descriptor) = descriptors.get(series_id) else {
                warn!(series_id, "Received unknown series ID in response");
                continue;
            };

            let Some(point) = series.data.first() else {
                debug!(series_id, "No data for series, suppressed or not published");
                continue;
            };

            let Some(value) = point.value.as_deref().and_then(parse_wage_value) else {
                debug!(series_id, "Suppressed wage value");
                continue;
            };

            let year = point.year().unwrap_or(fallback_year);
            let key = WageKey {
                soc_code: descriptor.soc_code.clone(),
                msa_code: descriptor.msa_code().to_string(),
                reference_year: year,
            };

            self.records
                .entry(key)
                .or_insert_with(|| WageRecord::for_descriptor(descriptor, year))
                .set(descriptor.statistic, value);

            if self.resolved.insert(descriptor.series_id.clone()) {
                contributed += 1;
            }
        }

        contributed
    }

    /// Unique records produced so far
    pub fn received(&self) -> usize {
        self.records.len()
    }

    /// Series that contributed a present value
    pub fn series_with_data(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_resolved(&self, series_id: &str) -> bool {
        self.resolved.contains(series_id)
    }

    /// Requested series that contributed nothing, in request order.
    ///
    /// Covers failed batches, series missing from the response, empty data
    /// and suppressed values alike; each series appears at most once.
    pub fn gaps(&self, requested: &[SeriesDescriptor]) -> Vec<String> {
        requested
            .iter()
            .filter(|d| !self.is_resolved(&d.series_id))
            .map(|d| d.series_id.clone())
            .collect()
    }

    pub fn records(&self) -> impl Iterator<Item = &WageRecord> {
        self.records.values()
    }

    /// Records ordered by key
    pub fn into_records(self) -> Vec<WageRecord> {
        self.records.into_values().collect()
    }
}

/// Index descriptors by series id for response lookup
pub fn index_descriptors(descriptors: &[SeriesDescriptor]) -> HashMap<String, SeriesDescriptor> {
    descriptors
        .iter()
        .map(|d| (d.series_id.clone(), d.clone()))
        .collect()
}
