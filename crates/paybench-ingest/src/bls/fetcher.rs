//! Sequential batch fetching against the rate-limited API

use futures::stream::{self, Stream, StreamExt};
use std::time::Duration;
use tracing::info;

use super::client::{BlsApi, FetchError};
use super::models::SeriesDescriptor;
use super::response::BlsResponse;

/// Outcome of one API call
#[derive(Debug)]
pub struct BatchResult {
    /// 1-based batch number
    pub number: usize,
    pub total: usize,
    pub series_ids: Vec<String>,
    pub result: Result<BlsResponse, FetchError>,
}

/// Splits descriptors into contiguous batches and requests them one at a time
pub struct BatchFetcher<A> {
    api: A,
    batch_size: usize,
    delay: Duration,
}

impl<A: BlsApi> BatchFetcher<A> {
    pub fn new(api: A, batch_size: usize, delay: Duration) -> Self {
        Self {
            api,
            batch_size: batch_size.max(1),
            delay,
        }
    }

    pub fn batch_count(&self, series: usize) -> usize {
        series.div_ceil(self.batch_size)
    }

    /// Stream one [`BatchResult`] per batch, in order.
    ///
    /// Calls never overlap. The configured delay is observed between
    /// consecutive calls but not after the last one. Failures are carried in
    /// the result rather than ending the stream.
    pub fn fetch_all<'a>(
        &'a self,
        descriptors: &'a [SeriesDescriptor],
        year: i32,
    ) -> impl Stream<Item = BatchResult> + 'a {
        let batches: Vec<Vec<String>> = descriptors
            .chunks(self.batch_size)
            .map(|chunk| chunk.iter().map(|d| d.series_id.clone()).collect())
            .collect();
        let total = batches.len();

        stream::iter(batches.into_iter().enumerate()).then(move |(index, series_ids)| async move {
            if index > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            info!(
                batch = index + 1,
                total,
                series = series_ids.len(),
                "Requesting batch"
            );
            let result = self.api.fetch_batch(&series_ids, year).await;

            BatchResult {
                number: index + 1,
                total,
                series_ids,
                result,
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::bls::models::{Geography, OccupationCode, StatisticKind};
    use crate::bls::series::build_all_series;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingApi {
        calls: Mutex<Vec<(usize, i32)>>,
    }

    #[async_trait]
    impl BlsApi for RecordingApi {
        async fn fetch_batch(
            &self,
            series_ids: &[String],
            year: i32,
        ) -> Result<BlsResponse, FetchError> {
            let mut calls = self.calls.lock().unwrap();
            calls.push((series_ids.len(), year));
            if calls.len() == 2 {
                return Err(FetchError::Status(503));
            }
            Ok(BlsResponse::default())
        }
    }

    fn descriptors(occupations: usize) -> Vec<SeriesDescriptor> {
        let catalog: Vec<_> = (0..occupations)
            .map(|i| OccupationCode::new(format!("15-12{:02}", i), "Test"))
            .collect();
        build_all_series(&catalog, &Geography::ALL, &StatisticKind::ALL)
    }

    #[tokio::test(start_paused = true)]
    async fn test_contiguous_batches_with_delay_between() {
        let fetcher = BatchFetcher::new(RecordingApi::default(), 25, Duration::from_millis(500));
        let series = descriptors(2);
        assert_eq!(fetcher.batch_count(series.len()), 3);

        let started = tokio::time::Instant::now();
        let results: Vec<_> = fetcher.fetch_all(&series, 2024).collect().await;
        let elapsed = started.elapsed();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].series_ids, series[..25].iter().map(|d| d.series_id.clone()).collect::<Vec<_>>());
        assert_eq!(results[2].series_ids.len(), 10);
        assert!(results.iter().all(|b| b.total == 3));
        assert_eq!(results[1].result, Err(FetchError::Status(503)));
        assert!(results[2].result.is_ok());

        // Two pauses for three calls
        assert!(elapsed >= Duration::from_millis(1000));
        assert!(elapsed < Duration::from_millis(1500));

        let calls = fetcher.api.calls.lock().unwrap();
        assert_eq!(*calls, vec![(25, 2024), (25, 2024), (10, 2024)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_batch_has_no_delay() {
        let fetcher = BatchFetcher::new(RecordingApi::default(), 50, Duration::from_secs(5));
        let series = descriptors(1);

        let started = tokio::time::Instant::now();
        let results: Vec<_> = fetcher.fetch_all(&series, 2023).collect().await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].series_ids.len(), 30);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_no_descriptors_no_calls() {
        let fetcher = BatchFetcher::new(RecordingApi::default(), 25, Duration::ZERO);
        let results: Vec<_> = fetcher.fetch_all(&[], 2024).collect().await;
        assert!(results.is_empty());
        assert!(fetcher.api.calls.lock().unwrap().is_empty());
    }
}
