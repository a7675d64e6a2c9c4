pub mod fetcher;
pub mod traits;

pub use fetcher::{GoogleTrendsFetcher, RetryPolicy};
pub use traits::TrendsSource;

use crate::config::AppConfig;
use crate::model::{CleanedSeries, PipelineError};
use crate::normalizer::{clean_frame, select_series};
use crate::storage::TtlCache;
use std::sync::Arc;
use tracing::{debug, info};

/// Acquisition parameters fixed for the lifetime of a provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuerySettings {
    pub region: String,
    pub language: String,
    pub timeframe: String,
}

impl From<&AppConfig> for QuerySettings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            region: cfg.region.clone(),
            language: cfg.language.clone(),
            timeframe: cfg.timeframe.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub keyword: String,
    pub settings: QuerySettings,
}

pub type SeriesCache = TtlCache<CacheKey, CleanedSeries>;

/// Fetches and cleans the series for one keyword.
pub struct SeriesProvider<S> {
    source: S,
    settings: QuerySettings,
    cache: Option<Arc<SeriesCache>>,
}

impl<S: TrendsSource> SeriesProvider<S> {
    pub fn new(source: S, settings: QuerySettings) -> Self {
        Self {
            source,
            settings,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<SeriesCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Returns the cleaned series, or an empty one if the source has no rows
    /// (or only the trailing row). The keyword is trimmed and must be non-empty.
    pub async fn fetch(&self, keyword: &str) -> Result<CleanedSeries, PipelineError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(PipelineError::InvalidInput);
        }

        let key = CacheKey {
            keyword: keyword.to_string(),
            settings: self.settings.clone(),
        };
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&key).await {
                info!("Cache hit for '{}' ({} points)", keyword, hit.len());
                return Ok(hit);
            }
        }

        let keywords = [keyword.to_string()];
        let frame = self
            .source
            .interest_over_time(&keywords, &self.settings.timeframe, &self.settings.region)
            .await?;
        debug!("Source returned {} raw rows", frame.rows.len());

        let series = if frame.is_empty() {
            CleanedSeries {
                keyword: keyword.to_string(),
                points: Vec::new(),
            }
        } else {
            let table = clean_frame(frame);
            if table.is_empty() {
                CleanedSeries {
                    keyword: keyword.to_string(),
                    points: Vec::new(),
                }
            } else {
                select_series(&table, keyword).ok_or_else(|| PipelineError::ColumnMismatch {
                    column: keyword.to_string(),
                })?
            }
        };

        if let Some(cache) = &self.cache {
            cache.insert(key, series.clone()).await;
        }
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FetchError, RawObservation, TrendsFrame};
    use crate::storage::ManualClock;
    use chrono::{DateTime, Duration as ChronoDuration};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingSource {
        calls: Arc<AtomicUsize>,
        frame: TrendsFrame,
    }

    #[async_trait::async_trait]
    impl TrendsSource for CountingSource {
        async fn interest_over_time(
            &self,
            _keywords: &[String],
            _timeframe: &str,
            _geo: &str,
        ) -> Result<TrendsFrame, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.frame.clone())
        }
    }

    fn weekly_frame(column: &str, n: i64) -> TrendsFrame {
        let start = DateTime::from_timestamp(1_602_979_200, 0).unwrap();
        TrendsFrame {
            columns: vec![column.to_string()],
            rows: (0..n)
                .map(|i| RawObservation {
                    timestamp: start + ChronoDuration::weeks(i),
                    values: vec![i as f64],
                    is_partial: i == n - 1,
                })
                .collect(),
        }
    }

    fn settings() -> QuerySettings {
        QuerySettings::from(&AppConfig::default())
    }

    fn provider(frame: TrendsFrame) -> (SeriesProvider<CountingSource>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            calls: calls.clone(),
            frame,
        };
        (SeriesProvider::new(source, settings()), calls)
    }

    #[tokio::test]
    async fn blank_keyword_is_rejected_without_fetching() {
        let (p, calls) = provider(weekly_frame("x", 5));
        assert_eq!(p.fetch("   ").await, Err(PipelineError::InvalidInput));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn keyword_is_trimmed_and_trailing_row_dropped() {
        let (p, _) = provider(weekly_frame("rocket stove", 10));
        let series = p.fetch("  rocket stove ").await.unwrap();
        assert_eq!(series.keyword, "rocket stove");
        assert_eq!(series.len(), 9);
    }

    #[tokio::test]
    async fn missing_column_is_reported() {
        let (p, _) = provider(weekly_frame("something else", 10));
        assert_eq!(
            p.fetch("rocket stove").await,
            Err(PipelineError::ColumnMismatch {
                column: "rocket stove".into()
            })
        );
    }

    #[tokio::test]
    async fn empty_source_gives_empty_series() {
        let (p, _) = provider(TrendsFrame::default());
        assert!(p.fetch("nothing").await.unwrap().is_empty());
        let (p, _) = provider(weekly_frame("one", 1));
        assert!(p.fetch("one").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cache_serves_repeat_calls_until_ttl() {
        let clock = ManualClock::new();
        let cache = Arc::new(SeriesCache::with_clock(
            Duration::from_secs(3600),
            Arc::new(clock.clone()),
        ));
        let (p, calls) = provider(weekly_frame("kw", 6));
        let p = p.with_cache(cache);

        p.fetch("kw").await.unwrap();
        p.fetch(" kw").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        clock.advance(Duration::from_secs(3601));
        p.fetch("kw").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
