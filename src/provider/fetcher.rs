use crate::config::AppConfig;
use crate::model::{FetchError, TrendsFrame};
use crate::parser::{parse_explore, parse_multiline};
use crate::provider::traits::TrendsSource;

use rand::Rng;
use reqwest::{Client, RequestBuilder};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

const HOME_URL: &str = "https://trends.google.com/";
const EXPLORE_URL: &str = "https://trends.google.com/trends/api/explore";
const MULTILINE_URL: &str = "https://trends.google.com/trends/api/widgetdata/multiline";

/// Bounded retry with exponential backoff: attempt `n` (1-based) waits
/// `backoff_factor * 2^(n-1)` seconds plus up to 10% jitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub backoff_factor: f64,
}

impl RetryPolicy {
    pub fn base_delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let secs = self.backoff_factor * 2f64.powi(attempt as i32 - 1);
        Duration::from_secs_f64(secs.max(0.0))
    }

    fn delay(&self, attempt: u32) -> Duration {
        let base = self.base_delay(attempt);
        if base.is_zero() {
            return base;
        }
        let jitter = rand::rng().random_range(0.0..=base.as_secs_f64() * 0.1);
        base + Duration::from_secs_f64(jitter)
    }
}

impl From<&AppConfig> for RetryPolicy {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            retries: cfg.retries,
            backoff_factor: cfg.backoff_factor,
        }
    }
}

/// Google Trends client: explore call for the widget token, then the
/// interest-over-time (multiline) call.
pub struct GoogleTrendsFetcher {
    pub client: Client,
    language: String,
    timezone_offset: i32,
    retry: RetryPolicy,
}

impl GoogleTrendsFetcher {
    pub fn new(cfg: &AppConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) DemandScope/0.1")
            .cookie_store(true)
            .connect_timeout(cfg.connect_timeout())
            .timeout(cfg.read_timeout())
            .build()
            .map_err(|e| FetchError::Http(e.to_string()))?;

        Ok(Self {
            client,
            language: cfg.language.clone(),
            timezone_offset: cfg.timezone_offset,
            retry: RetryPolicy::from(cfg),
        })
    }

    fn base_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("hl", self.language.clone()),
            ("tz", self.timezone_offset.to_string()),
        ]
    }

    /// Collects session cookies. Failure here is not fatal; the API calls
    /// report their own errors.
    async fn warm_up(&self, geo: &str) {
        match self.client.get(HOME_URL).query(&[("geo", geo)]).send().await {
            Ok(resp) => debug!("Session warm-up [{}]", resp.status()),
            Err(e) => warn!("Session warm-up failed: {}", e),
        }
    }

    async fn send_once(&self, request: RequestBuilder) -> Result<String, FetchError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::from_status(status.as_u16()));
        }
        Ok(response.text().await?)
    }

    async fn send_with_retry<F>(&self, what: &str, build: F) -> Result<String, FetchError>
    where
        F: Fn() -> RequestBuilder,
    {
        retry(&self.retry, what, || self.send_once(build())).await
    }
}

/// Runs `op` until it succeeds, fails with a non-transient error, or the
/// policy's retries are spent. `op` runs at most `retries + 1` times.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, what: &str, mut op: F) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.retries => {
                attempt += 1;
                let delay = policy.delay(attempt);
                warn!(
                    "{} failed ({}), retry {}/{} in {:?}",
                    what, e, attempt, policy.retries, delay
                );
                sleep(delay).await;
            }
            Err(e) => {
                warn!("{} failed after {} retries: {}", what, attempt, e);
                return Err(e);
            }
        }
    }
}

#[async_trait::async_trait]
impl TrendsSource for GoogleTrendsFetcher {
    async fn interest_over_time(
        &self,
        keywords: &[String],
        timeframe: &str,
        geo: &str,
    ) -> Result<TrendsFrame, FetchError> {
        self.warm_up(geo).await;

        let comparison: Vec<_> = keywords
            .iter()
            .map(|kw| serde_json::json!({ "keyword": kw, "time": timeframe, "geo": geo }))
            .collect();
        let explore_req = serde_json::json!({
            "comparisonItem": comparison,
            "category": 0,
            "property": "",
        })
        .to_string();

        let mut params = self.base_params();
        params.push(("req", explore_req));
        info!("Requesting explore token for {:?}", keywords);
        let body = self
            .send_with_retry("explore", || self.client.post(EXPLORE_URL).query(&params))
            .await?;
        let widget = parse_explore(&body)?;

        let mut params = self.base_params();
        params.push(("req", widget.request.to_string()));
        params.push(("token", widget.token.clone()));
        info!("Requesting interest over time...");
        let body = self
            .send_with_retry("interest over time", || {
                self.client.get(MULTILINE_URL).query(&params)
            })
            .await?;

        let frame = parse_multiline(&body, keywords)?;
        info!("Received {} rows", frame.rows.len());
        Ok(frame)
    }
}
