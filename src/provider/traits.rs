use crate::model::{FetchError, TrendsFrame};

/// External interest-over-time source.
///
/// Returns one value column per requested keyword plus a completeness flag per
/// row, or an empty frame when the source has nothing for the query.
#[async_trait::async_trait]
pub trait TrendsSource: Send + Sync {
    async fn interest_over_time(
        &self,
        keywords: &[String],
        timeframe: &str,
        geo: &str,
    ) -> Result<TrendsFrame, FetchError>;
}
