use crate::analyzer::{assemble, infer_period, Decomposer};
use crate::model::{AnalysisReport, PipelineError};
use crate::provider::{SeriesProvider, TrendsSource};
use tracing::info;

/// One run: fetch → infer period → decompose → assemble.
pub struct Pipeline<S, D> {
    provider: SeriesProvider<S>,
    decomposer: D,
}

impl<S: TrendsSource, D: Decomposer> Pipeline<S, D> {
    pub fn new(provider: SeriesProvider<S>, decomposer: D) -> Self {
        Self { provider, decomposer }
    }

    /// Runs every stage to completion. Any failure ends the run; nothing
    /// partial is returned. Failures are returned, not logged; the caller
    /// reports them with their stage.
    pub async fn run(&self, keyword: &str) -> Result<AnalysisReport, PipelineError> {
        info!("Fetching series for '{}'...", keyword.trim());
        let series = self.provider.fetch(keyword).await?;
        if series.is_empty() {
            return Err(PipelineError::EmptyResult {
                keyword: series.keyword,
            });
        }
        info!("Series has {} points", series.len());

        let period = infer_period(&series.timestamps());
        info!("Inferred seasonal period: {}", period);

        let decomposition = self.decomposer.decompose(&series, period)?;
        let table = assemble(&series, &decomposition);
        info!("Assembled {} rows", table.len());

        Ok(AnalysisReport {
            keyword: series.keyword,
            period,
            table,
        })
    }
}
