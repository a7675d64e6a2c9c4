use crate::model::{CleanedSeries, DecompositionResult, ResultRow, ResultTable};

/// Joins the series dates with the decomposition components, one row per date.
///
/// Panics if the component lengths differ from the series length; the
/// decomposer guarantees alignment.
pub fn assemble(series: &CleanedSeries, decomposition: &DecompositionResult) -> ResultTable {
    let n = series.len();
    assert_eq!(decomposition.original.len(), n, "original length mismatch");
    assert_eq!(decomposition.trend.len(), n, "trend length mismatch");
    assert_eq!(decomposition.seasonal.len(), n, "seasonal length mismatch");
    assert_eq!(decomposition.residual.len(), n, "residual length mismatch");

    let rows = series
        .points
        .iter()
        .enumerate()
        .map(|(i, (date, _))| ResultRow {
            date: *date,
            original: decomposition.original[i],
            trend: decomposition.trend[i],
            seasonal: decomposition.seasonal[i],
            remainder: decomposition.residual[i],
        })
        .collect();

    ResultTable { rows }
}
