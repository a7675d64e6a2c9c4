// Analyzer module: cadence heuristic, STL decomposition and result assembly.

pub mod assembler;
pub mod loess;
pub mod period;
pub mod stl;

pub use assembler::assemble;
pub use period::infer_period;
pub use stl::{StlDecomposer, StlParams};

use crate::model::{CleanedSeries, DecompositionError, DecompositionResult, SeasonalPeriod};

/// Splits a series into trend, seasonal and residual parts aligned with its dates.
pub trait Decomposer: Send + Sync {
    fn decompose(
        &self,
        series: &CleanedSeries,
        period: SeasonalPeriod,
    ) -> Result<DecompositionResult, DecompositionError>;
}
