use crate::model::SeasonalPeriod;
use crate::utils::median;
use chrono::{DateTime, Utc};

/// Guesses the seasonal cycle length (in samples) from the sampling cadence.
///
/// The median gap between consecutive timestamps, in whole days, picks the
/// cycle: daily data → weekly cycle (7), weekly data → yearly cycle (52),
/// anything coarser → yearly cycle in months (12). Fewer than 3 timestamps
/// gives 12.
pub fn infer_period(timestamps: &[DateTime<Utc>]) -> SeasonalPeriod {
    if timestamps.len() < 3 {
        return SeasonalPeriod::YEARLY_BY_MONTH;
    }

    let gaps: Vec<f64> = timestamps
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days() as f64)
        .collect();
    // Truncated to whole days, so a 7.5 day median still counts as weekly.
    let median_days = median(&gaps).unwrap_or(0.0).trunc() as i64;

    match median_days {
        d if d <= 1 => SeasonalPeriod::WEEKLY,
        d if d <= 7 => SeasonalPeriod::YEARLY_BY_WEEK,
        _ => SeasonalPeriod::YEARLY_BY_MONTH,
    }
}
