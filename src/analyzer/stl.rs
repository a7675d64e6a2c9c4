//! Seasonal-trend decomposition by LOESS (Cleveland et al., 1990).
//!
//! The inner loop alternates cycle-subseries smoothing (seasonal) and LOESS
//! of the deseasonalized series (trend). In robust mode an outer loop
//! reweights points by bisquare weights on the remainder so isolated spikes
//! stop pulling the trend and seasonal estimates.

use crate::analyzer::loess::{estimate, moving_average, smooth, Degree};
use crate::analyzer::Decomposer;
use crate::model::{CleanedSeries, DecompositionError, DecompositionResult, SeasonalPeriod};
use crate::utils::median;
use tracing::debug;

/// Smoother lengths and iteration counts for one STL run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StlParams {
    pub period: usize,
    pub seasonal: usize,
    pub trend: usize,
    pub low_pass: usize,
    pub inner_iter: usize,
    pub outer_iter: usize,
}

impl StlParams {
    pub const DEFAULT_SEASONAL: usize = 7;

    /// Standard choices: trend window is the smallest odd integer at least
    /// `1.5 * period / (1 - 1.5 / seasonal)`, low-pass window the smallest odd
    /// integer above `period`. Robust mode runs 2 inner and 15 outer passes.
    pub fn new(period: usize, seasonal: usize, robust: bool) -> Self {
        let trend = (1.5 * period as f64 / (1.0 - 1.5 / seasonal as f64)).ceil() as usize;
        let (inner_iter, outer_iter) = if robust { (2, 15) } else { (5, 0) };
        Self {
            period,
            seasonal,
            trend: make_odd(trend),
            low_pass: make_odd(period + 1),
            inner_iter,
            outer_iter,
        }
    }
}

fn make_odd(n: usize) -> usize {
    if n % 2 == 0 { n + 1 } else { n }
}

/// Additive STL decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StlDecomposer {
    seasonal: usize,
    robust: bool,
}

impl StlDecomposer {
    /// `seasonal` is the seasonal smoother length (odd, >= 3).
    pub fn new(seasonal: usize, robust: bool) -> Self {
        Self {
            seasonal: make_odd(seasonal.max(3)),
            robust,
        }
    }

    pub fn robust() -> Self {
        Self::new(StlParams::DEFAULT_SEASONAL, true)
    }
}

impl Default for StlDecomposer {
    fn default() -> Self {
        Self::robust()
    }
}

impl Decomposer for StlDecomposer {
    fn decompose(
        &self,
        series: &CleanedSeries,
        period: SeasonalPeriod,
    ) -> Result<DecompositionResult, DecompositionError> {
        let y = series.values();
        let p = period.get();
        if y.is_empty() {
            return Err(DecompositionError::EmptySeries);
        }
        if p < 2 {
            return Err(DecompositionError::InvalidPeriod(p));
        }
        if y.len() < 2 * p {
            return Err(DecompositionError::SeriesTooShort {
                len: y.len(),
                period: p,
                needed: 2 * p,
            });
        }
        if let Some(i) = y.iter().position(|v| !v.is_finite()) {
            return Err(DecompositionError::NonFiniteValue(i));
        }

        let params = StlParams::new(p, self.seasonal, self.robust);
        debug!("STL params: {:?}", params);
        let (trend, seasonal) = fit(&y, &params);

        let residual = y
            .iter()
            .zip(&trend)
            .zip(&seasonal)
            .map(|((v, t), s)| v - t - s)
            .collect();

        Ok(DecompositionResult {
            original: y,
            trend,
            seasonal,
            residual,
        })
    }
}

/// Runs the inner loop `outer_iter + 1` times, recomputing robustness weights
/// between passes. Returns `(trend, seasonal)`.
fn fit(y: &[f64], params: &StlParams) -> (Vec<f64>, Vec<f64>) {
    let n = y.len();
    let mut trend = vec![0.0; n];
    let mut season = vec![0.0; n];
    let mut weights = vec![1.0; n];
    let mut use_weights = false;

    for pass in 0..=params.outer_iter {
        let rw = use_weights.then_some(weights.as_slice());
        inner_loop(y, params, rw, &mut season, &mut trend);
        if pass == params.outer_iter {
            break;
        }
        let fitted: Vec<f64> = trend.iter().zip(&season).map(|(t, s)| t + s).collect();
        robustness_weights(y, &fitted, &mut weights);
        use_weights = true;
    }

    (trend, season)
}

fn inner_loop(
    y: &[f64],
    params: &StlParams,
    rw: Option<&[f64]>,
    season: &mut [f64],
    trend: &mut [f64],
) {
    let np = params.period;
    for _ in 0..params.inner_iter {
        let detrended: Vec<f64> = y.iter().zip(trend.iter()).map(|(v, t)| v - t).collect();
        let cycle = cycle_subseries(&detrended, np, params.seasonal, rw);
        let low = low_pass(&cycle, np, params.low_pass);

        for (i, s) in season.iter_mut().enumerate() {
            *s = cycle[np + i] - low[i];
        }

        let deseasonalized: Vec<f64> = y.iter().zip(season.iter()).map(|(v, s)| v - s).collect();
        trend.copy_from_slice(&smooth(&deseasonalized, params.trend, Degree::Linear, rw));
    }
}

/// Smooths each cycle-subseries and extends it by one cycle on both ends.
/// Output has `x.len() + 2 * np` points.
fn cycle_subseries(x: &[f64], np: usize, window: usize, rw: Option<&[f64]>) -> Vec<f64> {
    let n = x.len();
    let mut out = vec![0.0; n + 2 * np];

    for j in 0..np {
        let sub: Vec<f64> = x[j..].iter().step_by(np).copied().collect();
        let sub_rw: Option<Vec<f64>> = rw.map(|w| w[j..].iter().step_by(np).copied().collect());
        let k = sub.len();
        if k == 0 {
            continue;
        }

        let smoothed = smooth(&sub, window, Degree::Linear, sub_rw.as_deref());
        let mut scratch = vec![0.0; k];

        let right = window.min(k) - 1;
        let first = estimate(
            &sub,
            window,
            Degree::Linear,
            -1.0,
            0,
            right,
            sub_rw.as_deref(),
            &mut scratch,
        )
        .unwrap_or(smoothed[0]);
        let left = k.saturating_sub(window);
        let last = estimate(
            &sub,
            window,
            Degree::Linear,
            k as f64,
            left,
            k - 1,
            sub_rw.as_deref(),
            &mut scratch,
        )
        .unwrap_or(smoothed[k - 1]);

        let extended = std::iter::once(first)
            .chain(smoothed)
            .chain(std::iter::once(last));
        for (m, v) in extended.enumerate() {
            out[m * np + j] = v;
        }
    }
    out
}

/// Moving averages of length `np`, `np`, 3, then LOESS. Takes the
/// `n + 2 * np` extended cycle series and returns `n` points.
fn low_pass(cycle: &[f64], np: usize, window: usize) -> Vec<f64> {
    let a = moving_average(cycle, np);
    let b = moving_average(&a, np);
    let c = moving_average(&b, 3);
    smooth(&c, window, Degree::Linear, None)
}

/// Bisquare weights on `|y - fitted|` scaled by six times the median absolute
/// remainder. A vanishing median falls back to the mean absolute remainder.
fn robustness_weights(y: &[f64], fitted: &[f64], weights: &mut [f64]) {
    const SCALE_THRESHOLD: f64 = 1e-7;
    const MIN_SCALE: f64 = 1e-12;

    let residuals: Vec<f64> = y.iter().zip(fitted).map(|(v, f)| (v - f).abs()).collect();
    let mean_abs = residuals.iter().sum::<f64>() / residuals.len() as f64;
    let mut scale = median(&residuals).unwrap_or(0.0);
    if scale <= (SCALE_THRESHOLD * mean_abs).max(MIN_SCALE) {
        scale = mean_abs;
    }
    if scale <= MIN_SCALE {
        weights.fill(1.0);
        return;
    }

    let cmad = 6.0 * scale;
    let c1 = 0.001 * cmad;
    let c9 = 0.999 * cmad;
    for (w, r) in weights.iter_mut().zip(&residuals) {
        *w = if *r <= c1 {
            1.0
        } else if *r <= c9 {
            (1.0 - (r / cmad).powi(2)).powi(2)
        } else {
            0.0
        };
    }
}
