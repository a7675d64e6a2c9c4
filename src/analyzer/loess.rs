//! Local weighted regression on an evenly spaced index.
//!
//! Points are at positions `0..n`. Each estimate uses a tricube kernel over the
//! `window` nearest points, optionally multiplied by robustness weights, and
//! fits either a local constant or a local line.

/// Degree of the local polynomial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Degree {
    Constant,
    #[default]
    Linear,
}

/// Estimates the smoothed value at position `xs` from `y[left..=right]`.
///
/// `scratch` must be at least `y.len()` long. Returns `None` when every
/// neighbour has zero weight.
#[allow(clippy::too_many_arguments)]
pub fn estimate(
    y: &[f64],
    window: usize,
    degree: Degree,
    xs: f64,
    left: usize,
    right: usize,
    robustness: Option<&[f64]>,
    scratch: &mut [f64],
) -> Option<f64> {
    let n = y.len();
    let range = n as f64 - 1.0;
    let mut h = (xs - left as f64).max(right as f64 - xs);
    if window > n {
        h += ((window - n) / 2) as f64;
    }
    let h9 = 0.999 * h;
    let h1 = 0.001 * h;

    let mut total = 0.0;
    for j in left..=right {
        scratch[j] = 0.0;
        let r = (j as f64 - xs).abs();
        if r <= h9 {
            let mut w = if r <= h1 {
                1.0
            } else {
                (1.0 - (r / h).powi(3)).powi(3)
            };
            if let Some(rw) = robustness {
                w *= rw[j];
            }
            scratch[j] = w;
            total += w;
        }
    }
    if total <= 0.0 {
        return None;
    }

    for w in &mut scratch[left..=right] {
        *w /= total;
    }

    if h > 0.0 && degree == Degree::Linear {
        let center: f64 = (left..=right).map(|j| scratch[j] * j as f64).sum();
        let spread: f64 = (left..=right)
            .map(|j| scratch[j] * (j as f64 - center).powi(2))
            .sum();
        if spread.sqrt() > 0.001 * range {
            let slope = (xs - center) / spread;
            for j in left..=right {
                scratch[j] *= slope * (j as f64 - center) + 1.0;
            }
        }
    }

    Some((left..=right).map(|j| scratch[j] * y[j]).sum())
}

/// Smooths every point of `y` with a sliding window of `window` points.
/// Points whose neighbourhood has no weight keep their original value.
pub fn smooth(y: &[f64], window: usize, degree: Degree, robustness: Option<&[f64]>) -> Vec<f64> {
    let n = y.len();
    if n < 2 {
        return y.to_vec();
    }

    let mut out = vec![0.0; n];
    let mut scratch = vec![0.0; n];

    if window >= n {
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = estimate(y, window, degree, i as f64, 0, n - 1, robustness, &mut scratch)
                .unwrap_or(y[i]);
        }
        return out;
    }

    let half = (window + 1) / 2;
    let (mut left, mut right) = (0, window - 1);
    for (i, slot) in out.iter_mut().enumerate() {
        if i >= half && right != n - 1 {
            left += 1;
            right += 1;
        }
        *slot = estimate(y, window, degree, i as f64, left, right, robustness, &mut scratch)
            .unwrap_or(y[i]);
    }
    out
}

/// Simple moving average; output has `x.len() - len + 1` points.
pub fn moving_average(x: &[f64], len: usize) -> Vec<f64> {
    if len == 0 || x.len() < len {
        return Vec::new();
    }
    x.windows(len)
        .map(|window| window.iter().sum::<f64>() / len as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_data_is_reproduced() {
        let y: Vec<f64> = (0..40).map(|i| 3.0 + 0.5 * i as f64).collect();
        let s = smooth(&y, 9, Degree::Linear, None);
        for (a, b) in y.iter().zip(&s) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn constant_fit_flattens_a_step() {
        let y = [0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0];
        let s = smooth(&y, 7, Degree::Constant, None);
        assert!(s[3] < 10.0);
        assert!(s[3] > 0.0);
    }

    #[test]
    fn extrapolates_one_step_outside() {
        let y: Vec<f64> = (0..5).map(|i| 2.0 * i as f64).collect();
        let mut scratch = vec![0.0; y.len()];
        let before = estimate(&y, 7, Degree::Linear, -1.0, 0, 4, None, &mut scratch).unwrap();
        let after = estimate(&y, 7, Degree::Linear, 5.0, 0, 4, None, &mut scratch).unwrap();
        assert!((before + 2.0).abs() < 1e-9);
        assert!((after - 10.0).abs() < 1e-9);
    }

    #[test]
    fn zero_robustness_weights_give_none() {
        let y = [1.0, 2.0, 3.0];
        let rw = [0.0, 0.0, 0.0];
        let mut scratch = vec![0.0; 3];
        assert!(estimate(&y, 3, Degree::Linear, 1.0, 0, 2, Some(&rw), &mut scratch).is_none());
        assert_eq!(smooth(&y, 3, Degree::Linear, Some(&rw)), y.to_vec());
    }

    #[test]
    fn moving_average_lengths() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(moving_average(&x, 3), vec![2.0, 3.0, 4.0]);
        assert!(moving_average(&x, 6).is_empty());
    }
}
