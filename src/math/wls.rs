//! Weighted straight-line least squares.
//!
//! Each spectral segment is fitted with a single-variable model:
//!
//! ```text
//! minimize Σ w_i (y_i - a - b x_i)^2
//! ```
//!
//! which has a closed-form solution through its 2x2 normal equations. We
//! centre `x` on its weighted mean first so the normal matrix is diagonal up
//! to rounding, then solve it with nalgebra.
//!
//! The slope uncertainty is propagated linearly from per-point errors of `y`
//! (sandwich form `A⁻¹ B A⁻¹`), so it does not assume the weights are exact
//! inverse variances.

use nalgebra::{Matrix2, Vector2};

/// Relative threshold below which the spread of `x` is treated as zero.
const MIN_X_SPREAD: f64 = 1e-300;

/// Result of a weighted straight-line fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
    /// One-sigma standard error of `slope`.
    pub slope_std_err: f64,
    pub n: usize,
}

/// Fit `y = intercept + slope * x` with normal-equation weights `w`.
///
/// `y_err` holds the one-sigma error of each `y`, used only for the slope
/// standard error.
///
/// Returns `None` if fewer than two points are given, inputs are not finite,
/// weights are not positive, or all `x` coincide.
pub fn weighted_line_fit(x: &[f64], y: &[f64], w: &[f64], y_err: &[f64]) -> Option<LineFit> {
    let n = x.len();
    if n < 2 || y.len() != n || w.len() != n || y_err.len() != n {
        return None;
    }
    if x.iter().chain(y).chain(y_err).any(|v| !v.is_finite()) {
        return None;
    }
    if w.iter().any(|v| !(v.is_finite() && *v > 0.0)) {
        return None;
    }

    let sw: f64 = w.iter().sum();
    let x_bar = w.iter().zip(x).map(|(wi, xi)| wi * xi).sum::<f64>() / sw;

    let mut a = Matrix2::<f64>::zeros();
    let mut rhs = Vector2::<f64>::zeros();
    let mut b = Matrix2::<f64>::zeros();
    for i in 0..n {
        let row = Vector2::new(1.0, x[i] - x_bar);
        a += w[i] * row * row.transpose();
        rhs += w[i] * y[i] * row;
        b += (w[i] * y_err[i]).powi(2) * row * row.transpose();
    }

    if a[(1, 1)] <= MIN_X_SPREAD * sw {
        return None;
    }

    let a_inv = a.try_inverse()?;
    let beta = a_inv * rhs;
    let cov = a_inv * b * a_inv;

    let slope = beta[1];
    let intercept = beta[0] - slope * x_bar;
    let slope_std_err = cov[(1, 1)].max(0.0).sqrt();

    if !(slope.is_finite() && intercept.is_finite() && slope_std_err.is_finite()) {
        return None;
    }

    Some(LineFit {
        slope,
        intercept,
        slope_std_err,
        n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_exact_line() {
        // y = 2 + 3x on x = [0, 1, 2]
        let x = [0.0, 1.0, 2.0];
        let y = [2.0, 5.0, 8.0];
        let fit = weighted_line_fit(&x, &y, &[1.0, 2.0, 0.5], &[0.1; 3]).unwrap();
        assert!((fit.slope - 3.0).abs() < 1e-12);
        assert!((fit.intercept - 2.0).abs() < 1e-12);
        assert_eq!(fit.n, 3);
    }

    #[test]
    fn unit_weights_match_textbook_error() {
        // Equal weights and equal errors: se(slope) = sigma / sqrt(Sxx).
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 0.0, 1.0, 0.0];
        let sigma = 0.5;
        let fit = weighted_line_fit(&x, &y, &[1.0; 4], &[sigma; 4]).unwrap();
        let sxx = 5.0; // Σ (x - 1.5)^2
        assert!((fit.slope_std_err - sigma / f64::sqrt(sxx)).abs() < 1e-12);
    }

    #[test]
    fn heavier_weight_pulls_the_line() {
        let x = [0.0, 1.0, 2.0];
        let y = [0.0, 1.0, 0.0];
        let light = weighted_line_fit(&x, &y, &[1.0, 1.0, 1.0], &[1.0; 3]).unwrap();
        let heavy = weighted_line_fit(&x, &y, &[1.0, 1.0, 100.0], &[1.0; 3]).unwrap();
        // Symmetric data: unweighted slope is zero; weighting the last point
        // (y=0 at x=2) against the first two tilts the line downwards.
        assert!(light.slope.abs() < 1e-12);
        assert!(heavy.slope < 0.0);
    }

    #[test]
    fn degenerate_inputs_return_none() {
        assert!(weighted_line_fit(&[1.0], &[1.0], &[1.0], &[1.0]).is_none());
        assert!(weighted_line_fit(&[1.0, 1.0], &[1.0, 2.0], &[1.0, 1.0], &[1.0, 1.0]).is_none());
        assert!(weighted_line_fit(&[0.0, 1.0], &[1.0, 2.0], &[1.0, 0.0], &[1.0, 1.0]).is_none());
        assert!(weighted_line_fit(&[0.0, 1.0], &[1.0, f64::NAN], &[1.0, 1.0], &[1.0, 1.0]).is_none());
    }
}
