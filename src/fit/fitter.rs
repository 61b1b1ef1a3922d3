//! Depth from one linear segment of a log power spectrum.
//!
//! Given:
//! - wavenumbers `k_i` (cycles/km)
//! - spectral values `Φ_i` and their azimuthal spread `σ_i`
//! - a closed window `[low, high]`
//!
//! we regress `ln Φ` on `k` over the window, weighting each point by `1/σ_i`.
//! A source ensemble at depth `Z` decays as `ln Φ ≈ b - 4πZk`, so
//! `Z = -slope / 4π`. The depth uncertainty propagates the per-point relative
//! spread `σ_i/Φ_i` (the error of `ln Φ_i`) through the same regression.

use std::f64::consts::PI;

use tracing::debug;

use crate::domain::{DepthFit, KWindow};
use crate::error::{CpdError, CpdResult};
use crate::math::weighted_line_fit;

/// Slope-to-depth factor of the spectral decay relation.
const DEPTH_FACTOR: f64 = 4.0 * PI;

/// Fit one spectral segment and convert its slope to a depth.
///
/// Points with non-positive or non-finite `Φ` or `σ` are ignored; fewer than
/// two remaining points inside `window` is an `InsufficientFitRange`.
pub fn fit_segment(k: &[f64], phi: &[f64], sigma: &[f64], window: KWindow) -> CpdResult<DepthFit> {
    check_lengths(k, phi, sigma)?;
    window.validate()?;

    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let mut ws = Vec::new();
    let mut errs = Vec::new();
    for ((&ki, &p), &si) in k.iter().zip(phi).zip(sigma) {
        if !(ki.is_finite() && window.contains(ki)) {
            continue;
        }
        if !(p.is_finite() && p > 0.0 && si.is_finite() && si > 0.0) {
            continue;
        }
        xs.push(ki);
        ys.push(p.ln());
        ws.push(1.0 / si);
        errs.push(si / p);
    }

    let insufficient = |found: usize| CpdError::InsufficientFitRange {
        low: window.low,
        high: window.high,
        found,
    };
    if xs.len() < 2 {
        return Err(insufficient(xs.len()));
    }

    let line = weighted_line_fit(&xs, &ys, &ws, &errs).ok_or_else(|| insufficient(xs.len()))?;

    debug!(
        low = window.low,
        high = window.high,
        n = line.n,
        slope = line.slope,
        "fitted spectral segment"
    );

    Ok(DepthFit {
        depth: -line.slope / DEPTH_FACTOR,
        intercept: line.intercept,
        uncertainty: line.slope_std_err / DEPTH_FACTOR,
        slope: line.slope,
        n_points: line.n,
    })
}

pub(crate) fn check_lengths(k: &[f64], phi: &[f64], sigma: &[f64]) -> CpdResult<()> {
    if k.len() != phi.len() || k.len() != sigma.len() {
        return Err(CpdError::LengthMismatch {
            k: k.len(),
            phi: phi.len(),
            sigma: sigma.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exponential_spectrum(depth: f64, n: usize, dk: f64) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let k: Vec<f64> = (1..=n).map(|r| r as f64 * dk).collect();
        let phi: Vec<f64> = k.iter().map(|k| (3.0 - 4.0 * PI * depth * k).exp()).collect();
        let sigma: Vec<f64> = phi.iter().map(|p| 0.3 * p).collect();
        (k, phi, sigma)
    }

    #[test]
    fn recovers_depth_of_pure_exponential() {
        let (k, phi, sigma) = exponential_spectrum(4.0, 50, 0.01);
        let fit = fit_segment(&k, &phi, &sigma, KWindow::new(0.045, 0.305)).unwrap();
        assert!((fit.depth - 4.0).abs() < 1e-9, "depth={}", fit.depth);
        assert!((fit.intercept - 3.0).abs() < 1e-9);
        assert_eq!(fit.n_points, 26);
        assert!(fit.uncertainty > 0.0 && fit.uncertainty.is_finite());
    }

    #[test]
    fn wider_spread_gives_larger_uncertainty() {
        let (k, phi, sigma) = exponential_spectrum(2.0, 40, 0.01);
        let noisy: Vec<f64> = sigma.iter().map(|s| s * 3.0).collect();
        let w = KWindow::new(0.1, 0.3);
        let a = fit_segment(&k, &phi, &sigma, w).unwrap();
        let b = fit_segment(&k, &phi, &noisy, w).unwrap();
        assert!((b.uncertainty - 3.0 * a.uncertainty).abs() < 1e-12);
        assert!((a.depth - b.depth).abs() < 1e-12);
    }

    #[test]
    fn one_point_window_is_insufficient() {
        let (k, phi, sigma) = exponential_spectrum(2.0, 10, 0.1);
        let err = fit_segment(&k, &phi, &sigma, KWindow::new(0.25, 0.35)).unwrap_err();
        assert_eq!(
            err,
            CpdError::InsufficientFitRange {
                low: 0.25,
                high: 0.35,
                found: 1
            }
        );
    }

    #[test]
    fn window_outside_spectrum_is_insufficient() {
        let (k, phi, sigma) = exponential_spectrum(2.0, 10, 0.1);
        let err = fit_segment(&k, &phi, &sigma, KWindow::new(5.0, 6.0)).unwrap_err();
        assert!(matches!(err, CpdError::InsufficientFitRange { found: 0, .. }));
    }

    #[test]
    fn reversed_window_is_invalid_range() {
        let (k, phi, sigma) = exponential_spectrum(2.0, 10, 0.1);
        let err = fit_segment(&k, &phi, &sigma, KWindow::new(0.5, 0.2)).unwrap_err();
        assert!(matches!(err, CpdError::InvalidRange { .. }));
    }

    #[test]
    fn unusable_points_do_not_count() {
        let k = vec![0.1, 0.2, 0.3];
        let phi = vec![1.0, 0.0, 0.5];
        let sigma = vec![0.1, 0.1, 0.0];
        let err = fit_segment(&k, &phi, &sigma, KWindow::new(0.0, 1.0)).unwrap_err();
        assert!(matches!(err, CpdError::InsufficientFitRange { found: 1, .. }));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let err = fit_segment(&[0.1, 0.2], &[1.0], &[0.1, 0.1], KWindow::new(0.0, 1.0)).unwrap_err();
        assert!(matches!(err, CpdError::LengthMismatch { k: 2, phi: 1, sigma: 2 }));
    }

    #[test]
    fn repeated_fits_are_bit_identical() {
        let (k, phi, sigma) = exponential_spectrum(3.3, 64, 0.007);
        let w = KWindow::new(0.02, 0.2);
        let a = fit_segment(&k, &phi, &sigma, w).unwrap();
        let b = fit_segment(&k, &phi, &sigma, w).unwrap();
        assert_eq!(a.depth.to_bits(), b.depth.to_bits());
        assert_eq!(a.uncertainty.to_bits(), b.uncertainty.to_bits());
    }
}
