//! Spatial tapers (apodization windows).
//!
//! Windows are evaluated at `(i + 1) / (n + 1)` rather than `i / (n - 1)` so
//! edge samples get a small non-zero weight; with the usual zero-endpoint form
//! a 2-sample axis would be tapered away entirely.

use std::f64::consts::PI;

use nalgebra::DMatrix;

use crate::domain::Taper;

/// Fraction of the Tukey window occupied by the cosine flanks.
const TUKEY_ALPHA: f64 = 0.5;

/// 1D window coefficients of length `n`.
pub fn taper_coefficients(taper: Taper, n: usize) -> Vec<f64> {
    let denom = (n + 1) as f64;
    (0..n)
        .map(|i| {
            let u = (i + 1) as f64 / denom;
            match taper {
                Taper::None => 1.0,
                Taper::Hann => 0.5 * (1.0 - (2.0 * PI * u).cos()),
                Taper::Hamming => 0.54 - 0.46 * (2.0 * PI * u).cos(),
                Taper::Blackman => 0.42 - 0.5 * (2.0 * PI * u).cos() + 0.08 * (4.0 * PI * u).cos(),
                Taper::Tukey => tukey(u, TUKEY_ALPHA),
            }
        })
        .collect()
}

/// 2D taper with `ny` rows and `nx` columns (outer product of the 1D windows).
pub fn taper_2d(taper: Taper, nx: usize, ny: usize) -> DMatrix<f64> {
    let wx = taper_coefficients(taper, nx);
    let wy = taper_coefficients(taper, ny);
    DMatrix::from_fn(ny, nx, |j, i| wy[j] * wx[i])
}

fn tukey(u: f64, alpha: f64) -> f64 {
    let half = alpha / 2.0;
    if u < half {
        0.5 * (1.0 + (PI * (u / half - 1.0)).cos())
    } else if u > 1.0 - half {
        0.5 * (1.0 + (PI * ((u - 1.0) / half + 1.0)).cos())
    } else {
        1.0
    }
}
