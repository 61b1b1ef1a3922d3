//! Spectral model of a randomly magnetized horizontal layer.
//!
//! For a slab with top at `zt` and bottom at `zb` (km), the radial amplitude
//! spectrum at angular wavenumber `k` (rad/km) is, up to a constant:
//!
//! - `A(k) = exp(-k zt) * (1 - exp(-k (zb - zt)))`
//!
//! and the power spectrum is `A(k)^2`.
//!
//! Numerical notes:
//! - For small `k·(zb - zt)` the factor `1 - exp(-x)` loses precision; we use
//!   `expm1` and a series fallback.
//! - `A(0) = 0`: a layer of finite thickness carries no DC power.

use std::f64::consts::PI;

/// Threshold below which we switch to a small-x series approximation.
const SMALL_X: f64 = 1e-6;

/// Compute `1 - exp(-x)` in a numerically stable way.
pub fn one_minus_exp_neg(x: f64) -> f64 {
    if x.abs() < SMALL_X {
        // Series: 1 - e^{-x} ≈ x - x^2/2
        return x - x * x / 2.0;
    }
    -(-x).exp_m1()
}

/// Amplitude spectrum of a layer at wavenumber `k` given in cycles per km.
pub fn layer_amplitude(k_cycles: f64, zt: f64, zb: f64) -> f64 {
    let k = 2.0 * PI * k_cycles.abs();
    (-k * zt).exp() * one_minus_exp_neg(k * (zb - zt))
}

/// Power spectrum of a layer at wavenumber `k` given in cycles per km.
pub fn layer_power(k_cycles: f64, zt: f64, zb: f64) -> f64 {
    layer_amplitude(k_cycles, zt, zb).powi(2)
}

/// Centroid depth of a layer.
pub fn centroid_depth(zt: f64, zb: f64) -> f64 {
    0.5 * (zt + zb)
}
