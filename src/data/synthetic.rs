//! Synthetic anomaly grids of a randomly magnetized layer.
//!
//! Grids are built by spectral synthesis: every DFT cell gets a complex
//! Gaussian coefficient scaled by the layer amplitude spectrum
//! (`math::layer_amplitude`), and the real part of the inverse transform is
//! the field. The radial power spectrum of the result therefore follows the
//! layer model, with the usual chi-square scatter across azimuth.
//!
//! Generation is fully determined by the seed.

use nalgebra::DMatrix;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use rustfft::num_complex::Complex64;
use tracing::debug;

use crate::domain::Extent;
use crate::error::{CpdError, CpdResult};
use crate::grid::Grid;
use crate::math::layer_amplitude;
use crate::spectrum::fft2::{ifft2, signed_index};

/// Parameters of a synthetic layer grid.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerGridSpec {
    pub nx: usize,
    pub ny: usize,
    /// Node spacing (km), identical along both axes.
    pub spacing: f64,
    /// Coordinates of node `(0, 0)`.
    pub origin: (f64, f64),
    /// Depth to the top of the layer (km).
    pub zt: f64,
    /// Depth to the bottom of the layer (km).
    pub zb: f64,
    /// RMS of the generated field before noise is added.
    pub rms: f64,
    /// RMS of additive white Gaussian noise.
    pub noise: f64,
    pub seed: u64,
}

impl Default for LayerGridSpec {
    fn default() -> Self {
        Self {
            nx: 256,
            ny: 256,
            spacing: 1.0,
            origin: (0.0, 0.0),
            zt: 2.0,
            zb: 20.0,
            rms: 100.0,
            noise: 0.0,
            seed: 42,
        }
    }
}

impl LayerGridSpec {
    fn validate(&self) -> CpdResult<()> {
        if self.nx < 2 || self.ny < 2 {
            return Err(CpdError::InsufficientData {
                nx: self.nx,
                ny: self.ny,
                min: 2,
            });
        }
        if !(self.spacing.is_finite() && self.spacing > 0.0) {
            return Err(CpdError::InvalidParameter(format!(
                "spacing must be finite and > 0 (got {})",
                self.spacing
            )));
        }
        if !(self.zt.is_finite() && self.zb.is_finite() && self.zt >= 0.0 && self.zb > self.zt) {
            return Err(CpdError::InvalidParameter(format!(
                "layer depths must satisfy 0 <= zt < zb (got zt={}, zb={})",
                self.zt, self.zb
            )));
        }
        if !(self.rms.is_finite() && self.rms > 0.0) {
            return Err(CpdError::InvalidParameter(format!("rms must be > 0 (got {})", self.rms)));
        }
        if !(self.noise.is_finite() && self.noise >= 0.0) {
            return Err(CpdError::InvalidParameter(format!(
                "noise must be >= 0 (got {})",
                self.noise
            )));
        }
        Ok(())
    }

    pub fn extent(&self) -> Extent {
        let (x0, y0) = self.origin;
        Extent::new(
            x0,
            x0 + (self.nx - 1) as f64 * self.spacing,
            y0,
            y0 + (self.ny - 1) as f64 * self.spacing,
        )
    }
}

/// Generate a grid whose radial spectrum follows the layer model of `spec`.
pub fn synthesize_layer_grid(spec: &LayerGridSpec) -> CpdResult<Grid> {
    spec.validate()?;
    let (nx, ny) = (spec.nx, spec.ny);

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let normal = Normal::new(0.0, std::f64::consts::FRAC_1_SQRT_2)
        .map_err(|e| CpdError::InvalidParameter(format!("noise distribution error: {e}")))?;

    let lx = nx as f64 * spec.spacing;
    let ly = ny as f64 * spec.spacing;
    let coeffs = DMatrix::from_fn(ny, nx, |j, i| {
        let kx = signed_index(i, nx) as f64 / lx;
        let ky = signed_index(j, ny) as f64 / ly;
        let amp = layer_amplitude(kx.hypot(ky), spec.zt, spec.zb);
        let (re, im) = (normal.sample(&mut rng), normal.sample(&mut rng));
        Complex64::new(re, im) * amp
    });

    let field = ifft2(&coeffs).map(|c| c.re);
    let mean = field.mean();
    let rms = (field.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (nx * ny) as f64).sqrt();
    if !(rms.is_finite() && rms > 0.0) {
        return Err(CpdError::InvalidParameter(format!(
            "layer zt={} is too deep to produce a signal on this grid",
            spec.zt
        )));
    }

    let scale = spec.rms / rms;
    let data = if spec.noise > 0.0 {
        let noise = Normal::new(0.0, spec.noise)
            .map_err(|e| CpdError::InvalidParameter(format!("noise distribution error: {e}")))?;
        field.map(|v| (v - mean) * scale + noise.sample(&mut rng))
    } else {
        field.map(|v| (v - mean) * scale)
    };

    debug!(nx, ny, zt = spec.zt, zb = spec.zb, seed = spec.seed, "synthesized layer grid");
    Grid::new(data, spec.extent())
}
