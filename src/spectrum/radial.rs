//! 2D power spectrum and its radial (azimuthal) average.
//!
//! `PowerSpectrum2D::compute` runs the transform once; `radial` can then be
//! called with any wavenumber-weighting exponent without re-transforming.
//!
//! Conventions:
//! - wavenumbers are in cycles per grid coordinate unit (cycles/km)
//! - bins have uniform width `Δk = max(1/Lx, 1/Ly)` with `L = n·spacing`
//! - a cell goes to bin `round(|k| / Δk)`; bins run from 1 to the Nyquist
//!   wavenumber of the coarser axis, the DC bin is dropped
//! - bins with fewer than two cells are dropped (no spread estimate)

use nalgebra::DMatrix;
use tracing::debug;

use crate::domain::{RadialSpectrum, Taper};
use crate::error::{CpdError, CpdResult};
use crate::grid::SubGrid;
use crate::spectrum::fft2::{fft2, signed_index};
use crate::spectrum::taper::taper_2d;

/// Smallest sub-grid dimension (samples per axis) that can be transformed.
pub const MIN_TRANSFORM_SIZE: usize = 2;

/// Full 2D power spectrum of one (tapered, demeaned) sub-grid.
#[derive(Debug, Clone)]
pub struct PowerSpectrum2D {
    /// Power per DFT cell; `ny` rows by `nx` columns, unshifted order.
    power: DMatrix<f64>,
    /// Wavenumber of each column (cycles/km).
    kx: Vec<f64>,
    /// Wavenumber of each row (cycles/km).
    ky: Vec<f64>,
    bin_width: f64,
    max_bin: usize,
}

impl PowerSpectrum2D {
    /// Demean, taper and transform `subgrid`.
    pub fn compute(subgrid: &SubGrid, taper: Taper) -> CpdResult<Self> {
        let (nx, ny) = (subgrid.nx(), subgrid.ny());
        if nx < MIN_TRANSFORM_SIZE || ny < MIN_TRANSFORM_SIZE {
            return Err(CpdError::InsufficientData {
                nx,
                ny,
                min: MIN_TRANSFORM_SIZE,
            });
        }
        let (dx, dy) = (subgrid.dx(), subgrid.dy());

        let weights = taper_2d(taper, nx, ny);
        let mean = subgrid.mean();
        let tapered = subgrid.data().zip_map(&weights, |v, w| (v - mean) * w);
        let mean_sq_weight = weights.iter().map(|w| w * w).sum::<f64>() / (nx * ny) as f64;

        let spectrum = fft2(&tapered);
        let norm = dx * dy / ((nx * ny) as f64 * mean_sq_weight);
        let power = spectrum.map(|c| c.norm_sqr() * norm);

        let kx: Vec<f64> = (0..nx)
            .map(|i| signed_index(i, nx) as f64 / (nx as f64 * dx))
            .collect();
        let ky: Vec<f64> = (0..ny)
            .map(|j| signed_index(j, ny) as f64 / (ny as f64 * dy))
            .collect();

        let bin_width = (1.0 / (nx as f64 * dx)).max(1.0 / (ny as f64 * dy));
        let k_nyquist = (0.5 / dx).min(0.5 / dy);
        let max_bin = (k_nyquist / bin_width + 1e-9).floor() as usize;
        if max_bin == 0 {
            // No ring fits below the Nyquist of the coarser axis.
            let min = (2.0 * dx.max(dy) / dx.min(dy) - 1e-9).ceil() as usize;
            return Err(CpdError::InsufficientData { nx, ny, min });
        }

        debug!(nx, ny, bin_width, max_bin, taper = taper.display_name(), "computed 2D power spectrum");

        Ok(Self {
            power,
            kx,
            ky,
            bin_width,
            max_bin,
        })
    }

    /// `(nx, ny)` of the transformed sub-grid.
    pub fn shape(&self) -> (usize, usize) {
        (self.kx.len(), self.ky.len())
    }

    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    /// Raw power per cell (`ny` rows by `nx` columns).
    pub fn power(&self) -> &DMatrix<f64> {
        &self.power
    }

    /// Azimuthally average the power, each cell first multiplied by
    /// `|k|^(2·power)`.
    pub fn radial(&self, power: f64) -> CpdResult<RadialSpectrum> {
        if !power.is_finite() {
            return Err(CpdError::InvalidParameter(format!(
                "wavenumber-weighting exponent must be finite (got {power})"
            )));
        }

        let mut bins = vec![BinAccumulator::default(); self.max_bin + 1];
        for (i, &kx) in self.kx.iter().enumerate() {
            for (j, &ky) in self.ky.iter().enumerate() {
                let k = kx.hypot(ky);
                let bin = (k / self.bin_width).round() as usize;
                if bin == 0 || bin > self.max_bin {
                    continue;
                }
                let value = self.power[(j, i)] * k.powf(2.0 * power);
                bins[bin].push(value);
            }
        }

        let mut out = RadialSpectrum {
            k: Vec::with_capacity(self.max_bin),
            phi: Vec::with_capacity(self.max_bin),
            sigma: Vec::with_capacity(self.max_bin),
            counts: Vec::with_capacity(self.max_bin),
            bin_width: self.bin_width,
            power,
        };
        for (r, acc) in bins.iter().enumerate().skip(1) {
            if let Some((mean, std)) = acc.finish() {
                out.k.push(r as f64 * self.bin_width);
                out.phi.push(mean);
                out.sigma.push(std);
                out.counts.push(acc.count);
            }
        }

        debug!(bins = out.len(), power, "reduced radial spectrum");
        Ok(out)
    }
}

/// Radially averaged power spectrum of `subgrid`.
pub fn radial_spectrum(subgrid: &SubGrid, taper: Taper, power: f64) -> CpdResult<RadialSpectrum> {
    PowerSpectrum2D::compute(subgrid, taper)?.radial(power)
}

/// Running (sum, sum of squares, count) of one radial bin.
///
/// Values are accumulated relative to the first value seen so the variance
/// does not suffer from cancellation when the spread is small.
#[derive(Debug, Clone, Copy, Default)]
struct BinAccumulator {
    shift: f64,
    sum: f64,
    sum_sq: f64,
    count: usize,
}

impl BinAccumulator {
    fn push(&mut self, value: f64) {
        if self.count == 0 {
            self.shift = value;
        }
        let d = value - self.shift;
        self.sum += d;
        self.sum_sq += d * d;
        self.count += 1;
    }

    /// Mean and sample standard deviation; `None` below two samples.
    fn finish(&self) -> Option<(f64, f64)> {
        if self.count < 2 {
            return None;
        }
        let n = self.count as f64;
        let mean_d = self.sum / n;
        let var = ((self.sum_sq - n * mean_d * mean_d) / (n - 1.0)).max(0.0);
        Some((self.shift + mean_d, var.sqrt()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Extent;
    use crate::grid::Grid;
    use std::f64::consts::PI;

    fn wavy_grid(n: usize, spacing: f64) -> Grid {
        let data = DMatrix::from_fn(n, n, |j, i| {
            let (x, y) = (i as f64, j as f64);
            (2.0 * PI * 3.0 * x / n as f64).cos()
                + 0.5 * (2.0 * PI * 7.0 * y / n as f64).sin()
                + 0.1 * ((i * 31 + j * 17) % 13) as f64
        });
        let side = (n - 1) as f64 * spacing;
        Grid::new(data, Extent::new(0.0, side, 0.0, side)).unwrap()
    }

    #[test]
    fn too_small_grid_is_insufficient() {
        let g = Grid::new(DMatrix::from_element(1, 8, 1.0), Extent::new(0.0, 7.0, 0.0, 0.0)).unwrap();
        assert!(matches!(
            radial_spectrum(&g, Taper::None, 0.0),
            Err(CpdError::InsufficientData { nx: 8, ny: 1, .. })
        ));
    }

    #[test]
    fn anisotropic_grid_without_rings_is_insufficient() {
        // Δk = 1/4 from the short axis, Nyquist = 1/6 from the coarse one.
        let data = DMatrix::from_fn(40, 4, |j, i| ((i * 5 + j * 3) % 7) as f64);
        let g = Grid::new(data, Extent::new(0.0, 3.0, 0.0, 117.0)).unwrap();
        assert_eq!((g.dx(), g.dy()), (1.0, 3.0));
        assert_eq!(
            PowerSpectrum2D::compute(&g, Taper::Hann).unwrap_err(),
            CpdError::InsufficientData { nx: 4, ny: 40, min: 6 }
        );
    }

    #[test]
    fn two_by_two_is_supported() {
        let g = Grid::new(
            DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 5.0]),
            Extent::new(0.0, 1.0, 0.0, 1.0),
        )
        .unwrap();
        let s = radial_spectrum(&g, Taper::Hann, 0.0).unwrap();
        assert_eq!(s.len(), 1);
        assert!((s.k[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn wavenumbers_are_increasing_without_gaps() {
        let g = wavy_grid(32, 2.0);
        let s = radial_spectrum(&g, Taper::Hann, 0.0).unwrap();
        assert_eq!(s.len(), 16);
        assert!((s.bin_width - 1.0 / 64.0).abs() < 1e-15);
        for w in s.k.windows(2) {
            assert!(w[1] > w[0]);
            assert!(w[1] - w[0] <= s.bin_width * (1.0 + 1e-12));
        }
        assert!(s.sigma.iter().all(|v| *v >= 0.0 && v.is_finite()));
        assert_eq!(s.k.len(), s.phi.len());
        assert_eq!(s.k.len(), s.sigma.len());
    }

    #[test]
    fn rectangular_grid_uses_coarser_step() {
        let data = DMatrix::from_fn(12, 20, |j, i| ((i * 7 + j * 5) % 9) as f64);
        let g = Grid::new(data, Extent::new(0.0, 19.0, 0.0, 11.0)).unwrap();
        let s = radial_spectrum(&g, Taper::None, 0.0).unwrap();
        assert!((s.bin_width - 1.0 / 12.0).abs() < 1e-15);
        assert_eq!(s.len(), 6);
        assert!(s.counts.iter().all(|&c| c >= 2));
    }

    #[test]
    fn repeated_calls_are_identical() {
        let g = wavy_grid(24, 1.0);
        let a = radial_spectrum(&g, Taper::Tukey, 0.5).unwrap();
        let b = radial_spectrum(&g, Taper::Tukey, 0.5).unwrap();
        assert_eq!(a, b);

        let ps = PowerSpectrum2D::compute(&g, Taper::Tukey).unwrap();
        assert_eq!(ps.radial(0.5).unwrap(), a);
    }

    #[test]
    fn weighting_exponent_keeps_k_and_tilts_phi() {
        let g = wavy_grid(32, 1.0);
        let ps = PowerSpectrum2D::compute(&g, Taper::Hann).unwrap();
        let raw = ps.radial(0.0).unwrap();
        let weighted = ps.radial(1.0).unwrap();
        assert_eq!(raw.k, weighted.k);

        let ratios: Vec<f64> = raw
            .phi
            .iter()
            .zip(&weighted.phi)
            .map(|(p0, p1)| p1 / p0)
            .collect();
        for w in ratios.windows(2) {
            assert!(w[1] >= w[0]);
        }
    }

    #[test]
    fn plane_wave_peaks_in_its_bin() {
        let n = 32;
        let data = DMatrix::from_fn(n, n, |_, i| (2.0 * PI * 5.0 * i as f64 / n as f64).cos());
        let g = Grid::new(data, Extent::new(0.0, (n - 1) as f64, 0.0, (n - 1) as f64)).unwrap();
        let s = radial_spectrum(&g, Taper::None, 0.0).unwrap();
        let (peak, _) = s
            .phi
            .iter()
            .enumerate()
            .fold((0, f64::MIN), |best, (i, &v)| if v > best.1 { (i, v) } else { best });
        assert!((s.k[peak] - 5.0 / n as f64).abs() < 1e-12);
    }

    #[test]
    fn non_finite_exponent_is_rejected() {
        let g = wavy_grid(8, 1.0);
        assert!(matches!(
            radial_spectrum(&g, Taper::None, f64::NAN),
            Err(CpdError::InvalidParameter(_))
        ));
    }

    #[test]
    fn accumulator_matches_two_pass_variance() {
        let values = [1e6 + 1.0, 1e6 + 2.0, 1e6 + 4.0];
        let mut acc = BinAccumulator::default();
        for v in values {
            acc.push(v);
        }
        let (mean, std) = acc.finish().unwrap();
        assert!((mean - (1e6 + 7.0 / 3.0)).abs() < 1e-9);
        let var: f64 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 2.0;
        assert!((std - var.sqrt()).abs() < 1e-9);
    }
}
