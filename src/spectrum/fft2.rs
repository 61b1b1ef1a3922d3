//! 2D discrete Fourier transform built from 1D rustfft plans.
//!
//! Matrices are stored column-major, so a single `process` call over the
//! whole buffer transforms every column; rows are handled by transposing.

use nalgebra::DMatrix;
use rustfft::{num_complex::Complex64, FftDirection, FftPlanner};

/// Forward 2D DFT (unnormalized).
pub fn fft2(input: &DMatrix<f64>) -> DMatrix<Complex64> {
    let mut m = input.map(|v| Complex64::new(v, 0.0));
    transform_2d(&mut m, FftDirection::Forward);
    m
}

/// Inverse 2D DFT, normalized by `1 / (nx * ny)`.
pub fn ifft2(input: &DMatrix<Complex64>) -> DMatrix<Complex64> {
    let mut m = input.clone();
    transform_2d(&mut m, FftDirection::Inverse);
    let scale = 1.0 / (m.nrows() * m.ncols()) as f64;
    for v in m.iter_mut() {
        *v *= scale;
    }
    m
}

fn transform_2d(m: &mut DMatrix<Complex64>, direction: FftDirection) {
    let (ny, nx) = m.shape();
    if nx == 0 || ny == 0 {
        return;
    }
    let mut planner = FftPlanner::<f64>::new();

    // Columns (length ny) are contiguous.
    let col_fft = planner.plan_fft(ny, direction);
    col_fft.process(m.as_mut_slice());

    // Rows become columns after a transpose.
    let row_fft = planner.plan_fft(nx, direction);
    let mut t = m.transpose();
    row_fft.process(t.as_mut_slice());
    *m = t.transpose();
}

/// Signed frequency index of DFT bin `i` for a transform of length `n`,
/// following the usual `0, 1, .., -2, -1` ordering.
pub fn signed_index(i: usize, n: usize) -> i64 {
    if i < n.div_ceil(2) {
        i as i64
    } else {
        i as i64 - n as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_field_has_only_dc() {
        let m = DMatrix::from_element(4, 6, 2.0);
        let f = fft2(&m);
        assert!((f[(0, 0)].re - 48.0).abs() < 1e-12);
        for (idx, v) in f.iter().enumerate() {
            if idx != 0 {
                assert!(v.norm() < 1e-12);
            }
        }
    }

    #[test]
    fn inverse_restores_input() {
        let m = DMatrix::from_fn(5, 8, |j, i| ((i * 7 + j * 3) % 11) as f64 - 4.0);
        let back = ifft2(&fft2(&m));
        for (a, b) in m.iter().zip(back.iter()) {
            assert!((a - b.re).abs() < 1e-10 && b.im.abs() < 1e-10);
        }
    }

    #[test]
    fn plane_wave_lands_in_its_bin() {
        // cos(2π·2·i/8) along x only: energy at column bins ±2, row bin 0.
        let m = DMatrix::from_fn(4, 8, |_, i| (2.0 * std::f64::consts::PI * 2.0 * i as f64 / 8.0).cos());
        let f = fft2(&m);
        assert!((f[(0, 2)].norm() - 16.0).abs() < 1e-9);
        assert!((f[(0, 6)].norm() - 16.0).abs() < 1e-9);
        assert!(f[(1, 2)].norm() < 1e-9);
    }

    #[test]
    fn signed_index_ordering() {
        let v: Vec<i64> = (0..4).map(|i| signed_index(i, 4)).collect();
        assert_eq!(v, vec![0, 1, -2, -1]);
        let v: Vec<i64> = (0..5).map(|i| signed_index(i, 5)).collect();
        assert_eq!(v, vec![0, 1, 2, -2, -1]);
    }
}
