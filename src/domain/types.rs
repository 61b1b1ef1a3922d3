//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed by value between the estimation stages
//! - exported to JSON/CSV
//! - compared in tests

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{CpdError, CpdResult};

/// Physical bounding box of a node-registered grid.
///
/// `xmin`/`xmax` are the coordinates of the first and last column nodes,
/// `ymin`/`ymax` those of the first and last row nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Extent {
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    pub fn is_finite(&self) -> bool {
        self.xmin.is_finite() && self.xmax.is_finite() && self.ymin.is_finite() && self.ymax.is_finite()
    }

    /// Whether `(x, y)` lies inside the box (edges included).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.xmin && x <= self.xmax && y >= self.ymin && y <= self.ymax
    }

    /// Whether `other` lies entirely inside this box, up to `tol`.
    pub fn contains_extent(&self, other: &Extent, tol: f64) -> bool {
        other.xmin >= self.xmin - tol
            && other.xmax <= self.xmax + tol
            && other.ymin >= self.ymin - tol
            && other.ymax <= self.ymax + tol
    }

    /// Multiply every bound by `factor` (e.g. metres → km with `0.001`).
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(
            self.xmin * factor,
            self.xmax * factor,
            self.ymin * factor,
            self.ymax * factor,
        )
    }
}

/// Spatial apodization applied to a sub-grid before the transform.
///
/// 2D tapers are the outer product of the 1D window along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Taper {
    /// No windowing (rectangular).
    None,
    /// Hann window, zero at both edges.
    Hann,
    /// Hamming window.
    Hamming,
    /// Blackman window, strongest sidelobe suppression of the fixed shapes.
    Blackman,
    /// Tukey (tapered cosine) window, flat over the central half.
    Tukey,
}

impl Taper {
    pub fn display_name(self) -> &'static str {
        match self {
            Taper::None => "none",
            Taper::Hann => "hann",
            Taper::Hamming => "hamming",
            Taper::Blackman => "blackman",
            Taper::Tukey => "tukey",
        }
    }
}

/// Closed wavenumber interval `[low, high]` (cycles per km) used to select
/// the points of one regression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KWindow {
    pub low: f64,
    pub high: f64,
}

impl KWindow {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Check the bounds are usable: finite, non-negative and ordered.
    pub fn validate(&self) -> CpdResult<()> {
        if !(self.low.is_finite() && self.high.is_finite()) {
            return Err(CpdError::InvalidWindow(format!(
                "k-window bounds must be finite (got [{}, {}])",
                self.low, self.high
            )));
        }
        if self.low < 0.0 {
            return Err(CpdError::InvalidWindow(format!(
                "k-window lower bound must be >= 0 (got {})",
                self.low
            )));
        }
        if self.low > self.high {
            return Err(CpdError::InvalidRange {
                low: self.low,
                high: self.high,
            });
        }
        Ok(())
    }

    pub fn contains(&self, k: f64) -> bool {
        k >= self.low && k <= self.high
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    /// Same width, moved by `dk`.
    pub fn shifted(&self, dk: f64) -> Self {
        Self::new(self.low + dk, self.high + dk)
    }
}

/// Radially averaged power spectrum of one sub-grid.
///
/// `k`, `phi`, `sigma` and `counts` are parallel and ordered by strictly
/// increasing `k`. The DC bin is not included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialSpectrum {
    /// Bin-centre wavenumbers (cycles per km).
    pub k: Vec<f64>,
    /// Mean weighted power per bin.
    pub phi: Vec<f64>,
    /// Sample standard deviation of the weighted power across the bin.
    pub sigma: Vec<f64>,
    /// Number of transform cells that fell in each bin.
    pub counts: Vec<usize>,
    /// Uniform bin width (cycles per km).
    pub bin_width: f64,
    /// Wavenumber-weighting exponent the spectrum was produced with.
    pub power: f64,
}

impl RadialSpectrum {
    pub fn len(&self) -> usize {
        self.k.len()
    }

    pub fn is_empty(&self) -> bool {
        self.k.is_empty()
    }
}

/// Depth recovered from one linear segment of a log spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthFit {
    /// Depth (km), `-slope / 4π`.
    pub depth: f64,
    /// Regression intercept of `ln Φ` at `k = 0`.
    pub intercept: f64,
    /// One-sigma uncertainty of `depth` (km).
    pub uncertainty: f64,
    /// Fitted slope of `ln Φ` versus `k`.
    pub slope: f64,
    /// Number of spectral points used.
    pub n_points: usize,
}

/// Top and centroid fits of one spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TanakaFit {
    /// Depth to the top of the magnetized layer (Zt).
    pub top: DepthFit,
    /// Depth to the centroid of the magnetized layer (Zo).
    pub centroid: DepthFit,
}

/// Curie point depth (bottom of the magnetized layer) and its uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurieDepth {
    /// Zb (km).
    pub zb: f64,
    /// eZb (km).
    pub ezb: f64,
}

/// Parameters of one estimation, derived from CLI flags (plus defaults).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateConfig {
    /// Side length of the square window, in grid coordinate units (km).
    pub window_size: f64,
    pub taper: Taper,
    /// k-window for the top-depth fit.
    pub top_window: KWindow,
    /// k-window for the centroid-depth fit.
    pub centroid_window: KWindow,
}

/// One location to estimate at (batch input row).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

/// Full output of one estimation at one location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Estimate {
    pub location: Location,
    pub window_size: f64,
    /// Sub-grid shape actually transformed: `(nx, ny)`.
    pub subgrid_shape: (usize, usize),
    pub fit: TanakaFit,
    pub curie: CurieDepth,
}
