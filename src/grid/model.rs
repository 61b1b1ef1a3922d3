//! Node-registered anomaly grid and windowed sub-extraction.
//!
//! Storage is a `DMatrix<f64>` with one row per y node (row 0 at `ymin`) and
//! one column per x node (column 0 at `xmin`). Spacing is implied by the
//! extent: `dx = (xmax - xmin) / (nx - 1)`.

use nalgebra::DMatrix;
use tracing::debug;

use crate::domain::Extent;
use crate::error::{CpdError, CpdResult};

/// Tolerance (in node-index units) used when snapping window edges to nodes.
const SNAP_EPS: f64 = 1e-9;

/// A sub-grid is just a smaller grid with its own extent.
pub type SubGrid = Grid;

/// Immutable magnetic-anomaly grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    data: DMatrix<f64>,
    extent: Extent,
}

impl Grid {
    /// Build a grid, validating shape, extent and values.
    pub fn new(data: DMatrix<f64>, extent: Extent) -> CpdResult<Self> {
        let (ny, nx) = data.shape();
        if nx == 0 || ny == 0 {
            return Err(CpdError::InvalidGrid("grid has no samples".into()));
        }
        if !extent.is_finite() {
            return Err(CpdError::InvalidGrid("extent must be finite".into()));
        }
        check_axis("x", nx, extent.xmin, extent.xmax)?;
        check_axis("y", ny, extent.ymin, extent.ymax)?;
        if let Some(pos) = data.iter().position(|v| !v.is_finite()) {
            // Column-major storage: recover (row, col) for the message.
            let (row, col) = (pos % ny, pos / ny);
            return Err(CpdError::InvalidGrid(format!(
                "non-finite value at row {row}, column {col}"
            )));
        }
        Ok(Self { data, extent })
    }

    /// Build a grid from row-major rows, `rows[0]` being the `ymin` row.
    pub fn from_rows(rows: &[Vec<f64>], extent: Extent) -> CpdResult<Self> {
        let ny = rows.len();
        let nx = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some((j, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != nx) {
            return Err(CpdError::InvalidGrid(format!(
                "row {j} has {} values, expected {nx}",
                row.len()
            )));
        }
        let data = DMatrix::from_fn(ny, nx, |j, i| rows[j][i]);
        Self::new(data, extent)
    }

    pub fn nx(&self) -> usize {
        self.data.ncols()
    }

    pub fn ny(&self) -> usize {
        self.data.nrows()
    }

    pub fn data(&self) -> &DMatrix<f64> {
        &self.data
    }

    pub fn extent(&self) -> &Extent {
        &self.extent
    }

    /// Node spacing along x (0 for a single-column grid).
    pub fn dx(&self) -> f64 {
        spacing(self.nx(), self.extent.xmin, self.extent.xmax)
    }

    /// Node spacing along y (0 for a single-row grid).
    pub fn dy(&self) -> f64 {
        spacing(self.ny(), self.extent.ymin, self.extent.ymax)
    }

    pub fn x_coord(&self, i: usize) -> f64 {
        self.extent.xmin + self.dx() * i as f64
    }

    pub fn y_coord(&self, j: usize) -> f64 {
        self.extent.ymin + self.dy() * j as f64
    }

    pub fn mean(&self) -> f64 {
        self.data.mean()
    }

    /// Extract the block of nodes enclosing a square window of side
    /// `window_size` centred at `(x_center, y_center)`.
    ///
    /// The window is clipped to the grid, so the result may be smaller than
    /// requested; a window larger than the grid returns the whole grid.
    pub fn subgrid(&self, window_size: f64, x_center: f64, y_center: f64) -> CpdResult<SubGrid> {
        if !(window_size.is_finite() && window_size > 0.0) {
            return Err(CpdError::InvalidWindow(format!(
                "window size must be finite and > 0 (got {window_size})"
            )));
        }
        if !(x_center.is_finite() && y_center.is_finite()) {
            return Err(CpdError::InvalidWindow(format!(
                "window centre must be finite (got ({x_center}, {y_center}))"
            )));
        }
        if !self.extent.contains(x_center, y_center) {
            return Err(CpdError::InvalidWindow(format!(
                "window centre ({x_center}, {y_center}) lies outside the grid"
            )));
        }

        let half = window_size / 2.0;
        let (i0, i1) = enclosing_span(
            x_center - half,
            x_center + half,
            self.extent.xmin,
            self.dx(),
            self.nx(),
        );
        let (j0, j1) = enclosing_span(
            y_center - half,
            y_center + half,
            self.extent.ymin,
            self.dy(),
            self.ny(),
        );

        let data = self
            .data
            .view((j0, i0), (j1 - j0 + 1, i1 - i0 + 1))
            .into_owned();
        let extent = Extent::new(
            self.x_coord(i0),
            self.x_coord(i1),
            self.y_coord(j0),
            self.y_coord(j1),
        );
        debug!(
            x = x_center,
            y = y_center,
            window_size,
            nx = data.ncols(),
            ny = data.nrows(),
            "extracted sub-grid"
        );

        // Invariants hold by construction; skip re-validating the values.
        Ok(Grid { data, extent })
    }
}

fn check_axis(name: &str, n: usize, min: f64, max: f64) -> CpdResult<()> {
    if n == 1 && min != max {
        return Err(CpdError::InvalidGrid(format!(
            "single-node {name} axis needs {name}min == {name}max"
        )));
    }
    if n > 1 && max <= min {
        return Err(CpdError::InvalidGrid(format!(
            "{name}max must exceed {name}min (got {min}..{max})"
        )));
    }
    Ok(())
}

fn spacing(n: usize, min: f64, max: f64) -> f64 {
    if n < 2 {
        0.0
    } else {
        (max - min) / (n - 1) as f64
    }
}

/// Inclusive node range `[first, last]` enclosing `[lo, hi]`, clipped to `0..n`.
fn enclosing_span(lo: f64, hi: f64, origin: f64, spacing: f64, n: usize) -> (usize, usize) {
    if n < 2 || spacing <= 0.0 {
        return (0, 0);
    }
    let last = (n - 1) as f64;
    let first = ((lo - origin) / spacing + SNAP_EPS).floor().clamp(0.0, last);
    let end = ((hi - origin) / spacing - SNAP_EPS).ceil().clamp(0.0, last);
    (first as usize, end.max(first) as usize)
}
