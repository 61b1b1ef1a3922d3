//! Error types.
//!
//! - `CpdError`: failures raised by the estimation core (grid, spectrum, fit).
//! - `AppError`: front-end error carrying a process exit code.

use thiserror::Error;

/// Result type for core estimation operations.
pub type CpdResult<T> = Result<T, CpdError>;

/// Errors raised by the estimation core.
///
/// All of these are deterministic: retrying with the same inputs gives the
/// same error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CpdError {
    /// Non-positive or malformed window size, centre or k-range bound.
    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    /// Sub-grid too small to transform.
    #[error("Insufficient data: {nx}x{ny} samples (need at least {min} per axis)")]
    InsufficientData { nx: usize, ny: usize, min: usize },

    /// Fewer than two usable spectral points inside a k-window.
    #[error("Insufficient fit range: {found} usable point(s) in k=[{low}, {high}]")]
    InsufficientFitRange { low: f64, high: f64, found: usize },

    /// k-window given with `low > high`.
    #[error("Invalid range: low={low} > high={high}")]
    InvalidRange { low: f64, high: f64 },

    /// Parallel input sequences of different lengths.
    #[error("Length mismatch: k={k}, phi={phi}, sigma={sigma}")]
    LengthMismatch { k: usize, phi: usize, sigma: usize },

    /// Grid shape/extent/values violate the grid invariants.
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// Non-finite or out-of-domain numeric parameter (e.g. weighting exponent).
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl CpdError {
    /// Exit code used when this error reaches the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            CpdError::InvalidWindow(_)
            | CpdError::InvalidRange { .. }
            | CpdError::LengthMismatch { .. }
            | CpdError::InvalidGrid(_)
            | CpdError::InvalidParameter(_) => 2,
            CpdError::InsufficientData { .. } | CpdError::InsufficientFitRange { .. } => 3,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<CpdError> for AppError {
    fn from(err: CpdError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let e: AppError = CpdError::InvalidRange { low: 2.0, high: 1.0 }.into();
        assert_eq!(e.exit_code(), 2);

        let e: AppError = CpdError::InsufficientFitRange {
            low: 0.1,
            high: 0.2,
            found: 1,
        }
        .into();
        assert_eq!(e.exit_code(), 3);
        assert!(e.to_string().contains("1 usable point"));
    }
}
