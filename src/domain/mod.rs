//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - spatial and spectral value types (`Extent`, `KWindow`, `RadialSpectrum`)
//! - configuration enums (`Taper`) and the per-run `EstimateConfig`
//! - fit outputs (`DepthFit`, `TanakaFit`, `CurieDepth`, `Estimate`)

pub mod types;

pub use types::*;
