//! Gridded anomaly field and windowed sub-extraction.

pub mod model;

pub use model::*;
