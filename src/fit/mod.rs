//! Spectral fitting and depth combination.
//!
//! Responsibilities:
//!
//! - fit one log-linear spectral segment to a depth (`fitter`)
//! - run the top/centroid pair and combine them into Zb (`tanaka`)

pub mod fitter;
pub mod tanaka;

pub use fitter::*;
pub use tanaka::*;
