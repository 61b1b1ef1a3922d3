//! Spectral estimation: taper → 2D transform → radial power spectrum.

pub mod fft2;
pub mod radial;
pub mod taper;

pub use radial::*;
pub use taper::*;
