//! Mathematical utilities: weighted least squares and the layer spectrum model.

pub mod layer;
pub mod wls;

pub use layer::*;
pub use wls::*;
