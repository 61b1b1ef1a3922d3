//! `curie-depth` library crate.
//!
//! Estimates the Curie point depth (bottom of the magnetized crust) from a
//! gridded magnetic anomaly field with the Tanaka et al. (1999) spectral
//! centroid method:
//!
//! 1. cut a square window out of the grid (`grid`)
//! 2. radially average its 2D power spectrum (`spectrum`)
//! 3. fit the top and centroid depths from two wavenumber bands (`fit`)
//! 4. combine them into `Zb = 2·Zo − Zt` (`fit::compute_tanaka`)
//!
//! The binary (`cpd`) is a thin wrapper around `app`.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod grid;
pub mod io;
pub mod math;
pub mod report;
pub mod spectrum;
