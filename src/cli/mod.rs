//! Command-line parsing for the Curie point depth estimator.
//!
//! Argument parsing and dispatch are kept apart from the spectral code; the
//! app layer converts these structs into plain config values.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::Taper;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "cpd", version, about = "Curie point depth from magnetic anomaly grids (Tanaka 1999)")]
pub struct Cli {
    /// Log pipeline stages to stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Estimate the Curie point depth at one location.
    Estimate(EstimateArgs),
    /// Estimate at every location of a CSV (`x,y` header), in parallel.
    Batch(BatchArgs),
    /// Print or export the radial power spectrum at one location.
    Spectrum(SpectrumArgs),
    /// Write a synthetic magnetized-layer grid as CSV.
    Synth(SynthArgs),
    /// Re-print an estimate saved with `estimate --export-json`.
    Show(ShowArgs),
}

/// Grid file and its georeferencing.
#[derive(Debug, Args, Clone)]
pub struct GridArgs {
    /// Headerless numeric CSV, one row per grid row.
    #[arg(short, long, value_name = "CSV")]
    pub grid: PathBuf,

    /// Easting of the first column.
    #[arg(long, allow_negative_numbers = true)]
    pub xmin: f64,

    /// Easting of the last column.
    #[arg(long, allow_negative_numbers = true)]
    pub xmax: f64,

    /// Northing of the first row.
    #[arg(long, allow_negative_numbers = true)]
    pub ymin: f64,

    /// Northing of the last row.
    #[arg(long, allow_negative_numbers = true)]
    pub ymax: f64,

    /// Factor converting grid coordinate units to km (e.g. 0.001 for metres).
    #[arg(long, default_value_t = 1.0)]
    pub scale: f64,

    /// The first CSV row is the northern edge.
    #[arg(long)]
    pub north_up: bool,
}

/// Window and fit settings shared by estimation commands.
#[derive(Debug, Args, Clone)]
pub struct WindowArgs {
    /// Side of the square analysis window, in grid coordinate units.
    #[arg(short, long)]
    pub window: f64,

    /// Taper applied before the transform.
    #[arg(long, value_enum, default_value_t = Taper::Hann)]
    pub taper: Taper,

    /// Lower bound of the top-depth fit window (cycles/km).
    #[arg(long, default_value_t = 0.05)]
    pub top_min: f64,

    /// Upper bound of the top-depth fit window (cycles/km).
    #[arg(long, default_value_t = 0.2)]
    pub top_max: f64,

    /// Lower bound of the centroid-depth fit window (cycles/km).
    #[arg(long, default_value_t = 0.005)]
    pub centroid_min: f64,

    /// Upper bound of the centroid-depth fit window (cycles/km).
    #[arg(long, default_value_t = 0.03)]
    pub centroid_max: f64,
}

#[derive(Debug, Args, Clone)]
pub struct EstimateArgs {
    #[command(flatten)]
    pub grid: GridArgs,

    #[command(flatten)]
    pub window: WindowArgs,

    /// Window centre easting (grid units).
    #[arg(short, long, allow_negative_numbers = true)]
    pub x: f64,

    /// Window centre northing (grid units).
    #[arg(short, long, allow_negative_numbers = true)]
    pub y: f64,

    /// Write estimate, spectrum and settings to JSON.
    #[arg(long, value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    #[command(flatten)]
    pub grid: GridArgs,

    #[command(flatten)]
    pub window: WindowArgs,

    /// CSV of window centres with an `x,y` header (grid units).
    #[arg(short, long, value_name = "CSV")]
    pub locations: PathBuf,

    /// Write per-location results to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

/// Spectrum output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SpectrumFormat {
    Table,
    Csv,
    Json,
}

#[derive(Debug, Args, Clone)]
pub struct SpectrumArgs {
    #[command(flatten)]
    pub grid: GridArgs,

    /// Side of the square analysis window, in grid coordinate units.
    #[arg(short, long)]
    pub window: f64,

    /// Taper applied before the transform.
    #[arg(long, value_enum, default_value_t = Taper::Hann)]
    pub taper: Taper,

    /// Window centre easting (grid units).
    #[arg(short, long, allow_negative_numbers = true)]
    pub x: f64,

    /// Window centre northing (grid units).
    #[arg(short, long, allow_negative_numbers = true)]
    pub y: f64,

    /// Multiply each cell by |k|^(2*power) before averaging.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub power: f64,

    /// Output format on stdout.
    #[arg(long, value_enum, default_value_t = SpectrumFormat::Table)]
    pub format: SpectrumFormat,

    /// Also write the spectrum as CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SynthArgs {
    /// Output grid CSV.
    #[arg(short, long, value_name = "CSV")]
    pub output: PathBuf,

    /// Nodes along x.
    #[arg(long, default_value_t = 256)]
    pub nx: usize,

    /// Nodes along y.
    #[arg(long, default_value_t = 256)]
    pub ny: usize,

    /// Node spacing (km).
    #[arg(long, default_value_t = 1.0)]
    pub spacing: f64,

    /// Depth to the top of the magnetized layer (km).
    #[arg(long, default_value_t = 2.0)]
    pub zt: f64,

    /// Depth to the bottom of the magnetized layer (km).
    #[arg(long, default_value_t = 20.0)]
    pub zb: f64,

    /// RMS amplitude of the field (nT).
    #[arg(long, default_value_t = 100.0)]
    pub rms: f64,

    /// RMS of added white noise (nT).
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    /// Estimate JSON written by `estimate --export-json`.
    #[arg(value_name = "JSON")]
    pub input: PathBuf,

    /// Also print the saved radial spectrum.
    #[arg(long)]
    pub spectrum: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn estimate_defaults() {
        let cli = Cli::parse_from([
            "cpd", "estimate", "--grid", "g.csv", "--xmin", "-10", "--xmax", "10", "--ymin", "0", "--ymax", "20",
            "--window", "8", "-x", "0", "-y", "5",
        ]);
        let Command::Estimate(args) = cli.command else {
            panic!("expected estimate");
        };
        assert_eq!(args.grid.xmin, -10.0);
        assert_eq!(args.grid.scale, 1.0);
        assert_eq!(args.window.taper, Taper::Hann);
        assert_eq!((args.window.top_min, args.window.top_max), (0.05, 0.2));
        assert_eq!((args.window.centroid_min, args.window.centroid_max), (0.005, 0.03));
        assert!(!cli.verbose);
    }

    #[test]
    fn show_takes_positional_input() {
        let cli = Cli::parse_from(["cpd", "show", "saved.json", "--spectrum"]);
        let Command::Show(args) = cli.command else {
            panic!("expected show");
        };
        assert_eq!(args.input, PathBuf::from("saved.json"));
        assert!(args.spectrum);
    }
}
