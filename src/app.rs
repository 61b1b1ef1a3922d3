//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the real main that:
//! - parses CLI arguments and sets up logging
//! - loads grids and locations
//! - runs the estimation pipeline
//! - prints reports and writes optional exports
//! - re-prints saved estimates

use std::path::Path;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{
    BatchArgs, Command, EstimateArgs, GridArgs, ShowArgs, SpectrumArgs, SpectrumFormat, SynthArgs, WindowArgs,
};
use crate::data::{LayerGridSpec, synthesize_layer_grid};
use crate::domain::{EstimateConfig, Extent, KWindow, Location};
use crate::error::AppError;
use crate::io::GridSource;

pub mod pipeline;

/// Entry point for the `cpd` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Estimate(args) => handle_estimate(args),
        Command::Batch(args) => handle_batch(args),
        Command::Spectrum(args) => handle_spectrum(args),
        Command::Synth(args) => handle_synth(args),
        Command::Show(args) => handle_show(args),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A second init (e.g. from tests) keeps the existing subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_estimate(args: EstimateArgs) -> Result<(), AppError> {
    let scale = args.grid.scale;
    let grid = crate::io::load_grid_csv(&grid_source_from_args(&args.grid))?;
    let config = estimate_config_from_args(&args.window, scale);
    let location = Location {
        x: args.x * scale,
        y: args.y * scale,
    };

    let out = pipeline::estimate_at(&grid, location, &config)?;
    println!("{}", crate::report::format_estimate_summary(&out.estimate, &config));

    if let Some(path) = &args.export_json {
        let file = crate::io::EstimateFile::new(&config, &out.estimate, &out.spectrum);
        crate::io::write_estimate_json(path, &file)?;
        info!(path = %path.display(), "wrote estimate JSON");
    }
    Ok(())
}

fn handle_batch(args: BatchArgs) -> Result<(), AppError> {
    let scale = args.grid.scale;
    let grid = crate::io::load_grid_csv(&grid_source_from_args(&args.grid))?;
    let config = estimate_config_from_args(&args.window, scale);
    // Surface a bad k-window once instead of once per location.
    config.top_window.validate()?;
    config.centroid_window.validate()?;

    let locations = crate::io::load_locations_csv(&args.locations, scale)?;
    let results = pipeline::estimate_batch(&grid, &locations, &config);

    println!("{}", crate::report::format_batch_table(&locations, &results));

    if let Some(path) = &args.export {
        crate::io::write_batch_csv(path, &locations, &results)?;
        info!(path = %path.display(), "wrote batch CSV");
    }
    Ok(())
}

fn handle_spectrum(args: SpectrumArgs) -> Result<(), AppError> {
    let scale = args.grid.scale;
    let grid = crate::io::load_grid_csv(&grid_source_from_args(&args.grid))?;
    let location = Location {
        x: args.x * scale,
        y: args.y * scale,
    };
    let spectrum = pipeline::spectrum_at(&grid, location, args.window * scale, args.taper, args.power)?;

    match args.format {
        SpectrumFormat::Table => println!("{}", crate::report::format_spectrum_table(&spectrum)),
        SpectrumFormat::Csv => crate::io::write_spectrum_csv_to(std::io::stdout().lock(), &spectrum)?,
        SpectrumFormat::Json => {
            let json = serde_json::to_string_pretty(&spectrum)
                .map_err(|e| AppError::new(4, format!("Failed to serialize spectrum: {e}")))?;
            println!("{json}");
        }
    }

    if let Some(path) = &args.export {
        crate::io::write_spectrum_csv(path, &spectrum)?;
    }
    Ok(())
}

fn handle_synth(args: SynthArgs) -> Result<(), AppError> {
    let spec = LayerGridSpec {
        nx: args.nx,
        ny: args.ny,
        spacing: args.spacing,
        origin: (0.0, 0.0),
        zt: args.zt,
        zb: args.zb,
        rms: args.rms,
        noise: args.noise,
        seed: args.seed,
    };
    let grid = synthesize_layer_grid(&spec)?;
    crate::io::write_grid_csv(&args.output, &grid)?;

    let e = grid.extent();
    println!(
        "Wrote {}x{} grid to '{}' (--xmin {} --xmax {} --ymin {} --ymax {})",
        grid.nx(),
        grid.ny(),
        args.output.display(),
        e.xmin,
        e.xmax,
        e.ymin,
        e.ymax
    );
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    print!("{}", render_saved_estimate(&args.input, args.spectrum)?);
    Ok(())
}

/// Summary of an estimate JSON, in the same layout `estimate` prints.
pub fn render_saved_estimate(path: &Path, with_spectrum: bool) -> Result<String, AppError> {
    let saved = crate::io::read_estimate_json(path)?;
    info!(path = %path.display(), tool = %saved.tool, "read estimate JSON");

    let mut out = format!("Saved by {} at {}\n\n", saved.tool, saved.generated_at);
    out.push_str(&crate::report::format_estimate_summary(&saved.estimate, &saved.config));
    if with_spectrum {
        out.push('\n');
        out.push_str(&crate::report::format_spectrum_table(&saved.spectrum));
        out.push('\n');
    }
    Ok(out)
}

pub fn grid_source_from_args(args: &GridArgs) -> GridSource {
    GridSource {
        path: args.grid.clone(),
        extent: Extent::new(args.xmin, args.xmax, args.ymin, args.ymax),
        scale: args.scale,
        north_up: args.north_up,
    }
}

/// Build the core config; the window size is converted to km with `scale`.
pub fn estimate_config_from_args(args: &WindowArgs, scale: f64) -> EstimateConfig {
    EstimateConfig {
        window_size: args.window * scale,
        taper: args.taper,
        top_window: KWindow::new(args.top_min, args.top_max),
        centroid_window: KWindow::new(args.centroid_min, args.centroid_max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_size_is_scaled_to_km() {
        let args = WindowArgs {
            window: 50_000.0,
            taper: crate::domain::Taper::Tukey,
            top_min: 0.05,
            top_max: 0.2,
            centroid_min: 0.005,
            centroid_max: 0.03,
        };
        let config = estimate_config_from_args(&args, 0.001);
        assert!((config.window_size - 50.0).abs() < 1e-9);
        assert_eq!(config.top_window, KWindow::new(0.05, 0.2));
        assert_eq!(config.taper, crate::domain::Taper::Tukey);
    }

    #[test]
    fn saved_estimate_is_reprinted() {
        use crate::domain::{CurieDepth, DepthFit, Estimate, RadialSpectrum, TanakaFit, Taper};

        let fit = |depth: f64| DepthFit {
            depth,
            intercept: 1.0,
            uncertainty: 0.1,
            slope: -4.0 * std::f64::consts::PI * depth,
            n_points: 9,
        };
        let estimate = Estimate {
            location: Location { x: 10.0, y: 20.0 },
            window_size: 64.0,
            subgrid_shape: (65, 65),
            fit: TanakaFit {
                top: fit(1.5),
                centroid: fit(6.0),
            },
            curie: CurieDepth { zb: 10.5, ezb: 0.25 },
        };
        let config = EstimateConfig {
            window_size: 64.0,
            taper: Taper::Hann,
            top_window: KWindow::new(0.05, 0.2),
            centroid_window: KWindow::new(0.005, 0.03),
        };
        let spectrum = RadialSpectrum {
            k: vec![0.015625, 0.03125],
            phi: vec![4.0, 2.0],
            sigma: vec![0.5, 0.25],
            counts: vec![8, 12],
            bin_width: 0.015625,
            power: 0.0,
        };

        let path = std::env::temp_dir().join(format!("cpd-show-{}.json", std::process::id()));
        let file = crate::io::EstimateFile::new(&config, &estimate, &spectrum);
        crate::io::write_estimate_json(&path, &file).unwrap();

        let text = render_saved_estimate(&path, false).unwrap();
        assert!(text.starts_with(&format!("Saved by {} at {}", file.tool, file.generated_at)));
        assert!(text.contains(&crate::report::format_estimate_summary(&estimate, &config)));

        let with_spectrum = render_saved_estimate(&path, true).unwrap();
        assert!(with_spectrum.contains(&crate::report::format_spectrum_table(&spectrum)));
        let _ = std::fs::remove_file(path);

        let err = render_saved_estimate(Path::new("/nonexistent/cpd-show.json"), false).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
