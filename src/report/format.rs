//! Formatted terminal output.
//!
//! Formatting lives here so the estimation code stays free of presentation
//! details and output changes stay local.

use crate::domain::{Estimate, EstimateConfig, Location, RadialSpectrum};
use crate::error::CpdResult;
use crate::report::BatchSummary;

/// Summary of a single estimation.
pub fn format_estimate_summary(estimate: &Estimate, config: &EstimateConfig) -> String {
    let mut out = String::new();
    let (top, centroid) = (&estimate.fit.top, &estimate.fit.centroid);

    out.push_str("=== cpd - Curie point depth (Tanaka 1999) ===\n");
    out.push_str(&format!(
        "Location: x={:.3} y={:.3} km\n",
        estimate.location.x, estimate.location.y
    ));
    out.push_str(&format!(
        "Window: {:.3} km ({}x{} nodes) | taper={}\n",
        estimate.window_size,
        estimate.subgrid_shape.0,
        estimate.subgrid_shape.1,
        config.taper.display_name()
    ));

    out.push_str("\nSegment fits:\n");
    out.push_str(&format!(
        "  top       k=[{:.4}, {:.4}] n={:<3} Zt={:>8.3} ± {:.3} km\n",
        config.top_window.low, config.top_window.high, top.n_points, top.depth, top.uncertainty
    ));
    out.push_str(&format!(
        "  centroid  k=[{:.4}, {:.4}] n={:<3} Zo={:>8.3} ± {:.3} km\n",
        config.centroid_window.low,
        config.centroid_window.high,
        centroid.n_points,
        centroid.depth,
        centroid.uncertainty
    ));

    out.push_str(&format!(
        "\nCurie point depth: Zb={:.3} ± {:.3} km\n",
        estimate.curie.zb, estimate.curie.ezb
    ));
    out
}

/// Per-location batch table followed by the summary line.
pub fn format_batch_table(locations: &[Location], results: &[CpdResult<Estimate>]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>12} {:>12} {:>9} {:>9} {:>9} {:>9}  {}\n",
            "x", "y", "Zt", "Zo", "Zb", "eZb", "status"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<12} {:-<12} {:-<9} {:-<9} {:-<9} {:-<9}  {:-<6}", "", "", "", "", "", "", "").trim_end());
    out.push('\n');

    for (loc, result) in locations.iter().zip(results) {
        let line = match result {
            Ok(est) => format!(
                "{:>12.3} {:>12.3} {:>9.3} {:>9.3} {:>9.3} {:>9.3}  ok",
                loc.x, loc.y, est.fit.top.depth, est.fit.centroid.depth, est.curie.zb, est.curie.ezb
            ),
            Err(err) => format!(
                "{:>12.3} {:>12.3} {:>9} {:>9} {:>9} {:>9}  {}",
                loc.x,
                loc.y,
                "-",
                "-",
                "-",
                "-",
                truncate(&err.to_string(), 60)
            ),
        };
        out.push_str(&line);
        out.push('\n');
    }

    let summary = BatchSummary::from_results(results);
    out.push('\n');
    out.push_str(&format!("Locations: {} ok, {} failed", summary.ok, summary.failed));
    if let Some((min, max, mean)) = summary.zb_range {
        out.push_str(&format!(" | Zb min={min:.3} max={max:.3} mean={mean:.3} km"));
    }
    out.push('\n');
    out
}

/// Radial spectrum as a table.
pub fn format_spectrum_table(spectrum: &RadialSpectrum) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Radial spectrum: {} bins, dk={:.5} cycles/km, power={}\n",
        spectrum.len(),
        spectrum.bin_width,
        spectrum.power
    ));
    out.push_str(&format!("{:>10} {:>14} {:>14} {:>6} {:>10}\n", "k", "phi", "sigma", "n", "ln_phi"));
    for i in 0..spectrum.len() {
        let phi = spectrum.phi[i];
        let ln_phi = if phi > 0.0 { format!("{:>10.4}", phi.ln()) } else { format!("{:>10}", "-") };
        out.push_str(&format!(
            "{:>10.5} {:>14.6e} {:>14.6e} {:>6} {}\n",
            spectrum.k[i], phi, spectrum.sigma[i], spectrum.counts[i], ln_phi
        ));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CurieDepth, DepthFit, KWindow, TanakaFit, Taper};
    use crate::error::CpdError;

    fn estimate() -> Estimate {
        let fit = |depth: f64| DepthFit {
            depth,
            intercept: 0.0,
            uncertainty: 0.25,
            slope: 0.0,
            n_points: 12,
        };
        Estimate {
            location: Location { x: 10.0, y: 20.0 },
            window_size: 64.0,
            subgrid_shape: (65, 65),
            fit: TanakaFit {
                top: fit(1.5),
                centroid: fit(6.0),
            },
            curie: CurieDepth { zb: 10.5, ezb: 0.559 },
        }
    }

    #[test]
    fn estimate_summary_shows_depths() {
        let config = EstimateConfig {
            window_size: 64.0,
            taper: Taper::Hann,
            top_window: KWindow::new(0.05, 0.2),
            centroid_window: KWindow::new(0.005, 0.03),
        };
        let text = format_estimate_summary(&estimate(), &config);
        assert!(text.contains("Zb=10.500 ± 0.559 km"));
        assert!(text.contains("65x65 nodes"));
        assert!(text.contains("taper=hann"));
    }

    #[test]
    fn batch_table_lists_failures_in_place() {
        let locations = [Location { x: 10.0, y: 20.0 }, Location { x: -5.0, y: 0.0 }];
        let results = vec![Ok(estimate()), Err(CpdError::InvalidWindow("outside".to_string()))];
        let text = format_batch_table(&locations, &results);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[2].ends_with("ok"));
        assert!(lines[3].contains("Invalid window: outside"));
        assert!(text.contains("1 ok, 1 failed"));
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
