//! Elbow plot of the K-means sweep, rendered as SVG to avoid system font dependencies.

use crate::error::{CliError, Result};
use confsel::workflows::cluster::ClusteringOutcome;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

const SIZE: (u32, u32) = (800, 500);

/// Writes the inertia-vs-k curve with a dashed marker at the chosen k into
/// `output_dir`, named after the largest swept k and the chosen one.
pub fn write_elbow_plot(outcome: &ClusteringOutcome, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(outcome.elbow_plot_name("svg"));
    let points: Vec<(f64, f64)> = outcome
        .sweep
        .fits
        .iter()
        .map(|fit| (fit.k as f64, fit.inertia))
        .collect();
    draw_elbow(&path, &points, outcome.best_k as f64)?;
    Ok(path)
}

fn draw_elbow(path: &Path, points: &[(f64, f64)], best_k: f64) -> Result<()> {
    let plot_err = |e: &dyn std::fmt::Display| CliError::Plot {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let (x_min, x_max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (x, _)| {
            (lo.min(*x), hi.max(*x))
        });
    let y_max = points.iter().map(|(_, y)| *y).fold(0.0, f64::max);
    if !x_min.is_finite() || !x_max.is_finite() {
        return Err(plot_err(&"no sweep points to draw"));
    }

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| plot_err(&e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Elbow method for optimal k", ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d((x_min - 0.5)..(x_max + 0.5), 0.0..(y_max * 1.05).max(1e-9))
        .map_err(|e| plot_err(&e))?;

    chart
        .configure_mesh()
        .x_desc("k")
        .y_desc("Inertia")
        .draw()
        .map_err(|e| plot_err(&e))?;

    chart
        .draw_series(LineSeries::new(points.iter().copied(), &BLUE))
        .map_err(|e| plot_err(&e))?;
    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 3, BLUE.filled())),
        )
        .map_err(|e| plot_err(&e))?;
    chart
        .draw_series(DashedLineSeries::new(
            [(best_k, 0.0), (best_k, y_max * 1.05)],
            6,
            4,
            RED.stroke_width(1),
        ))
        .map_err(|e| plot_err(&e))?;

    root.present().map_err(|e| plot_err(&e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn elbow_plot_is_written_as_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("elbow_max6_best3.svg");
        let points = [
            (1.0, 100.0),
            (2.0, 50.0),
            (3.0, 20.0),
            (4.0, 18.0),
            (5.0, 17.0),
            (6.0, 16.5),
        ];
        draw_elbow(&path, &points, 3.0).unwrap();

        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Inertia"));
    }

    #[test]
    fn empty_curve_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = draw_elbow(&dir.path().join("empty.svg"), &[], 1.0);
        assert!(matches!(result, Err(CliError::Plot { .. })));
    }
}
