use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use csv::WriterBuilder;
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::Serialize;

use crate::composite::CompositeProperties;
use crate::error::{IcmeError, Result};
use crate::monte_carlo::{Property, ResultTable, TableSummary, DEFAULT_HISTOGRAM_BINS};
use crate::stress_strain::{StressStrainCurve, REFERENCE_UTS_MPA, STRAIN_LIMIT};

pub const DEFAULT_RESULTS_CSV: &str = "data/monte_carlo_results.csv";
pub const DEFAULT_DISTRIBUTION_FIGURE: &str = "docs/figures/monte_carlo.png";
pub const DEFAULT_PROPERTIES_CSV: &str = "data/arrest_sim_data.csv";

const DISTRIBUTION_SIZE: (u32, u32) = (3000, 1000);
const STRESS_STRAIN_SIZE: (u32, u32) = (2000, 1200);
const ORANGE: RGBColor = RGBColor(255, 165, 0);

/// Written next to the sample table after a Monte Carlo run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub generated_at: String,
    pub config_path: PathBuf,
    pub seed: u64,
    pub tolerance: f64,
    pub results_csv: PathBuf,
    pub figure: PathBuf,
    pub statistics: TableSummary,
}

impl RunSummary {
    pub fn new(
        config_path: &Path,
        seed: u64,
        tolerance: f64,
        results_csv: &Path,
        figure: &Path,
        table: &ResultTable,
    ) -> Self {
        Self {
            generated_at: Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            config_path: config_path.to_path_buf(),
            seed,
            tolerance,
            results_csv: results_csv.to_path_buf(),
            figure: figure.to_path_buf(),
            statistics: table.summarize(),
        }
    }
}

/// Writes one row per sample in draw order. The header is written even for
/// an empty table.
pub fn write_results_csv(path: &Path, table: &ResultTable) -> Result<()> {
    ensure_parent(path)?;

    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(Property::ALL.map(Property::column_name))?;
    for sample in table {
        writer.serialize(sample)?;
    }
    writer.flush()?;

    tracing::info!(path = %path.display(), rows = table.len(), "wrote Monte Carlo results");
    Ok(())
}

pub fn write_properties_csv(path: &Path, properties: &CompositeProperties) -> Result<()> {
    ensure_parent(path)?;

    let mut writer = csv::Writer::from_path(path)?;
    writer.serialize(properties)?;
    writer.flush()?;

    tracing::info!(path = %path.display(), "wrote simulation results");
    Ok(())
}

pub fn write_summary_json(path: &Path, summary: &RunSummary) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, serde_json::to_string_pretty(summary)?)?;
    Ok(())
}

/// Renders one histogram panel per property, each with its design target
/// marked. A `.svg` extension selects the SVG backend, anything else PNG.
pub fn plot_distributions(table: &ResultTable, path: &Path) -> Result<()> {
    ensure_parent(path)?;

    if is_svg(path) {
        let root = SVGBackend::new(path, DISTRIBUTION_SIZE).into_drawing_area();
        draw_distributions(&root, table)?;
    } else {
        let root = BitMapBackend::new(path, DISTRIBUTION_SIZE).into_drawing_area();
        draw_distributions(&root, table)?;
    }

    tracing::info!(path = %path.display(), "wrote Monte Carlo distributions");
    Ok(())
}

pub fn plot_stress_strain(curve: &StressStrainCurve, path: &Path) -> Result<()> {
    ensure_parent(path)?;

    if is_svg(path) {
        let root = SVGBackend::new(path, STRESS_STRAIN_SIZE).into_drawing_area();
        draw_stress_strain(&root, curve)?;
    } else {
        let root = BitMapBackend::new(path, STRESS_STRAIN_SIZE).into_drawing_area();
        draw_stress_strain(&root, curve)?;
    }

    tracing::info!(path = %path.display(), "wrote stress-strain plot");
    Ok(())
}

fn draw_distributions<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    table: &ResultTable,
) -> Result<()> {
    root.fill(&WHITE).map_err(plot_error)?;

    let panels = root.split_evenly((1, 3));
    for (panel, property) in panels.iter().zip(Property::ALL) {
        draw_histogram_panel(panel, table, property)?;
    }

    root.present().map_err(plot_error)?;
    Ok(())
}

fn draw_histogram_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    table: &ResultTable,
    property: Property,
) -> Result<()> {
    let bins = table.histogram(property, DEFAULT_HISTOGRAM_BINS)?;
    let reference = property.reference_value();

    let lower = bins.first().map_or(reference, |b| b.lower).min(reference);
    let upper = bins.last().map_or(reference, |b| b.upper).max(reference);
    let pad = ((upper - lower) * 0.05).max(reference.abs() * 0.01).max(1e-6);
    let y_max = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64 * 1.1;

    let mut chart = ChartBuilder::on(area)
        .caption(
            format!("{} Distribution ({})", property.title(), property.unit()),
            ("sans-serif", 34).into_font(),
        )
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d((lower - pad)..(upper + pad), 0.0..y_max)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc(format!("{} [{}]", property.title(), property.unit()))
        .y_desc("Samples")
        .draw()
        .map_err(plot_error)?;

    let fill = panel_color(property);
    chart
        .draw_series(bins.iter().map(|bin| {
            Rectangle::new(
                [(bin.lower, 0.0), (bin.upper, bin.count as f64)],
                fill.mix(0.7).filled(),
            )
        }))
        .map_err(plot_error)?;
    chart
        .draw_series(bins.iter().map(|bin| {
            Rectangle::new(
                [(bin.lower, 0.0), (bin.upper, bin.count as f64)],
                BLACK.stroke_width(1),
            )
        }))
        .map_err(plot_error)?;

    chart
        .draw_series(LineSeries::new(
            vec![(reference, 0.0), (reference, y_max)],
            RED.stroke_width(3),
        ))
        .map_err(plot_error)?
        .label(target_label(property))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 25, y)], RED.stroke_width(3)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .border_style(BLACK)
        .background_style(WHITE.mix(0.7))
        .draw()
        .map_err(plot_error)?;

    Ok(())
}

fn draw_stress_strain<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    curve: &StressStrainCurve,
) -> Result<()> {
    root.fill(&WHITE).map_err(plot_error)?;

    let limit_pct = STRAIN_LIMIT * 100.0;
    let max_stress_mpa = (curve.max_stress() / 1e6).max(REFERENCE_UTS_MPA) * 1.1;

    let mut chart = ChartBuilder::on(root)
        .caption(
            "Stress-Strain Curve - HYPERCABLE Composite (0-5% Strain)",
            ("sans-serif", 40).into_font(),
        )
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..limit_pct * 1.1, 0.0..max_stress_mpa)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc("Strain (%)")
        .y_desc("Stress (MPa)")
        .draw()
        .map_err(plot_error)?;

    chart
        .draw_series(LineSeries::new(
            curve
                .points()
                .iter()
                .map(|p| (p.strain * 100.0, p.stress / 1e6)),
            BLUE.stroke_width(3),
        ))
        .map_err(plot_error)?
        .label("HYPERCABLE-4113-MOD1")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 25, y)], BLUE.stroke_width(3)));

    chart
        .draw_series(LineSeries::new(
            vec![(limit_pct, 0.0), (limit_pct, max_stress_mpa)],
            RED.stroke_width(2),
        ))
        .map_err(plot_error)?
        .label("Strain Limiter (5%)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 25, y)], RED.stroke_width(3)));

    chart
        .draw_series(LineSeries::new(
            vec![(0.0, REFERENCE_UTS_MPA), (limit_pct * 1.1, REFERENCE_UTS_MPA)],
            GREEN.stroke_width(2),
        ))
        .map_err(plot_error)?
        .label("UTS (2,246 MPa)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 25, y)], GREEN.stroke_width(3)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .border_style(BLACK)
        .background_style(WHITE.mix(0.7))
        .draw()
        .map_err(plot_error)?;

    root.present().map_err(plot_error)?;
    Ok(())
}

fn panel_color(property: Property) -> RGBColor {
    match property {
        Property::Density => BLUE,
        Property::Uts => GREEN,
        Property::Modulus => ORANGE,
    }
}

fn target_label(property: Property) -> &'static str {
    match property {
        Property::Density => "Target: 2.0 g/cm³",
        Property::Uts => "Target: 2,246 MPa",
        Property::Modulus => "Target: 173 GPa",
    }
}

fn is_svg(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn plot_error(err: impl std::fmt::Display) -> IcmeError {
    IcmeError::Plot(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::simulate;
    use crate::monte_carlo::run_seeded;
    use crate::properties::tests::two_phase_config;

    #[test]
    fn results_csv_has_fixed_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("results.csv");
        let table = run_seeded(&two_phase_config(), 4, 5, 0.05).unwrap();

        write_results_csv(&path, &table).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec!["density_gcm3", "uts_mpa", "young_modulus_gpa"]
        );
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 4);
        for (row, sample) in rows.iter().zip(&table) {
            assert_eq!(row[0].parse::<f64>().unwrap(), sample.density);
            assert_eq!(row[1].parse::<f64>().unwrap(), sample.uts);
            assert_eq!(row[2].parse::<f64>().unwrap(), sample.modulus);
        }
    }

    #[test]
    fn empty_table_still_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_results_csv(&path, &ResultTable::default()).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert_eq!(raw.trim_end(), "density_gcm3,uts_mpa,young_modulus_gpa");
    }

    #[test]
    fn properties_csv_uses_report_column_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arrest.csv");
        let props = simulate(&two_phase_config()).unwrap();
        write_properties_csv(&path, &props).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), 10);
        assert_eq!(&headers[6], "peak_force_37p6mm_MN");
        assert_eq!(&headers[9], "milstd_fatigue_pass");
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[7], "false");
        assert_eq!(&row[5], "25000");
    }

    #[test]
    fn summary_json_round_trips_statistics() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        let table = run_seeded(&two_phase_config(), 50, 9, 0.05).unwrap();
        let summary = RunSummary::new(
            Path::new("configs/test.yaml"),
            9,
            0.05,
            Path::new(DEFAULT_RESULTS_CSV),
            Path::new(DEFAULT_DISTRIBUTION_FIGURE),
            &table,
        );
        write_summary_json(&path, &summary).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["seed"], 9);
        assert_eq!(value["statistics"]["samples"], 50);
        assert!(value["statistics"]["uts"]["mean"].as_f64().unwrap() > 1500.0);
    }

    #[test]
    fn svg_extension_is_detected() {
        assert!(is_svg(Path::new("out/figure.SVG")));
        assert!(!is_svg(Path::new("out/figure.png")));
        assert!(!is_svg(Path::new("out/figure")));
    }
}
