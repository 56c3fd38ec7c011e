use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use hypercable_icme::logging::init_logging;
use hypercable_icme::output::plot_stress_strain;
use hypercable_icme::stress_strain::{StressStrainCurve, DEFAULT_CURVE_POINTS};

#[derive(Debug, Parser)]
#[command(author, version, about = "Plot the HYPERCABLE stress-strain curve (0-5% strain)")]
struct Cli {
    /// Output image path (.png or .svg)
    #[arg(long)]
    save: PathBuf,

    /// Number of strain samples along the curve
    #[arg(long, default_value_t = DEFAULT_CURVE_POINTS)]
    points: usize,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let curve = StressStrainCurve::hypercable(cli.points)?;
    plot_stress_strain(&curve, &cli.save)
        .with_context(|| format!("failed to render {}", cli.save.display()))?;

    println!("Stress-strain plot saved to: {}", cli.save.display());
    Ok(())
}
