use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use hypercable_icme::logging::init_logging;
use hypercable_icme::output::{write_properties_csv, DEFAULT_PROPERTIES_CSV};
use hypercable_icme::{simulate, CompositeConfig};

#[derive(Debug, Parser)]
#[command(author, version, about = "Simulate composite material properties")]
struct Cli {
    /// Path to YAML config file
    #[arg(long)]
    config: PathBuf,

    /// Output CSV path
    #[arg(long, default_value = DEFAULT_PROPERTIES_CSV)]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = CompositeConfig::from_path(&cli.config)
        .with_context(|| format!("failed to load config {}", cli.config.display()))?;
    let properties = simulate(&config)?;

    write_properties_csv(&cli.output, &properties)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;

    println!(
        "Density: {:.3} g/cm3 | UTS: {:.1} MPa | Modulus: {:.1} GPa",
        properties.density_gcm3, properties.uts_mpa, properties.young_modulus_gpa
    );
    println!(
        "MIL-STD UTS: {} | Force: {} | Fatigue: {}",
        verdict(properties.milstd_uts_pass),
        verdict(properties.milstd_force_pass),
        verdict(properties.milstd_fatigue_pass)
    );
    println!("Simulation results saved to: {}", cli.output.display());
    Ok(())
}

fn verdict(pass: bool) -> &'static str {
    if pass {
        "PASS"
    } else {
        "FAIL"
    }
}
