use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use hypercable_icme::logging::init_logging;
use hypercable_icme::monte_carlo::{
    run_with_settings, SamplerSettings, DEFAULT_SAMPLES, DEFAULT_TOLERANCE,
};
use hypercable_icme::output::{
    plot_distributions, write_results_csv, write_summary_json, RunSummary,
    DEFAULT_DISTRIBUTION_FIGURE, DEFAULT_RESULTS_CSV,
};
use hypercable_icme::CompositeConfig;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Run Monte Carlo simulation on composite properties with a composition tolerance"
)]
struct Cli {
    /// Path to YAML config file
    #[arg(long)]
    config: PathBuf,

    /// Number of Monte Carlo samples
    #[arg(long, default_value_t = DEFAULT_SAMPLES)]
    samples: usize,

    /// Output image path (.png or .svg)
    #[arg(long, default_value = DEFAULT_DISTRIBUTION_FIGURE)]
    save: PathBuf,

    /// Output CSV path for the per-sample table
    #[arg(long, default_value = DEFAULT_RESULTS_CSV)]
    results: PathBuf,

    /// Optional JSON run summary path
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Random seed; drawn from OS entropy when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Half-width of the multiplicative composition perturbation
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: f64,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = CompositeConfig::from_path(&cli.config)
        .with_context(|| format!("failed to load config {}", cli.config.display()))?;

    let settings = SamplerSettings {
        samples: cli.samples,
        tolerance: cli.tolerance,
        seed: cli.seed,
    };
    let run = run_with_settings(&config, &settings)?;

    write_results_csv(&cli.results, &run.table)
        .with_context(|| format!("failed to write {}", cli.results.display()))?;
    plot_distributions(&run.table, &cli.save)
        .with_context(|| format!("failed to render {}", cli.save.display()))?;

    if let Some(path) = &cli.summary {
        let summary = RunSummary::new(
            &cli.config,
            run.seed,
            run.tolerance,
            &cli.results,
            &cli.save,
            &run.table,
        );
        write_summary_json(path, &summary)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Summary: {}", path.display());
    }

    println!("Samples: {} | Seed: {}", run.table.len(), run.seed);
    println!("Results CSV: {}", cli.results.display());
    println!("Monte Carlo distributions saved to: {}", cli.save.display());
    Ok(())
}
