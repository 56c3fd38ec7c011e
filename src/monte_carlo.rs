//! Monte Carlo propagation of composition tolerance through the
//! rule-of-mixtures formulas.
//!
//! Each sample scales every nominal volume fraction by an independent factor,
//! clamps the result to `[0, 1]`, renormalizes so the fractions sum to one and
//! evaluates the mixture properties. Clamping happens before renormalization,
//! so a fraction pinned at 1.0 shifts the relative proportions of the others.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Uniform};
use serde::Serialize;

use crate::composite::MILSTD_MIN_UTS_MPA;
use crate::config::CompositeConfig;
use crate::error::{IcmeError, Result};
use crate::properties::{mixture_properties, MixtureProperties};

pub const DEFAULT_SAMPLES: usize = 1000;
/// Half-width of the multiplicative composition perturbation (±5%).
pub const DEFAULT_TOLERANCE: f64 = 0.05;
pub const DEFAULT_HISTOGRAM_BINS: usize = 30;

pub type SampleResult = MixtureProperties;

/// Supplies the multiplicative factor applied to one volume fraction.
pub trait PerturbationSource {
    fn next_factor(&mut self) -> f64;
}

/// Factors drawn from `Uniform(1 - tolerance, 1 + tolerance)`.
#[derive(Debug, Clone)]
pub struct UniformPerturbation<R> {
    rng: R,
    factors: Uniform<f64>,
    tolerance: f64,
}

impl<R: Rng> UniformPerturbation<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            factors: Uniform::new(1.0 - DEFAULT_TOLERANCE, 1.0 + DEFAULT_TOLERANCE),
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    pub fn with_tolerance(rng: R, tolerance: f64) -> Result<Self> {
        if !(tolerance > 0.0 && tolerance < 1.0) {
            return Err(IcmeError::InvalidArgument(format!(
                "perturbation tolerance must lie in (0, 1), got {tolerance}"
            )));
        }

        Ok(Self {
            rng,
            factors: Uniform::new(1.0 - tolerance, 1.0 + tolerance),
            tolerance,
        })
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

impl<R: Rng> PerturbationSource for UniformPerturbation<R> {
    fn next_factor(&mut self) -> f64 {
        self.factors.sample(&mut self.rng)
    }
}

/// Degenerate source returning the same factor on every draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantPerturbation(pub f64);

impl PerturbationSource for ConstantPerturbation {
    fn next_factor(&mut self) -> f64 {
        self.0
    }
}

/// Settings for a CLI-driven run.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerSettings {
    pub samples: usize,
    pub tolerance: f64,
    /// Fixed seed; `None` draws one from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            tolerance: DEFAULT_TOLERANCE,
            seed: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MonteCarloRun {
    pub seed: u64,
    pub tolerance: f64,
    pub table: ResultTable,
}

/// Draws one factor per phase (in phase order) and clamps each perturbed
/// fraction to `[0, 1]`.
pub fn perturb_fractions<S>(nominal: &[f64], source: &mut S) -> Vec<f64>
where
    S: PerturbationSource + ?Sized,
{
    nominal
        .iter()
        .map(|v| (v * source.next_factor()).clamp(0.0, 1.0))
        .collect()
}

/// Scales the fractions to sum to one. Returns `None` when their sum is not
/// a positive finite number.
pub fn renormalize(fractions: &[f64]) -> Option<Vec<f64>> {
    let total: f64 = fractions.iter().sum();
    if !(total > 0.0 && total.is_finite()) {
        return None;
    }
    Some(fractions.iter().map(|v| v / total).collect())
}

/// Runs `n_samples` perturbed evaluations of the configured composite.
///
/// Fails the whole run with [`IcmeError::DegenerateFractions`] if any sample's
/// perturbed fractions cannot be renormalized; samples are never dropped.
pub fn run<S>(config: &CompositeConfig, n_samples: usize, source: &mut S) -> Result<ResultTable>
where
    S: PerturbationSource + ?Sized,
{
    tracing::debug!(
        n_samples,
        phases = config.phases.len(),
        "starting Monte Carlo propagation"
    );

    let nominal = config.volume_fractions();
    let mut samples = Vec::with_capacity(n_samples);

    for sample in 0..n_samples {
        let clamped = perturb_fractions(&nominal, source);
        let fractions =
            renormalize(&clamped).ok_or(IcmeError::DegenerateFractions { sample })?;
        samples.push(mixture_properties(&config.phases, &fractions)?);
    }

    tracing::info!(samples = samples.len(), "Monte Carlo propagation complete");
    Ok(ResultTable::new(samples))
}

pub fn run_seeded(
    config: &CompositeConfig,
    n_samples: usize,
    seed: u64,
    tolerance: f64,
) -> Result<ResultTable> {
    let rng = ChaCha8Rng::seed_from_u64(seed);
    let mut source = UniformPerturbation::with_tolerance(rng, tolerance)?;
    run(config, n_samples, &mut source)
}

pub fn run_with_settings(
    config: &CompositeConfig,
    settings: &SamplerSettings,
) -> Result<MonteCarloRun> {
    let seed = settings.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, tolerance = settings.tolerance, "sampler seed");
    let table = run_seeded(config, settings.samples, seed, settings.tolerance)?;
    Ok(MonteCarloRun {
        seed,
        tolerance: settings.tolerance,
        table,
    })
}

/// One output column of the sample table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Density,
    Uts,
    Modulus,
}

impl Property {
    pub const ALL: [Property; 3] = [Property::Density, Property::Uts, Property::Modulus];

    pub fn column_name(self) -> &'static str {
        match self {
            Property::Density => "density_gcm3",
            Property::Uts => "uts_mpa",
            Property::Modulus => "young_modulus_gpa",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Property::Density => "g/cm³",
            Property::Uts => "MPa",
            Property::Modulus => "GPa",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Property::Density => "Density",
            Property::Uts => "UTS",
            Property::Modulus => "Young's Modulus",
        }
    }

    /// Design target marked on the distribution plots.
    pub fn reference_value(self) -> f64 {
        match self {
            Property::Density => 2.0,
            Property::Uts => 2246.0,
            Property::Modulus => 173.3,
        }
    }

    pub fn value(self, sample: &SampleResult) -> f64 {
        match self {
            Property::Density => sample.density,
            Property::Uts => sample.uts,
            Property::Modulus => sample.modulus,
        }
    }
}

/// Monte Carlo samples in draw order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    samples: Vec<SampleResult>,
}

impl ResultTable {
    pub fn new(samples: Vec<SampleResult>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[SampleResult] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SampleResult> {
        self.samples.iter()
    }

    pub fn column(&self, property: Property) -> Vec<f64> {
        self.samples.iter().map(|s| property.value(s)).collect()
    }

    pub fn summarize(&self) -> TableSummary {
        let uts_pass_rate = if self.samples.is_empty() {
            None
        } else {
            let passing = self
                .samples
                .iter()
                .filter(|s| s.uts >= MILSTD_MIN_UTS_MPA)
                .count();
            Some(passing as f64 / self.samples.len() as f64)
        };

        TableSummary {
            samples: self.samples.len(),
            density: PropertyStats::from_values(&self.column(Property::Density)),
            uts: PropertyStats::from_values(&self.column(Property::Uts)),
            modulus: PropertyStats::from_values(&self.column(Property::Modulus)),
            uts_pass_rate,
        }
    }

    /// Equal-width histogram of one column over its observed range.
    pub fn histogram(&self, property: Property, bins: usize) -> Result<Vec<HistogramBin>> {
        histogram(&self.column(property), bins)
    }
}

impl<'a> IntoIterator for &'a ResultTable {
    type Item = &'a SampleResult;
    type IntoIter = std::slice::Iter<'a, SampleResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PropertyStats {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub p05: f64,
    pub p95: f64,
}

impl PropertyStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Some(Self {
            mean,
            std_dev: variance.sqrt(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            p05: nearest_rank(&sorted, 5.0),
            p95: nearest_rank(&sorted, 95.0),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSummary {
    pub samples: usize,
    pub density: Option<PropertyStats>,
    pub uts: Option<PropertyStats>,
    pub modulus: Option<PropertyStats>,
    /// Share of samples meeting the MIL-STD UTS threshold.
    pub uts_pass_rate: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

pub fn histogram(values: &[f64], bins: usize) -> Result<Vec<HistogramBin>> {
    if bins == 0 {
        return Err(IcmeError::InvalidArgument(
            "histogram needs at least one bin".to_string(),
        ));
    }
    if values.is_empty() {
        return Ok(Vec::new());
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max <= min {
        return Ok(vec![HistogramBin {
            lower: min - 0.5,
            upper: min + 0.5,
            count: values.len(),
        }]);
    }

    let width = (max - min) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|idx| HistogramBin {
            lower: min + width * idx as f64,
            upper: min + width * (idx + 1) as f64,
            count: 0,
        })
        .collect();

    for value in values {
        let idx = (((value - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }

    Ok(out)
}

fn nearest_rank(sorted: &[f64], percentile: f64) -> f64 {
    let rank = (percentile / 100.0 * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}
