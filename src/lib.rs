//! HYPERCABLE ICME toolkit.
//!
//! Rule-of-mixtures estimates of composite density, strength and stiffness
//! from a YAML phase description, MIL-STD screening of the single-shot
//! result, and Monte Carlo propagation of a ±5% composition tolerance.

pub mod composite;
pub mod config;
pub mod error;
pub mod logging;
pub mod monte_carlo;
pub mod output;
pub mod properties;
pub mod stress_strain;

pub use composite::{simulate, CompositeProperties};
pub use config::{CompositeConfig, PhaseSpec};
pub use error::{ConfigError, IcmeError, Result};
pub use monte_carlo::{
    run, run_seeded, run_with_settings, ConstantPerturbation, MonteCarloRun, PerturbationSource,
    Property, ResultTable, SampleResult, SamplerSettings, TableSummary, UniformPerturbation,
};
pub use properties::{mixture_properties, nominal_properties, MixtureProperties};
pub use stress_strain::StressStrainCurve;
