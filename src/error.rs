use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IcmeError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("phase/fraction length mismatch: expected {expected}, got {got}")]
    Dimension { expected: usize, got: usize },
    #[error("perturbed volume fractions of sample {sample} sum to zero; cannot renormalize")]
    DegenerateFractions { sample: usize },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("plot error: {0}")]
    Plot(String),
}

/// Every way loading a composite configuration can fail.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("{0}")]
    Invalid(String),
}

pub type Result<T, E = IcmeError> = std::result::Result<T, E>;
