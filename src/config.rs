use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Fracture toughness reported when the configuration does not override it.
pub const DEFAULT_FRACTURE_TOUGHNESS_MPAM: f64 = 8.0;

const FRACTION_SUM_TOLERANCE: f64 = 1e-6;

/// One constituent phase of the composite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSpec {
    pub name: String,
    /// Share of the composite volume, in [0, 1]
    pub volume_fraction: f64,
    /// Density [g/cm^3]
    #[serde(rename = "density_gcm3")]
    pub density: f64,
    /// Young's modulus [GPa]
    #[serde(rename = "young_modulus_gpa")]
    pub modulus: f64,
    /// Ultimate tensile strength [MPa]
    #[serde(rename = "uts_mpa")]
    pub uts: f64,
    /// Load-transfer de-rating applied to strength and stiffness, in [0, 1]
    pub efficiency_factor: f64,
}

/// Validated composite description loaded once per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeConfig {
    pub phases: Vec<PhaseSpec>,
    /// Optional override for the reported fracture toughness [MPa·m^0.5]
    #[serde(default)]
    pub fracture_toughness_mpam: Option<f64>,
}

impl CompositeConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&raw)?;
        tracing::debug!(
            path = %path.display(),
            phases = config.phases.len(),
            "loaded composite configuration"
        );
        Ok(config)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: CompositeConfig = serde_yaml::from_str(raw)?;
        config.validate()?;

        let total = config.fraction_sum();
        if (total - 1.0).abs() > FRACTION_SUM_TOLERANCE {
            tracing::warn!(total, "volume fractions do not sum to 1.0");
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.phases.is_empty() {
            return Err(ConfigError::Invalid(
                "phases must contain at least one phase".to_string(),
            ));
        }

        for phase in &self.phases {
            phase.validate()?;
        }

        if let Some(k_ic) = self.fracture_toughness_mpam {
            if !k_ic.is_finite() || k_ic < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "fracture_toughness_mpam must be finite and non-negative, got {k_ic}"
                )));
            }
        }

        Ok(())
    }

    pub fn volume_fractions(&self) -> Vec<f64> {
        self.phases.iter().map(|p| p.volume_fraction).collect()
    }

    pub fn fraction_sum(&self) -> f64 {
        self.phases.iter().map(|p| p.volume_fraction).sum()
    }

    pub fn fracture_toughness(&self) -> f64 {
        self.fracture_toughness_mpam
            .unwrap_or(DEFAULT_FRACTURE_TOUGHNESS_MPAM)
    }
}

impl PhaseSpec {
    fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("volume_fraction", self.volume_fraction),
            ("density_gcm3", self.density),
            ("young_modulus_gpa", self.modulus),
            ("uts_mpa", self.uts),
            ("efficiency_factor", self.efficiency_factor),
        ];
        if let Some((field, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(self.invalid(field, &format!("must be finite, got {value}")));
        }

        if !(0.0..=1.0).contains(&self.volume_fraction) {
            return Err(self.invalid("volume_fraction", "must lie in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.efficiency_factor) {
            return Err(self.invalid("efficiency_factor", "must lie in [0, 1]"));
        }
        if self.density <= 0.0 {
            return Err(self.invalid("density_gcm3", "must be > 0"));
        }
        if self.modulus <= 0.0 {
            return Err(self.invalid("young_modulus_gpa", "must be > 0"));
        }
        if self.uts <= 0.0 {
            return Err(self.invalid("uts_mpa", "must be > 0"));
        }

        Ok(())
    }

    fn invalid(&self, field: &str, reason: &str) -> ConfigError {
        ConfigError::Invalid(format!("phase '{}': {field} {reason}", self.name))
    }
}
