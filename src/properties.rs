//! Rule-of-mixtures property formulas.
//!
//! All three properties are linear in the volume fractions, so the caller may
//! pass fractions that differ from the configured ones; the Monte Carlo
//! sampler injects its perturbations this way.

use serde::Serialize;

use crate::config::{CompositeConfig, PhaseSpec};
use crate::error::{IcmeError, Result};

/// Effective composite properties from one set of volume fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MixtureProperties {
    #[serde(rename = "density_gcm3")]
    pub density: f64,
    #[serde(rename = "uts_mpa")]
    pub uts: f64,
    #[serde(rename = "young_modulus_gpa")]
    pub modulus: f64,
}

/// Linear (Voigt) density mixing: `Σ v_i ρ_i`.
pub fn density(phases: &[PhaseSpec], fractions: &[f64]) -> Result<f64> {
    check_dimensions(phases, fractions)?;
    Ok(phases
        .iter()
        .zip(fractions)
        .map(|(p, v)| v * p.density)
        .sum())
}

/// Efficiency-weighted rule of mixtures for strength: `Σ η_i v_i σ_i`.
pub fn uts(phases: &[PhaseSpec], fractions: &[f64]) -> Result<f64> {
    check_dimensions(phases, fractions)?;
    Ok(phases
        .iter()
        .zip(fractions)
        .map(|(p, v)| p.efficiency_factor * v * p.uts)
        .sum())
}

/// Efficiency-weighted rule of mixtures for stiffness: `Σ η_i v_i E_i`.
pub fn modulus(phases: &[PhaseSpec], fractions: &[f64]) -> Result<f64> {
    check_dimensions(phases, fractions)?;
    Ok(phases
        .iter()
        .zip(fractions)
        .map(|(p, v)| p.efficiency_factor * v * p.modulus)
        .sum())
}

pub fn mixture_properties(phases: &[PhaseSpec], fractions: &[f64]) -> Result<MixtureProperties> {
    Ok(MixtureProperties {
        density: density(phases, fractions)?,
        uts: uts(phases, fractions)?,
        modulus: modulus(phases, fractions)?,
    })
}

/// Properties at the configured (unperturbed) volume fractions.
pub fn nominal_properties(config: &CompositeConfig) -> Result<MixtureProperties> {
    mixture_properties(&config.phases, &config.volume_fractions())
}

fn check_dimensions(phases: &[PhaseSpec], fractions: &[f64]) -> Result<()> {
    if phases.len() != fractions.len() {
        return Err(IcmeError::Dimension {
            expected: phases.len(),
            got: fractions.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    pub(crate) fn phase(
        name: &str,
        volume_fraction: f64,
        density: f64,
        modulus: f64,
        uts: f64,
        efficiency_factor: f64,
    ) -> PhaseSpec {
        PhaseSpec {
            name: name.to_string(),
            volume_fraction,
            density,
            modulus,
            uts,
            efficiency_factor,
        }
    }

    pub(crate) fn two_phase_config() -> CompositeConfig {
        CompositeConfig {
            phases: vec![
                phase("A", 0.6, 1.8, 150.0, 2000.0, 0.9),
                phase("B", 0.4, 2.5, 200.0, 1500.0, 0.85),
            ],
            fracture_toughness_mpam: None,
        }
    }

    #[test]
    fn two_phase_reference_values() {
        let props = nominal_properties(&two_phase_config()).unwrap();
        assert_abs_diff_eq!(props.density, 2.08, epsilon = 1e-9);
        assert_abs_diff_eq!(props.uts, 1590.0, epsilon = 1e-9);
        assert_abs_diff_eq!(props.modulus, 149.0, epsilon = 1e-9);
    }

    #[test]
    fn efficiency_does_not_touch_density() {
        let phases = vec![phase("only", 1.0, 1.5, 100.0, 1000.0, 0.5)];
        let props = mixture_properties(&phases, &[1.0]).unwrap();
        assert_abs_diff_eq!(props.density, 1.5);
        assert_abs_diff_eq!(props.uts, 500.0);
        assert_abs_diff_eq!(props.modulus, 50.0);
    }

    #[test]
    fn fractions_override_nominal_values() {
        let config = two_phase_config();
        let props = mixture_properties(&config.phases, &[0.5, 0.5]).unwrap();
        assert_abs_diff_eq!(props.density, 0.5 * 1.8 + 0.5 * 2.5, epsilon = 1e-12);
    }

    #[test]
    fn mismatched_lengths_fail() {
        let config = two_phase_config();
        let err = mixture_properties(&config.phases, &[1.0]).unwrap_err();
        assert!(matches!(
            err,
            IcmeError::Dimension {
                expected: 2,
                got: 1
            }
        ));
        assert!(density(&config.phases, &[0.2, 0.3, 0.5]).is_err());
    }
}
