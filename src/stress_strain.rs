//! Hand-fitted HYPERCABLE stress-strain model over 0-5% strain.

use serde::Serialize;

use crate::error::{IcmeError, Result};

/// Linear-elastic modulus [Pa]
pub const ELASTIC_MODULUS_PA: f64 = 173e9;
/// End of the linear-elastic region (0.4% strain)
pub const ELASTIC_LIMIT_STRAIN: f64 = 0.004;
/// Strain limiter (5% strain)
pub const STRAIN_LIMIT: f64 = 0.05;
/// Plateau stress at the elastic limit [Pa]
pub const PLATEAU_START_PA: f64 = 700e6;
/// Plateau stress at the strain limiter [Pa]
pub const PLATEAU_END_PA: f64 = 900e6;
/// Reference UTS marker drawn on the curve [MPa]
pub const REFERENCE_UTS_MPA: f64 = 2246.0;

pub const DEFAULT_CURVE_POINTS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub strain: f64,
    #[serde(rename = "stress_pa")]
    pub stress: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StressStrainCurve {
    points: Vec<CurvePoint>,
}

impl StressStrainCurve {
    /// Samples the model at `points` evenly spaced strains in `[0, STRAIN_LIMIT]`.
    pub fn hypercable(points: usize) -> Result<Self> {
        if points < 2 {
            return Err(IcmeError::InvalidArgument(format!(
                "stress-strain curve needs at least 2 points, got {points}"
            )));
        }

        let step = STRAIN_LIMIT / (points - 1) as f64;
        let points = (0..points)
            .map(|idx| {
                let strain = step * idx as f64;
                CurvePoint {
                    strain,
                    stress: stress_at(strain),
                }
            })
            .collect();

        Ok(Self { points })
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    pub fn max_stress(&self) -> f64 {
        self.points.iter().map(|p| p.stress).fold(0.0, f64::max)
    }
}

/// Piecewise model: linear elastic up to 0.4%, then a linear hardening
/// plateau from 700 to 900 MPa. The two branches do not meet at the elastic
/// limit (692 vs 700 MPa).
pub fn stress_at(strain: f64) -> f64 {
    if strain <= ELASTIC_LIMIT_STRAIN {
        ELASTIC_MODULUS_PA * strain
    } else {
        PLATEAU_START_PA
            + (PLATEAU_END_PA - PLATEAU_START_PA) * (strain - ELASTIC_LIMIT_STRAIN)
                / (STRAIN_LIMIT - ELASTIC_LIMIT_STRAIN)
    }
}

/// Absorbed energy up to the strain limiter [MJ/m^3].
///
/// Uses the trapezoid idealisation of the curve: a triangle rising to the
/// plateau start stress, then the plateau trapezoid.
pub fn energy_absorption_mj_m3() -> f64 {
    let plateau_width = STRAIN_LIMIT - ELASTIC_LIMIT_STRAIN;
    let linear = 0.5 * PLATEAU_START_PA * ELASTIC_LIMIT_STRAIN;
    let plateau = PLATEAU_START_PA * plateau_width
        + 0.5 * (PLATEAU_END_PA - PLATEAU_START_PA) * plateau_width;
    (linear + plateau) / 1e6
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn curve_spans_zero_to_strain_limit() {
        let curve = StressStrainCurve::hypercable(DEFAULT_CURVE_POINTS).unwrap();
        let points = curve.points();
        assert_eq!(points.len(), 100);
        assert_eq!(points[0].strain, 0.0);
        assert_eq!(points[0].stress, 0.0);
        assert_relative_eq!(points[99].strain, STRAIN_LIMIT, epsilon = 1e-15);
        assert_relative_eq!(curve.max_stress(), PLATEAU_END_PA, max_relative = 1e-12);
    }

    #[test]
    fn branches_follow_the_model() {
        assert_relative_eq!(stress_at(0.002), 346e6, max_relative = 1e-12);
        assert_relative_eq!(stress_at(ELASTIC_LIMIT_STRAIN), 692e6, max_relative = 1e-12);
        assert_relative_eq!(stress_at(0.027), 800e6, max_relative = 1e-12);
    }

    #[test]
    fn energy_absorption_matches_trapezoid() {
        assert_relative_eq!(energy_absorption_mj_m3(), 38.2, max_relative = 1e-12);
    }

    #[test]
    fn too_few_points_is_rejected() {
        assert!(matches!(
            StressStrainCurve::hypercable(1),
            Err(IcmeError::InvalidArgument(_))
        ));
    }
}
