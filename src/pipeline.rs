// Reference-zone calibration and target-zone saturation

use std::fmt;

use ndarray::{Array1, ArrayView1, Zip};
use serde::Serialize;
use tracing::{debug, warn};

use crate::calibration::FrameCalibrator;
use crate::error::{SwError, SwResult};
use crate::gassmann::invert_kf_from_ksat;
use crate::params::{CalibrationSettings, RockFluidModuli};
use crate::sonic::{shear_modulus_gpa, ZoneInput};
use crate::wood::sw_from_wood;

/// Dry frame calibrated in a brine-filled reference zone.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CalibratedFrame {
    /// Ksat of the reference zone in GPa
    pub ksat_reference: f64,
    /// Kdry in GPa
    pub kdry: f64,
}

/// Fluid and saturation estimate for one target zone.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TargetEstimate {
    pub ksat: f64,
    pub kf: f64,
    pub sw: f64,
}

/// The five reported values of a run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SaturationReport {
    pub ksat_reference: f64,
    pub kdry: f64,
    pub ksat_target: f64,
    pub kf_target: f64,
    pub sw: f64,
}

impl fmt::Display for SaturationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ksat (water zone): {:.3} GPa", self.ksat_reference)?;
        writeln!(f, "Calibrated Kdry:   {:.3} GPa", self.kdry)?;
        writeln!(f, "Ksat (target):     {:.3} GPa", self.ksat_target)?;
        writeln!(f, "Inverted Kf:       {:.3} GPa", self.kf_target)?;
        write!(f, "Estimated Sw:      {:.3} (fraction)", self.sw)
    }
}

impl CalibratedFrame {
    /// Calibrate Kdry in a zone assumed fully brine saturated.
    pub fn calibrate(
        reference: &ZoneInput,
        moduli: &RockFluidModuli,
        settings: &CalibrationSettings,
    ) -> SwResult<Self> {
        let (_, vs) = reference.velocities()?;
        let ksat_reference = reference.ksat()?;
        debug!(
            ksat = ksat_reference,
            mu = shear_modulus_gpa(vs, reference.rho_gcc),
            "reference zone moduli"
        );
        let kdry = FrameCalibrator::new(*settings).calibrate(
            ksat_reference,
            moduli.mineral,
            reference.phi,
            moduli.brine,
        )?;
        Ok(CalibratedFrame {
            ksat_reference,
            kdry,
        })
    }

    /// Invert fluid modulus and saturation in a target zone.
    pub fn evaluate(&self, target: &ZoneInput, moduli: &RockFluidModuli) -> SwResult<TargetEstimate> {
        let ksat = target.ksat()?;
        let estimate = self.evaluate_ksat(ksat, target.phi, moduli)?;
        debug!(ksat = estimate.ksat, kf = estimate.kf, sw = estimate.sw, "target zone");
        Ok(estimate)
    }

    fn evaluate_ksat(&self, ksat: f64, phi: f64, moduli: &RockFluidModuli) -> SwResult<TargetEstimate> {
        let kf = invert_kf_from_ksat(ksat, self.kdry, moduli.mineral, phi)?;
        let sw = sw_from_wood(kf, moduli.brine, moduli.hydrocarbon)?;
        if !(0.0..=1.0).contains(&sw) {
            warn!(sw, kf, "saturation outside [0, 1], check rock and fluid assumptions");
        }
        Ok(TargetEstimate { ksat, kf, sw })
    }

    /// Full report for one target zone against this frame.
    pub fn report(&self, target: &ZoneInput, moduli: &RockFluidModuli) -> SwResult<SaturationReport> {
        let estimate = self.evaluate(target, moduli)?;
        Ok(SaturationReport {
            ksat_reference: self.ksat_reference,
            kdry: self.kdry,
            ksat_target: estimate.ksat,
            kf_target: estimate.kf,
            sw: estimate.sw,
        })
    }

    /// Sw for many target zones sharing this frame.
    ///
    /// # Arguments
    /// * dtc: compressional slowness per zone in µs/ft
    /// * dts: shear slowness per zone in µs/ft
    /// * rho: bulk density per zone in g/cm³
    /// * phi: porosity per zone
    pub fn saturation_profile(
        &self,
        dtc: ArrayView1<'_, f64>,
        dts: ArrayView1<'_, f64>,
        rho: ArrayView1<'_, f64>,
        phi: ArrayView1<'_, f64>,
        moduli: &RockFluidModuli,
    ) -> SwResult<Array1<f64>> {
        let n_zones = dtc.len();
        for found in [dts.len(), rho.len(), phi.len()] {
            if found != n_zones {
                return Err(SwError::ShapeMismatch {
                    expected: n_zones,
                    found,
                });
            }
        }
        let mut sw: Array1<f64> = Array1::zeros(n_zones);
        let mut index = 0;
        let mut failure = None;
        Zip::from(&mut sw)
            .and(&dtc)
            .and(&dts)
            .and(&rho)
            .and(&phi)
            .for_each(|sw, &dtc, &dts, &rho, &phi| {
                if failure.is_none() {
                    match self.evaluate(&ZoneInput::new(dtc, dts, rho, phi), moduli) {
                        Ok(estimate) => *sw = estimate.sw,
                        Err(source) => {
                            failure = Some(SwError::TargetZone {
                                index,
                                source: Box::new(source),
                            })
                        }
                    }
                }
                index += 1;
            });
        match failure {
            Some(err) => Err(err),
            None => Ok(sw),
        }
    }
}

/// Run the whole workflow: calibrate on `reference`, estimate `target`.
pub fn estimate_saturation(
    reference: &ZoneInput,
    target: &ZoneInput,
    moduli: &RockFluidModuli,
    settings: &CalibrationSettings,
) -> SwResult<SaturationReport> {
    CalibratedFrame::calibrate(reference, moduli, settings)?.report(target, moduli)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{InversionError, SaturationError};
    use crate::gassmann::gassmann_ksat;
    use crate::wood::kf_from_wood;
    use ndarray::array;

    fn frame() -> CalibratedFrame {
        CalibratedFrame {
            ksat_reference: 16.665,
            kdry: 12.613,
        }
    }

    #[test]
    fn synthetic_target_recovers_saturation() {
        let moduli = RockFluidModuli::default();
        let kf = kf_from_wood(0.4, moduli.brine, moduli.hydrocarbon);
        let ksat = gassmann_ksat(12.613, moduli.mineral, 0.22, kf);
        let estimate = frame().evaluate_ksat(ksat, 0.22, &moduli).unwrap();
        assert!((estimate.kf - kf).abs() < 1e-9);
        assert!((estimate.sw - 0.4).abs() < 1e-9);
    }

    #[test]
    fn target_ksat_equal_to_kdry_fails() {
        let err = frame()
            .evaluate_ksat(12.613, 0.25, &RockFluidModuli::default())
            .unwrap_err();
        assert_eq!(err, SwError::Inversion(InversionError::KsatEqualsKdry { ksat: 12.613 }));
    }

    #[test]
    fn identical_fluids_fail() {
        let moduli = RockFluidModuli::new(37.0, 2.0, 2.0);
        let err = frame().evaluate_ksat(15.0, 0.25, &moduli).unwrap_err();
        assert!(matches!(
            err,
            SwError::Saturation(SaturationError::InvalidFluidModuli { .. })
        ));
    }

    #[test]
    fn profile_rejects_mismatched_lengths() {
        let err = frame()
            .saturation_profile(
                array![92.0, 95.0].view(),
                array![170.0].view(),
                array![2.3, 2.3].view(),
                array![0.25, 0.25].view(),
                &RockFluidModuli::default(),
            )
            .unwrap_err();
        assert_eq!(err, SwError::ShapeMismatch { expected: 2, found: 1 });
    }

    #[test]
    fn profile_reports_failing_zone_index() {
        let err = frame()
            .saturation_profile(
                array![92.0, 92.0, 0.0].view(),
                array![170.0, 170.0, 170.0].view(),
                array![2.3, 2.3, 2.3].view(),
                array![0.25, 0.25, 0.25].view(),
                &RockFluidModuli::default(),
            )
            .unwrap_err();
        assert!(matches!(err, SwError::TargetZone { index: 2, .. }));
    }

    #[test]
    fn report_formats_three_decimals() {
        let report = SaturationReport {
            ksat_reference: 16.665_318,
            kdry: 12.613,
            ksat_target: 15.387_168,
            kf_target: 1.717_753,
            sw: 0.728_091,
        };
        let text = report.to_string();
        assert!(text.contains("Ksat (water zone): 16.665 GPa"));
        assert!(text.contains("Calibrated Kdry:   12.613 GPa"));
        assert!(text.ends_with("Estimated Sw:      0.728 (fraction)"));
    }
}
