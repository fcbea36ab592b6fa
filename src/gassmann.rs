// Gassmann fluid substitution

use crate::error::InversionError;

/// Saturated bulk modulus from Gassmann's equation
///
/// $$\begin{equation}
/// K_{sat} = K_{dry} + \frac{\left(1 - \frac{K_{dry}}{K_m}\right)^2}
/// {\frac{\phi}{K_f} + \frac{1 - \phi}{K_m} - \frac{K_{dry}}{K_m^2}}
/// \end{equation}$$
///
/// # Arguments
/// * kdry: dry-frame bulk modulus in GPa
/// * km: mineral (matrix) bulk modulus in GPa
/// * phi: porosity
/// * kf: pore-fluid bulk modulus in GPa
///
/// # Returns
/// the saturated bulk modulus in GPa
pub fn gassmann_ksat(kdry: f64, km: f64, phi: f64, kf: f64) -> f64 {
    kdry + (1.0 - kdry / km).powi(2) / (phi / kf + (1.0 - phi) / km - kdry / km.powi(2))
}

/// Fluid bulk modulus from Gassmann's equation solved for $K_f$
///
/// $$\begin{equation}
/// K_f = \phi \left(\frac{\left(1 - \frac{K_{dry}}{K_m}\right)^2}{K_{sat} - K_{dry}}
/// - \frac{1 - \phi}{K_m} + \frac{K_{dry}}{K_m^2}\right)^{-1}
/// \end{equation}$$
///
/// Both singular points are detected by exact comparison with zero, so a
/// denominator that is merely tiny passes through and gives a huge $K_f$.
///
/// # Arguments
/// * ksat: saturated bulk modulus in GPa
/// * kdry: calibrated dry-frame bulk modulus in GPa
/// * km: mineral bulk modulus in GPa
/// * phi: porosity
pub fn invert_kf_from_ksat(ksat: f64, kdry: f64, km: f64, phi: f64) -> Result<f64, InversionError> {
    let a = (1.0 - kdry / km).powi(2);
    let b = ksat - kdry;
    if b == 0.0 {
        return Err(InversionError::KsatEqualsKdry { ksat });
    }
    let den = a / b;
    let term = den - (1.0 - phi) / km + kdry / km.powi(2);
    if term == 0.0 {
        return Err(InversionError::InvalidTerm);
    }
    Ok(phi / term)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn forward_matches_reference_values() {
        let k = gassmann_ksat(12.613, 37.0, 0.25, 2.6);
        assert!((k - 16.665_048_943_125_136).abs() < 1e-9);
        let k = gassmann_ksat(10.0, 37.0, 0.25, 2.6);
        assert!((k - 14.880_020_597_322_348).abs() < 1e-9);
    }

    #[test]
    fn dry_frame_equal_to_mineral_gives_mineral() {
        // (1 - Kdry/Km)^2 vanishes
        assert_eq!(gassmann_ksat(37.0, 37.0, 0.2, 2.6), 37.0);
    }

    #[test]
    fn stiffer_fluid_stiffens_rock() {
        let soft = gassmann_ksat(12.0, 37.0, 0.25, 0.9);
        let stiff = gassmann_ksat(12.0, 37.0, 0.25, 2.6);
        assert!(stiff > soft);
        assert!(soft > 12.0);
    }

    #[test]
    fn ksat_equal_to_kdry_is_rejected() {
        assert_eq!(
            invert_kf_from_ksat(12.613, 12.613, 37.0, 0.25),
            Err(InversionError::KsatEqualsKdry { ksat: 12.613 })
        );
    }

    #[test]
    fn ksat_just_above_kdry_is_not_rejected() {
        let kf = invert_kf_from_ksat(12.613 + 1e-12, 12.613, 37.0, 0.25).unwrap();
        assert!(kf.is_finite());
        assert!(kf.abs() < 1e-6);
    }

    #[test]
    fn zero_inversion_term_is_rejected() {
        // Kdry = 0 and phi = 0 leave term = 1/Ksat - 1/Km, zero when Ksat == Km
        assert_eq!(
            invert_kf_from_ksat(37.0, 0.0, 37.0, 0.0),
            Err(InversionError::InvalidTerm)
        );
    }

    #[test]
    fn near_zero_inversion_term_gives_huge_kf() {
        // term vanishes at Ksat = Km / (1 - phi) when Kdry = 0
        let kf = invert_kf_from_ksat(37.0 / 0.75 * (1.0 + 1e-12), 0.0, 37.0, 0.25).unwrap();
        assert!(kf.is_finite());
        assert!(kf.abs() > 1e3);
    }

    #[test]
    fn reference_water_zone_recovers_brine() {
        let kf = invert_kf_from_ksat(16.665_318_705_113_418, 12.613, 37.0, 0.25).unwrap();
        assert!((kf - 2.600_192_998_844_824).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn forward_then_inverse_recovers_kf(
            km in 10.0f64..80.0,
            frac in 0.05f64..0.95,
            phi in 0.05f64..0.4,
            kf in 0.05f64..5.0,
        ) {
            let kdry = km * frac;
            let ksat = gassmann_ksat(kdry, km, phi, kf);
            let recovered = invert_kf_from_ksat(ksat, kdry, km, phi).unwrap();
            prop_assert!((recovered - kf).abs() / kf < 1e-8);
        }
    }
}
