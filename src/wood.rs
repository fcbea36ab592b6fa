// Wood (Reuss) mixing of brine and hydrocarbon

use crate::error::SaturationError;

/// Water saturation from Wood/Reuss fluid mixing (brine-hydrocarbon)
///
/// $$\begin{equation}
/// S_w = \frac{\frac{1}{K_f} - \frac{1}{K_{hc}}}{\frac{1}{K_w} - \frac{1}{K_{hc}}}
/// \end{equation}$$
///
/// The result is not clamped: values outside [0, 1] mean the rock or fluid
/// assumptions do not hold for the zone.
///
/// # Arguments
/// * kf: effective pore-fluid bulk modulus in GPa
/// * kw: brine bulk modulus in GPa
/// * khc: hydrocarbon bulk modulus in GPa
pub fn sw_from_wood(kf: f64, kw: f64, khc: f64) -> Result<f64, SaturationError> {
    let numerator = 1.0 / kf - 1.0 / khc;
    let denominator = 1.0 / kw - 1.0 / khc;
    if denominator == 0.0 {
        return Err(SaturationError::InvalidFluidModuli { kw, khc });
    }
    Ok(numerator / denominator)
}

/// Effective fluid bulk modulus of a brine-hydrocarbon mix
///
/// $$\frac{1}{K_f} = \frac{S_w}{K_w} + \frac{1 - S_w}{K_{hc}}$$
pub fn kf_from_wood(sw: f64, kw: f64, khc: f64) -> f64 {
    1.0 / (sw / kw + (1.0 - sw) / khc)
}
