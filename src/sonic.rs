// Sonic log conversions: slowness to velocity, velocity and density to moduli

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{SonicError, Wave};

/// Feet to meters.
pub const FT_TO_M: f64 = 0.3048;

/// Microseconds per second, undoes the µs scaling of slowness logs.
pub const US_PER_S: f64 = 1e6;

/// g/cm³ to kg/m³.
pub const GCC_TO_KGM3: f64 = 1000.0;

/// Pa to GPa.
pub const PA_PER_GPA: f64 = 1e9;

/// Log-derived summary of one depth interval.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneInput {
    /// compressional slowness in µs/ft
    pub dtc_us_per_ft: f64,
    /// shear slowness in µs/ft
    pub dts_us_per_ft: f64,
    /// bulk density in g/cm³
    pub rho_gcc: f64,
    /// porosity as a fraction
    pub phi: f64,
}

impl ZoneInput {
    pub fn new(dtc_us_per_ft: f64, dts_us_per_ft: f64, rho_gcc: f64, phi: f64) -> Self {
        ZoneInput {
            dtc_us_per_ft,
            dts_us_per_ft,
            rho_gcc,
            phi,
        }
    }

    /// Vp and Vs of the zone in m/s.
    pub fn velocities(&self) -> Result<(f64, f64), SonicError> {
        velocities_from_sonic(self.dtc_us_per_ft, self.dts_us_per_ft)
    }

    /// Saturated bulk modulus of the zone in GPa.
    pub fn ksat(&self) -> Result<f64, SonicError> {
        ksat_gpa(self.dtc_us_per_ft, self.dts_us_per_ft, self.rho_gcc)
    }
}

/// Parses `"dtc,dts,rho,phi"`, e.g. `"90,170,2.32,0.25"`.
impl FromStr for ZoneInput {
    type Err = String;

    fn from_str(input: &str) -> Result<ZoneInput, Self::Err> {
        let values = input
            .split(',')
            .map(|field| {
                field
                    .trim()
                    .parse::<f64>()
                    .map_err(|e| format!("invalid number '{}': {}", field.trim(), e))
            })
            .collect::<Result<Vec<f64>, String>>()?;
        match values[..] {
            [dtc, dts, rho, phi] => Ok(ZoneInput::new(dtc, dts, rho, phi)),
            _ => Err(format!(
                "expected 4 comma-separated values (dtc,dts,rho,phi), got {}",
                values.len()
            )),
        }
    }
}

/// Velocity in m/s from a slowness reading in µs/ft
///
/// $$v = \frac{0.3048 \times 10^6}{\Delta t}$$
///
/// # Arguments
/// * slowness_us_per_ft: sonic slowness in µs/ft
/// * wave: which wave the reading belongs to, only used for the error
pub fn velocity_from_slowness(slowness_us_per_ft: f64, wave: Wave) -> Result<f64, SonicError> {
    if !(slowness_us_per_ft > 0.0) {
        return Err(SonicError::NonPositiveSlowness {
            wave,
            value: slowness_us_per_ft,
        });
    }
    Ok(FT_TO_M * US_PER_S / slowness_us_per_ft)
}

/// Vp, Vs in m/s from sonic slowness logs in µs/ft
pub fn velocities_from_sonic(
    dtc_us_per_ft: f64,
    dts_us_per_ft: f64,
) -> Result<(f64, f64), SonicError> {
    let vp = velocity_from_slowness(dtc_us_per_ft, Wave::Compressional)?;
    let vs = velocity_from_slowness(dts_us_per_ft, Wave::Shear)?;
    Ok((vp, vs))
}

/// Saturated bulk modulus in GPa from velocities
///
/// $$K_{sat} = \rho \left(V_p^2 - \frac{4}{3} V_s^2\right)$$
///
/// # Arguments
/// * vp: compressional velocity in m/s
/// * vs: shear velocity in m/s
/// * rho_gcc: bulk density in g/cm³
pub fn bulk_modulus_gpa(vp: f64, vs: f64, rho_gcc: f64) -> f64 {
    let rho = rho_gcc * GCC_TO_KGM3;
    let ksat_pa = rho * (vp.powi(2) - (4.0 / 3.0) * vs.powi(2));
    ksat_pa / PA_PER_GPA
}

/// Shear modulus in GPa, $\mu = \rho V_s^2$
pub fn shear_modulus_gpa(vs: f64, rho_gcc: f64) -> f64 {
    rho_gcc * GCC_TO_KGM3 * vs.powi(2) / PA_PER_GPA
}

/// Saturated bulk modulus in GPa straight from slowness logs
pub fn ksat_gpa(dtc_us_per_ft: f64, dts_us_per_ft: f64, rho_gcc: f64) -> Result<f64, SonicError> {
    let (vp, vs) = velocities_from_sonic(dtc_us_per_ft, dts_us_per_ft)?;
    Ok(bulk_modulus_gpa(vp, vs, rho_gcc))
}
