// Error types for each stage of the saturation workflow

use std::fmt;

use thiserror::Error;

/// Which sonic wave a slowness reading belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wave {
    Compressional,
    Shear,
}

impl fmt::Display for Wave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wave::Compressional => f.write_str("compressional"),
            Wave::Shear => f.write_str("shear"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SonicError {
    #[error("{wave} slowness must be positive, got {value} us/ft")]
    NonPositiveSlowness { wave: Wave, value: f64 },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("mineral modulus must be positive, got {km} GPa")]
    InvalidMineralModulus { km: f64 },

    #[error("calibration resolution must be positive, got {steps_per_gpa} steps per GPa")]
    InvalidResolution { steps_per_gpa: f64 },

    #[error("no Kdry candidates between 0 and {km} GPa at {steps_per_gpa} steps per GPa")]
    EmptyCandidateSet { km: f64, steps_per_gpa: f64 },

    #[error("every Kdry candidate gave a non-finite Gassmann prediction")]
    NoFiniteCandidate,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum InversionError {
    #[error("Ksat equals Kdry ({ksat} GPa), inversion unstable")]
    KsatEqualsKdry { ksat: f64 },

    #[error("invalid inversion term, check rock/fluid assumptions")]
    InvalidTerm,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SaturationError {
    #[error("invalid fluid moduli for saturation calculation (Kw = {kw} GPa, Khc = {khc} GPa)")]
    InvalidFluidModuli { kw: f64, khc: f64 },
}

/// Any failure of the workflow, tagged with the stage that raised it.
///
/// The message names the stage only; the cause is the error source, so
/// print with `{:#}` through anyhow (or walk `source()`) for the full text.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SwError {
    #[error("sonic conversion failed")]
    Sonic(#[from] SonicError),

    #[error("unable to calibrate Kdry, check inputs")]
    Calibration(#[from] CalibrationError),

    #[error("fluid inversion failed")]
    Inversion(#[from] InversionError),

    #[error("saturation estimate failed")]
    Saturation(#[from] SaturationError),

    #[error("zone arrays differ in length: {expected} vs {found}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("target zone {index}")]
    TargetZone {
        index: usize,
        #[source]
        source: Box<SwError>,
    },
}

pub type SwResult<T> = Result<T, SwError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Figment(#[from] figment::Error),

    #[error("configuration file not found: {}", path.display())]
    MissingFile { path: std::path::PathBuf },

    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(err: SwError) -> String {
        format!("{:#}", anyhow::Error::from(err))
    }

    #[test]
    fn messages_name_the_failing_stage() {
        let err = SwError::from(CalibrationError::InvalidMineralModulus { km: -1.0 });
        assert_eq!(err.to_string(), "unable to calibrate Kdry, check inputs");

        let err = SwError::from(InversionError::KsatEqualsKdry { ksat: 12.5 });
        assert_eq!(err.to_string(), "fluid inversion failed");
    }

    #[test]
    fn full_chain_prints_each_message_once() {
        assert_eq!(
            chain(SwError::from(InversionError::InvalidTerm)),
            "fluid inversion failed: invalid inversion term, check rock/fluid assumptions"
        );
        assert_eq!(
            chain(SwError::from(SonicError::NonPositiveSlowness {
                wave: Wave::Shear,
                value: 0.0,
            })),
            "sonic conversion failed: shear slowness must be positive, got 0 us/ft"
        );
        assert_eq!(
            chain(SwError::from(SaturationError::InvalidFluidModuli { kw: 2.0, khc: 2.0 })),
            "saturation estimate failed: invalid fluid moduli for saturation calculation \
             (Kw = 2 GPa, Khc = 2 GPa)"
        );
    }

    #[test]
    fn zone_errors_keep_their_source() {
        let inner = SwError::from(SonicError::NonPositiveSlowness {
            wave: Wave::Compressional,
            value: 0.0,
        });
        let err = SwError::TargetZone {
            index: 1,
            source: Box::new(inner.clone()),
        };
        assert_eq!(err.to_string(), "target zone 1");
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), inner.to_string());
        assert_eq!(
            chain(err),
            "target zone 1: sonic conversion failed: compressional slowness must be positive, \
             got 0 us/ft"
        );
    }
}
