//! Physical constants and calibration settings shared by every stage.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`SONIC_SW_*` prefix, `__` as separator)
//! 2. A TOML file (`--config`, or `./sonic-sw.toml` when present)
//! 3. Built-in defaults
//!
//! `SONIC_SW_MODULI__MINERAL=36.6` maps to `moduli.mineral`,
//! `SONIC_SW_CALIBRATION__METHOD=scan` to `calibration.method`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Grid spacing of the Kdry search, one-thousandth of a GPa.
pub const DEFAULT_STEPS_PER_GPA: f64 = 1000.0;

const fn default_max_iter() -> usize {
    200
}

const fn default_tol() -> f64 {
    1e-9
}

const fn default_steps_per_gpa() -> f64 {
    DEFAULT_STEPS_PER_GPA
}

/// Mineral, brine and hydrocarbon bulk moduli in GPa.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RockFluidModuli {
    /// Km, matrix modulus from the mineral mix
    pub mineral: f64,
    /// Kw, brine at reservoir pressure, temperature and salinity
    pub brine: f64,
    /// Khc, oil or gas
    pub hydrocarbon: f64,
}

impl RockFluidModuli {
    pub fn new(mineral: f64, brine: f64, hydrocarbon: f64) -> Self {
        RockFluidModuli {
            mineral,
            brine,
            hydrocarbon,
        }
    }
}

/// Quartz matrix, brine, light oil.
impl Default for RockFluidModuli {
    fn default() -> Self {
        RockFluidModuli::new(37.0, 2.6, 0.9)
    }
}

/// How the dry-frame modulus is searched for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalibrationMethod {
    /// Bracketed root search snapped to the candidate grid
    #[default]
    Bisection,
    /// Exhaustive scan of the candidate grid
    Scan,
}

impl FromStr for CalibrationMethod {
    type Err = String;

    fn from_str(input: &str) -> Result<CalibrationMethod, Self::Err> {
        match input {
            "bisection" => Ok(CalibrationMethod::Bisection),
            "scan" => Ok(CalibrationMethod::Scan),
            _ => Err(format!(
                "unknown calibration method '{}', expected 'bisection' or 'scan'",
                input
            )),
        }
    }
}

impl fmt::Display for CalibrationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrationMethod::Bisection => f.write_str("bisection"),
            CalibrationMethod::Scan => f.write_str("scan"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSettings {
    /// Candidate Kdry values are `i / steps_per_gpa`.
    #[serde(default = "default_steps_per_gpa")]
    pub steps_per_gpa: f64,

    #[serde(default)]
    pub method: CalibrationMethod,

    /// Bisection iteration cap.
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,

    /// Bisection stops once |Ksat(Kdry) - Ksat| falls below this, in GPa.
    #[serde(default = "default_tol")]
    pub tol: f64,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        CalibrationSettings {
            steps_per_gpa: default_steps_per_gpa(),
            method: CalibrationMethod::default(),
            max_iter: default_max_iter(),
            tol: default_tol(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SwConfig {
    #[serde(default)]
    pub moduli: RockFluidModuli,
    #[serde(default)]
    pub calibration: CalibrationSettings,
}

impl SwConfig {
    pub const ENV_PREFIX: &'static str = "SONIC_SW_";
    pub const DEFAULT_FILE: &'static str = "sonic-sw.toml";

    /// Load from defaults, the TOML file and the environment.
    ///
    /// An explicit `path` must exist; without one, `./sonic-sw.toml` is
    /// merged only if present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::MissingFile {
                    path: path.to_path_buf(),
                });
            }
        }
        let config: SwConfig = Self::figment(path).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the provider chain.
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let file = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_FILE));
        if file.exists() {
            figment = figment.merge(Toml::file(file));
        }

        figment.merge(Env::prefixed(Self::ENV_PREFIX).split("__"))
    }

    /// Solver settings the calibrator cannot work without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.calibration.max_iter == 0 {
            return Err(ConfigError::InvalidValue {
                field: "calibration.max_iter".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if !(self.calibration.tol > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "calibration.tol".to_string(),
                reason: format!("must be positive, got {}", self.calibration.tol),
            });
        }
        Ok(())
    }
}
