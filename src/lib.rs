// library

pub mod calibration;
pub mod error;
pub mod gassmann;
pub mod params;
pub mod pipeline;
pub mod sonic;
pub mod wood;

#[cfg(feature = "python")]
mod python;

pub use calibration::{calibrate_kdry_from_water_zone, FrameCalibrator};
pub use error::{
    CalibrationError, ConfigError, InversionError, SaturationError, SonicError, SwError, SwResult,
};
pub use gassmann::{gassmann_ksat, invert_kf_from_ksat};
pub use params::{CalibrationMethod, CalibrationSettings, RockFluidModuli, SwConfig};
pub use pipeline::{estimate_saturation, CalibratedFrame, SaturationReport, TargetEstimate};
pub use sonic::{ksat_gpa, velocities_from_sonic, ZoneInput, FT_TO_M};
pub use wood::{kf_from_wood, sw_from_wood};
